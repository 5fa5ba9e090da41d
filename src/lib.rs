//! Datalogger VM Builtin Runtime
//!
//! This library implements the builtin call contract of an embedded
//! datalogger VM: the symbol table a compiler front end type-checks calls
//! against, and the dispatch layer a host VM routes those calls through.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Builtin Contract                                │
//! │  - Symbol table: names, parameter types, return types, slots    │
//! │  - Call validation: arity, widening (char -> int -> float)      │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                                 │
//! │  - Value/type model                                              │
//! │  - Measurement table definitions (periods, columns, wire layout) │
//! │  - Measurement schedule                                          │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Ports (Traits)                               │
//! │  - AnalogPort / DigitalPort: pin-level hardware access          │
//! │  - SensorBusPort: addressed serial sensor bus measurements      │
//! │  - ConsolePort / ClockPort / TableStorePort                     │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Adapters                                     │
//! │  - mock: scripted context for tests                             │
//! │  - host: stdout / process clock / in-memory store (std)         │
//! │  - rp2350: embassy-rp ADC and GPIO (rp2350 feature)             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Properties
//!
//! - **No faults from routine I/O** - math domain errors yield NaN,
//!   hardware failures are recoverable reported conditions
//! - **Testable** - all hardware state lives behind ports; the whole
//!   contract runs against the mock adapters
//! - **Cooperative** - suspension builtins (`delay`, `waitNextMeasure`,
//!   bus measurements) are async and suspend only the calling context

#![cfg_attr(not(feature = "std"), no_std)]

// ============================================================================
// Builtin contract (shared between compiler front end and device VM)
// ============================================================================

pub mod builtin_table;

pub use builtin_table::{
    address_of, builtin_at, check_call, lookup, slot, BuiltinSignature, CallError, ReturnType,
    BUILTINS, BUILTIN_ADDRESS_BASE, BUILTIN_COUNT,
};

// ============================================================================
// Hexagonal Architecture
// ============================================================================

/// Domain layer - pure contract logic
pub mod domain;

/// Ports - traits defining boundaries
pub mod ports;

/// Adapters - concrete implementations
pub mod adapters;

/// Dispatch - executing builtin calls against the ports
pub mod dispatch;

// Re-export key domain types
pub use domain::{
    CellValue, Column, ColumnFormat, SamplePeriod, Schedule, TableDef, TableDefError, ValueType,
};

// Re-export key port traits
pub use ports::{
    AnalogPort, BusAddress, ClockPort, ConsolePort, DigitalPort, SensorBusConfig, SensorBusPort,
    TableStorePort,
};

// Re-export the dispatch surface
pub use dispatch::{BuiltinCall, BuiltinError, BuiltinValue, HostBuiltins, ADC_READ_FAILED};
