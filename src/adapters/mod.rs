//! Adapters - concrete implementations of ports
//!
//! Adapters connect the builtin runtime to the outside world by
//! implementing the port traits. Each adapter knows how to work with a
//! specific environment or hardware.
//!
//! # Available Adapters
//!
//! - **mock**: scripted, recording adapters for every port (tests)
//! - **host**: stdout console, process clock, in-memory table store (std)
//! - **rp2350**: embassy-rp ADC/GPIO and embassy-time clock (`rp2350`
//!   feature)

pub mod mock;

#[cfg(feature = "std")]
pub mod host;

#[cfg(feature = "rp2350")]
pub mod rp2350;

pub use mock::{MockAnalog, MockClock, MockConsole, MockDigital, MockSensorBus, MockTableStore};

#[cfg(feature = "std")]
pub use host::{MemTableStore, StdClock, StdConsole};

#[cfg(feature = "rp2350")]
pub use rp2350::{EmbassyClock, Rp2350Analog, Rp2350Digital};
