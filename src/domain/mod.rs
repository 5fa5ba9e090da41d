//! Domain layer - pure contract logic independent of infrastructure
//!
//! This module contains the core domain entities and services of the
//! builtin runtime: the value/type model, measurement table definitions,
//! and the measurement schedule.

pub mod schedule;
pub mod table;
pub mod value;

pub use schedule::Schedule;
pub use table::{
    CellValue, Column, ColumnFormat, SamplePeriod, TableDef, TableDefError, MAX_TABLES,
    MAX_TABLE_COLUMNS,
};
pub use value::ValueType;
