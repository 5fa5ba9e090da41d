//! Table store port - abstraction for persisting measurement tables
//!
//! This trait allows the runtime to persist accumulated table rows
//! without knowing the storage medium (flash, host file, mock). Rows are
//! staged as they are produced and flushed to durable storage in one
//! commit, so a storage hiccup costs one commit, not the whole run.

use crate::domain::table::{CellValue, TableDef};

/// Handle to a registered table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TableId(pub u8);

/// Error type for table store operations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TableStoreError {
    /// Store not initialized
    NotInitialized,
    /// The table handle does not name a registered table
    NotRegistered,
    /// The store already holds the maximum number of tables
    TooManyTables,
    /// A staged row does not match the table's columns
    SchemaMismatch,
    /// Durable storage is full
    StorageFull,
    /// The storage medium rejected the write
    WriteFailed,
}

/// Table store statistics
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TableStoreStats {
    /// Registered tables
    pub tables: u8,
    /// Rows staged but not yet committed
    pub staged_rows: u32,
    /// Rows committed to durable storage since boot
    pub committed_rows: u32,
}

/// Port for persisting measurement table rows
///
/// The row lifecycle is `register` once, `stage` per sample, `commit` on
/// the program's save request. A commit flushes every staged row across
/// all tables.
pub trait TableStorePort {
    /// Register a table definition, returning its handle.
    fn register(&mut self, def: &TableDef) -> Result<TableId, TableStoreError>;

    /// Stage one row for `table`.
    ///
    /// The row must carry one cell per declared column, each matching the
    /// column's format, else `SchemaMismatch`.
    fn stage(&mut self, table: TableId, row: &[CellValue]) -> Result<(), TableStoreError>;

    /// Flush all staged rows to durable storage.
    ///
    /// Returns the number of rows persisted. On failure the staged rows
    /// remain staged; the caller may retry a later commit.
    fn commit(&mut self) -> impl core::future::Future<Output = Result<u32, TableStoreError>>;

    /// Get store statistics
    fn stats(&self) -> TableStoreStats;
}
