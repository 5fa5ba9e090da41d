//! Host adapters - std universe bindings
//!
//! These adapters bind the ports to a PC environment: stdout for the
//! console, the process clock for timing, and an in-memory stand-in for
//! durable storage that frames committed rows the same way a device
//! transport would (postcard + COBS).

use std::io::Write;
use std::time::{Duration, Instant};

use heapless::Vec as BoundedVec;
use serde::{Deserialize, Serialize};

use crate::domain::table::{CellValue, TableDef, MAX_TABLES, MAX_TABLE_COLUMNS};
use crate::ports::clock::ClockPort;
use crate::ports::console::{ConsoleError, ConsolePort};
use crate::ports::table_store::{TableId, TableStoreError, TableStorePort, TableStoreStats};

/// Console adapter writing program output to stdout.
pub struct StdConsole;

impl ConsolePort for StdConsole {
    fn write_text(&mut self, text: &str) -> Result<(), ConsoleError> {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(text.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|_| ConsoleError::WriteFailed)
    }
}

/// Clock adapter over the process monotonic clock.
///
/// Sleeps park the thread; on a host there is exactly one execution
/// context, so this matches the cooperative model.
pub struct StdClock {
    started: Instant,
}

impl StdClock {
    /// Create a clock starting at zero now.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for StdClock {
    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    async fn sleep_ms(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

/// One committed row as framed into the store log.
#[derive(Serialize, Deserialize)]
struct RowRecord {
    table: u8,
    cells: BoundedVec<CellValue, MAX_TABLE_COLUMNS>,
}

/// Worst-case COBS frame for one row record
const FRAME_BYTES: usize = 192;

/// In-memory durable-storage stand-in.
///
/// Committed rows are appended to a byte log as COBS-framed postcard
/// records; the log is capped so the storage-full path is reachable on a
/// host.
pub struct MemTableStore {
    tables: std::vec::Vec<TableDef>,
    staged: std::vec::Vec<(u8, BoundedVec<CellValue, MAX_TABLE_COLUMNS>)>,
    log: std::vec::Vec<u8>,
    capacity_bytes: usize,
    committed_rows: u32,
}

impl MemTableStore {
    /// Default log capacity (64 KiB).
    pub const DEFAULT_CAPACITY: usize = 64 * 1024;

    /// Create a store with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a store holding at most `capacity_bytes` of committed log.
    pub fn with_capacity(capacity_bytes: usize) -> Self {
        Self {
            tables: std::vec::Vec::new(),
            staged: std::vec::Vec::new(),
            log: std::vec::Vec::new(),
            capacity_bytes,
            committed_rows: 0,
        }
    }

    /// The committed log: concatenated COBS frames, one per row.
    pub fn log_bytes(&self) -> &[u8] {
        &self.log
    }

    /// Rows committed since construction.
    pub fn committed_rows(&self) -> u32 {
        self.committed_rows
    }
}

impl Default for MemTableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TableStorePort for MemTableStore {
    fn register(&mut self, def: &TableDef) -> Result<TableId, TableStoreError> {
        if self.tables.len() >= MAX_TABLES {
            return Err(TableStoreError::TooManyTables);
        }
        let id = self.tables.len() as u8;
        self.tables.push(def.clone());
        Ok(TableId(id))
    }

    fn stage(&mut self, table: TableId, row: &[CellValue]) -> Result<(), TableStoreError> {
        let def = self
            .tables
            .get(table.0 as usize)
            .ok_or(TableStoreError::NotRegistered)?;
        if row.len() != def.columns().len() {
            return Err(TableStoreError::SchemaMismatch);
        }
        for (cell, column) in row.iter().zip(def.columns()) {
            if !cell.matches(column.format) {
                return Err(TableStoreError::SchemaMismatch);
            }
        }
        let mut cells = BoundedVec::new();
        for &cell in row {
            let _ = cells.push(cell);
        }
        self.staged.push((table.0, cells));
        Ok(())
    }

    async fn commit(&mut self) -> Result<u32, TableStoreError> {
        // Frame everything first so a full log never half-commits
        let mut frames: std::vec::Vec<u8> = std::vec::Vec::new();
        for (table, cells) in &self.staged {
            let record = RowRecord {
                table: *table,
                cells: cells.clone(),
            };
            let frame = postcard::to_vec_cobs::<RowRecord, FRAME_BYTES>(&record)
                .map_err(|_| TableStoreError::WriteFailed)?;
            frames.extend_from_slice(&frame);
        }
        if self.log.len() + frames.len() > self.capacity_bytes {
            return Err(TableStoreError::StorageFull);
        }
        self.log.extend_from_slice(&frames);
        let flushed = self.staged.len() as u32;
        self.staged.clear();
        self.committed_rows += flushed;
        Ok(flushed)
    }

    fn stats(&self) -> TableStoreStats {
        TableStoreStats {
            tables: self.tables.len() as u8,
            staged_rows: self.staged.len() as u32,
            committed_rows: self.committed_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::{Column, ColumnFormat, SamplePeriod};
    use embassy_futures::block_on;

    fn env_table() -> TableDef {
        let mut def = TableDef::new("env", SamplePeriod::Seconds(10));
        def.push_column(Column::new("temp", ColumnFormat::Float))
            .unwrap();
        def.push_column(Column::new("count", ColumnFormat::Int32))
            .unwrap();
        def
    }

    #[test]
    fn test_commit_frames_rows() {
        let mut store = MemTableStore::new();
        let id = store.register(&env_table()).unwrap();
        store
            .stage(id, &[CellValue::Float(21.5), CellValue::Int(3)])
            .unwrap();
        store
            .stage(id, &[CellValue::Float(21.9), CellValue::Int(4)])
            .unwrap();

        let flushed = block_on(store.commit()).unwrap();
        assert_eq!(flushed, 2);
        assert_eq!(store.committed_rows(), 2);
        assert_eq!(store.stats().staged_rows, 0);

        // COBS framing: two frames, each ending in the 0x00 delimiter
        let log = store.log_bytes();
        assert!(!log.is_empty());
        assert_eq!(*log.last().unwrap(), 0x00);
        assert_eq!(log.iter().filter(|&&b| b == 0x00).count(), 2);
    }

    #[test]
    fn test_full_log_keeps_staged_rows() {
        let mut store = MemTableStore::with_capacity(4);
        let id = store.register(&env_table()).unwrap();
        store
            .stage(id, &[CellValue::Float(21.5), CellValue::Int(3)])
            .unwrap();

        assert_eq!(
            block_on(store.commit()),
            Err(TableStoreError::StorageFull)
        );
        // Nothing lost: the row is still staged for a later retry
        assert_eq!(store.stats().staged_rows, 1);
        assert_eq!(store.committed_rows(), 0);
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let mut store = MemTableStore::new();
        let id = store.register(&env_table()).unwrap();
        assert_eq!(
            store.stage(id, &[CellValue::Int(1), CellValue::Int(3)]),
            Err(TableStoreError::SchemaMismatch)
        );
        assert_eq!(
            store.stage(id, &[CellValue::Float(1.0)]),
            Err(TableStoreError::SchemaMismatch)
        );
        assert_eq!(
            store.stage(TableId(9), &[]),
            Err(TableStoreError::NotRegistered)
        );
    }
}
