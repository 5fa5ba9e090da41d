//! Mock adapters - the reproducible test context
//!
//! One mock per port: scripted values in, recorded calls out, no real
//! I/O. The mocks are plain `core` code so the full builtin contract can
//! be exercised identically on a host and in a device test image.

use heapless::{String, Vec};

use crate::domain::table::{CellValue, TableDef, MAX_TABLES, MAX_TABLE_COLUMNS};
use crate::ports::analog::{AnalogError, AnalogPort};
use crate::ports::clock::ClockPort;
use crate::ports::console::{ConsoleError, ConsolePort};
use crate::ports::digital::{DigitalError, DigitalPort};
use crate::ports::sensor_bus::{BusAddress, SensorBusError, SensorBusPort};
use crate::ports::table_store::{TableId, TableStoreError, TableStorePort, TableStoreStats};

/// Scripted readings / recorded transitions kept per mock
const MOCK_SLOTS: usize = 16;

/// Captured console output bound
const MOCK_CONSOLE_BYTES: usize = 256;

// ============================================================================
// Analog
// ============================================================================

/// Mock analog converter frontend.
///
/// Valid ports and channels are configured up front; readings are
/// scripted per (port, channel) and default to zero.
pub struct MockAnalog {
    ports: u8,
    channels: u8,
    readings: Vec<(u8, u8, u16), MOCK_SLOTS>,
    fail_next: Option<AnalogError>,
}

impl MockAnalog {
    /// Create a mock with `ports` converters of `channels` channels each.
    pub fn new(ports: u8, channels: u8) -> Self {
        Self {
            ports,
            channels,
            readings: Vec::new(),
            fail_next: None,
        }
    }

    /// Script the value returned for one channel.
    pub fn set_reading(&mut self, port: u8, channel: u8, value: u16) {
        let _ = self.readings.push((port, channel, value));
    }

    /// Make the next read fail with `error`.
    pub fn fail_next(&mut self, error: AnalogError) {
        self.fail_next = Some(error);
    }
}

impl AnalogPort for MockAnalog {
    fn read(&mut self, port: u8, channel: u8) -> Result<u16, AnalogError> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        if port >= self.ports {
            return Err(AnalogError::InvalidPort);
        }
        if channel >= self.channels {
            return Err(AnalogError::InvalidChannel);
        }
        let scripted = self
            .readings
            .iter()
            .find(|&&(p, c, _)| p == port && c == channel)
            .map(|&(_, _, v)| v);
        Ok(scripted.unwrap_or(0))
    }
}

// ============================================================================
// Digital
// ============================================================================

/// Mock digital output bank recording every transition.
pub struct MockDigital {
    channels: u8,
    transitions: Vec<(u8, bool), MOCK_SLOTS>,
}

impl MockDigital {
    /// Create a mock with `channels` output channels.
    pub fn new(channels: u8) -> Self {
        Self {
            channels,
            transitions: Vec::new(),
        }
    }

    /// Every recorded (channel, level) write, in order.
    pub fn transitions(&self) -> &[(u8, bool)] {
        &self.transitions
    }

    /// The last level written to `channel`, if any.
    pub fn last_level(&self, channel: u8) -> Option<bool> {
        self.transitions
            .iter()
            .rev()
            .find(|&&(c, _)| c == channel)
            .map(|&(_, level)| level)
    }
}

impl DigitalPort for MockDigital {
    fn set_level(&mut self, channel: u8, high: bool) -> Result<(), DigitalError> {
        if channel >= self.channels {
            return Err(DigitalError::InvalidChannel);
        }
        let _ = self.transitions.push((channel, high));
        Ok(())
    }
}

// ============================================================================
// Sensor bus
// ============================================================================

/// Mock sensor bus with scripted readings per address.
pub struct MockSensorBus {
    responses: Vec<(BusAddress, Vec<f32, MOCK_SLOTS>), 4>,
    fail_next: Option<SensorBusError>,
    last_request: Option<(BusAddress, usize)>,
}

impl MockSensorBus {
    /// Create a bus with no sensors attached.
    pub fn new() -> Self {
        Self {
            responses: Vec::new(),
            fail_next: None,
            last_request: None,
        }
    }

    /// Attach a scripted sensor at `addr` answering with `readings`.
    pub fn attach(&mut self, addr: BusAddress, readings: &[f32]) {
        let mut values = Vec::new();
        for &v in readings.iter().take(MOCK_SLOTS) {
            let _ = values.push(v);
        }
        let _ = self.responses.push((addr, values));
    }

    /// Make the next measurement fail with `error`.
    pub fn fail_next(&mut self, error: SensorBusError) {
        self.fail_next = Some(error);
    }

    /// The address and requested count of the last measurement.
    pub fn last_request(&self) -> Option<(BusAddress, usize)> {
        self.last_request
    }
}

impl Default for MockSensorBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorBusPort for MockSensorBus {
    async fn measure(
        &mut self,
        addr: BusAddress,
        dst: &mut [f32],
    ) -> Result<usize, SensorBusError> {
        self.last_request = Some((addr, dst.len()));
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        let readings = self
            .responses
            .iter()
            .find(|(a, _)| *a == addr)
            .map(|(_, values)| values.as_slice())
            .ok_or(SensorBusError::NoResponse)?;
        let n = readings.len().min(dst.len());
        dst[..n].copy_from_slice(&readings[..n]);
        Ok(n)
    }
}

// ============================================================================
// Console
// ============================================================================

/// Mock console capturing emitted text.
pub struct MockConsole {
    output: String<MOCK_CONSOLE_BYTES>,
}

impl MockConsole {
    /// Create an empty capture buffer.
    pub fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    /// Everything written so far, concatenated.
    pub fn output(&self) -> &str {
        &self.output
    }
}

impl Default for MockConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsolePort for MockConsole {
    fn write_text(&mut self, text: &str) -> Result<(), ConsoleError> {
        self.output
            .push_str(text)
            .map_err(|_| ConsoleError::MessageTooLarge)
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Mock clock: a manual millisecond counter.
///
/// Sleeps complete synchronously by advancing the counter and recording
/// the requested duration, so timing behavior is observable without
/// real waiting.
pub struct MockClock {
    now_ms: u64,
    sleeps: Vec<u64, MOCK_SLOTS>,
}

impl MockClock {
    /// Create a clock at zero milliseconds since boot.
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            sleeps: Vec::new(),
        }
    }

    /// Create a clock already at `now_ms`.
    pub fn at(now_ms: u64) -> Self {
        Self {
            now_ms,
            sleeps: Vec::new(),
        }
    }

    /// Advance the clock without recording a sleep.
    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    /// Every sleep duration requested, in order.
    pub fn sleeps(&self) -> &[u64] {
        &self.sleeps
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for MockClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    async fn sleep_ms(&mut self, ms: u64) {
        self.now_ms += ms;
        let _ = self.sleeps.push(ms);
    }
}

// ============================================================================
// Table store
// ============================================================================

/// Mock table store holding staged and committed rows in memory.
pub struct MockTableStore {
    tables: Vec<TableDef, MAX_TABLES>,
    staged: Vec<(u8, Vec<CellValue, MAX_TABLE_COLUMNS>), MOCK_SLOTS>,
    committed_rows: u32,
    fail_next_commit: Option<TableStoreError>,
}

impl MockTableStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            staged: Vec::new(),
            committed_rows: 0,
            fail_next_commit: None,
        }
    }

    /// Make the next commit fail with `error` (staged rows are kept).
    pub fn fail_next_commit(&mut self, error: TableStoreError) {
        self.fail_next_commit = Some(error);
    }

    /// Rows committed since construction.
    pub fn committed_rows(&self) -> u32 {
        self.committed_rows
    }
}

impl Default for MockTableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TableStorePort for MockTableStore {
    fn register(&mut self, def: &TableDef) -> Result<TableId, TableStoreError> {
        let id = self.tables.len() as u8;
        self.tables
            .push(def.clone())
            .map_err(|_| TableStoreError::TooManyTables)?;
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
        let mut cells = Vec::new();
        for &cell in row {
            let _ = cells.push(cell);
        }
        self.staged
            .push((table.0, cells))
            .map_err(|_| TableStoreError::StorageFull)?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<u32, TableStoreError> {
        if let Some(error) = self.fail_next_commit.take() {
            return Err(error);
        }
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
