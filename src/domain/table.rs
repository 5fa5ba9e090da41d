//! Measurement table definitions
//!
//! A table is the unit of durable output: a named set of typed columns
//! sampled on a fixed period. Table definitions are serialized into the
//! device image with a fixed layout (16-byte-bounded names, one period
//! byte, one format byte per column), so every field here is bounded.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

/// Maximum number of columns in a table
pub const MAX_TABLE_COLUMNS: usize = 16;

/// Maximum number of tables a device image can declare
pub const MAX_TABLES: usize = 8;

/// Maximum bytes of a serialized name field (truncated beyond this)
pub const NAME_FIELD_BYTES: usize = 16;

/// Worst-case serialized size of one table definition
///
/// Full-length name (16, no terminator) + period byte + 16 columns of
/// format byte plus a short-name field (16 + terminator).
pub const MAX_SERIALIZED_LEN: usize =
    NAME_FIELD_BYTES + 1 + MAX_TABLE_COLUMNS * (1 + NAME_FIELD_BYTES + 1);

/// Error type for table definition operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TableDefError {
    /// Period value outside the representable range
    PeriodOutOfRange,
    /// Table already has `MAX_TABLE_COLUMNS` columns
    TooManyColumns,
    /// Destination buffer cannot hold the serialized definition
    BufferTooSmall,
}

/// Cell format of one column, with its fixed wire discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ColumnFormat {
    /// Placeholder for an unrecognized format byte
    Invalid = 0,
    /// Unsigned 8-bit cell
    Uint8 = 1,
    /// Signed 8-bit cell
    Int8 = 2,
    /// Unsigned 16-bit cell
    Uint16 = 3,
    /// Signed 16-bit cell
    Int16 = 4,
    /// Unsigned 32-bit cell
    Uint32 = 5,
    /// Signed 32-bit cell
    Int32 = 6,
    /// 32-bit IEEE float cell
    Float = 7,
}

impl ColumnFormat {
    /// The byte this format serializes as.
    pub const fn wire_value(self) -> u8 {
        self as u8
    }

    /// Decode a format byte. Unknown bytes map to `None`.
    pub const fn from_wire(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(ColumnFormat::Invalid),
            1 => Some(ColumnFormat::Uint8),
            2 => Some(ColumnFormat::Int8),
            3 => Some(ColumnFormat::Uint16),
            4 => Some(ColumnFormat::Int16),
            5 => Some(ColumnFormat::Uint32),
            6 => Some(ColumnFormat::Int32),
            7 => Some(ColumnFormat::Float),
            _ => None,
        }
    }

    /// Size in bytes of one cell of this format.
    pub const fn cell_size(self) -> usize {
        match self {
            ColumnFormat::Invalid => 0,
            ColumnFormat::Uint8 | ColumnFormat::Int8 => 1,
            ColumnFormat::Uint16 | ColumnFormat::Int16 => 2,
            ColumnFormat::Uint32 | ColumnFormat::Int32 | ColumnFormat::Float => 4,
        }
    }

    /// Whether this format holds integer cells.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            ColumnFormat::Uint8
                | ColumnFormat::Int8
                | ColumnFormat::Uint16
                | ColumnFormat::Int16
                | ColumnFormat::Uint32
                | ColumnFormat::Int32
        )
    }
}

/// Sampling period of a table, bounded per unit.
///
/// The wire encoding packs the period into one byte: seconds encode as-is,
/// minutes as `value + 59`, hours as `value + 118`. The ranges meet exactly
/// where the durations coincide (`Minutes(1)` encodes like `Seconds(60)`,
/// `Hours(1)` like `Minutes(60)`), so the code-to-duration mapping stays
/// monotone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplePeriod {
    /// 1..=60 seconds
    Seconds(u8),
    /// 1..=60 minutes
    Minutes(u8),
    /// 1..=24 hours
    Hours(u8),
}

impl SamplePeriod {
    /// Create a period of `value` seconds (1..=60).
    pub fn seconds(value: u8) -> Result<Self, TableDefError> {
        if value == 0 || value > 60 {
            return Err(TableDefError::PeriodOutOfRange);
        }
        Ok(SamplePeriod::Seconds(value))
    }

    /// Create a period of `value` minutes (1..=60).
    pub fn minutes(value: u8) -> Result<Self, TableDefError> {
        if value == 0 || value > 60 {
            return Err(TableDefError::PeriodOutOfRange);
        }
        Ok(SamplePeriod::Minutes(value))
    }

    /// Create a period of `value` hours (1..=24).
    pub fn hours(value: u8) -> Result<Self, TableDefError> {
        if value == 0 || value > 24 {
            return Err(TableDefError::PeriodOutOfRange);
        }
        Ok(SamplePeriod::Hours(value))
    }

    /// Period length in seconds.
    pub const fn as_secs(self) -> u32 {
        match self {
            SamplePeriod::Seconds(v) => v as u32,
            SamplePeriod::Minutes(v) => v as u32 * 60,
            SamplePeriod::Hours(v) => v as u32 * 3600,
        }
    }

    /// One-byte wire encoding of this period.
    pub const fn encode(self) -> u8 {
        match self {
            SamplePeriod::Seconds(v) => v,
            SamplePeriod::Minutes(v) => (v as u16 + 59) as u8,
            SamplePeriod::Hours(v) => (v as u16 + 118) as u8,
        }
    }

    /// Decode a period byte into its canonical representation.
    ///
    /// Where unit ranges overlap (equal durations), the smaller unit wins:
    /// code 60 decodes as `Seconds(60)`, not `Minutes(1)`.
    pub const fn decode(code: u8) -> Option<Self> {
        match code {
            0 => None,
            1..=60 => Some(SamplePeriod::Seconds(code)),
            61..=119 => Some(SamplePeriod::Minutes(code - 59)),
            120..=142 => Some(SamplePeriod::Hours(code - 118)),
            _ => None,
        }
    }
}

/// One column of a measurement table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, truncated to the 16-byte name field
    pub name: String<NAME_FIELD_BYTES>,
    /// Cell format
    pub format: ColumnFormat,
}

impl Column {
    /// Create a column, truncating the name to the wire field size.
    pub fn new(name: &str, format: ColumnFormat) -> Self {
        Self {
            name: truncate_name(name),
            format,
        }
    }
}

/// A measurement table definition.
///
/// Columns are appended with [`TableDef::push_column`]; the count is capped
/// at [`MAX_TABLE_COLUMNS`] to match the device layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    name: String<NAME_FIELD_BYTES>,
    period: SamplePeriod,
    columns: Vec<Column, MAX_TABLE_COLUMNS>,
}

impl TableDef {
    /// Create an empty table definition.
    ///
    /// The name is truncated to the 16-byte wire field.
    pub fn new(name: &str, period: SamplePeriod) -> Self {
        Self {
            name: truncate_name(name),
            period,
            columns: Vec::new(),
        }
    }

    /// Append a column.
    pub fn push_column(&mut self, column: Column) -> Result<(), TableDefError> {
        self.columns
            .push(column)
            .map_err(|_| TableDefError::TooManyColumns)
    }

    /// Table name (already truncated to the wire field).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sampling period.
    pub const fn period(&self) -> SamplePeriod {
        self.period
    }

    /// Declared columns, in definition order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Exact size of the serialized definition in bytes.
    pub fn serialized_len(&self) -> usize {
        let mut len = name_field_len(&self.name) + 1;
        for column in &self.columns {
            len += 1 + name_field_len(&column.name);
        }
        if self.columns.len() < MAX_TABLE_COLUMNS {
            len += 1;
        }
        len
    }

    /// Serialize the definition into `dst` using the device layout.
    ///
    /// Layout: name field, one period byte, then per column a format byte
    /// followed by the column's name field, then a single zero terminator
    /// byte when fewer than [`MAX_TABLE_COLUMNS`] columns are present.
    /// A name field is the raw name bytes followed by a NUL, with the NUL
    /// omitted when the name fills all 16 bytes.
    ///
    /// Returns the number of bytes written; never writes past `dst`.
    pub fn serialize_into(&self, dst: &mut [u8]) -> Result<usize, TableDefError> {
        let needed = self.serialized_len();
        if dst.len() < needed {
            return Err(TableDefError::BufferTooSmall);
        }

        let mut at = write_name_field(&self.name, dst, 0);
        dst[at] = self.period.encode();
        at += 1;

        for column in &self.columns {
            dst[at] = column.format.wire_value();
            at += 1;
            at = write_name_field(&column.name, dst, at);
        }
        if self.columns.len() < MAX_TABLE_COLUMNS {
            dst[at] = 0;
            at += 1;
        }

        Ok(at)
    }
}

/// A staged row cell, matching one column of a table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Integer cell (any integer column format)
    Int(i32),
    /// Float cell
    Float(f32),
}

impl CellValue {
    /// Whether this cell may be stored under the given column format.
    pub const fn matches(self, format: ColumnFormat) -> bool {
        match self {
            CellValue::Int(_) => format.is_integer(),
            CellValue::Float(_) => matches!(format, ColumnFormat::Float),
        }
    }
}

/// Truncate a name to the wire field size, respecting UTF-8 boundaries.
fn truncate_name(name: &str) -> String<NAME_FIELD_BYTES> {
    let mut end = name.len().min(NAME_FIELD_BYTES);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    // Cannot fail: `end` is at most the field size
    String::try_from(&name[..end]).unwrap_or_default()
}

/// Serialized size of a name field: the bytes plus a NUL unless full.
fn name_field_len(name: &str) -> usize {
    if name.len() < NAME_FIELD_BYTES {
        name.len() + 1
    } else {
        NAME_FIELD_BYTES
    }
}

/// Write a name field at `at`, returning the new offset.
fn write_name_field(name: &str, dst: &mut [u8], at: usize) -> usize {
    let bytes = name.as_bytes();
    dst[at..at + bytes.len()].copy_from_slice(bytes);
    let mut at = at + bytes.len();
    if bytes.len() < NAME_FIELD_BYTES {
        dst[at] = 0;
        at += 1;
    }
    at
}
