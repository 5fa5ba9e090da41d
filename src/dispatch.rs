//! Builtin dispatch - executing contract calls against the host ports
//!
//! The compiler resolves a call site against the symbol table in
//! [`crate::builtin_table`]; at run time the VM hands the same call, with
//! its arguments now concrete, to [`HostBuiltins::execute`]. Calls are a
//! fixed enumerated union rather than a name/`&[value]` pair, so a
//! malformed call cannot exist past construction.
//!
//! Failure policy (an embedded control loop cannot tolerate faults from
//! routine I/O):
//!
//! - math builtins are pure and total: domain violations yield NaN
//! - `getADC` reports failure in-band as the `-1` sentinel, since the
//!   declared contract gives it no error channel
//! - every other hardware builtin surfaces failure as a recoverable
//!   [`BuiltinError`]; the context stays usable afterwards

use crate::builtin_table::{BuiltinSignature, BUILTINS};
use crate::domain::table::{CellValue, TableDef};
use crate::domain::Schedule;
use crate::ports::analog::AnalogPort;
use crate::ports::clock::ClockPort;
use crate::ports::console::{ConsoleError, ConsolePort};
use crate::ports::digital::{DigitalError, DigitalPort};
use crate::ports::sensor_bus::{BusAddress, SensorBusError, SensorBusPort};
use crate::ports::table_store::{TableId, TableStoreError, TableStorePort, TableStoreStats};

/// In-band result of a failed `getADC` call.
pub const ADC_READ_FAILED: i32 = -1;

/// One builtin call with its typed argument list.
///
/// Buffers are caller-owned; the runtime writes through them during the
/// call and retains nothing afterwards.
#[derive(Debug)]
pub enum BuiltinCall<'a> {
    /// sine (radians)
    Sin(f32),
    /// cosine (radians)
    Cos(f32),
    /// tangent (radians)
    Tan(f32),
    /// arcsine, NaN outside [-1, 1]
    Asin(f32),
    /// arccosine, NaN outside [-1, 1]
    Acos(f32),
    /// arctangent
    Atan(f32),
    /// hyperbolic sine
    Sinh(f32),
    /// hyperbolic cosine
    Cosh(f32),
    /// hyperbolic tangent
    Tanh(f32),
    /// inverse hyperbolic sine
    Asinh(f32),
    /// inverse hyperbolic cosine, NaN below 1
    Acosh(f32),
    /// inverse hyperbolic tangent, NaN outside (-1, 1)
    Atanh(f32),
    /// square root, NaN for negative input
    Sqrt(f32),
    /// natural exponential
    Exp(f32),
    /// emit a format string to the output channel
    Print(&'a str),
    /// read an analog channel
    GetAdc {
        /// Converter number
        port: i32,
        /// Channel on the converter
        channel: i32,
    },
    /// drive a digital output
    SetPin {
        /// Logical output channel
        channel: i32,
        /// Zero is low, anything else high
        level: i32,
    },
    /// trigger one sensor bus measurement cycle
    Sdi12SingleMeasurement {
        /// Bus address of the sensor
        addr: i32,
        /// Caller-owned destination buffer
        dst: &'a mut [f32],
        /// Readings requested; never more than this are written
        count: i32,
    },
    /// suspend the calling context for a duration
    Delay {
        /// Milliseconds; zero or negative returns immediately
        ms: i32,
    },
    /// suspend until the next measurement cycle boundary
    WaitNextMeasure,
    /// flush staged table rows to durable storage
    SaveTable,
}

impl BuiltinCall<'_> {
    /// Dispatch slot of this call (index into [`BUILTINS`]).
    pub const fn slot(&self) -> usize {
        match self {
            BuiltinCall::Sin(_) => 0,
            BuiltinCall::Cos(_) => 1,
            BuiltinCall::Tan(_) => 2,
            BuiltinCall::Asin(_) => 3,
            BuiltinCall::Acos(_) => 4,
            BuiltinCall::Atan(_) => 5,
            BuiltinCall::Sinh(_) => 6,
            BuiltinCall::Cosh(_) => 7,
            BuiltinCall::Tanh(_) => 8,
            BuiltinCall::Asinh(_) => 9,
            BuiltinCall::Acosh(_) => 10,
            BuiltinCall::Atanh(_) => 11,
            BuiltinCall::Sqrt(_) => 12,
            BuiltinCall::Exp(_) => 13,
            BuiltinCall::Print(_) => 14,
            BuiltinCall::GetAdc { .. } => 15,
            BuiltinCall::SetPin { .. } => 16,
            BuiltinCall::Sdi12SingleMeasurement { .. } => 17,
            BuiltinCall::Delay { .. } => 18,
            BuiltinCall::WaitNextMeasure => 19,
            BuiltinCall::SaveTable => 20,
        }
    }

    /// The symbol-table signature this call was resolved against.
    pub fn signature(&self) -> &'static BuiltinSignature {
        &BUILTINS[self.slot()]
    }

    /// Source-level name of this builtin.
    pub fn name(&self) -> &'static str {
        self.signature().name
    }
}

/// What a completed call leaves for the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BuiltinValue {
    /// Nothing (void builtins)
    Void,
    /// An integer result
    Int(i32),
    /// A float result
    Float(f32),
}

/// Recoverable failure of a hardware-touching builtin.
///
/// Reporting one of these must never terminate the calling program; the
/// embedding VM logs it and continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuiltinError {
    /// Console write failed
    Console(ConsoleError),
    /// Digital output rejected the write
    Digital(DigitalError),
    /// Sensor bus measurement failed
    SensorBus(SensorBusError),
    /// Table persistence failed
    TableStore(TableStoreError),
    /// `waitNextMeasure` with no table registered: there is no cycle
    NoMeasurementCycle,
}

/// The host context: every hardware-touching builtin goes through here.
///
/// One explicit object instead of global hardware state, so the full
/// contract is reproducible against mock ports. The type parameters are
/// the six port implementations.
pub struct HostBuiltins<A, D, B, C, K, S> {
    analog: A,
    digital: D,
    bus: B,
    console: C,
    clock: K,
    store: S,
    schedule: Schedule,
}

impl<A, D, B, C, K, S> HostBuiltins<A, D, B, C, K, S>
where
    A: AnalogPort,
    D: DigitalPort,
    B: SensorBusPort,
    C: ConsolePort,
    K: ClockPort,
    S: TableStorePort,
{
    /// Assemble a context from its ports.
    pub fn new(analog: A, digital: D, bus: B, console: C, clock: K, store: S) -> Self {
        Self {
            analog,
            digital,
            bus,
            console,
            clock,
            store,
            schedule: Schedule::new(),
        }
    }

    /// Register a measurement table with the store and the schedule.
    ///
    /// The table's period joins the measurement cycle that
    /// `waitNextMeasure` suspends on.
    pub fn register_table(&mut self, def: &TableDef) -> Result<TableId, TableStoreError> {
        let id = self.store.register(def)?;
        self.schedule
            .add_period(def.period())
            .map_err(|_| TableStoreError::TooManyTables)?;
        Ok(id)
    }

    /// Stage one row for a registered table; `saveTable` commits it.
    pub fn stage_row(&mut self, table: TableId, row: &[CellValue]) -> Result<(), TableStoreError> {
        self.store.stage(table, row)
    }

    /// Store statistics (registered tables, staged and committed rows).
    pub fn store_stats(&self) -> TableStoreStats {
        self.store.stats()
    }

    /// The measurement schedule derived from registered tables.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Current time from the clock port (milliseconds since boot).
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Mutable access to every port (diagnostics, adapters-under-test).
    pub fn ports_mut(&mut self) -> (&mut A, &mut D, &mut B, &mut C, &mut K, &mut S) {
        (
            &mut self.analog,
            &mut self.digital,
            &mut self.bus,
            &mut self.console,
            &mut self.clock,
            &mut self.store,
        )
    }

    /// Tear the context back down into its ports.
    pub fn into_ports(self) -> (A, D, B, C, K, S) {
        (
            self.analog,
            self.digital,
            self.bus,
            self.console,
            self.clock,
            self.store,
        )
    }

    /// Execute one builtin call.
    pub async fn execute(&mut self, call: BuiltinCall<'_>) -> Result<BuiltinValue, BuiltinError> {
        match call {
            BuiltinCall::Sin(x) => Ok(BuiltinValue::Float(libm::sinf(x))),
            BuiltinCall::Cos(x) => Ok(BuiltinValue::Float(libm::cosf(x))),
            BuiltinCall::Tan(x) => Ok(BuiltinValue::Float(libm::tanf(x))),
            BuiltinCall::Asin(x) => Ok(BuiltinValue::Float(libm::asinf(x))),
            BuiltinCall::Acos(x) => Ok(BuiltinValue::Float(libm::acosf(x))),
            BuiltinCall::Atan(x) => Ok(BuiltinValue::Float(libm::atanf(x))),
            BuiltinCall::Sinh(x) => Ok(BuiltinValue::Float(libm::sinhf(x))),
            BuiltinCall::Cosh(x) => Ok(BuiltinValue::Float(libm::coshf(x))),
            BuiltinCall::Tanh(x) => Ok(BuiltinValue::Float(libm::tanhf(x))),
            BuiltinCall::Asinh(x) => Ok(BuiltinValue::Float(libm::asinhf(x))),
            BuiltinCall::Acosh(x) => Ok(BuiltinValue::Float(libm::acoshf(x))),
            BuiltinCall::Atanh(x) => Ok(BuiltinValue::Float(libm::atanhf(x))),
            BuiltinCall::Sqrt(x) => Ok(BuiltinValue::Float(libm::sqrtf(x))),
            BuiltinCall::Exp(x) => Ok(BuiltinValue::Float(libm::expf(x))),

            BuiltinCall::Print(text) => {
                self.console
                    .write_text(text)
                    .map_err(BuiltinError::Console)?;
                Ok(BuiltinValue::Void)
            }

            BuiltinCall::GetAdc { port, channel } => {
                let (Ok(port), Ok(channel)) = (u8::try_from(port), u8::try_from(channel)) else {
                    return Ok(BuiltinValue::Int(ADC_READ_FAILED));
                };
                match self.analog.read(port, channel) {
                    Ok(raw) => Ok(BuiltinValue::Int(i32::from(raw))),
                    Err(_) => Ok(BuiltinValue::Int(ADC_READ_FAILED)),
                }
            }

            BuiltinCall::SetPin { channel, level } => {
                let channel = u8::try_from(channel)
                    .map_err(|_| BuiltinError::Digital(DigitalError::InvalidChannel))?;
                self.digital
                    .set_level(channel, level != 0)
                    .map_err(BuiltinError::Digital)?;
                Ok(BuiltinValue::Void)
            }

            BuiltinCall::Sdi12SingleMeasurement { addr, dst, count } => {
                // Effective window: never past `count`, never past the buffer
                let wanted = count.max(0) as usize;
                let dst_len = dst.len();
                let dst = &mut dst[..wanted.min(dst_len)];

                // Invalid address: buffer left untouched
                let addr = u8::try_from(addr)
                    .ok()
                    .and_then(BusAddress::try_new)
                    .ok_or(BuiltinError::SensorBus(SensorBusError::InvalidAddress))?;

                match self.bus.measure(addr, dst).await {
                    Ok(_) => Ok(BuiltinValue::Void),
                    Err(e) => {
                        // Sensor non-response leaves defined data behind
                        dst.fill(0.0);
                        Err(BuiltinError::SensorBus(e))
                    }
                }
            }

            BuiltinCall::Delay { ms } => {
                if ms > 0 {
                    self.clock.sleep_ms(ms as u64).await;
                }
                Ok(BuiltinValue::Void)
            }

            BuiltinCall::WaitNextMeasure => {
                let now = self.clock.now_ms();
                let Some(deadline) = self.schedule.next_due_ms(now) else {
                    return Err(BuiltinError::NoMeasurementCycle);
                };
                self.clock.sleep_until_ms(deadline).await;
                Ok(BuiltinValue::Void)
            }

            BuiltinCall::SaveTable => {
                self.store.commit().await.map_err(BuiltinError::TableStore)?;
                Ok(BuiltinValue::Void)
            }
        }
    }
}
