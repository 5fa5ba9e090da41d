//! Sensor bus port - abstraction for the addressed serial sensor bus
//!
//! This trait allows the runtime to trigger measurements on a shared
//! serial bus without knowing the wire protocol or the transceiver
//! hardware. A measurement cycle is slow (sensors wake up, settle, and
//! answer in their own time), so the measurement call is a suspension
//! point.

/// Address of a single sensor on the shared bus.
///
/// The bus addresses sensors with a single digit; `0..=9` are valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusAddress(u8);

impl BusAddress {
    /// Highest valid address.
    pub const MAX: u8 = 9;

    /// Create an address, rejecting values outside `0..=9`.
    pub const fn try_new(raw: u8) -> Option<Self> {
        if raw <= Self::MAX {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Get the raw address value
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// Error type for sensor bus operations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorBusError {
    /// Address outside the bus address space
    InvalidAddress,
    /// No sensor answered at this address
    NoResponse,
    /// The sensor answered but the measurement never completed in time
    Timeout,
    /// Framing or line error on the bus
    BusError,
    /// The sensor reported fewer readings than requested
    TooFewReadings,
}

/// Configuration for bus timing behavior
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorBusConfig {
    /// Upper bound on one measurement cycle (milliseconds)
    pub timeout_ms: u32,
    /// Retries after a non-response before giving up
    pub retries: u8,
}

impl Default for SensorBusConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2_000,
            retries: 1,
        }
    }
}

impl SensorBusConfig {
    /// Create config for quick polling of responsive sensors
    pub const fn fast() -> Self {
        Self {
            timeout_ms: 250,
            retries: 0,
        }
    }

    /// Create config for slow-waking field sensors
    pub const fn patient() -> Self {
        Self {
            timeout_ms: 15_000,
            retries: 3,
        }
    }
}

/// Port for triggering a measurement on the shared sensor bus
///
/// # Example Implementation
///
/// ```ignore
/// struct UartSensorBus<'a> {
///     uart: Uart<'a, Blocking>,
///     config: SensorBusConfig,
/// }
///
/// impl SensorBusPort for UartSensorBus<'_> {
///     async fn measure(
///         &mut self,
///         addr: BusAddress,
///         dst: &mut [f32],
///     ) -> Result<usize, SensorBusError> {
///         self.request_measurement(addr).await?;
///         self.await_service_ready(self.config.timeout_ms).await?;
///         self.read_values(addr, dst).await
///     }
/// }
/// ```
pub trait SensorBusPort {
    /// Trigger one measurement cycle on the sensor at `addr` and copy the
    /// readings into `dst`.
    ///
    /// Fills at most `dst.len()` readings and returns the count written.
    /// Suspends until the sensor delivers or a bounded timeout elapses;
    /// the adapter must never block past its configured timeout.
    fn measure(
        &mut self,
        addr: BusAddress,
        dst: &mut [f32],
    ) -> impl core::future::Future<Output = Result<usize, SensorBusError>>;
}
