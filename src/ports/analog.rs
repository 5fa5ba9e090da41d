//! Analog input port - abstraction for ADC access
//!
//! This trait allows the runtime to read analog channels without knowing
//! the specific converter hardware (on-chip ADC, external SPI ADC, mock).

/// Error type for analog read operations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogError {
    /// No converter with this port number exists
    InvalidPort,
    /// The converter has no such channel
    InvalidChannel,
    /// The conversion itself failed
    ReadFailed,
    /// Converter not powered up or still settling
    NotReady,
}

/// Port for reading analog inputs
///
/// `port` selects a converter, `channel` an input on it. Reads are
/// blocking; a conversion is short enough that suspending is not worth
/// the scheduler round-trip.
///
/// # Example Implementation
///
/// ```ignore
/// struct Rp2350Analog<'a> {
///     adc: Adc<'a, Blocking>,
///     channels: heapless::Vec<AdcChannel<'a>, 4>,
/// }
///
/// impl AnalogPort for Rp2350Analog<'_> {
///     fn read(&mut self, port: u8, channel: u8) -> Result<u16, AnalogError> {
///         if port != 0 {
///             return Err(AnalogError::InvalidPort);
///         }
///         let channel = self.channels.get_mut(channel as usize)
///             .ok_or(AnalogError::InvalidChannel)?;
///         self.adc.blocking_read(channel).map_err(|_| AnalogError::ReadFailed)
///     }
/// }
/// ```
pub trait AnalogPort {
    /// Read one conversion from `channel` of converter `port`.
    fn read(&mut self, port: u8, channel: u8) -> Result<u16, AnalogError>;
}
