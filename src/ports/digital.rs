//! Digital output port - abstraction for pin writes
//!
//! This trait allows the runtime to drive digital outputs without knowing
//! the pin mapping or the GPIO hardware behind it.

/// Error type for digital output operations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigitalError {
    /// No output with this channel number exists
    InvalidChannel,
    /// The hardware write failed
    WriteFailed,
}

/// Port for driving digital output channels
///
/// Channels are logical output numbers; the adapter owns the mapping to
/// physical pins. An invalid channel is rejected with an error rather
/// than faulting, so a bad program value cannot take the runtime down.
pub trait DigitalPort {
    /// Drive `channel` high or low.
    fn set_level(&mut self, channel: u8, high: bool) -> Result<(), DigitalError>;
}
