//! Console port - abstraction for program text output
//!
//! This trait allows the runtime to emit program output without knowing
//! the transport (stdout on a host, UART or USB CDC on a device, mock).

/// Error type for console operations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleError {
    /// No host is listening
    NotConnected,
    /// The transport rejected the write
    WriteFailed,
    /// Text does not fit the transport's frame or buffer
    MessageTooLarge,
}

/// Port for emitting program text
///
/// The runtime hands over the text exactly as the program supplied it;
/// framing and line discipline belong to the adapter.
pub trait ConsolePort {
    /// Emit `text` to the output channel.
    fn write_text(&mut self, text: &str) -> Result<(), ConsoleError>;
}
