//! RP2350 adapters - device universe bindings
//!
//! These adapters bind the analog, digital, and clock ports to the
//! RP2350 via embassy. The ADC runs in blocking mode: conversions are
//! short, and blocking reads avoid DMA contention with flash writes.

use embassy_rp::adc::{Adc, Blocking, Channel as AdcChannel};
use embassy_rp::gpio::{Level, Output};
use embassy_time::{Instant, Timer};
use heapless::Vec;

use crate::ports::analog::{AnalogError, AnalogPort};
use crate::ports::clock::ClockPort;
use crate::ports::digital::{DigitalError, DigitalPort};

/// ADC channels one converter exposes to the runtime
pub const MAX_ADC_CHANNELS: usize = 4;

/// Output channels the digital bank exposes to the runtime
pub const MAX_OUTPUT_CHANNELS: usize = 8;

/// RP2350 on-chip ADC adapter.
///
/// The RP2350 has a single converter, so only port 0 exists; channels
/// index into the configured channel list.
pub struct Rp2350Analog<'a> {
    adc: Adc<'a, Blocking>,
    channels: Vec<AdcChannel<'a>, MAX_ADC_CHANNELS>,
}

impl<'a> Rp2350Analog<'a> {
    /// Create an adapter over a blocking-mode ADC and its channels.
    pub fn new(adc: Adc<'a, Blocking>, channels: Vec<AdcChannel<'a>, MAX_ADC_CHANNELS>) -> Self {
        Self { adc, channels }
    }
}

impl AnalogPort for Rp2350Analog<'_> {
    fn read(&mut self, port: u8, channel: u8) -> Result<u16, AnalogError> {
        if port != 0 {
            return Err(AnalogError::InvalidPort);
        }
        let channel = self
            .channels
            .get_mut(channel as usize)
            .ok_or(AnalogError::InvalidChannel)?;
        self.adc
            .blocking_read(channel)
            .map_err(|_| AnalogError::ReadFailed)
    }
}

/// RP2350 GPIO output bank adapter.
///
/// Logical channel numbers index into the configured output list; the
/// board wiring decides which physical pins those are.
pub struct Rp2350Digital<'a> {
    outputs: Vec<Output<'a>, MAX_OUTPUT_CHANNELS>,
}

impl<'a> Rp2350Digital<'a> {
    /// Create an adapter over pre-configured GPIO outputs.
    pub fn new(outputs: Vec<Output<'a>, MAX_OUTPUT_CHANNELS>) -> Self {
        Self { outputs }
    }
}

impl DigitalPort for Rp2350Digital<'_> {
    fn set_level(&mut self, channel: u8, high: bool) -> Result<(), DigitalError> {
        let output = self
            .outputs
            .get_mut(channel as usize)
            .ok_or(DigitalError::InvalidChannel)?;
        output.set_level(if high { Level::High } else { Level::Low });
        Ok(())
    }
}

/// Clock adapter over the embassy time driver.
pub struct EmbassyClock;

impl ClockPort for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    async fn sleep_ms(&mut self, ms: u64) {
        Timer::after_millis(ms).await;
    }
}
