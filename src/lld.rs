//! The low-level peripheral driver this crate sits on.
//!
//! Vendor peripheral libraries expose an SPI channel as a handful of
//! register-programming calls. [`LowLevel`] captures the subset the master
//! driver needs; every call is assumed to succeed given a correct static
//! [`Wiring`].

use crate::BitOrder;
use bitflags::bitflags;
use embedded_hal::spi::{Mode, Phase, Polarity, MODE_0, MODE_1, MODE_2, MODE_3};

bitflags! {
    /// Protocol status register bits.
    pub struct Status: u32 {
        /// A new frame has started in the receiver.
        const RECEIVER_START = 1 << 10;
        /// A received word was overwritten before it was read.
        const DATA_LOST = 1 << 11;
        /// The last word has been shifted out.
        const TRANSMIT_SHIFT = 1 << 12;
        /// The transmit buffer has been moved to the shift register.
        const TRANSMIT_BUFFER = 1 << 13;
        /// A word has been received.
        const RECEIVE = 1 << 14;
        /// A word has been received through the alternative receive path.
        const ALTERNATIVE_RECEIVE = 1 << 15;
        /// Baud-rate generator event.
        const BAUD_RATE_GENERATOR = 1 << 16;
    }
}

bitflags! {
    /// Data-valid bits of the double-buffered receive register.
    pub struct ReceiveBuffer: u32 {
        /// Receive buffer 0 holds a word.
        const RDV0 = 1 << 13;
        /// Receive buffer 1 holds a word.
        const RDV1 = 1 << 29;
    }
}

/// Idle level of the shift clock.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PassiveLevel {
    Low,
    High,
}

/// Shift clock configuration of the baud-rate generator.
///
/// With `delay` enabled the first edge shifts data out, so data is sampled on
/// the second half of the clock period.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShiftClock {
    pub passive_level: PassiveLevel,
    pub delay: bool,
}

impl ShiftClock {
    /// Hardware configuration for an SPI mode.
    pub fn from_mode(mode: Mode) -> Self {
        let passive_level = match mode.polarity {
            Polarity::IdleLow => PassiveLevel::Low,
            Polarity::IdleHigh => PassiveLevel::High,
        };
        let delay = mode.phase == Phase::CaptureOnFirstTransition;
        ShiftClock {
            passive_level,
            delay,
        }
    }

    /// The SPI mode this configuration implements.
    pub fn mode(self) -> Mode {
        match (self.passive_level, self.delay) {
            (PassiveLevel::Low, true) => MODE_0,
            (PassiveLevel::Low, false) => MODE_1,
            (PassiveLevel::High, true) => MODE_2,
            (PassiveLevel::High, false) => MODE_3,
        }
    }
}

/// Where the shift clock is routed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClockOutput {
    /// The SCLKOUT pin.
    Sclk,
}

/// Data input stage of the channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Input {
    Din0,
}

/// Data shift mode for a transmitted word.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransmitMode {
    /// One data line per direction.
    Standard,
    Dual,
    Quad,
}

/// A GPIO identified by port and pin number.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pin<P> {
    pub port: P,
    pub pin: u8,
}

/// A pin together with the electrical configuration it needs.
#[derive(Debug, Clone)]
pub struct PinSetup<P, C> {
    pub pin: Pin<P>,
    pub config: C,
}

/// Register-level operations on one SPI channel.
pub trait LowLevel {
    /// GPIO port identifier.
    type Port: Copy;
    /// Static channel configuration record.
    type ChannelConfig;
    /// Electrical pin configuration record (mode, drive strength, ...).
    type PinConfig;

    /// Programs the channel's base configuration.
    fn init(&mut self, config: &Self::ChannelConfig);

    /// Starts the channel's protocol state machine.
    fn start(&mut self);

    /// Stops the channel's protocol state machine.
    fn stop(&mut self);

    /// Selects which of the channel's input lines feeds `input`.
    fn set_input_source(&mut self, input: Input, source: u8);

    fn init_pin(&mut self, pin: Pin<Self::Port>, config: &Self::PinConfig);

    fn set_bit_order(&mut self, order: BitOrder);

    fn configure_shift_clock(&mut self, clock: ShiftClock, output: ClockOutput);

    /// Programs the baud-rate generator for `hz`.
    fn set_baudrate(&mut self, hz: u32);

    /// Queues `byte` for transmission.
    fn transmit(&mut self, byte: u8, mode: TransmitMode);

    /// Reads (and thereby releases) the oldest received word.
    fn received_data(&mut self) -> u8;

    fn status(&mut self) -> Status;

    fn clear_status(&mut self, flags: Status);

    fn receive_buffer_status(&mut self) -> ReceiveBuffer;
}

/// Static description of which channel and pins form one SPI interface.
///
/// Fixed for the lifetime of the driver that owns it.
pub struct Wiring<L: LowLevel> {
    pub channel: L::ChannelConfig,
    /// Data in (MISO).
    pub miso: PinSetup<L::Port, L::PinConfig>,
    /// Data out (MOSI).
    pub mosi: PinSetup<L::Port, L::PinConfig>,
    /// Clock out (SCLK).
    pub sclk: PinSetup<L::Port, L::PinConfig>,
    /// Input line connected to MISO, selected for [`Input::Din0`].
    pub input_source: u8,
}

impl<L: LowLevel> core::fmt::Debug for Wiring<L>
where
    L::Port: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Wiring")
            .field("miso", &self.miso.pin)
            .field("mosi", &self.mosi.pin)
            .field("sclk", &self.sclk.pin)
            .field("input_source", &self.input_source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_clock_roundtrips_every_mode() {
        let modes = [MODE_0, MODE_1, MODE_2, MODE_3];
        let clocks: Vec<ShiftClock> = modes.iter().map(|m| ShiftClock::from_mode(*m)).collect();

        for (mode, clock) in modes.iter().zip(&clocks) {
            assert!(clock.mode() == *mode);
        }
        for i in 0..clocks.len() {
            for j in i + 1..clocks.len() {
                assert_ne!(clocks[i], clocks[j]);
            }
        }
    }

    #[test]
    fn mode_table() {
        assert_eq!(
            ShiftClock::from_mode(MODE_0),
            ShiftClock {
                passive_level: PassiveLevel::Low,
                delay: true
            }
        );
        assert_eq!(
            ShiftClock::from_mode(MODE_3),
            ShiftClock {
                passive_level: PassiveLevel::High,
                delay: false
            }
        );
    }
}
