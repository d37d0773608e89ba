//! A simulated SPI channel with MOSI wired back to MISO.
//!
//! [`Loopback`] behaves like a channel with a double-buffered receive
//! register: every transmitted byte is shifted straight back in, raising the
//! transmit shift and receive indications. It is useful for exercising
//! drivers built on [`SpiMaster`](crate::SpiMaster) off-target.

use crate::lld::{
    ClockOutput, Input, LowLevel, Pin, PinSetup, ReceiveBuffer, ShiftClock, Status, TransmitMode,
    Wiring,
};
use crate::BitOrder;

/// Simulated channel configuration. There is nothing to configure.
#[derive(Debug, Default, Copy, Clone)]
pub struct ChannelConfig;

/// Simulated pin role.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PinConfig {
    Input,
    PushPull,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Fault {
    None,
    /// The shift register never completes.
    Stalled,
    /// Bytes are shifted out but nothing is latched on the receive side.
    Deaf,
}

/// Simulated loopback channel.
#[derive(Debug)]
pub struct Loopback {
    running: bool,
    fault: Fault,
    status: Status,
    rx: [Option<u8>; 2],

    /// Number of times the channel was initialized.
    pub init_calls: u32,
    /// Number of times the channel was started.
    pub start_calls: u32,
    /// Number of times the channel was stopped.
    pub stop_calls: u32,
    /// Number of pin configurations performed.
    pub pin_inits: u32,
    /// Last programmed bit order.
    pub bit_order: Option<BitOrder>,
    /// Last programmed shift clock.
    pub shift_clock: Option<ShiftClock>,
    /// Last programmed baud rate.
    pub baudrate: Option<u32>,
    /// Input line selected for DIN0.
    pub input_source: Option<u8>,
    /// Number of received words that were overwritten before being read.
    pub overruns: u32,
}

impl Default for Loopback {
    fn default() -> Self {
        Self {
            running: false,
            fault: Fault::None,
            status: Status::empty(),
            rx: [None; 2],
            init_calls: 0,
            start_calls: 0,
            stop_calls: 0,
            pin_inits: 0,
            bit_order: None,
            shift_clock: None,
            baudrate: None,
            input_source: None,
            overruns: 0,
        }
    }
}

impl Loopback {
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel whose shift register never completes, so neither the
    /// transmit shift nor the receive indication is ever raised.
    pub fn stalled() -> Self {
        Self {
            fault: Fault::Stalled,
            ..Self::default()
        }
    }

    /// A channel that completes every transmission but never receives, as
    /// if the data input were routed to an unconnected line.
    pub fn deaf() -> Self {
        Self {
            fault: Fault::Deaf,
            ..Self::default()
        }
    }

    /// Pin assignment of the simulated channel.
    pub fn wiring() -> Wiring<Self> {
        Wiring {
            channel: ChannelConfig,
            miso: PinSetup {
                pin: Pin { port: 0, pin: 6 },
                config: PinConfig::Input,
            },
            mosi: PinSetup {
                pin: Pin { port: 0, pin: 7 },
                config: PinConfig::PushPull,
            },
            sclk: PinSetup {
                pin: Pin { port: 0, pin: 5 },
                config: PinConfig::PushPull,
            },
            input_source: 0,
        }
    }

    /// Whether the protocol state machine is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Puts a word into the receive buffer as if a peer had sent it
    /// unprompted.
    pub fn inject(&mut self, byte: u8) {
        match self.rx.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => *slot = Some(byte),
            None => {
                self.overruns += 1;
                self.status |= Status::DATA_LOST;
                self.rx[1] = Some(byte);
            }
        }
        self.status |= Status::RECEIVE;
    }
}

impl LowLevel for Loopback {
    type Port = u8;
    type ChannelConfig = ChannelConfig;
    type PinConfig = PinConfig;

    fn init(&mut self, _config: &ChannelConfig) {
        self.init_calls += 1;
        self.status = Status::empty();
        self.rx = [None; 2];
    }

    fn start(&mut self) {
        self.start_calls += 1;
        self.running = true;
    }

    fn stop(&mut self) {
        self.stop_calls += 1;
        self.running = false;
    }

    fn set_input_source(&mut self, _input: Input, source: u8) {
        self.input_source = Some(source);
    }

    fn init_pin(&mut self, _pin: Pin<u8>, _config: &PinConfig) {
        self.pin_inits += 1;
    }

    fn set_bit_order(&mut self, order: BitOrder) {
        self.bit_order = Some(order);
    }

    fn configure_shift_clock(&mut self, clock: ShiftClock, _output: ClockOutput) {
        self.shift_clock = Some(clock);
    }

    fn set_baudrate(&mut self, hz: u32) {
        self.baudrate = Some(hz);
    }

    fn transmit(&mut self, byte: u8, _mode: TransmitMode) {
        if self.fault == Fault::Stalled || !self.running {
            return;
        }
        self.status |= Status::TRANSMIT_BUFFER | Status::TRANSMIT_SHIFT;
        if self.fault == Fault::Deaf {
            return;
        }
        // The same wire shifts in as it shifts out, so the bit order cancels.
        self.inject(byte);
    }

    fn received_data(&mut self) -> u8 {
        let byte = self.rx[0].take();
        self.rx[0] = self.rx[1].take();
        byte.unwrap_or(0)
    }

    fn status(&mut self) -> Status {
        self.status
    }

    fn clear_status(&mut self, flags: Status) {
        self.status.remove(flags);
    }

    fn receive_buffer_status(&mut self) -> ReceiveBuffer {
        let mut status = ReceiveBuffer::empty();
        status.set(ReceiveBuffer::RDV0, self.rx[0].is_some());
        status.set(ReceiveBuffer::RDV1, self.rx[1].is_some());
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echoes_and_raises_flags() {
        let mut sim = Loopback::new();
        sim.start();
        sim.transmit(0x3C, TransmitMode::Standard);

        assert!(sim.status().contains(Status::TRANSMIT_SHIFT | Status::RECEIVE));
        assert_eq!(sim.receive_buffer_status(), ReceiveBuffer::RDV0);
        assert_eq!(sim.received_data(), 0x3C);
        assert!(sim.receive_buffer_status().is_empty());
    }

    #[test]
    fn receive_buffer_is_two_deep() {
        let mut sim = Loopback::new();
        sim.inject(1);
        sim.inject(2);
        sim.inject(3);

        assert_eq!(sim.overruns, 1);
        assert!(sim.status().contains(Status::DATA_LOST));
        assert_eq!(sim.received_data(), 1);
        assert_eq!(sim.received_data(), 3);
        assert_eq!(sim.received_data(), 0);
    }

    #[test]
    fn deaf_channel_only_transmits() {
        let mut sim = Loopback::deaf();
        sim.start();
        sim.transmit(0xFF, TransmitMode::Standard);
        assert_eq!(sim.status(), Status::TRANSMIT_BUFFER | Status::TRANSMIT_SHIFT);
        assert!(sim.receive_buffer_status().is_empty());
    }

    #[test]
    fn stalled_channel_stays_silent() {
        let mut sim = Loopback::stalled();
        sim.start();
        sim.transmit(0xFF, TransmitMode::Standard);
        assert!(sim.status().is_empty());
        assert!(sim.receive_buffer_status().is_empty());
    }
}
