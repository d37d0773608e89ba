//! The SPI master driver.

use crate::lld::{ClockOutput, Input, LowLevel, ShiftClock, Status, TransmitMode, Wiring};
use crate::poll::{Deadline, Forever};
#[cfg(feature = "log")]
use crate::utils::Bytes;
use crate::{BitOrder, ClockDivider, DrainPolicy, Error, InterruptMode, Settings, Wait};
use core::fmt;
use embedded_hal::blocking::spi::{Transfer, Write};
use embedded_hal::spi::Mode;

/// Whether the channel hardware has been brought up.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    Initialized,
}

/// Blocking, byte-oriented SPI master on top of a [`LowLevel`] channel.
///
/// # Type Parameters
///
/// * **`L`**: The low-level channel driver.
/// * **`D`**: The [`Deadline`] bounding each busy-wait of a transfer.
///   Defaults to [`Forever`], which polls without limit.
///
/// The driver performs no locking. On a multi-threaded host, wrap the whole
/// driver in a mutex so configuration and transfers cannot interleave.
pub struct SpiMaster<L: LowLevel, D = Forever> {
    lld: L,
    wiring: Wiring<L>,
    state: State,
    settings: Settings,
    drain: DrainPolicy,
    deadline: D,
    interrupt_mode: InterruptMode,
}

impl<L: LowLevel> SpiMaster<L, Forever> {
    /// Creates an uninitialized driver for the channel described by `wiring`.
    ///
    /// No hardware is touched until [`init`](Self::init) or
    /// [`begin`](Self::begin) is called.
    pub fn new(lld: L, wiring: Wiring<L>) -> Self {
        Self {
            lld,
            wiring,
            state: State::Uninitialized,
            settings: Settings::default(),
            drain: DrainPolicy::default(),
            deadline: Forever,
            interrupt_mode: InterruptMode::None,
        }
    }
}

impl<L: LowLevel, D: Deadline> SpiMaster<L, D> {
    /// Replaces the deadline used by every busy-wait.
    pub fn with_deadline<D2: Deadline>(self, deadline: D2) -> SpiMaster<L, D2> {
        SpiMaster {
            lld: self.lld,
            wiring: self.wiring,
            state: self.state,
            settings: self.settings,
            drain: self.drain,
            deadline,
            interrupt_mode: self.interrupt_mode,
        }
    }

    /// Sets how stale received words are discarded before each transfer.
    pub fn with_drain_policy(mut self, drain: DrainPolicy) -> Self {
        self.drain = drain;
        self
    }

    /// Brings up the channel and its pins.
    ///
    /// Does nothing if the channel is already initialized. After
    /// [`end`](Self::end), the full bring-up runs again.
    pub fn init(&mut self) {
        if self.state == State::Initialized {
            return;
        }

        let wiring = &self.wiring;
        self.lld.init(&wiring.channel);

        // The input stage has to be routed before the channel starts sampling.
        self.lld.init_pin(wiring.miso.pin, &wiring.miso.config);
        self.lld.set_input_source(Input::Din0, wiring.input_source);
        self.lld.start();

        self.lld.init_pin(wiring.mosi.pin, &wiring.mosi.config);
        self.lld.init_pin(wiring.sclk.pin, &wiring.sclk.config);

        self.interrupt_mode = InterruptMode::None;
        self.state = State::Initialized;
        info!("SpiMaster::init: channel started");
    }

    /// Initializes the channel and applies `settings`.
    ///
    /// Pass `Settings::default()` for 4 MHz, MSB first, mode 0.
    pub fn begin(&mut self, settings: Settings) {
        self.init();
        self.apply(settings);
    }

    /// Stops the channel. A later [`init`](Self::init) performs the full
    /// bring-up again.
    pub fn end(&mut self) {
        if self.state == State::Uninitialized {
            return;
        }
        self.state = State::Uninitialized;
        self.lld.stop();
        info!("SpiMaster::end: channel stopped");
    }

    /// Applies `settings` for the transfers that follow.
    ///
    /// Transactions do not nest: a second call simply replaces the active
    /// settings, and nothing is restored by
    /// [`end_transaction`](Self::end_transaction).
    pub fn begin_transaction(&mut self, settings: Settings) -> Result<(), Error> {
        self.check_initialized()?;
        self.apply(settings);
        Ok(())
    }

    /// Ends a transaction. Chip select is managed by the caller, so there is
    /// nothing to undo.
    pub fn end_transaction(&mut self) {}

    pub fn set_bit_order(&mut self, order: BitOrder) -> Result<(), Error> {
        self.check_initialized()?;
        debug!("SpiMaster: bit order {:?}", order);
        self.lld.set_bit_order(order);
        self.settings.bit_order = order;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error> {
        self.check_initialized()?;
        let clock = ShiftClock::from_mode(mode);
        debug!("SpiMaster: shift clock {:?}", clock);
        self.lld.configure_shift_clock(clock, ClockOutput::Sclk);
        self.settings.mode = mode;
        Ok(())
    }

    /// Programs the baud rate of a legacy clock divider class.
    pub fn set_clock_divider(&mut self, divider: ClockDivider) -> Result<(), Error> {
        self.set_frequency(divider.frequency())
    }

    pub fn set_frequency(&mut self, hz: u32) -> Result<(), Error> {
        self.check_initialized()?;
        debug!("SpiMaster: baud rate {} Hz", hz);
        self.lld.set_baudrate(hz);
        self.settings.max_frequency_hz = hz;
        Ok(())
    }

    /// Shifts `out` onto the bus and returns the byte shifted in meanwhile.
    ///
    /// Any stale words in the receive buffer are discarded first. Each
    /// busy-wait is bounded by the configured [`Deadline`].
    pub fn exchange_byte(&mut self, out: u8) -> Result<u8, Error> {
        self.check_initialized()?;

        self.drain()?;
        self.lld.transmit(out, TransmitMode::Standard);

        self.wait(Wait::TransmitShift)?;
        self.lld.clear_status(Status::TRANSMIT_SHIFT);

        self.wait(Wait::ReceiveReady)?;
        let received = self.lld.received_data();
        self.lld
            .clear_status(Status::RECEIVE | Status::ALTERNATIVE_RECEIVE);

        trace!("exchange: {:02x} -> {:02x}", out, received);
        Ok(received)
    }

    /// Exchanges a 16-bit word as two bytes.
    ///
    /// The high byte goes first when shifting MSB first, the low byte
    /// otherwise.
    pub fn exchange_word(&mut self, out: u16) -> Result<u16, Error> {
        let [hi, lo] = out.to_be_bytes();
        match self.settings.bit_order {
            BitOrder::MsbFirst => {
                let hi = self.exchange_byte(hi)?;
                let lo = self.exchange_byte(lo)?;
                Ok(u16::from_be_bytes([hi, lo]))
            }
            BitOrder::LsbFirst => {
                let lo = self.exchange_byte(lo)?;
                let hi = self.exchange_byte(hi)?;
                Ok(u16::from_be_bytes([hi, lo]))
            }
        }
    }

    /// Not implemented; interrupt-driven transfers are unsupported.
    pub fn using_interrupt(&mut self, _irq: u8) {}

    /// Not implemented; interrupt-driven transfers are unsupported.
    pub fn attach_interrupt(&mut self) {}

    /// Not implemented; interrupt-driven transfers are unsupported.
    pub fn detach_interrupt(&mut self) {}

    pub fn state(&self) -> State {
        self.state
    }

    /// The settings as last programmed.
    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn interrupt_mode(&self) -> InterruptMode {
        self.interrupt_mode
    }

    pub fn wiring(&self) -> &Wiring<L> {
        &self.wiring
    }

    pub fn lld(&self) -> &L {
        &self.lld
    }

    /// Direct access to the channel, bypassing the driver's state tracking.
    pub fn lld_mut(&mut self) -> &mut L {
        &mut self.lld
    }

    /// Releases the channel and its wiring. The channel is left running if
    /// it was initialized.
    pub fn free(self) -> (L, Wiring<L>) {
        (self.lld, self.wiring)
    }

    fn check_initialized(&self) -> Result<(), Error> {
        match self.state {
            State::Initialized => Ok(()),
            State::Uninitialized => Err(Error::NotInitialized),
        }
    }

    fn apply(&mut self, settings: Settings) {
        debug!("SpiMaster: applying {:?}", settings);
        self.lld.set_bit_order(settings.bit_order);
        self.lld
            .configure_shift_clock(ShiftClock::from_mode(settings.mode), ClockOutput::Sclk);
        self.lld.set_baudrate(settings.max_frequency_hz);
        self.settings = settings;
    }

    fn drain(&mut self) -> Result<(), Error> {
        match self.drain {
            DrainPolicy::Fixed(reads) => {
                for _ in 0..reads {
                    self.lld.received_data();
                }
            }
            DrainPolicy::UntilEmpty => {
                self.deadline.start();
                while !self.lld.receive_buffer_status().is_empty() {
                    self.lld.received_data();
                    if self.deadline.expired() {
                        warn!("SpiMaster: receive buffer does not drain");
                        return Err(Error::Timeout(Wait::Drain));
                    }
                }
            }
        }
        Ok(())
    }

    fn wait(&mut self, wait: Wait) -> Result<(), Error> {
        self.deadline.start();
        loop {
            let ready = match wait {
                Wait::TransmitShift => self.lld.status().contains(Status::TRANSMIT_SHIFT),
                Wait::ReceiveReady => !self.lld.receive_buffer_status().is_empty(),
                Wait::Drain => self.lld.receive_buffer_status().is_empty(),
            };
            if ready {
                return Ok(());
            }
            if self.deadline.expired() {
                warn!("SpiMaster: timed out waiting for {:?}", wait);
                return Err(Error::Timeout(wait));
            }
            core::hint::spin_loop();
        }
    }
}

impl<L: LowLevel, D> fmt::Debug for SpiMaster<L, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpiMaster")
            .field("state", &self.state)
            .field("settings", &self.settings)
            .field("drain", &self.drain)
            .field("interrupt_mode", &self.interrupt_mode)
            .finish()
    }
}

impl<L: LowLevel, D: Deadline> Transfer<u8> for SpiMaster<L, D> {
    type Error = Error;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Error> {
        #[cfg(feature = "log")]
        trace!("transfer: out [{}]", Bytes(&*words));
        for word in words.iter_mut() {
            *word = self.exchange_byte(*word)?;
        }
        #[cfg(feature = "log")]
        trace!("transfer: in [{}]", Bytes(&*words));
        Ok(words)
    }
}

impl<L: LowLevel, D: Deadline> Write<u8> for SpiMaster<L, D> {
    type Error = Error;

    fn write(&mut self, words: &[u8]) -> Result<(), Error> {
        for word in words {
            self.exchange_byte(*word)?;
        }
        Ok(())
    }
}
