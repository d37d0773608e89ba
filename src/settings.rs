//! Transfer parameters.

use crate::Error;
use core::convert::TryFrom;
use core::fmt;
use embedded_hal::spi::{Mode, MODE_0, MODE_1, MODE_2, MODE_3};

/// Order in which the bits of a byte are shifted onto the bus.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BitOrder {
    /// Most significant bit first.
    MsbFirst,
    /// Least significant bit first.
    LsbFirst,
}

impl BitOrder {
    /// Conventional raw value of [`BitOrder::LsbFirst`].
    pub const LSBFIRST: u8 = 0;
    /// Conventional raw value of [`BitOrder::MsbFirst`].
    pub const MSBFIRST: u8 = 1;
}

impl TryFrom<u8> for BitOrder {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Error> {
        match raw {
            Self::LSBFIRST => Ok(BitOrder::LsbFirst),
            Self::MSBFIRST => Ok(BitOrder::MsbFirst),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// Looks up SPI mode `0..=3` by its conventional number.
pub fn mode_from_index(index: u8) -> Result<Mode, Error> {
    match index {
        0 => Ok(MODE_0),
        1 => Ok(MODE_1),
        2 => Ok(MODE_2),
        3 => Ok(MODE_3),
        _ => Err(Error::InvalidArgument),
    }
}

/// The conventional number (`0..=3`) of an SPI mode.
pub fn mode_index(mode: Mode) -> u8 {
    match mode {
        m if m == MODE_0 => 0,
        m if m == MODE_1 => 1,
        m if m == MODE_2 => 2,
        _ => 3,
    }
}

/// Legacy clock selection, expressed as a division of a 16 MHz reference.
///
/// Prefer [`Settings::max_frequency_hz`] where an absolute frequency can be
/// given.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClockDivider {
    Div2,
    Div4,
    Div8,
    Div16,
    Div32,
    Div64,
    Div128,
}

impl ClockDivider {
    /// All dividers, fastest first.
    pub const ALL: [ClockDivider; 7] = [
        ClockDivider::Div2,
        ClockDivider::Div4,
        ClockDivider::Div8,
        ClockDivider::Div16,
        ClockDivider::Div32,
        ClockDivider::Div64,
        ClockDivider::Div128,
    ];

    const REFERENCE_HZ: u32 = 16_000_000;

    /// The divisor this class stands for.
    pub const fn divisor(self) -> u8 {
        match self {
            ClockDivider::Div2 => 2,
            ClockDivider::Div4 => 4,
            ClockDivider::Div8 => 8,
            ClockDivider::Div16 => 16,
            ClockDivider::Div32 => 32,
            ClockDivider::Div64 => 64,
            ClockDivider::Div128 => 128,
        }
    }

    /// The baud rate programmed for this class.
    pub const fn frequency(self) -> u32 {
        Self::REFERENCE_HZ / self.divisor() as u32
    }

    /// Looks up a divider by its divisor. Only powers of two from 2 to 128
    /// are accepted.
    pub fn from_divisor(divisor: u8) -> Result<Self, Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|div| div.divisor() == divisor)
            .ok_or(Error::InvalidArgument)
    }
}

/// Parameters applied to the channel at the start of a transaction.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Maximum SCLK frequency in Hz.
    pub max_frequency_hz: u32,
    pub bit_order: BitOrder,
    pub mode: Mode,
}

impl Settings {
    pub const fn new(max_frequency_hz: u32, bit_order: BitOrder, mode: Mode) -> Self {
        Self {
            max_frequency_hz,
            bit_order,
            mode,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("max_frequency_hz", &self.max_frequency_hz)
            .field("bit_order", &self.bit_order)
            .field("mode", &mode_index(self.mode))
            .finish()
    }
}

impl Default for Settings {
    /// 4 MHz, MSB first, mode 0.
    fn default() -> Self {
        Self::new(4_000_000, BitOrder::MsbFirst, MODE_0)
    }
}

/// How stale words are discarded from the receive buffer before a transfer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrainPolicy {
    /// Read the receive buffer unconditionally this many times.
    Fixed(u8),
    /// Read while the receive buffer reports valid data.
    UntilEmpty,
}

impl Default for DrainPolicy {
    /// Two reads, one per half of a double-buffered receive register.
    fn default() -> Self {
        DrainPolicy::Fixed(2)
    }
}

/// Interrupt bookkeeping kept by the driver.
///
/// Interrupt-driven transfers are not implemented, so the driver only ever
/// reports [`InterruptMode::None`]. The other variants are reserved for
/// masking a specific IRQ or all interrupts around a transaction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InterruptMode {
    None,
    /// Reserved: mask the IRQs registered with `using_interrupt`.
    Mask,
    /// Reserved: disable interrupts globally.
    Global,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divider_frequencies_halve() {
        let freqs: Vec<u32> = ClockDivider::ALL.iter().map(|d| d.frequency()).collect();
        assert_eq!(
            freqs,
            [8_000_000, 4_000_000, 2_000_000, 1_000_000, 500_000, 250_000, 125_000]
        );
    }

    #[test]
    fn divider_lookup() {
        assert_eq!(ClockDivider::from_divisor(32).unwrap(), ClockDivider::Div32);
        assert_eq!(ClockDivider::from_divisor(3), Err(Error::InvalidArgument));
        assert_eq!(ClockDivider::from_divisor(0), Err(Error::InvalidArgument));
    }

    #[test]
    fn raw_bit_order() {
        assert_eq!(BitOrder::try_from(0u8).unwrap(), BitOrder::LsbFirst);
        assert_eq!(BitOrder::try_from(1u8).unwrap(), BitOrder::MsbFirst);
        assert_eq!(BitOrder::try_from(7u8), Err(Error::InvalidArgument));
    }

    #[test]
    fn mode_numbers() {
        let modes = [MODE_0, MODE_1, MODE_2, MODE_3];
        for (index, mode) in (0u8..).zip(modes.iter()) {
            assert!(mode_from_index(index) == Ok(*mode));
            assert_eq!(mode_index(*mode), index);
        }
        assert!(matches!(mode_from_index(4), Err(Error::InvalidArgument)));
    }

    #[test]
    fn settings_debug_shows_mode_number() {
        let settings = Settings::new(1_000_000, BitOrder::LsbFirst, MODE_3);
        assert_eq!(
            format!("{:?}", settings),
            "Settings { max_frequency_hz: 1000000, bit_order: LsbFirst, mode: 3 }"
        );
    }

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.max_frequency_hz, 4_000_000);
        assert_eq!(settings.bit_order, BitOrder::MsbFirst);
        assert_eq!(mode_index(settings.mode), 0);
        assert_eq!(DrainPolicy::default(), DrainPolicy::Fixed(2));
    }
}
