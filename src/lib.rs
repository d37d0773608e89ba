//! A blocking SPI master driver layered on a vendor low-level driver.
//!
//! Microcontroller vendors usually ship a register-level peripheral library
//! (channel init/start/stop, pin setup, baud-rate programming, status flags).
//! This crate maps the conventional byte-oriented SPI master API onto such a
//! library: implement [`LowLevel`] for your chip's channel, describe the pins
//! in a [`Wiring`], and drive it through [`SpiMaster`].
//!
//! ```
//! use spi_lld::{sim::Loopback, Settings, SpiMaster};
//!
//! let mut spi = SpiMaster::new(Loopback::new(), Loopback::wiring());
//! spi.begin(Settings::default());
//! assert_eq!(spi.exchange_byte(0xA5).unwrap(), 0xA5);
//! ```
//!
//! [`SpiMaster`] also implements the `embedded-hal` blocking SPI traits, so
//! device drivers written against [`embedded-hal`] run on it unchanged.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal/

#![doc(html_root_url = "https://docs.rs/spi-lld/0.1.0")]
#![warn(missing_debug_implementations, rust_2018_idioms)]
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;
mod driver;
mod error;
pub mod lld;
pub mod poll;
pub mod prelude;
mod settings;
pub mod sim;
#[cfg(feature = "log")]
mod utils;

pub use crate::driver::{SpiMaster, State};
pub use crate::error::{Error, Wait};
pub use crate::lld::{LowLevel, Wiring};
pub use crate::settings::{
    mode_from_index, mode_index, BitOrder, ClockDivider, DrainPolicy, InterruptMode, Settings,
};
pub use embedded_hal::spi::{Mode, Phase, Polarity, MODE_0, MODE_1, MODE_2, MODE_3};
