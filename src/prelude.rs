//! Traits needed to drive a channel, imported anonymously.

pub use crate::lld::LowLevel as _;
pub use crate::poll::Deadline as _;
pub use embedded_hal::blocking::spi::Transfer as _;
pub use embedded_hal::blocking::spi::Write as _;
