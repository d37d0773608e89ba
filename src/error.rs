use core::fmt::{self, Debug, Display};

mod private {
    #[derive(Debug)]
    pub enum Private {}
}

/// The hardware condition a blocking transfer was waiting for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Wait {
    /// The transmit shift indication, set once the outgoing byte left the
    /// shift register.
    TransmitShift,
    /// A valid word in the receive buffer.
    ReceiveReady,
    /// An empty receive buffer before transmitting.
    Drain,
}

/// The error type used by this library.
pub enum Error {
    /// The channel has not been brought up with `init`/`begin`, or has been
    /// shut down with `end`.
    NotInitialized,

    /// A status flag was not raised before the configured deadline expired.
    ///
    /// This usually means the channel clock is not running or the pins are
    /// routed to the wrong function.
    Timeout(Wait),

    /// A raw configuration value did not name any valid setting.
    InvalidArgument,

    #[doc(hidden)]
    __NonExhaustive(private::Private),
}

impl Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotInitialized => f.write_str("Error::NotInitialized"),
            Error::Timeout(wait) => write!(f, "Error::Timeout({:?})", wait),
            Error::InvalidArgument => f.write_str("Error::InvalidArgument"),
            Error::__NonExhaustive(_) => unreachable!(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotInitialized => f.write_str("SPI channel is not initialized"),
            Error::Timeout(Wait::TransmitShift) => {
                f.write_str("timed out waiting for the transmit shift indication")
            }
            Error::Timeout(Wait::ReceiveReady) => {
                f.write_str("timed out waiting for received data")
            }
            Error::Timeout(Wait::Drain) => {
                f.write_str("timed out draining stale words from the receive buffer")
            }
            Error::InvalidArgument => f.write_str("invalid configuration value"),
            Error::__NonExhaustive(_) => unreachable!(),
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::NotInitialized, Error::NotInitialized) => true,
            (Error::Timeout(a), Error::Timeout(b)) => a == b,
            (Error::InvalidArgument, Error::InvalidArgument) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_wait() {
        assert_eq!(
            Error::Timeout(Wait::ReceiveReady).to_string(),
            "timed out waiting for received data"
        );
        assert_eq!(
            format!("{:?}", Error::Timeout(Wait::TransmitShift)),
            "Error::Timeout(TransmitShift)"
        );
    }
}
