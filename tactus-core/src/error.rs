//! Error taxonomy
//!
//! Every fallible driver operation returns [`Error`]. Interrupt-side code
//! never fails, so nothing here is produced from interrupt context.

use tactus_hal::{BusError, StorageError};

/// Convenience alias used throughout the drivers
pub type Result<T> = core::result::Result<T, Error>;

/// Top-level error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Caller passed something unusable (bad pin, zero interval, missing line)
    InvalidArgument,
    /// A fixed-capacity resource was already taken
    ResourceExhausted,
    /// Bus transaction failed; `BusError::Timeout` is the distinguished case
    Bus(BusError),
    /// Device or file content did not match what the protocol requires
    Protocol(ProtocolError),
    /// File or chunk does not exist
    NotFound,
}

/// Protocol-level failure detail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Device answered with something it should never send
    UnexpectedResponse,
    /// Container structure is broken (bad tags, truncated chunk)
    MalformedContainer,
    /// Well-formed file in a format the engine does not play
    UnsupportedFormat,
}

impl Error {
    /// True when the underlying bus transaction ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Bus(BusError::Timeout))
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Error::Bus(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => Error::NotFound,
            StorageError::Device => Error::Bus(BusError::Transport),
        }
    }
}
