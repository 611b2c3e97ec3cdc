//! Tactus Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that are implemented by
//! chip-specific HALs. Drivers in `tactus-drivers` are written against these
//! traits only, which lets every wire protocol be exercised on the host with
//! recording mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  tactus-firmware (tasks, board wiring)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tactus-drivers (GT911, ILI9488, audio) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tactus-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tactus-hal-rp2040                      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O (interrupt safe)
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`spi::SpiBus`] - SPI bus operations
//! - [`audio::AudioSink`] - Streaming PCM output with backpressure
//! - [`storage::FileSource`] - Byte-stream file access by path

#![no_std]
#![deny(unsafe_code)]

pub mod audio;
pub mod gpio;
pub mod i2c;
pub mod spi;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use audio::AudioSink;
pub use gpio::{InputPin, OutputPin};
pub use i2c::I2cBus;
pub use spi::SpiBus;
pub use storage::{FileSource, StorageError};

/// Failure of a single bus transaction
///
/// Every transaction is bounded by a timeout in the chip HAL; running out of
/// time is reported separately from other transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Transaction did not complete within its deadline
    Timeout,
    /// Addressed device did not acknowledge
    Nack,
    /// Any other transport failure (arbitration, overrun, DMA, ...)
    Transport,
}

impl BusError {
    /// Returns true for the timeout sub-case
    pub fn is_timeout(&self) -> bool {
        matches!(self, BusError::Timeout)
    }
}
