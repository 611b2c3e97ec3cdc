//! I2C bus abstractions
//!
//! Provides traits for I2C master operations that can be implemented
//! by chip-specific HALs.

use crate::BusError;

/// I2C bus master
///
/// Each call is one bus transaction. Implementations bound every
/// transaction with a timeout and report it as [`BusError::Timeout`].
pub trait I2cBus {
    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(
        &mut self,
        address: u8,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), BusError>>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> impl core::future::Future<Output = Result<(), BusError>>;
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Per-transaction timeout in milliseconds
    pub timeout_ms: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            frequency: 100_000, // 100kHz standard mode
            timeout_ms: 50,
        }
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self {
        frequency: 100_000,
        timeout_ms: 50,
    };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self {
        frequency: 400_000,
        timeout_ms: 50,
    };
}
