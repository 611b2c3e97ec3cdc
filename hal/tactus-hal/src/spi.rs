//! SPI bus abstractions
//!
//! Display panels only ever receive, so the trait is write-only.

use crate::BusError;

/// SPI bus master (transmit only)
pub trait SpiBus {
    /// Write data without reading
    ///
    /// One call is one bus transaction; chip select framing is handled by
    /// the implementation.
    fn write(&mut self, data: &[u8]) -> impl core::future::Future<Output = Result<(), BusError>>;
}

/// SPI configuration
#[derive(Debug, Clone, Copy)]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity
    pub polarity: Polarity,
    /// Clock phase
    pub phase: Phase,
    /// Per-transaction timeout in milliseconds
    pub timeout_ms: u32,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 20_000_000, // 20 MHz panel clock
            polarity: Polarity::IdleLow,
            phase: Phase::CaptureOnFirstTransition,
            timeout_ms: 100,
        }
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}
