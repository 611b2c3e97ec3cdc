//! Streaming audio output abstractions

use crate::BusError;

/// Interleaved stereo 16-bit PCM output (I2S or similar)
///
/// Byte layout is little-endian `L0 L1 R0 R1` per frame, the same as a
/// canonical WAV data chunk.
pub trait AudioSink {
    /// Sample rate the output clock is configured for, in Hz
    fn sample_rate(&self) -> u32;

    /// Start the output clocks
    ///
    /// Called once before the first write. Calling it again is harmless.
    fn enable(&mut self) -> impl core::future::Future<Output = Result<(), BusError>>;

    /// Queue PCM bytes for output
    ///
    /// Waits until the device can accept data, then takes as much as it can.
    /// Returns the number of bytes consumed, which may be less than
    /// `data.len()`; callers loop until everything is written.
    fn write(&mut self, data: &[u8]) -> impl core::future::Future<Output = Result<usize, BusError>>;
}
