//! RP2040-specific HAL for the desk appliance firmware
//!
//! This crate provides RP2040 implementations of the shared `tactus-hal`
//! traits on top of `embassy-rp`:
//!
//! - GPIO line wrappers usable from interrupt-priority tasks
//! - Dynamic pin allocation for config-driven encoder wiring
//! - Timeout-bounded async I2C and SPI buses
//! - PIO-based I2S output (implements `tactus_hal::AudioSink`)
//! - SD card file source over SPI (implements `tactus_hal::FileSource`)

#![no_std]

pub mod audio;
pub mod gpio;
pub mod i2c;
pub mod pins;
pub mod spi;
pub mod storage;

pub use audio::PioI2sSink;
pub use gpio::{Drive, Line};
pub use i2c::TimedI2c;
pub use pins::PinBank;
pub use spi::TimedSpi;
pub use storage::SdCardFiles;
