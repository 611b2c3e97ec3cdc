//! Peripheral drivers
//!
//! Every driver here is written against the `tactus-hal` traits, so the same
//! code runs on the board and against recording mocks on the host:
//!
//! - Rotary encoder (interrupt-fed, debounced, lossy event queue)
//! - GT911 capacitive touch controller (I2C)
//! - ILI9488 SPI display with chunked pixel transfer
//! - Audio streaming engine (tone synthesis, WAV playback, cooperative stop)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod audio;
pub mod encoder;
pub mod gt911;
pub mod ili9488;

#[cfg(test)]
pub(crate) mod mock;
