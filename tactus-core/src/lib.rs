//! Board-agnostic core logic for the desk appliance firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Error taxonomy shared by every driver
//! - Quadrature transition table and debounce rule
//! - Input events and audio commands exchanged between tasks
//! - RIFF/WAVE header decoding and validation
//! - Transfer buffer and chunk planning for bulk bus writes
//! - Player (presentation) state machine
//! - Configuration types and the `desk.toml` parser

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod player;
pub mod quadrature;
pub mod transfer;
pub mod wav;

pub use error::{Error, ProtocolError, Result};
