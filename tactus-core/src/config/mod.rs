//! Configuration types
//!
//! Board-agnostic configuration structures and the parser for the
//! `desk.toml` file embedded in the firmware image.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ParseError};
pub use types::*;
