//! Simple TOML parser for device configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `desk.toml`. It does NOT support the full TOML grammar.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings
//! - Arrays and inline tables
//! - Dotted keys

use heapless::String as HString;

use super::types::{DeskConfig, PinConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// String longer than its fixed-capacity field
    TooLong,
    /// Invalid pin string
    InvalidPin,
    /// Well-formed value the device cannot run with
    OutOfRange,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Display,
    Touch,
    Encoder,
    Audio,
    Input,
    Player,
}

/// Parse TOML configuration into DeskConfig
///
/// Keys not present keep their defaults. Unknown keys are ignored so older
/// firmware accepts newer files. The result is checked with
/// [`DeskConfig::validate`].
pub fn parse_config(input: &str) -> Result<DeskConfig, ParseError> {
    let mut config = DeskConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    config.validate().map_err(|_| ParseError::OutOfRange)?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "display" => Ok(Section::Display),
        "touch" => Ok(Section::Touch),
        "encoder" => Ok(Section::Encoder),
        "audio" => Ok(Section::Audio),
        "input" => Ok(Section::Input),
        "player" => Ok(Section::Player),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        Ok(&value[1..value.len() - 1])
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

/// Parse an integer value (underscore separators allowed)
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: HString<24> = HString::new();
    for c in value.chars().filter(|c| *c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a pin string like "gpio11", "!gpio12", "^gpio4"
fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let value = parse_string(value)?;
    let mut inverted = false;
    let mut pull_up = false;
    let mut s = value;

    // Check for modifiers
    while !s.is_empty() {
        if let Some(rest) = s.strip_prefix('!') {
            inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    let num = s.strip_prefix("gpio").ok_or(ParseError::InvalidPin)?;
    let pin: u8 = num.parse().map_err(|_| ParseError::InvalidPin)?;

    Ok(PinConfig {
        pin,
        inverted,
        pull_up,
    })
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut DeskConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Display => match key {
            "width" => config.display.width = parse_int(value)?,
            "height" => config.display.height = parse_int(value)?,
            "spi_hz" => config.display.spi_hz = parse_int(value)?,
            "backlight_active_high" => config.display.backlight_active_high = parse_bool(value)?,
            _ => {}
        },
        Section::Touch => match key {
            "i2c_hz" => config.touch.i2c_hz = parse_int(value)?,
            "timeout_ms" => config.touch.timeout_ms = parse_int(value)?,
            _ => {}
        },
        Section::Encoder => match key {
            "pin_a" => config.encoder.pin_a = parse_pin(value)?,
            "pin_b" => config.encoder.pin_b = parse_pin(value)?,
            "pin_button" | "button_pin" => config.encoder.pin_button = parse_pin(value)?,
            "debounce_ms" => config.encoder.debounce_ms = parse_int(value)?,
            _ => {}
        },
        Section::Audio => match key {
            "sample_rate" => config.audio.sample_rate = parse_int(value)?,
            _ => {}
        },
        Section::Input => match key {
            "poll_ms" => config.input.poll_ms = parse_int(value)?,
            _ => {}
        },
        Section::Player => match key {
            "initial_volume" => config.player.initial_volume = parse_int(value)?,
            "volume_step" => config.player.volume_step = parse_int(value)?,
            "default_track" => {
                let track = parse_string(value)?;
                config.player.default_track =
                    HString::try_from(track).map_err(|_| ParseError::TooLong)?;
            }
            _ => {}
        },
        Section::Root => {
            // No root-level keys
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pin() {
        let pin = parse_pin("gpio11").unwrap();
        assert_eq!(pin.pin, 11);
        assert!(!pin.inverted);
        assert!(!pin.pull_up);

        let pin = parse_pin("!gpio12").unwrap();
        assert_eq!(pin.pin, 12);
        assert!(pin.inverted);

        let pin = parse_pin("^gpio4").unwrap();
        assert_eq!(pin.pin, 4);
        assert!(pin.pull_up);

        let pin = parse_pin("\"^!gpio5\"").unwrap();
        assert_eq!(pin.pin, 5);
        assert!(pin.inverted);
        assert!(pin.pull_up);

        assert_eq!(parse_pin("pin5"), Err(ParseError::InvalidPin));
        assert_eq!(parse_pin("gpio"), Err(ParseError::InvalidPin));
    }

    #[test]
    fn test_parse_int_with_separators() {
        assert_eq!(parse_int::<u32>("44_100"), Ok(44_100));
        assert_eq!(parse_int::<u32>("20000000"), Ok(20_000_000));
        assert_eq!(parse_int::<u8>("300"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_parse_key_value_strips_comment() {
        assert_eq!(parse_key_value("poll_ms = 15 # fast"), Some(("poll_ms", "15")));
        assert_eq!(
            parse_key_value("default_track = \"A#B.WAV\""),
            Some(("default_track", "\"A#B.WAV\""))
        );
        assert_eq!(parse_key_value("novalue ="), None);
    }

    #[test]
    fn test_unknown_section_is_error() {
        assert_eq!(
            parse_config("[stepper]\nrpm = 3\n"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
# desk appliance
[display]
width = 320
height = 480
spi_hz = 40_000_000
backlight_active_high = false

[touch]
i2c_hz = 100000

[encoder]
pin_a = "^gpio10"
pin_b = "^gpio11"
pin_button = "^!gpio12"
debounce_ms = 3

[audio]
sample_rate = 48000

[input]
poll_ms = 10

[player]
initial_volume = 40
volume_step = 10
default_track = "MUSIC/INTRO.WAV"
unknown_key = 1
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.display.spi_hz, 40_000_000);
        assert!(!config.display.backlight_active_high);
        assert_eq!(config.touch.i2c_hz, 100_000);
        assert_eq!(config.touch.timeout_ms, 50);
        assert_eq!(config.encoder.pin_a.pin, 10);
        assert!(config.encoder.pin_button.inverted);
        assert_eq!(config.encoder.debounce_ms, 3);
        assert_eq!(config.audio.sample_rate, 48_000);
        assert_eq!(config.input.poll_ms, 10);
        assert_eq!(config.player.initial_volume, 40);
        assert_eq!(config.player.volume_step, 10);
        assert_eq!(config.player.default_track.as_str(), "MUSIC/INTRO.WAV");
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert_eq!(
            parse_config("[display]\nwidth = 32\nheight = 24\n"),
            Err(ParseError::OutOfRange)
        );
        assert_eq!(
            parse_config("[input]\npoll_ms = 0\n[display]\nwidth = 0\n"),
            Err(ParseError::OutOfRange)
        );
        assert_eq!(
            parse_config("[encoder]\npin_a = \"gpio3\"\npin_b = \"gpio3\"\n"),
            Err(ParseError::OutOfRange)
        );
    }

    #[test]
    fn test_track_too_long() {
        let mut s: HString<160> = HString::try_from("[player]\ndefault_track = \"").unwrap();
        for _ in 0..100 {
            s.push('A').unwrap();
        }
        s.push('"').unwrap();
        assert_eq!(parse_config(&s), Err(ParseError::TooLong));
    }
}
