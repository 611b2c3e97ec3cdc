//! Build script for tactus-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates desk.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sections every desk.toml must carry
const REQUIRED_SECTIONS: [&str; 4] = ["display", "encoder", "audio", "player"];

/// Rates the PIO I2S clock divider is tuned for
const STANDARD_SAMPLE_RATES: [i64; 4] = [22_050, 32_000, 44_100, 48_000];

/// Smallest panel the player screen layout fits on
const MIN_PANEL: (i64, i64) = (252, 112);

/// Largest panel edge the ILI9488 addresses
const MAX_PANEL_EDGE: i64 = 480;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate desk.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=desk.toml");

    let config_path = Path::new("desk.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: desk.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds desk.toml at build time.                    ║\n\
            ║  Please create one in the tactus-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read desk.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in desk.toml                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_required_sections(&config, &mut errors);
    validate_display(&config, &mut errors);
    validate_audio(&config, &mut errors);
    validate_input(&config, &mut errors);
    validate_encoder(&config, &mut errors);
    validate_player(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in desk.toml                       ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=desk.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn validate_required_sections(config: &toml::Value, errors: &mut Vec<String>) {
    for name in REQUIRED_SECTIONS {
        match config.get(name) {
            Some(toml::Value::Table(_)) => {}
            Some(_) => errors.push(format!("[{}] must be a table", name)),
            None => errors.push(format!("Missing [{}] section", name)),
        }
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(display) = config.get("display") else {
        return;
    };
    for (key, min) in [("width", MIN_PANEL.0), ("height", MIN_PANEL.1)] {
        match display.get(key) {
            Some(toml::Value::Integer(v)) => {
                if *v < min || *v > MAX_PANEL_EDGE {
                    errors.push(format!(
                        "[display] {} must be {}-{}",
                        key, min, MAX_PANEL_EDGE
                    ));
                }
            }
            Some(_) => errors.push(format!("[display] {} must be an integer", key)),
            None => {}
        }
    }
    if let Some(toml::Value::Integer(hz)) = display.get("spi_hz") {
        if *hz <= 0 {
            errors.push("[display] spi_hz must be positive".to_string());
        }
    }
}

fn validate_input(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(input) = config.get("input") else {
        return;
    };
    match input.get("poll_ms") {
        Some(toml::Value::Integer(ms)) => {
            if *ms <= 0 || *ms > 1000 {
                errors.push("[input] poll_ms must be 1-1000".to_string());
            }
        }
        Some(_) => errors.push("[input] poll_ms must be an integer".to_string()),
        None => {}
    }
}

fn validate_audio(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(audio) = config.get("audio") else {
        return;
    };
    match audio.get("sample_rate") {
        Some(toml::Value::Integer(rate)) => {
            if !STANDARD_SAMPLE_RATES.contains(rate) {
                errors.push(format!(
                    "[audio] sample_rate {} is not 22050/32000/44100/48000",
                    rate
                ));
            }
        }
        Some(_) => errors.push("[audio] sample_rate must be an integer".to_string()),
        None => errors.push("[audio] missing 'sample_rate'".to_string()),
    }
}

fn validate_encoder(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(encoder) = config.get("encoder") else {
        return;
    };

    let mut pins = Vec::new();
    for key in ["pin_a", "pin_b", "pin_button"] {
        match encoder.get(key) {
            Some(toml::Value::String(s)) => match pin_number(s) {
                Some(n) if pins.contains(&n) => {
                    errors.push(format!("[encoder] {} reuses gpio{}", key, n))
                }
                Some(n) => pins.push(n),
                None => errors.push(format!("[encoder] {} '{}' is not a valid pin", key, s)),
            },
            Some(_) => errors.push(format!("[encoder] {} must be a pin string", key)),
            None => {}
        }
    }

    if let Some(toml::Value::Integer(ms)) = encoder.get("debounce_ms") {
        if *ms <= 0 || *ms > 1000 {
            errors.push("[encoder] debounce_ms must be 1-1000".to_string());
        }
    }
}

fn validate_player(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(player) = config.get("player") else {
        return;
    };

    if let Some(toml::Value::Integer(v)) = player.get("initial_volume") {
        if !(0..=100).contains(v) {
            errors.push("[player] initial_volume must be 0-100".to_string());
        }
    }

    if let Some(toml::Value::Integer(v)) = player.get("volume_step") {
        if !(1..=100).contains(v) {
            errors.push("[player] volume_step must be 1-100".to_string());
        }
    }

    match player.get("default_track") {
        Some(toml::Value::String(track)) => {
            if !track.is_empty() && !track.to_ascii_lowercase().ends_with(".wav") {
                errors.push(format!("[player] default_track '{}' must be a .wav file", track));
            }
            if track.len() > 64 {
                errors.push("[player] default_track longer than 64 bytes".to_string());
            }
        }
        Some(_) => errors.push("[player] default_track must be a string".to_string()),
        None => {}
    }
}

/// GPIO number of a pin string like "!^gpio7"
fn pin_number(s: &str) -> Option<u8> {
    let n: u8 = s
        .trim_start_matches(['!', '^'])
        .strip_prefix("gpio")?
        .parse()
        .ok()?;
    (n < 30).then_some(n)
}
