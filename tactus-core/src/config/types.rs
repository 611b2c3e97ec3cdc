//! Configuration type definitions

use crate::display::layout;
use crate::error::Error;
use crate::events::TrackPath;

/// Sample rates the audio path can be clocked at
pub const STANDARD_SAMPLE_RATES: [u32; 4] = [22_050, 32_000, 44_100, 48_000];

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }

    /// Create a pin with pull-up enabled
    pub const fn with_pullup(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: true,
        }
    }

    /// Whether a sampled level means "asserted"
    pub const fn is_active(&self, high: bool) -> bool {
        high != self.inverted
    }
}

/// ILI9488 panel settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    pub width: u16,
    pub height: u16,
    /// SPI clock in Hz
    pub spi_hz: u32,
    /// Backlight is on when its line is high
    pub backlight_active_high: bool,
}

impl DisplayConfig {
    /// Largest panel edge the controller addresses
    pub const MAX_EDGE: u16 = 480;

    /// Check the panel fits the player layout and the controller
    pub fn validate(&self) -> Result<(), Error> {
        if self.width < layout::MIN_WIDTH || self.height < layout::MIN_HEIGHT {
            return Err(Error::InvalidArgument);
        }
        if self.width > Self::MAX_EDGE || self.height > Self::MAX_EDGE {
            return Err(Error::InvalidArgument);
        }
        if self.spi_hz == 0 {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 480,
            spi_hz: 20_000_000,
            backlight_active_high: true,
        }
    }
}

/// GT911 bus settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchConfig {
    /// I2C clock in Hz
    pub i2c_hz: u32,
    /// Per-transaction timeout
    pub timeout_ms: u32,
}

impl TouchConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.i2c_hz == 0 || self.timeout_ms == 0 {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            i2c_hz: 400_000,
            timeout_ms: 50,
        }
    }
}

/// Rotary encoder wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderConfig {
    pub pin_a: PinConfig,
    pub pin_b: PinConfig,
    /// Button line; `inverted` means active-low
    pub pin_button: PinConfig,
    /// Minimum spacing between accepted events, per source
    pub debounce_ms: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            pin_a: PinConfig::with_pullup(2),
            pin_b: PinConfig::with_pullup(3),
            pin_button: PinConfig {
                pin: 7,
                inverted: true,
                pull_up: true,
            },
            debounce_ms: 5,
        }
    }
}

impl EncoderConfig {
    /// Check pins are distinct and the debounce interval is usable
    pub fn validate(&self) -> Result<(), Error> {
        let (a, b, sw) = (self.pin_a.pin, self.pin_b.pin, self.pin_button.pin);
        if a == b || a == sw || b == sw {
            return Err(Error::InvalidArgument);
        }
        if self.debounce_ms == 0 {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }

    pub const fn debounce_us(&self) -> u64 {
        self.debounce_ms as u64 * 1000
    }
}

/// I2S output settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioConfig {
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
        }
    }
}

impl AudioConfig {
    pub fn is_standard_rate(&self) -> bool {
        STANDARD_SAMPLE_RATES.contains(&self.sample_rate)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.is_standard_rate() {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }
}

/// Input polling period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputConfig {
    pub poll_ms: u32,
}

impl InputConfig {
    /// A zero period would spin the polling task
    pub fn validate(&self) -> Result<(), Error> {
        if self.poll_ms == 0 {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { poll_ms: 15 }
    }
}

/// Player behaviour
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlayerConfig {
    pub initial_volume: u8,
    pub volume_step: u8,
    /// Track played on button press; empty when none is known
    pub default_track: TrackPath,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_volume: 50,
            volume_step: 5,
            default_track: TrackPath::new(),
        }
    }
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.initial_volume > crate::player::MAX_VOLUME || self.volume_step == 0 {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }

    pub fn track(&self) -> Option<TrackPath> {
        if self.default_track.is_empty() {
            None
        } else {
            Some(self.default_track.clone())
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeskConfig {
    pub display: DisplayConfig,
    pub touch: TouchConfig,
    pub encoder: EncoderConfig,
    pub audio: AudioConfig,
    pub input: InputConfig,
    pub player: PlayerConfig,
}

impl DeskConfig {
    /// Check every section; the first bad one wins
    pub fn validate(&self) -> Result<(), Error> {
        self.display.validate()?;
        self.touch.validate()?;
        self.encoder.validate()?;
        self.audio.validate()?;
        self.input.validate()?;
        self.player.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_config() {
        let pin = PinConfig::new(10);
        assert_eq!(pin.pin, 10);
        assert!(!pin.inverted);
        assert!(!pin.pull_up);
        assert!(pin.is_active(true));

        let inverted = PinConfig::inverted(12);
        assert!(inverted.inverted);
        assert!(inverted.is_active(false));

        let pullup = PinConfig::with_pullup(4);
        assert!(pullup.pull_up);
    }

    #[test]
    fn test_default_config() {
        let config = DeskConfig::default();
        assert_eq!(config.display.width, 320);
        assert_eq!(config.display.height, 480);
        assert_eq!(config.audio.sample_rate, 44_100);
        assert!(config.audio.is_standard_rate());
        assert_eq!(config.player.initial_volume, 50);
        assert!(config.player.track().is_none());
        assert!(config.encoder.validate().is_ok());
        assert!(config.encoder.pin_button.inverted);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_panel_below_layout_minimum_rejected() {
        let mut config = DeskConfig::default();
        config.display.width = 32;
        config.display.height = 24;
        assert_eq!(config.validate(), Err(Error::InvalidArgument));

        let mut config = DeskConfig::default();
        config.display.width = 0;
        assert_eq!(config.validate(), Err(Error::InvalidArgument));

        let mut config = DeskConfig::default();
        config.display.width = layout::MIN_WIDTH;
        config.display.height = layout::MIN_HEIGHT;
        assert_eq!(config.validate(), Ok(()));

        let mut config = DeskConfig::default();
        config.display.height = 481;
        assert_eq!(config.validate(), Err(Error::InvalidArgument));
    }

    #[test]
    fn test_zero_poll_period_rejected() {
        let mut config = DeskConfig::default();
        config.input.poll_ms = 0;
        assert_eq!(config.validate(), Err(Error::InvalidArgument));
    }

    #[test]
    fn test_section_validation() {
        let mut config = DeskConfig::default();
        config.audio.sample_rate = 12_345;
        assert_eq!(config.validate(), Err(Error::InvalidArgument));

        let mut config = DeskConfig::default();
        config.touch.timeout_ms = 0;
        assert_eq!(config.validate(), Err(Error::InvalidArgument));

        let mut config = DeskConfig::default();
        config.player.initial_volume = 101;
        assert_eq!(config.validate(), Err(Error::InvalidArgument));

        let mut config = DeskConfig::default();
        config.player.volume_step = 0;
        assert_eq!(config.validate(), Err(Error::InvalidArgument));

        let mut config = DeskConfig::default();
        config.encoder.debounce_ms = 0;
        assert_eq!(config.validate(), Err(Error::InvalidArgument));
    }

    #[test]
    fn test_encoder_validation() {
        let mut enc = EncoderConfig::default();
        enc.pin_b.pin = enc.pin_a.pin;
        assert_eq!(enc.validate(), Err(Error::InvalidArgument));

        let mut enc = EncoderConfig::default();
        enc.pin_button.pin = enc.pin_b.pin;
        assert_eq!(enc.validate(), Err(Error::InvalidArgument));

        let mut enc = EncoderConfig::default();
        enc.debounce_ms = 0;
        assert_eq!(enc.validate(), Err(Error::InvalidArgument));
    }
}
