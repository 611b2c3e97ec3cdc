//! Events and commands exchanged between execution contexts
//!
//! Raw device layouts are decoded at the driver boundary; only the types in
//! this module travel between tasks.

use heapless::{String, Vec};

use crate::quadrature::Step;

/// Maximum length of a track path, in bytes
pub const MAX_PATH_LEN: usize = 64;

/// Maximum simultaneous touch points reported by the controller
pub const MAX_TOUCH_POINTS: usize = 5;

/// Path of a file on the mounted volume
pub type TrackPath = String<MAX_PATH_LEN>;

/// What the encoder reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderEventKind {
    Left,
    Right,
    Button,
}

impl From<Step> for EncoderEventKind {
    fn from(step: Step) -> Self {
        match step {
            Step::Left => EncoderEventKind::Left,
            Step::Right => EncoderEventKind::Right,
        }
    }
}

/// One debounced encoder event, stamped in interrupt context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderEvent {
    pub kind: EncoderEventKind,
    /// Microseconds since boot
    pub timestamp_us: u64,
}

/// A single contact reported by the touch controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
    pub id: u8,
    pub x: u16,
    pub y: u16,
    pub size: u16,
}

impl TouchPoint {
    /// Clamp coordinates into `[0, width-1] x [0, height-1]`
    pub fn clamped(self, width: u16, height: u16) -> Self {
        Self {
            x: self.x.min(width.saturating_sub(1)),
            y: self.y.min(height.saturating_sub(1)),
            ..self
        }
    }
}

/// Points from one controller poll, in the order the device reported them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchFrame {
    pub points: Vec<TouchPoint, MAX_TOUCH_POINTS>,
}

impl TouchFrame {
    /// Frame with no contacts
    pub const fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First reported contact, if any
    pub fn primary(&self) -> Option<TouchPoint> {
        self.points.first().copied()
    }
}

/// Normalized input delivered to the presentation context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// Encoder rotated counter-clockwise one step
    Left,
    /// Encoder rotated clockwise one step
    Right,
    /// Encoder button pressed
    Button,
    /// Screen touched at clamped panel coordinates
    Touch { x: u16, y: u16 },
}

impl From<EncoderEventKind> for InputEvent {
    fn from(kind: EncoderEventKind) -> Self {
        match kind {
            EncoderEventKind::Left => InputEvent::Left,
            EncoderEventKind::Right => InputEvent::Right,
            EncoderEventKind::Button => InputEvent::Button,
        }
    }
}

/// Work item for the audio context
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioCommand {
    /// Synthesized sine tone
    Beep {
        freq_hz: f32,
        duration_ms: u32,
        volume: f32,
    },
    /// Stream a WAV file from storage
    PlayFile(TrackPath),
    /// Cancel the current file playback
    Stop,
}

impl AudioCommand {
    /// Short confirmation tone played at boot
    pub const fn boot_beep() -> Self {
        AudioCommand::Beep {
            freq_hz: 880.0,
            duration_ms: 120,
            volume: 0.35,
        }
    }
}
