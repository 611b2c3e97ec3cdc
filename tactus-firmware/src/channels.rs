//! Inter-task communication channels
//!
//! Defines the static channels and shared flags used between the edge,
//! Input, Presentation and Audio tasks. Everything here is backed by the
//! RP2040 critical-section implementation, which is safe across both cores.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use static_cell::StaticCell;

use tactus_core::events::{AudioCommand, InputEvent};
use tactus_drivers::audio::PlaybackControl;
use tactus_drivers::encoder::EncoderQueue;
use tactus_drivers::gt911::TouchIrq;

/// Channel capacity for normalized input events
const INPUT_CHANNEL_SIZE: usize = 16;

/// Channel capacity for audio commands
const AUDIO_CHANNEL_SIZE: usize = 8;

/// Input events from the Input task (encoder steps, button, touch)
pub static INPUT_CHANNEL: Channel<CriticalSectionRawMutex, InputEvent, INPUT_CHANNEL_SIZE> =
    Channel::new();

/// Audio commands; producers wait when it is full
pub static AUDIO_CHANNEL: Channel<CriticalSectionRawMutex, AudioCommand, AUDIO_CHANNEL_SIZE> =
    Channel::new();

/// Raised by the Audio task each time a file playback returns or is skipped
///
/// Carries the generation of that playback so the player can ignore a
/// completion that belongs to an earlier track.
pub static PLAYBACK_FINISHED: Signal<CriticalSectionRawMutex, u32> = Signal::new();

/// Stop flag and play state shared with the audio engine
pub static PLAYBACK: PlaybackControl = PlaybackControl::new();

/// Set by the touch INT edge, cleared by the GT911 read
pub static TOUCH_IRQ: TouchIrq = TouchIrq::new();

/// Encoder event queue, claimed once at start-up
pub static ENCODER_QUEUE: StaticCell<EncoderQueue> = StaticCell::new();
