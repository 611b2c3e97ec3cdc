//! Player state machine
//!
//! Owns what the presentation context shows: volume, play state, and the
//! known track. Each input produces an [`Update`] telling the caller what to
//! redraw and which audio command, if any, to send.
//!
//! Every `PlayFile` issued gets the next generation number. The audio side
//! reports completions with the generation they belong to, so a completion
//! for an earlier track never stops the current one.

use crate::events::{AudioCommand, InputEvent, TrackPath};

pub const MAX_VOLUME: u8 = 100;

/// Whether a file is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Playback {
    #[default]
    Idle,
    Playing,
}

/// Result of feeding one event to the player
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Update {
    /// Volume bar needs redrawing
    pub volume_changed: bool,
    /// Play/pause icon needs redrawing
    pub playback_changed: bool,
    /// Command to send to the audio context
    pub command: Option<AudioCommand>,
    /// Play was requested with no known track
    pub rejected: bool,
}

impl Update {
    pub fn is_noop(&self) -> bool {
        !self.volume_changed && !self.playback_changed && self.command.is_none() && !self.rejected
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    volume: u8,
    step: u8,
    playback: Playback,
    track: Option<TrackPath>,
    generation: u32,
}

impl Player {
    /// Create a player; an empty `track` means none is known
    pub fn new(initial_volume: u8, step: u8, track: Option<TrackPath>) -> Self {
        Self {
            volume: initial_volume.min(MAX_VOLUME),
            step,
            playback: Playback::Idle,
            track: track.filter(|t| !t.is_empty()),
            generation: 0,
        }
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn is_playing(&self) -> bool {
        self.playback == Playback::Playing
    }

    pub fn track(&self) -> Option<&TrackPath> {
        self.track.as_ref()
    }

    /// Generation of the most recent `PlayFile` (0 before the first, wrapping)
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Apply one normalized input event
    pub fn handle(&mut self, event: InputEvent) -> Update {
        match event {
            InputEvent::Left => self.set_volume(self.volume.saturating_sub(self.step)),
            InputEvent::Right => {
                self.set_volume(self.volume.saturating_add(self.step).min(MAX_VOLUME))
            }
            InputEvent::Button => self.toggle(),
            InputEvent::Touch { .. } => Update::default(),
        }
    }

    /// Playback of `generation` ended on the audio side (finished, stopped,
    /// or failed)
    ///
    /// A completion for anything but the latest `PlayFile` is stale and
    /// changes nothing.
    pub fn playback_finished(&mut self, generation: u32) -> Update {
        if generation != self.generation || self.playback == Playback::Idle {
            return Update::default();
        }
        self.playback = Playback::Idle;
        Update {
            playback_changed: true,
            ..Update::default()
        }
    }

    fn set_volume(&mut self, volume: u8) -> Update {
        let changed = volume != self.volume;
        self.volume = volume;
        Update {
            volume_changed: changed,
            ..Update::default()
        }
    }

    fn toggle(&mut self) -> Update {
        match self.playback {
            Playback::Playing => {
                self.playback = Playback::Idle;
                Update {
                    playback_changed: true,
                    command: Some(AudioCommand::Stop),
                    ..Update::default()
                }
            }
            Playback::Idle => match &self.track {
                Some(track) => {
                    let command = AudioCommand::PlayFile(track.clone());
                    self.generation = self.generation.wrapping_add(1);
                    self.playback = Playback::Playing;
                    Update {
                        playback_changed: true,
                        command: Some(command),
                        ..Update::default()
                    }
                }
                None => Update {
                    rejected: true,
                    ..Update::default()
                },
            },
        }
    }
}
