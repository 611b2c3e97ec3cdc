//! Audio task
//!
//! Owns the audio engine on core 1. Commands are executed one at a time,
//! each to completion, in the order they were sent.
//!
//! `PlayFile` commands are numbered in arrival order, matching the
//! generations the player hands out, and every one is reported back on
//! `PLAYBACK_FINISHED` with its number once it is done or skipped.

use defmt::*;

use tactus_core::events::AudioCommand;

use crate::board::Engine;
use crate::channels::{AUDIO_CHANNEL, PLAYBACK, PLAYBACK_FINISHED};

/// Audio command loop
#[embassy_executor::task]
pub async fn audio_task(engine: &'static mut Engine, sample_rate: u32) {
    info!("Audio task started");

    if let Err(e) = engine.initialize(sample_rate).await {
        error!("Audio output init failed: {:?}", e);
        return;
    }
    info!("I2S running at {} Hz", sample_rate);

    let mut generation: u32 = 0;

    loop {
        let command = AUDIO_CHANNEL.receive().await;
        debug!("Audio command: {:?}", command);

        match command {
            AudioCommand::Beep {
                freq_hz,
                duration_ms,
                volume,
            } => {
                if let Err(e) = engine.play_tone(freq_hz, duration_ms, volume).await {
                    warn!("Tone failed: {:?}", e);
                }
            }
            AudioCommand::PlayFile(path) => {
                generation = generation.wrapping_add(1);
                if PLAYBACK.is_cancelled(generation) {
                    info!("Skipping {}, stopped while queued", path.as_str());
                } else {
                    info!("Playing {}", path.as_str());
                    match engine.play_file(&path).await {
                        Ok(()) => info!("Playback of {} ended", path.as_str()),
                        Err(e) => warn!("Playback of {} failed: {:?}", path.as_str(), e),
                    }
                }
                PLAYBACK_FINISHED.signal(generation);
            }
            AudioCommand::Stop => {
                // stop was already raised on the shared control by the sender
                engine.request_stop();
            }
        }
    }
}
