//! Presentation task
//!
//! Owns the panel and the player state. Turns input events into redraws
//! and audio commands, and follows playback completions from the Audio
//! task. Without a working panel the player still runs, only the drawing
//! is skipped.

use defmt::*;
use embassy_futures::select::{select, Either};

use tactus_core::config::PlayerConfig;
use tactus_core::display::Palette;
use tactus_core::events::{AudioCommand, InputEvent};
use tactus_core::player::{Player, Update};

use crate::board::Panel;
use crate::channels::{AUDIO_CHANNEL, INPUT_CHANNEL, PLAYBACK, PLAYBACK_FINISHED};
use crate::screen::Screen;

/// Player UI and audio dispatch
#[embassy_executor::task]
pub async fn presentation_task(mut panel: Option<Panel>, config: &'static PlayerConfig) {
    info!("Presentation task started");

    let mut player = Player::new(config.initial_volume, config.volume_step, config.track());

    if player.track().is_none() {
        warn!("No default track configured, play is disabled");
    }

    let mut screen = panel
        .as_ref()
        .map(|p| Screen::new(Palette::default(), p.width(), p.height()));
    match (panel.as_mut(), screen.as_mut()) {
        (Some(panel), Some(screen)) => {
            if let Err(e) = screen
                .draw_boot(panel, player.volume(), player.is_playing())
                .await
            {
                error!("Boot screen failed: {:?}", e);
            }
        }
        _ => warn!("No panel, running without a screen"),
    }
    AUDIO_CHANNEL.send(AudioCommand::boot_beep()).await;

    loop {
        let update = match select(INPUT_CHANNEL.receive(), PLAYBACK_FINISHED.wait()).await {
            Either::First(event) => {
                if let InputEvent::Touch { x, y } = event {
                    info!("Touch at ({}, {})", x, y);
                }
                player.handle(event)
            }
            Either::Second(generation) => {
                debug!(
                    "Playback {} finished (latest {})",
                    generation,
                    player.generation()
                );
                player.playback_finished(generation)
            }
        };

        dispatch(&player, &update).await;
        if let (Some(panel), Some(screen)) = (panel.as_mut(), screen.as_mut()) {
            redraw(panel, screen, &player, &update).await;
        }
    }
}

async fn dispatch(player: &Player, update: &Update) {
    if update.rejected {
        warn!("Play ignored: no track");
    }

    if let Some(command) = &update.command {
        if matches!(command, AudioCommand::Stop) {
            // reaches a running playback now and one still queued later
            PLAYBACK.cancel(player.generation());
        }
        AUDIO_CHANNEL.send(command.clone()).await;
    }
}

async fn redraw(panel: &mut Panel, screen: &mut Screen, player: &Player, update: &Update) {
    if update.volume_changed {
        debug!("Volume {}", player.volume());
        if let Err(e) = screen.draw_volume(panel, player.volume()).await {
            warn!("Volume redraw failed: {:?}", e);
        }
    }

    if update.playback_changed {
        if let Err(e) = screen.draw_icon(panel, player.is_playing()).await {
            warn!("Icon redraw failed: {:?}", e);
        }
    }
}
