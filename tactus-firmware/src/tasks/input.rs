//! Input task
//!
//! Polls on a fixed period: reads the touch controller when its INT has
//! fired, then drains every queued encoder event. Both are normalized into
//! [`InputEvent`]s for Presentation.

use defmt::*;
use embassy_time::{Duration, Ticker};

use tactus_core::events::InputEvent;
use tactus_drivers::encoder::Encoder;
use tactus_drivers::gt911::Gt911;

use crate::board::TouchBus;
use crate::channels::INPUT_CHANNEL;

/// Touch and encoder polling
#[embassy_executor::task]
pub async fn input_task(
    mut touch: Option<Gt911<'static, TouchBus>>,
    encoder: Option<&'static Encoder>,
    width: u16,
    height: u16,
    poll_ms: u32,
) {
    info!("Input task started ({} ms period)", poll_ms);

    let mut ticker = Ticker::every(Duration::from_millis(poll_ms as u64));

    loop {
        ticker.next().await;

        if let Some(gt911) = touch.as_mut().filter(|t| t.touch_pending()) {
            match gt911.read_touch_points().await {
                Ok(frame) => {
                    if let Some(point) = frame.primary() {
                        let point = point.clamped(width, height);
                        forward(InputEvent::Touch {
                            x: point.x,
                            y: point.y,
                        });
                    }
                }
                // no new touch this cycle
                Err(e) => debug!("Touch read failed: {:?}", e),
            }
        }

        if let Some(encoder) = encoder {
            let source = encoder.source();
            while let Some(event) = source.try_consume() {
                trace!("Encoder {:?} at {} us", event.kind, event.timestamp_us);
                forward(event.kind.into());
            }
        }
    }
}

fn forward(event: InputEvent) {
    if INPUT_CHANNEL.try_send(event).is_err() {
        warn!("Input channel full, dropping {:?}", event);
    }
}
