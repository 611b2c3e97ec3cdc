//! Edge tasks
//!
//! Run on the interrupt-priority executor and do nothing but sample lines
//! and hand the result to a non-blocking producer. They never touch a bus.

use defmt::*;
use embassy_futures::select::select;
use embassy_time::Instant;

use tactus_drivers::encoder::Encoder;
use tactus_drivers::gt911::TouchIrq;
use tactus_hal::InputPin;
use tactus_hal_rp2040::Line;

/// Quadrature A/B edges
#[embassy_executor::task]
pub async fn encoder_phase_task(
    encoder: &'static Encoder,
    mut a: Line<'static>,
    mut b: Line<'static>,
) {
    info!("Encoder phase task started");

    // drop anything queued before the lines settled
    encoder.source().reset(&a, &b);
    let sink = encoder.sink();

    loop {
        select(a.wait_for_any_edge(), b.wait_for_any_edge()).await;
        sink.on_phase_edge(a.is_high(), b.is_high(), Instant::now().as_micros());
    }
}

/// Encoder push button edges
#[embassy_executor::task]
pub async fn encoder_button_task(encoder: &'static Encoder, mut button: Line<'static>) {
    info!("Encoder button task started");

    let sink = encoder.sink();
    loop {
        button.wait_for_any_edge().await;
        sink.on_button_edge(button.is_high(), Instant::now().as_micros());
    }
}

/// GT911 INT line, active low
#[embassy_executor::task]
pub async fn touch_irq_task(mut int: Line<'static>, irq: &'static TouchIrq) {
    info!("Touch IRQ task started");

    loop {
        int.wait_for_falling_edge().await;
        irq.raise();
    }
}
