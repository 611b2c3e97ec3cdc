//! Tactus - Desk Appliance Firmware
//!
//! Firmware binary for the RP2040 desk appliance: a rotary encoder and a
//! capacitive touch panel drive a small player UI on an ILI9488 display,
//! with tones and WAV playback from SD card over I2S.
//!
//! Execution contexts:
//! - Interrupt-priority executor: encoder and touch edge tasks
//! - Core 0 thread executor: Input and Presentation
//! - Core 1: Audio

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{Executor, InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::InterruptHandler as I2cInterruptHandler;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::{I2C0, PIO0};
use embassy_rp::pio::InterruptHandler as PioInterruptHandler;
use embassy_time::Instant;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use tactus_core::config::{parse_config, DeskConfig};
use tactus_core::display::BLACK;
use tactus_drivers::audio::AudioEngine;
use tactus_drivers::encoder::Encoder;
use tactus_drivers::gt911::Gt911;

use crate::board::{encoder_lines, Board, CardSlot, Engine};
use crate::channels::{ENCODER_QUEUE, PLAYBACK, TOUCH_IRQ};

/// Embedded default configuration (compiled into firmware)
/// Edit desk.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../desk.toml");

/// Core 1 stack; sized for the blocking SD card path
const CORE1_STACK_SIZE: usize = 16 * 1024;

mod board;
mod channels;
mod screen;
mod tasks;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
});

// Static cells for state shared with tasks (must live forever)
static CONFIG: StaticCell<DeskConfig> = StaticCell::new();
static ENCODER: StaticCell<Encoder> = StaticCell::new();
static ENGINE: StaticCell<Engine> = StaticCell::new();
static CORE1_STACK: StaticCell<Stack<CORE1_STACK_SIZE>> = StaticCell::new();
static EXECUTOR_CORE1: StaticCell<Executor> = StaticCell::new();

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tactus firmware starting...");

    let config: &'static DeskConfig = CONFIG.init(load_config());
    info!(
        "Config: {}x{} panel, {} Hz audio, {} ms input period",
        config.display.width, config.display.height, config.audio.sample_rate, config.input.poll_ms
    );

    let p = embassy_rp::init(Default::default());
    let mut board = Board::split(p);

    // Display
    let mut panel = board.display.into_panel(&config.display);
    let panel = match panel.initialize().await {
        Ok(()) => {
            info!("ILI9488 initialized");
            if let Err(e) = panel.clear(BLACK).await {
                warn!("Panel clear failed: {:?}", e);
            }
            Some(panel)
        }
        Err(e) => {
            error!("ILI9488 init failed, display disabled: {:?}", e);
            None
        }
    };

    // Touch
    let (touch_bus, touch_int) = board.touch.into_parts(&config.touch);
    let touch = match Gt911::initialize(touch_bus, &TOUCH_IRQ).await {
        Ok(gt911) => {
            info!(
                "GT911 product {} firmware {:04x}",
                gt911.product_id_str(),
                gt911.firmware_version()
            );
            Some(gt911)
        }
        Err(e) => {
            error!("GT911 init failed, touch disabled: {:?}", e);
            None
        }
    };

    // Encoder
    let encoder = match encoder_lines(&mut board.bank, config).and_then(|lines| {
        let encoder = Encoder::initialize(
            &config.encoder,
            &lines.a,
            &lines.b,
            &ENCODER_QUEUE,
            Instant::now().as_micros(),
        )?;
        Ok((encoder, lines))
    }) {
        Ok((encoder, lines)) => {
            info!(
                "Encoder on A={} B={} SW={}",
                config.encoder.pin_a.pin, config.encoder.pin_b.pin, config.encoder.pin_button.pin
            );
            Some((&*ENCODER.init(encoder), lines))
        }
        Err(e) => {
            error!("Encoder init failed, encoder disabled: {:?}", e);
            None
        }
    };

    // Audio output and storage
    let sink = board.i2s.into_sink(config.audio.sample_rate);
    let card = match board.card.mount() {
        Ok(card) => {
            info!("SD card mounted");
            Some(card)
        }
        Err(e) => {
            warn!("SD card unavailable, file playback disabled: {:?}", e);
            None
        }
    };
    let engine = ENGINE.init(AudioEngine::new(sink, CardSlot(card), &PLAYBACK));

    // Core 1: audio
    let sample_rate = config.audio.sample_rate;
    spawn_core1(board.core1, CORE1_STACK.init(Stack::new()), move || {
        let executor = EXECUTOR_CORE1.init(Executor::new());
        executor.run(|spawner| spawner.spawn(tasks::audio_task(engine, sample_rate)).unwrap());
    });

    // Interrupt priority: edge tasks
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high.spawn(tasks::touch_irq_task(touch_int, &TOUCH_IRQ)).unwrap();

    let encoder = encoder.map(|(encoder, lines)| {
        high.spawn(tasks::encoder_phase_task(encoder, lines.a, lines.b))
            .unwrap();
        high.spawn(tasks::encoder_button_task(encoder, lines.button))
            .unwrap();
        encoder
    });

    // Thread mode: input and presentation
    spawner
        .spawn(tasks::input_task(
            touch,
            encoder,
            config.display.width,
            config.display.height,
            config.input.poll_ms,
        ))
        .unwrap();
    spawner
        .spawn(tasks::presentation_task(panel, &config.player))
        .unwrap();

    info!("All tasks spawned");
}

/// Parse the embedded desk.toml, falling back to defaults on error
fn load_config() -> DeskConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Embedded config invalid, using defaults: {:?}", e);
            DeskConfig::default()
        }
    }
}
