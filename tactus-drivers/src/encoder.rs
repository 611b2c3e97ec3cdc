//! Rotary encoder with push button
//!
//! Edges are decoded in interrupt context and pushed into a bounded queue.
//! The queue has two endpoints:
//!
//! - [`EventSink`]: non-blocking and lossy, the only thing interrupt code
//!   may touch. A full queue drops the event.
//! - [`EventSource`]: task side, waits for events with a timeout.
//!
//! Shared decoder state is held in atomics so both endpoints can live on
//! different executors.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{with_timeout, Duration};
use portable_atomic::{AtomicU64, AtomicU8, Ordering};
use static_cell::StaticCell;

use tactus_core::config::{EncoderConfig, PinConfig};
use tactus_core::events::{EncoderEvent, EncoderEventKind};
use tactus_core::quadrature::{debounce_elapsed, decode, phase_state};
use tactus_core::{Error, Result};
use tactus_hal::InputPin;

/// Events buffered between interrupt and task context
pub const QUEUE_DEPTH: usize = 16;

pub type EncoderQueue = Channel<CriticalSectionRawMutex, EncoderEvent, QUEUE_DEPTH>;

/// Decoder state shared by both endpoints
pub struct Encoder {
    queue: &'static EncoderQueue,
    debounce_us: u64,
    button: PinConfig,
    /// Last 2-bit phase state
    state: AtomicU8,
    last_step_us: AtomicU64,
    last_button_us: AtomicU64,
}

impl Encoder {
    /// Validate the wiring, claim the queue and sample the starting phase
    ///
    /// `slot` can be claimed once; a second encoder on the same slot gets
    /// [`Error::ResourceExhausted`].
    pub fn initialize(
        config: &EncoderConfig,
        pin_a: &impl InputPin,
        pin_b: &impl InputPin,
        slot: &'static StaticCell<EncoderQueue>,
        now_us: u64,
    ) -> Result<Self> {
        config.validate()?;
        let queue = slot.try_init(Channel::new()).ok_or(Error::ResourceExhausted)?;

        Ok(Self {
            queue,
            debounce_us: config.debounce_us(),
            button: config.pin_button,
            state: AtomicU8::new(phase_state(pin_a.is_high(), pin_b.is_high())),
            last_step_us: AtomicU64::new(now_us),
            last_button_us: AtomicU64::new(0),
        })
    }

    /// Producer endpoint for interrupt context
    pub fn sink(&self) -> EventSink<'_> {
        EventSink { encoder: self }
    }

    /// Consumer endpoint for task context
    pub fn source(&self) -> EventSource<'_> {
        EventSource { encoder: self }
    }

    fn push(&self, kind: EncoderEventKind, now_us: u64) {
        // full queue drops the event
        let _ = self.queue.try_send(EncoderEvent {
            kind,
            timestamp_us: now_us,
        });
    }
}

/// Interrupt-side endpoint
///
/// Every method is bounded, never blocks and never fails.
#[derive(Clone, Copy)]
pub struct EventSink<'a> {
    encoder: &'a Encoder,
}

impl EventSink<'_> {
    /// Handle an edge on A or B with both lines sampled
    pub fn on_phase_edge(&self, a: bool, b: bool, now_us: u64) {
        let enc = self.encoder;
        let current = phase_state(a, b);
        let previous = enc.state.swap(current, Ordering::AcqRel);

        let Some(step) = decode(previous, current) else {
            return;
        };
        let last = enc.last_step_us.load(Ordering::Acquire);
        if debounce_elapsed(last, now_us, enc.debounce_us) {
            enc.last_step_us.store(now_us, Ordering::Release);
            enc.push(step.into(), now_us);
        }
    }

    /// Handle an edge on the button line
    pub fn on_button_edge(&self, level_high: bool, now_us: u64) {
        let enc = self.encoder;
        if !enc.button.is_active(level_high) {
            return;
        }
        let last = enc.last_button_us.load(Ordering::Acquire);
        if debounce_elapsed(last, now_us, enc.debounce_us) {
            enc.last_button_us.store(now_us, Ordering::Release);
            enc.push(EncoderEventKind::Button, now_us);
        }
    }
}

/// Task-side endpoint
#[derive(Clone, Copy)]
pub struct EventSource<'a> {
    encoder: &'a Encoder,
}

impl EventSource<'_> {
    /// Next event, or `None` once `timeout` passes
    pub async fn consume(&self, timeout: Duration) -> Option<EncoderEvent> {
        with_timeout(timeout, self.encoder.queue.receive()).await.ok()
    }

    /// Next event if one is already queued
    pub fn try_consume(&self) -> Option<EncoderEvent> {
        self.encoder.queue.try_receive().ok()
    }

    /// Events currently queued
    pub fn pending(&self) -> usize {
        self.encoder.queue.len()
    }

    /// Drop queued events and resync the phase state from the lines
    pub fn reset(&self, pin_a: &impl InputPin, pin_b: &impl InputPin) {
        self.encoder.queue.clear();
        self.encoder
            .state
            .store(phase_state(pin_a.is_high(), pin_b.is_high()), Ordering::Release);
    }
}
