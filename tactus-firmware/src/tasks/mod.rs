//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.
//! The edge tasks run on the interrupt-priority executor; Input and
//! Presentation share the core-0 thread executor; Audio owns core 1.

pub mod audio;
pub mod edges;
pub mod input;
pub mod presentation;

pub use audio::audio_task;
pub use edges::{encoder_button_task, encoder_phase_task, touch_irq_task};
pub use input::input_task;
pub use presentation::presentation_task;
