//! GPIO line wrappers
//!
//! Thin newtypes over the embassy-rp drivers so they can carry the
//! `tactus-hal` pin traits. Level reads and writes are plain register
//! accesses and safe from any priority.

use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::Peri;

use tactus_core::config::PinConfig;
use tactus_hal::{InputPin, OutputPin};

/// Maximum number of GPIO pins on RP2040
pub const GPIO_COUNT: usize = 30;

/// Input line with edge waiting
pub struct Line<'d>(Input<'d>);

impl<'d> Line<'d> {
    pub fn new(input: Input<'d>) -> Self {
        Self(input)
    }

    /// Configure a pin as input with the pull from its config
    pub fn from_config(pin: Peri<'d, AnyPin>, config: &PinConfig) -> Self {
        Self(Input::new(pin, pull_for(config)))
    }

    /// Resolve on the next rising or falling edge
    pub async fn wait_for_any_edge(&mut self) {
        self.0.wait_for_any_edge().await;
    }

    pub async fn wait_for_falling_edge(&mut self) {
        self.0.wait_for_falling_edge().await;
    }
}

impl InputPin for Line<'_> {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}

/// Push-pull output line
pub struct Drive<'d>(Output<'d>);

impl<'d> Drive<'d> {
    pub fn new(pin: Peri<'d, AnyPin>, initial_high: bool) -> Self {
        let level = if initial_high { Level::High } else { Level::Low };
        Self(Output::new(pin, level))
    }
}

impl OutputPin for Drive<'_> {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }
}

/// Pull resistor implied by a pin config
///
/// Active-low lines idle high, so they get a pull-up even when the config
/// does not ask for one explicitly.
pub fn pull_for(config: &PinConfig) -> Pull {
    if config.pull_up || config.inverted {
        Pull::Up
    } else {
        Pull::None
    }
}
