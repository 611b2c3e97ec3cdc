//! GPIO line abstractions
//!
//! Both traits are synchronous and side-effect free apart from the line
//! itself, so they may be called from interrupt context.

/// Digital output line (data/command select, reset, backlight)
pub trait OutputPin {
    /// Drive the line high (logic 1)
    fn set_high(&mut self);

    /// Drive the line low (logic 0)
    fn set_low(&mut self);

    /// Drive the line to a specific level
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }
}

/// Digital input line (encoder phases, button, touch INT)
pub trait InputPin {
    /// Check if the line reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the line reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}
