//! Dynamic pin allocation for config-driven hardware setup
//!
//! Pins with fixed board wiring (display, touch, SD card, I2S) are claimed
//! directly from the peripherals. The rest go into a [`PinBank`] and are
//! taken by number from the configuration.

use embassy_rp::gpio::AnyPin;
use embassy_rp::Peri;

use tactus_core::{Error, Result};

use crate::gpio::GPIO_COUNT;

/// Move free GPIOs into a bank by number
///
/// Usage:
/// ```ignore
/// let mut bank = PinBank::new();
/// bank_pins!(bank, p, 2 => PIN_2, 3 => PIN_3, 7 => PIN_7);
/// ```
#[macro_export]
macro_rules! bank_pins {
    ($bank:expr, $p:expr, $($n:literal => $pin:ident),+ $(,)?) => {
        $(
            $bank.insert($n, $p.$pin.into());
        )+
    };
}

/// Pin bank that holds unassigned GPIOs and hands them out by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl Default for PinBank {
    fn default() -> Self {
        Self::new()
    }
}

impl PinBank {
    pub const fn new() -> Self {
        Self {
            pins: [const { None }; GPIO_COUNT],
        }
    }

    /// Put a pin into the bank
    pub fn insert(&mut self, pin_num: u8, pin: Peri<'static, AnyPin>) {
        if let Some(slot) = self.pins.get_mut(pin_num as usize) {
            *slot = Some(pin);
        }
    }

    /// Take a pin by number
    ///
    /// Fails with [`Error::InvalidArgument`] if the number is out of range,
    /// belongs to fixed board wiring, or was already taken.
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>> {
        self.pins
            .get_mut(pin_num as usize)
            .and_then(Option::take)
            .ok_or(Error::InvalidArgument)
    }
}
