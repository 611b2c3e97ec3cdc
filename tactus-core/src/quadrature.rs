//! Quadrature decoding
//!
//! A 2-bit phase state is `(a << 1) | b`. Each edge looks up the pair
//! (previous, current) in a 16-entry table. Indices where both lines changed
//! at once are bounce and decode to no movement.

/// Movement per `(previous << 2) | current` index
pub const TRANSITIONS: [i8; 16] = [
    0, -1, 1, 0, //
    1, 0, 0, -1, //
    -1, 0, 0, 1, //
    0, 1, -1, 0,
];

/// Direction of one accepted quadrature step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Counter-clockwise
    Left,
    /// Clockwise
    Right,
}

/// Pack two line levels into a 2-bit phase state
#[inline]
pub const fn phase_state(a: bool, b: bool) -> u8 {
    ((a as u8) << 1) | (b as u8)
}

/// Raw table movement for a state transition
#[inline]
pub const fn movement(previous: u8, current: u8) -> i8 {
    TRANSITIONS[(((previous & 0x03) << 2) | (current & 0x03)) as usize]
}

/// Decode a transition into a step, if it is one
#[inline]
pub const fn decode(previous: u8, current: u8) -> Option<Step> {
    match movement(previous, current) {
        1 => Some(Step::Right),
        -1 => Some(Step::Left),
        _ => None,
    }
}

/// Whether an event at `now_us` is far enough from the last accepted one
///
/// Equal to the interval counts as accepted. A clock that appears to run
/// backwards never accepts.
#[inline]
pub const fn debounce_elapsed(last_us: u64, now_us: u64, interval_us: u64) -> bool {
    match now_us.checked_sub(last_us) {
        Some(elapsed) => elapsed >= interval_us,
        None => false,
    }
}
