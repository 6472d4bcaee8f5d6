//! Countdown timers for gameplay windows (coyote time, jump buffer, dash,
//! cooldowns, idle death).
//!
//! A `Countdown` is "ready" once it has run out. Ticking only subtracts while
//! the value is still positive, so a timer may end slightly below zero after
//! the frame that expires it. Negative values are never re-clamped: they
//! simply read as ready.

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Countdown {
    value: f32,
}

impl Countdown {
    /// A timer that is already expired.
    pub const fn expired() -> Self {
        Self { value: 0.0 }
    }

    /// A timer armed with `duration` seconds.
    pub const fn armed(duration: f32) -> Self {
        Self { value: duration }
    }

    pub fn tick(&mut self, dt: f32) {
        if self.value > 0.0 {
            self.value -= dt;
        }
    }

    pub fn arm(&mut self, duration: f32) {
        self.value = duration;
    }

    pub fn clear(&mut self) {
        self.value = 0.0;
    }

    /// True once the countdown has reached or passed zero.
    pub fn is_ready(&self) -> bool {
        self.value <= 0.0
    }

    /// True while time remains on the countdown.
    pub fn is_active(&self) -> bool {
        self.value > 0.0
    }

    /// Raw stored value. May be negative right after expiry.
    pub fn remaining(&self) -> f32 {
        self.value
    }
}
