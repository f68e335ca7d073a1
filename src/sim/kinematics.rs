//! Vertical flight model
//!
//! An agent's vertical motion is a closed-form function of the ticks elapsed
//! since its last impulse; gravity never accumulates into a stored velocity.

use serde::{Deserialize, Serialize};

use crate::consts::{IMPULSE_VEL, LIFT_BIAS, TERMINAL_FALL};

/// Vertical motion state for one agent.
///
/// Per tick the displacement is `d = v·t + 1.5·t²` where `v` is the velocity
/// recorded at the last impulse and `t` the ticks since then, clamped to the
/// terminal fall speed on the way down and biased by extra lift while still
/// ascending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    /// Velocity recorded at the last impulse (0 before the first one)
    vel: f32,
    /// Ticks elapsed since the last impulse
    ticks: u32,
}

impl Default for Flight {
    fn default() -> Self {
        Self { vel: 0.0, ticks: 0 }
    }
}

impl Flight {
    pub fn new() -> Self {
        Self::default()
    }

    fn displacement(vel: f32, ticks: u32) -> f32 {
        let t = ticks as f32;
        let d = vel * t + 1.5 * t * t;
        if d >= TERMINAL_FALL {
            TERMINAL_FALL
        } else if d < 0.0 {
            d - LIFT_BIAS
        } else {
            d
        }
    }

    /// Advance one tick and return the vertical displacement to apply.
    pub fn advance(&mut self) -> f32 {
        self.ticks += 1;
        Self::displacement(self.vel, self.ticks)
    }

    /// Restart the motion curve with upward velocity.
    ///
    /// May be issued every tick without limit; re-triggering sooner just
    /// resets `t` earlier on the curve, which yields a smaller net negative
    /// displacement.
    pub fn impulse(&mut self) {
        self.vel = IMPULSE_VEL;
        self.ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_fall_reaches_terminal_speed() {
        let mut flight = Flight::new();
        assert_eq!(flight.advance(), 1.5);
        assert_eq!(flight.advance(), 6.0);
        assert_eq!(flight.advance(), 13.5);
        // From here the raw curve exceeds the clamp
        for _ in 0..20 {
            assert_eq!(flight.advance(), TERMINAL_FALL);
        }
    }

    #[test]
    fn test_free_fall_is_monotonically_non_decreasing() {
        let mut flight = Flight::new();
        let mut prev = flight.advance();
        for _ in 0..50 {
            let d = flight.advance();
            assert!(d >= prev);
            prev = d;
        }
        assert_eq!(prev, TERMINAL_FALL);
    }

    #[test]
    fn test_impulse_ascends_next_tick() {
        let mut flight = Flight::new();
        for _ in 0..10 {
            flight.advance();
        }
        flight.impulse();
        let d = flight.advance();
        // -10.5 + 1.5 = -9, biased to -11
        assert_eq!(d, -11.0);
        assert!(d < 0.0);
    }

    #[test]
    fn test_earlier_reimpulse_gives_smaller_net_lift() {
        // Re-triggering the impulse sooner keeps the curve nearer its start,
        // where the displacement is less negative.
        let mut fresh = Flight::new();
        fresh.impulse();
        let first = fresh.advance();

        let mut held = Flight::new();
        held.impulse();
        held.advance();
        let second = held.advance();

        assert!(first < 0.0 && second < 0.0);
        assert!(first > second);
    }

    #[test]
    fn test_impulse_every_tick_never_falls() {
        let mut flight = Flight::new();
        for _ in 0..30 {
            flight.impulse();
            assert_eq!(flight.advance(), -11.0);
        }
    }
}
