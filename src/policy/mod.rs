//! Decision providers
//!
//! Implementations of the simulation's decision boundary: a human polling
//! adapter and an evolved feedforward network.

pub mod network;

pub use network::PolicyNetwork;

use crate::sim::{DecisionPolicy, Observation};

/// Human decision provider.
///
/// The frontend edge-detects a key press and queues an impulse request; the
/// next `decide` call consumes it. Stateless beyond that single pending
/// flag.
#[derive(Debug, Default)]
pub struct HumanInput {
    impulse_pending: bool,
}

impl HumanInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an impulse for the next tick. Multiple requests within one tick
    /// collapse into one.
    pub fn request_impulse(&mut self) {
        self.impulse_pending = true;
    }
}

impl DecisionPolicy for HumanInput {
    fn decide(&mut self, _obs: Observation) -> f32 {
        if self.impulse_pending {
            self.impulse_pending = false;
            1.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::IMPULSE_THRESHOLD;

    fn obs() -> Observation {
        Observation {
            y: 350.0,
            gap_top_dist: 50.0,
            gap_bottom_dist: 150.0,
        }
    }

    #[test]
    fn test_impulse_consumed_once() {
        let mut input = HumanInput::new();
        assert!(input.decide(obs()) <= IMPULSE_THRESHOLD);
        input.request_impulse();
        input.request_impulse();
        assert!(input.decide(obs()) > IMPULSE_THRESHOLD);
        assert!(input.decide(obs()) <= IMPULSE_THRESHOLD);
    }
}
