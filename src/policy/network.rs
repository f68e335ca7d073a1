//! Evolved feedforward policy network
//!
//! A small fixed-topology network: three observation inputs, one tanh hidden
//! layer, one logistic output compared against the impulse threshold. The
//! evolutionary trainer owns all selection; this type only knows how to
//! evaluate itself, mutate, and cross over.

use rand::Rng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::consts::FIELD_HEIGHT;
use crate::sim::{DecisionPolicy, Observation};

/// Observation inputs per agent per tick.
pub const INPUTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyNetwork {
    /// One weight row per hidden neuron
    hidden_weights: Vec<[f32; INPUTS]>,
    hidden_bias: Vec<f32>,
    output_weights: Vec<f32>,
    output_bias: f32,
}

impl PolicyNetwork {
    /// Construct a randomly initialized network with `hidden` neurons.
    #[must_use]
    pub fn random(hidden: usize, rng: &mut dyn RngCore) -> Self {
        let mut hidden_weights = Vec::with_capacity(hidden);
        for _ in 0..hidden {
            let mut row = [0.0; INPUTS];
            for weight in &mut row {
                *weight = rng.random_range(-2.0..2.0);
            }
            hidden_weights.push(row);
        }
        Self {
            hidden_weights,
            hidden_bias: (0..hidden).map(|_| rng.random_range(-1.0..1.0)).collect(),
            output_weights: (0..hidden).map(|_| rng.random_range(-2.0..2.0)).collect(),
            output_bias: rng.random_range(-1.0..1.0),
        }
    }

    pub fn hidden_len(&self) -> usize {
        self.hidden_weights.len()
    }

    fn logistic(value: f32) -> f32 {
        1.0 / (1.0 + (-value).exp())
    }

    fn gaussian(rng: &mut dyn RngCore) -> f32 {
        const TWO_PI: f32 = std::f32::consts::TAU;
        let u1 = rng.random::<f32>().clamp(f32::MIN_POSITIVE, 1.0);
        let u2 = rng.random::<f32>();
        (-2.0 * u1.ln()).sqrt() * (TWO_PI * u2).cos()
    }

    /// Evaluate the network on one observation. Pure: the same inputs always
    /// produce the same scalar.
    pub fn activate(&self, inputs: [f32; INPUTS]) -> f32 {
        // Observations are field-scale distances; bring them to unit range
        // so the tanh layer does not saturate immediately
        let scaled = inputs.map(|v| v / FIELD_HEIGHT);
        let mut acc = self.output_bias;
        for ((row, bias), out_weight) in self
            .hidden_weights
            .iter()
            .zip(&self.hidden_bias)
            .zip(&self.output_weights)
        {
            let mut sum = *bias;
            for (weight, input) in row.iter().zip(&scaled) {
                sum += weight * input;
            }
            acc += sum.tanh() * out_weight;
        }
        Self::logistic(acc)
    }

    /// Perturb each parameter with probability `rate` by a Gaussian step of
    /// scale `sigma`.
    pub fn mutate(&mut self, rng: &mut dyn RngCore, rate: f32, sigma: f32) {
        let sigma = sigma.max(1e-5);
        for row in &mut self.hidden_weights {
            for weight in row.iter_mut() {
                if rng.random::<f32>() < rate {
                    *weight += Self::gaussian(rng) * sigma;
                }
            }
        }
        for bias in &mut self.hidden_bias {
            if rng.random::<f32>() < rate {
                *bias += Self::gaussian(rng) * sigma;
            }
        }
        for weight in &mut self.output_weights {
            if rng.random::<f32>() < rate {
                *weight += Self::gaussian(rng) * sigma;
            }
        }
        if rng.random::<f32>() < rate {
            self.output_bias += Self::gaussian(rng) * sigma;
        }
    }

    /// Uniform crossover: each hidden neuron (with its output weight) comes
    /// from one parent or the other. Both parents must share a topology.
    #[must_use]
    pub fn crossover(&self, other: &Self, rng: &mut dyn RngCore) -> Self {
        debug_assert_eq!(self.hidden_len(), other.hidden_len());
        let mut child = self.clone();
        for i in 0..child.hidden_len().min(other.hidden_len()) {
            if rng.random::<f32>() < 0.5 {
                child.hidden_weights[i] = other.hidden_weights[i];
                child.hidden_bias[i] = other.hidden_bias[i];
                child.output_weights[i] = other.output_weights[i];
            }
        }
        if rng.random::<f32>() < 0.5 {
            child.output_bias = other.output_bias;
        }
        child
    }
}

impl DecisionPolicy for PolicyNetwork {
    fn decide(&mut self, obs: Observation) -> f32 {
        self.activate(obs.as_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_random_network_has_expected_shape() {
        let mut rng = Pcg32::seed_from_u64(0xDEAD_BEEF);
        let net = PolicyNetwork::random(6, &mut rng);
        assert_eq!(net.hidden_len(), 6);
        assert_eq!(net.hidden_bias.len(), 6);
        assert_eq!(net.output_weights.len(), 6);
    }

    #[test]
    fn test_activation_is_deterministic_and_bounded() {
        let mut rng = Pcg32::seed_from_u64(123);
        let net = PolicyNetwork::random(6, &mut rng);
        let inputs = [350.0, 120.0, 80.0];
        let a = net.activate(inputs);
        let b = net.activate(inputs);
        assert_eq!(a, b);
        assert!(a.is_finite());
        assert!((0.0..=1.0).contains(&a));
    }

    #[test]
    fn test_mutate_changes_parameters() {
        let mut rng = Pcg32::seed_from_u64(456);
        let mut net = PolicyNetwork::random(6, &mut rng);
        let original = net.clone();
        net.mutate(&mut rng, 1.0, 0.5);
        assert_ne!(net, original);
    }

    #[test]
    fn test_crossover_preserves_topology() {
        let mut rng = Pcg32::seed_from_u64(789);
        let a = PolicyNetwork::random(6, &mut rng);
        let b = PolicyNetwork::random(6, &mut rng);
        let child = a.crossover(&b, &mut rng);
        assert_eq!(child.hidden_len(), 6);
        // Every neuron came from one of the parents
        for i in 0..6 {
            assert!(
                child.hidden_weights[i] == a.hidden_weights[i]
                    || child.hidden_weights[i] == b.hidden_weights[i]
            );
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let mut rng = Pcg32::seed_from_u64(42);
        let net = PolicyNetwork::random(4, &mut rng);
        let json = serde_json::to_string(&net).unwrap();
        let back: PolicyNetwork = serde_json::from_str(&json).unwrap();
        assert_eq!(net, back);
    }
}
