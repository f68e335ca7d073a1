//! Runtime configuration
//!
//! Evolution and fitness knobs in one serde struct with defaults matching
//! the built-in constants. A JSON config file is optional; a malformed file
//! or an invalid value is rejected before any round starts. Field geometry
//! and kinematic constants are compile-time (`crate::consts`) because the
//! collision masks are built against them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{
    DEFAULT_FITNESS_TARGET, DEFAULT_GENERATION_CAP, DEFAULT_POPULATION,
    FITNESS_COLLISION_PENALTY, FITNESS_PASS_BONUS, FITNESS_PER_TICK,
};
use crate::sim::Rewards;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("population must be at least 1")]
    EmptyPopulation,
    #[error("hidden_neurons must be at least 1")]
    NoHiddenNeurons,
    #[error("generation_cap must be at least 1")]
    NoGenerations,
    #[error("fitness_target must be positive and finite")]
    BadFitnessTarget,
    #[error("fitness_per_tick must be positive and finite")]
    BadTickReward,
    #[error("fitness bonuses and penalties must be finite")]
    BadReward,
    #[error("mutation_rate must lie within [0, 1]")]
    BadMutationRate,
    #[error("mutation_sigma must be positive and finite")]
    BadMutationSigma,
}

/// Tunable training and fitness parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Agents per generation
    pub population: usize,
    /// Hidden layer width of evolved networks
    pub hidden_neurons: usize,
    /// Hard cap on generations per training run
    pub generation_cap: u32,
    /// A round stops early once any agent's fitness reaches this
    pub fitness_target: f32,
    /// Survival reward per tick
    pub fitness_per_tick: f32,
    /// Bonus for every live agent when a pipe is passed
    pub fitness_pass_bonus: f32,
    /// Penalty applied on collision
    pub fitness_collision_penalty: f32,
    /// Per-parameter mutation probability
    pub mutation_rate: f32,
    /// Gaussian mutation step scale
    pub mutation_sigma: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            population: DEFAULT_POPULATION,
            hidden_neurons: 6,
            generation_cap: DEFAULT_GENERATION_CAP,
            fitness_target: DEFAULT_FITNESS_TARGET,
            fitness_per_tick: FITNESS_PER_TICK,
            fitness_pass_bonus: FITNESS_PASS_BONUS,
            fitness_collision_penalty: FITNESS_COLLISION_PENALTY,
            mutation_rate: 0.25,
            mutation_sigma: 0.5,
        }
    }
}

impl Config {
    /// Load a config file; missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Reject invalid values. Called once at startup; a failure here is
    /// fatal before any round begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.hidden_neurons == 0 {
            return Err(ConfigError::NoHiddenNeurons);
        }
        if self.generation_cap == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if !(self.fitness_target.is_finite() && self.fitness_target > 0.0) {
            return Err(ConfigError::BadFitnessTarget);
        }
        // A positive per-tick reward also guarantees every round terminates:
        // a surviving agent's fitness reaches the target in bounded ticks
        if !(self.fitness_per_tick.is_finite() && self.fitness_per_tick > 0.0) {
            return Err(ConfigError::BadTickReward);
        }
        if !self.fitness_pass_bonus.is_finite() || !self.fitness_collision_penalty.is_finite() {
            return Err(ConfigError::BadReward);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::BadMutationRate);
        }
        if !(self.mutation_sigma.is_finite() && self.mutation_sigma > 0.0) {
            return Err(ConfigError::BadMutationSigma);
        }
        Ok(())
    }

    /// The fitness constants a round needs, detached from the rest.
    pub fn rewards(&self) -> Rewards {
        Rewards {
            per_tick: self.fitness_per_tick,
            pass_bonus: self.fitness_pass_bonus,
            collision_penalty: self.fitness_collision_penalty,
        }
    }
}
