//! Evolutionary trainer
//!
//! The trainer owns population management, selection, and variation; the
//! simulation only ever sees a batch of decision policies and hands back one
//! fitness value per policy. Nothing here reaches into the tick engine's
//! internals.

use std::cmp::Ordering;

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::policy::PolicyNetwork;
use crate::settings::Config;
use crate::sim::{self, DecisionPolicy, RoundPhase, RoundState, StopReason};

/// How many top performers survive a generation unchanged.
const ELITES: usize = 2;

/// The best network seen so far across a training run.
#[derive(Debug, Clone)]
pub struct Champion {
    pub fitness: f32,
    pub generation: u32,
    pub network: PolicyNetwork,
}

/// Outcome of a single generation round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationReport {
    pub generation: u32,
    pub score: u32,
    pub best_fitness: f32,
    pub survivors: usize,
    pub ticks: u64,
    pub stop: Option<StopReason>,
    /// The round was interrupted between ticks by the cancel hook
    pub cancelled: bool,
}

/// Outcome of a whole training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingSummary {
    pub generations_run: u32,
    pub target_reached: bool,
    pub cancelled: bool,
}

pub struct Trainer {
    config: Config,
    seed: u64,
    population: Vec<PolicyNetwork>,
    /// Index of the next generation to evaluate
    pub generation: u32,
    pub champion: Option<Champion>,
    rng: Pcg32,
}

impl Trainer {
    pub fn new(config: Config, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let population = (0..config.population)
            .map(|_| PolicyNetwork::random(config.hidden_neurons, &mut rng))
            .collect();
        Self {
            config,
            seed,
            population,
            generation: 0,
            champion: None,
            rng,
        }
    }

    pub fn population_len(&self) -> usize {
        self.population.len()
    }

    /// Per-generation obstacle stream derived from the run seed.
    fn round_seed(&self) -> u64 {
        self.seed
            .wrapping_add((self.generation as u64).wrapping_mul(2654435761))
    }

    /// Evaluate the current population in one round.
    ///
    /// `observe` sees the world between ticks; `cancel` is honored between
    /// ticks only, and the interrupted round's best agent still counts
    /// toward the champion before this returns.
    pub fn run_generation(
        &mut self,
        observe: &mut dyn FnMut(&RoundState),
        cancel: &mut dyn FnMut() -> bool,
    ) -> GenerationReport {
        let mut state = RoundState::population(
            self.population.len(),
            self.round_seed(),
            self.generation,
            self.config.rewards(),
            self.config.fitness_target,
        );
        let mut policies = self.population.clone();
        let mut refs: Vec<&mut dyn DecisionPolicy> = policies
            .iter_mut()
            .map(|net| net as &mut dyn DecisionPolicy)
            .collect();

        let mut cancelled = false;
        while state.phase == RoundPhase::Running {
            if cancel() {
                cancelled = true;
                break;
            }
            sim::tick(&mut state, &mut refs);
            observe(&state);
        }

        let fitness = state.fitness_values();
        self.note_champion(&fitness);

        let report = GenerationReport {
            generation: self.generation,
            score: state.score,
            best_fitness: state.best_fitness(),
            survivors: state.live_count(),
            ticks: state.tick_count,
            stop: state.stop_reason,
            cancelled,
        };

        if !cancelled && report.stop != Some(StopReason::TargetReached) {
            self.reproduce(&fitness);
        }
        self.generation += 1;
        report
    }

    /// Run up to `generations` rounds, stopping early at the fitness target
    /// or when the cancel hook fires.
    pub fn run(
        &mut self,
        generations: u32,
        observe: &mut dyn FnMut(&RoundState),
        cancel: &mut dyn FnMut() -> bool,
    ) -> TrainingSummary {
        let mut summary = TrainingSummary {
            generations_run: 0,
            target_reached: false,
            cancelled: false,
        };
        for _ in 0..generations {
            let report = self.run_generation(observe, cancel);
            summary.generations_run += 1;
            log::info!(
                "generation {}: score {}, best fitness {:.1}, survivors {}/{}, {} ticks",
                report.generation,
                report.score,
                report.best_fitness,
                report.survivors,
                self.population.len(),
                report.ticks
            );
            if report.cancelled {
                summary.cancelled = true;
                break;
            }
            if report.stop == Some(StopReason::TargetReached) {
                summary.target_reached = true;
                break;
            }
        }
        summary
    }

    fn note_champion(&mut self, fitness: &[f32]) {
        let Some((best_idx, &best)) = fitness
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(Ordering::Equal))
        else {
            return;
        };
        let improved = self.champion.as_ref().is_none_or(|c| best > c.fitness);
        if improved {
            self.champion = Some(Champion {
                fitness: best,
                generation: self.generation,
                network: self.population[best_idx].clone(),
            });
        }
    }

    /// Build the next population: keep the elites unchanged, fill the rest
    /// with mutated crossover of parents drawn from the top quarter.
    fn reproduce(&mut self, fitness: &[f32]) {
        let len = self.population.len();
        let mut ranked: Vec<usize> = (0..len).collect();
        ranked.sort_by(|&a, &b| {
            fitness[b]
                .partial_cmp(&fitness[a])
                .unwrap_or(Ordering::Equal)
        });

        let parent_pool = (len / 4).max(2).min(len);
        let mut next = Vec::with_capacity(len);
        for &i in ranked.iter().take(ELITES.min(len)) {
            next.push(self.population[i].clone());
        }
        while next.len() < len {
            let a = ranked[self.rng.random_range(0..parent_pool)];
            let b = ranked[self.rng.random_range(0..parent_pool)];
            let mut child = self.population[a].crossover(&self.population[b], &mut self.rng);
            child.mutate(
                &mut self.rng,
                self.config.mutation_rate,
                self.config.mutation_sigma,
            );
            next.push(child);
        }
        self.population = next;
    }
}
