//! Round state and core simulation types
//!
//! Everything a round needs to advance deterministically lives here; there
//! are no process-wide mutable globals. High score and champion artifacts
//! flow through the persistence collaborators instead.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{
    BIRD_START_X, BIRD_START_Y, FITNESS_COLLISION_PENALTY, FITNESS_PASS_BONUS, FITNESS_PER_TICK,
    PIPE_SPAWN_X,
};

use super::ground::Ground;
use super::kinematics::Flight;
use super::obstacle::{Pipe, PipeSpawner};

/// How a round is driven and scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundMode {
    /// A single agent, no fitness accounting, ends when it dies
    Human,
    /// A pool of agents accruing fitness, ends when the pool empties or the
    /// early-stop target is reached
    Population,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    Running,
    Ended,
}

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Every agent collided or left the field
    AllDead,
    /// Some agent's fitness reached the configured target (a success stop)
    TargetReached,
}

/// Fitness shaping constants, copied out of the runtime config per round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rewards {
    /// Survival reward per tick
    pub per_tick: f32,
    /// Bonus for every live agent when a pipe is passed
    pub pass_bonus: f32,
    /// Penalty applied when an agent collides
    pub collision_penalty: f32,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            per_tick: FITNESS_PER_TICK,
            pass_bonus: FITNESS_PASS_BONUS,
            collision_penalty: FITNESS_COLLISION_PENALTY,
        }
    }
}

/// A controllable bird entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Position; x is fixed for the whole pool, y is driven by kinematics
    pub pos: Vec2,
    pub flight: Flight,
    pub alive: bool,
    /// Cumulative reward, meaningful in population mode only
    pub fitness: f32,
    /// Raw policy output from the most recent decision; always present,
    /// only meaningful when a frontend asked for diagnostics
    pub last_decision: f32,
}

impl Agent {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(BIRD_START_X, BIRD_START_Y),
            flight: Flight::new(),
            alive: true,
            fitness: 0.0,
            last_decision: 0.0,
        }
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete round state, reproducible from its seed and decision sequence.
#[derive(Debug, Clone)]
pub struct RoundState {
    /// Round seed, feeding the pipe spawner
    pub seed: u64,
    pub mode: RoundMode,
    /// Agents in stable index order; dead ones stay in place so fitness
    /// survives to the end of the round
    pub agents: Vec<Agent>,
    /// Pipes in creation order
    pub pipes: Vec<Pipe>,
    pub ground: Ground,
    pub score: u32,
    /// Generation index, population mode only
    pub generation: u32,
    pub phase: RoundPhase,
    pub stop_reason: Option<StopReason>,
    pub tick_count: u64,
    pub rewards: Rewards,
    /// Early-stop fitness target; `None` outside population mode
    pub fitness_target: Option<f32>,
    pub(super) spawner: PipeSpawner,
}

impl RoundState {
    /// A single-agent round with no fitness accounting.
    pub fn human(seed: u64) -> Self {
        Self::with_mode(RoundMode::Human, 1, seed, 0, Rewards::default(), None)
    }

    /// A population round for one generation of training.
    pub fn population(
        agent_count: usize,
        seed: u64,
        generation: u32,
        rewards: Rewards,
        fitness_target: f32,
    ) -> Self {
        Self::with_mode(
            RoundMode::Population,
            agent_count,
            seed,
            generation,
            rewards,
            Some(fitness_target),
        )
    }

    fn with_mode(
        mode: RoundMode,
        agent_count: usize,
        seed: u64,
        generation: u32,
        rewards: Rewards,
        fitness_target: Option<f32>,
    ) -> Self {
        let mut spawner = PipeSpawner::new(seed);
        let first_pipe = spawner.spawn(PIPE_SPAWN_X);
        Self {
            seed,
            mode,
            agents: (0..agent_count).map(|_| Agent::new()).collect(),
            pipes: vec![first_pipe],
            ground: Ground::new(),
            score: 0,
            generation,
            phase: RoundPhase::Running,
            stop_reason: None,
            tick_count: 0,
            rewards,
            fitness_target,
            spawner,
        }
    }

    pub fn live_count(&self) -> usize {
        self.agents.iter().filter(|a| a.alive).count()
    }

    /// The first live agent, which breaks ties for lead-pipe selection and
    /// pass detection.
    pub fn lead_agent(&self) -> Option<&Agent> {
        self.agents.iter().find(|a| a.alive)
    }

    /// Index of the pipe whose geometry feeds decision input: the first pipe
    /// (in creation order) whose trailing edge is still at or ahead of the
    /// lead agent's x.
    ///
    /// When no pipe qualifies (the agents are ahead of everything spawned so
    /// far) this falls back to index 0 even though that pipe is behind them.
    /// The stale geometry lasts at most until the next spawn lands and is
    /// deliberate, not a bug.
    pub fn lead_pipe_index(&self) -> usize {
        let Some(agent) = self.lead_agent() else {
            return 0;
        };
        self.pipes
            .iter()
            .position(|p| p.trailing_edge() >= agent.pos.x)
            .unwrap_or(0)
    }

    /// Per-agent fitness values in stable index order, dead agents included.
    pub fn fitness_values(&self) -> Vec<f32> {
        self.agents.iter().map(|a| a.fitness).collect()
    }

    pub fn best_fitness(&self) -> f32 {
        self.agents.iter().map(|a| a.fitness).fold(0.0, f32::max)
    }

    /// Read-only view of the world for presentation. Nothing flows back.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            agents: self
                .agents
                .iter()
                .map(|a| AgentView {
                    pos: a.pos,
                    alive: a.alive,
                    decision: a.last_decision,
                })
                .collect(),
            pipes: self
                .pipes
                .iter()
                .map(|p| PipeView {
                    x: p.x,
                    gap_top: p.gap_top,
                    gap_bottom: p.gap_bottom,
                })
                .collect(),
            ground: (self.ground.x1, self.ground.x2),
            score: self.score,
            generation: self.generation,
            survivors: self.live_count(),
        }
    }
}

/// One agent as presentation sees it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub pos: Vec2,
    pub alive: bool,
    pub decision: f32,
}

/// One pipe pair as presentation sees it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeView {
    pub x: f32,
    pub gap_top: f32,
    pub gap_bottom: f32,
}

/// Per-tick read-only world snapshot for frontends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub agents: Vec<AgentView>,
    pub pipes: Vec<PipeView>,
    pub ground: (f32, f32),
    pub score: u32,
    pub generation: u32,
    pub survivors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{PIPE_WIDTH, PIPE_RESPAWN_X};

    #[test]
    fn test_new_round_has_one_pipe_ahead() {
        let state = RoundState::human(1);
        assert_eq!(state.pipes.len(), 1);
        assert_eq!(state.pipes[0].x, PIPE_SPAWN_X);
        assert_eq!(state.phase, RoundPhase::Running);
        assert_eq!(state.lead_pipe_index(), 0);
    }

    #[test]
    fn test_lead_pipe_skips_passed_geometry() {
        let mut state = RoundState::human(1);
        let second = state.spawner.spawn(PIPE_RESPAWN_X);
        state.pipes.push(second);
        // Drag the first pipe until its trailing edge is behind the agent
        state.pipes[0].x = BIRD_START_X - PIPE_WIDTH as f32 - 1.0;
        assert_eq!(state.lead_pipe_index(), 1);
        // Trailing edge exactly at the agent's x still counts as ahead
        state.pipes[0].x = BIRD_START_X - PIPE_WIDTH as f32;
        assert_eq!(state.lead_pipe_index(), 0);
    }

    #[test]
    fn test_lead_pipe_falls_back_to_first() {
        let mut state = RoundState::human(1);
        // Every pipe behind the agents: fall back to index 0
        state.pipes[0].x = -200.0;
        assert_eq!(state.lead_pipe_index(), 0);
    }

    #[test]
    fn test_snapshot_reflects_world() {
        let state = RoundState::population(3, 9, 4, Rewards::default(), 400.0);
        let snap = state.snapshot();
        assert_eq!(snap.agents.len(), 3);
        assert_eq!(snap.pipes.len(), 1);
        assert_eq!(snap.survivors, 3);
        assert_eq!(snap.generation, 4);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.pipes[0].gap_bottom - snap.pipes[0].gap_top, 200.0);
    }
}
