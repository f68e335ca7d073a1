//! Fixed-step tick engine
//!
//! One call advances every agent and every pipe exactly once. The whole tick
//! is atomic with respect to observation: callers only ever see the world
//! between ticks, never half-updated.

use crate::consts::{BIRD_HEIGHT, GROUND_Y, IMPULSE_THRESHOLD, PIPE_RESPAWN_X};

use super::collision::collides;
use super::decision::{DecisionPolicy, Observation};
use super::state::{RoundMode, RoundPhase, RoundState, StopReason};

/// What happened during one tick, for frontends and trainers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// A pipe was passed and the score advanced
    pub scored: bool,
    /// Agents retired this tick (collision, out of bounds, or provider failure)
    pub retired: usize,
}

/// Advance the round by one tick.
///
/// `providers` supplies one decision source per agent, in agent index order;
/// dead agents' providers are not polled. Does nothing once the round has
/// ended.
pub fn tick(state: &mut RoundState, providers: &mut [&mut dyn DecisionPolicy]) -> TickReport {
    debug_assert_eq!(providers.len(), state.agents.len());
    let mut report = TickReport::default();
    if state.phase == RoundPhase::Ended {
        return report;
    }
    state.tick_count += 1;
    let population = state.mode == RoundMode::Population;

    // Lead pipe geometry feeds every agent's observation this tick.
    // The pipe list is never empty: a round starts with one pipe and every
    // pass pushes a replacement before pruning.
    let lead = state.lead_pipe_index();
    let (gap_top, gap_bottom) = {
        let p = &state.pipes[lead];
        (p.gap_top, p.gap_bottom)
    };

    // Decide, apply the impulse, advance kinematics, accrue survival reward.
    // Stable index order: fitness and score semantics depend on it.
    for (agent, provider) in state.agents.iter_mut().zip(providers.iter_mut()) {
        if !agent.alive {
            continue;
        }
        let obs = Observation {
            y: agent.pos.y,
            gap_top_dist: (agent.pos.y - gap_top).abs(),
            gap_bottom_dist: (agent.pos.y - gap_bottom).abs(),
        };
        let decision = provider.decide(obs);
        agent.last_decision = decision;
        if !decision.is_finite() {
            // The provider failed; retire its agent and keep the round going
            log::warn!("decision provider returned {decision}; retiring agent");
            agent.alive = false;
            report.retired += 1;
            continue;
        }
        if decision > IMPULSE_THRESHOLD {
            agent.flight.impulse();
        }
        agent.pos.y += agent.flight.advance();
        if population {
            agent.fitness += state.rewards.per_tick;
        }
    }

    // Mark newly passed pipes and scroll everything, in creation order.
    let lead_x = state.lead_agent().map(|a| a.pos.x);
    let mut passed_this_tick = false;
    for pipe in &mut state.pipes {
        if let Some(x) = lead_x {
            if !pipe.passed && pipe.x < x {
                pipe.passed = true;
                passed_this_tick = true;
            }
        }
        pipe.advance();
    }

    // Collision pass
    let pipes = &state.pipes;
    for agent in &mut state.agents {
        if agent.alive && pipes.iter().any(|p| collides(agent, p)) {
            agent.alive = false;
            if population {
                agent.fitness -= state.rewards.collision_penalty;
            }
            report.retired += 1;
        }
    }

    // A raised passed flag scores once, rewards the survivors, spawns the
    // replacement pipe, and prunes anything fully off the left edge.
    if passed_this_tick {
        state.score += 1;
        report.scored = true;
        if population {
            for agent in state.agents.iter_mut().filter(|a| a.alive) {
                agent.fitness += state.rewards.pass_bonus;
            }
        }
        let pipe = state.spawner.spawn(PIPE_RESPAWN_X);
        state.pipes.push(pipe);
        state.pipes.retain(|p| !p.offscreen());
    }

    // Out-of-bounds pass: ground line or above the field. No penalty beyond
    // retirement.
    for agent in &mut state.agents {
        if agent.alive && (agent.pos.y + BIRD_HEIGHT as f32 >= GROUND_Y || agent.pos.y < 0.0) {
            agent.alive = false;
            report.retired += 1;
        }
    }

    state.ground.advance();

    // Termination: empty pool always ends the round; in population mode a
    // fitness hitting the target ends it early as a success.
    if state.live_count() == 0 {
        state.phase = RoundPhase::Ended;
        state.stop_reason = Some(StopReason::AllDead);
    } else if population {
        if let Some(target) = state.fitness_target {
            if state.agents.iter().any(|a| a.fitness >= target) {
                state.phase = RoundPhase::Ended;
                state.stop_reason = Some(StopReason::TargetReached);
            }
        }
    }

    report
}
