//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (the gap draw is the single randomness source)
//! - Stable iteration order (by agent index)
//! - No rendering or platform dependencies

pub mod collision;
pub mod decision;
pub mod ground;
pub mod kinematics;
pub mod mask;
pub mod obstacle;
pub mod state;
pub mod tick;

pub use collision::collides;
pub use decision::{DecisionPolicy, Observation};
pub use ground::Ground;
pub use kinematics::Flight;
pub use mask::{SpriteMask, bird_mask};
pub use obstacle::{Pipe, PipeSpawner};
pub use state::{
    Agent, AgentView, FrameSnapshot, PipeView, Rewards, RoundMode, RoundPhase, RoundState,
    StopReason,
};
pub use tick::{TickReport, tick};
