//! Flappy Evo - a side-scrolling reflex game with neuro-evolution
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, pipes, collisions, tick engine)
//! - `policy`: Decision providers (human input, evolved networks)
//! - `evo`: Generation loop driving the evolutionary trainer
//! - `persistence`: Champion policy artifact save/load
//! - `settings`: Validated runtime configuration

pub mod evo;
pub mod highscores;
pub mod persistence;
pub mod policy;
pub mod settings;
pub mod sim;

pub use highscores::HighScore;
pub use settings::Config;

/// Game configuration constants (logical units)
pub mod consts {
    /// Play field dimensions
    pub const FIELD_WIDTH: f32 = 500.0;
    pub const FIELD_HEIGHT: f32 = 800.0;
    /// Ground line; an agent whose bottom edge reaches it is out of bounds
    pub const GROUND_Y: f32 = 730.0;

    /// Agent spawn point, fixed for the whole pool
    pub const BIRD_START_X: f32 = 230.0;
    pub const BIRD_START_Y: f32 = 350.0;
    /// Bird sprite collision extents
    pub const BIRD_WIDTH: u32 = 68;
    pub const BIRD_HEIGHT: u32 = 48;

    /// Upward velocity set by an impulse
    pub const IMPULSE_VEL: f32 = -10.5;
    /// Terminal fall displacement per tick
    pub const TERMINAL_FALL: f32 = 16.0;
    /// Extra lift applied while the displacement is still negative
    pub const LIFT_BIAS: f32 = 2.0;

    /// Pipe geometry
    pub const PIPE_WIDTH: u32 = 104;
    pub const PIPE_SEGMENT_HEIGHT: f32 = 640.0;
    /// Vertical gap between the top and bottom segments
    pub const PIPE_GAP: f32 = 200.0;
    /// Leftward pipe scroll per tick
    pub const PIPE_VEL: f32 = 5.0;
    /// The round's first pipe spawns here
    pub const PIPE_SPAWN_X: f32 = 700.0;
    /// Replacement pipes spawn here once the previous one is passed
    pub const PIPE_RESPAWN_X: f32 = 600.0;
    /// Gap-top draw range (upper bound exclusive)
    pub const GAP_MIN: i32 = 50;
    pub const GAP_MAX: i32 = 450;

    /// Ground strip scroll and segment width
    pub const GROUND_VEL: f32 = 5.0;
    pub const GROUND_SEGMENT_WIDTH: f32 = 672.0;

    /// Policy output above this requests an impulse
    pub const IMPULSE_THRESHOLD: f32 = 0.5;

    /// Fitness shaping defaults
    pub const FITNESS_PER_TICK: f32 = 0.1;
    pub const FITNESS_PASS_BONUS: f32 = 5.0;
    pub const FITNESS_COLLISION_PENALTY: f32 = 1.0;
    /// A round stops early once any agent's fitness reaches this
    pub const DEFAULT_FITNESS_TARGET: f32 = 400.0;
    pub const DEFAULT_GENERATION_CAP: u32 = 50;
    pub const DEFAULT_POPULATION: usize = 50;
}
