//! Cube Runner - An endless-runner cube dodging game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, spawning, collisions, game state)
//! - `renderer`: WebGPU rendering pipeline
//! - `hud`: Score and message text for the DOM overlay
//! - `tuning`: Data-driven game balance

pub mod hud;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz frame)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks per animation frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Speed defaults (world units per tick)
    pub const INITIAL_SPEED: f32 = 0.15;
    pub const SPEED_CAP: f32 = 0.5;
    pub const SPEED_RAMP: f32 = 0.00001;
    pub const BRAKE: f32 = 0.002;

    /// Camera roll when steering (radians)
    pub const ROLL_STEP: f32 = 0.015;
    pub const ROLL_CAP: f32 = 0.3;

    /// Sideways movement per tick: BASE_STRAFE + speed * STRAFE_FACTOR
    pub const BASE_STRAFE: f32 = 0.1;
    pub const STRAFE_FACTOR: f32 = 0.35;

    /// Spawn band width: (BASE - speed * FACTOR), centred on the avatar
    pub const SPAWN_BASE_WIDTH: f32 = 60.0;
    pub const SPAWN_WIDTH_FACTOR: f32 = 40.0;
    /// Spawn band starts this far ahead of the camera...
    pub const SPAWN_DISTANCE: f32 = 80.0;
    /// ...and extends this far back toward it
    pub const SPAWN_DEPTH: f32 = 10.0;
    /// Minimum spacing between spawned obstacles (both axes)
    pub const EXCLUSION_RADIUS: f32 = 1.0;
    pub const SPAWN_RETRY_LIMIT: u32 = 16;
    /// Obstacle lifetime in ticks is BASE_TTL / speed
    pub const BASE_TTL: f32 = 120.0;
    pub const MAX_LIVE_OBSTACLES: usize = 512;

    /// Cube edge length
    pub const OBSTACLE_SIZE: f32 = 1.5;

    /// Collisions are ignored until the score passes this
    pub const GRACE_SCORE: u64 = 200;

    /// Initial camera position
    pub const START_Z: f32 = 30.0;
    pub const CAMERA_HEIGHT: f32 = 1.0;

    /// Avatar body sits ahead of and below the camera
    pub const AVATAR_OFFSET_Z: f32 = 5.0;
    pub const AVATAR_Y: f32 = -1.0;
    pub const AVATAR_HALF_WIDTH: f32 = 0.75;

    /// Floor plane
    pub const FLOOR_Y: f32 = -0.75;
    pub const FLOOR_SIZE: f32 = 1000.0;
}
