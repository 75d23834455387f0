//! Rocket Drift - gameplay core of a top-down rocket vs. asteroids arcade game
//!
//! Core modules:
//! - `sim`: Simulation (obstacles, player, arena, deferred actions)
//! - `settings`: Data-driven tuning
//! - `highscore`: Best-score persistence port
//! - `audio`: Sound cue port driven by game events
//! - `ui`: HUD labels and controls

pub mod audio;
pub mod highscore;
pub mod settings;
pub mod sim;
pub mod ui;

pub use highscore::{MemoryStore, ScoreStore};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena half extents (world units)
    pub const ARENA_HALF_WIDTH: f32 = 9.0;
    pub const ARENA_HALF_HEIGHT: f32 = 5.0;
    /// Obstacles never spawn closer than this to the player
    pub const SPAWN_SAFE_RADIUS: f32 = 2.5;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 0.35;
    pub const PLAYER_THRUST: f32 = 12.0;
    pub const PLAYER_MAX_SPEED: f32 = 5.0;
    pub const STICK_DEADZONE: f32 = 0.2;
    /// Score points per second survived
    pub const SCORE_PER_SECOND: f32 = 10.0;
    /// Seconds the wreck lingers before removal
    pub const PLAYER_REMOVAL_DELAY: f32 = 1.0;

    /// Obstacle defaults
    pub const OBSTACLE_MIN_SPEED: f32 = 1.0;
    pub const OBSTACLE_MAX_SPEED: f32 = 3.0;
    pub const OBSTACLE_MAX_SPIN: f32 = 1.5;
    /// Velocity multiplier on wall hit
    pub const BOOST_MULTIPLIER: f32 = 2.0;
    /// Seconds of real time a boost lasts
    pub const BOOST_DURATION: f32 = 1.0;

    /// Effect lifetimes (seconds)
    pub const BOUNCE_EFFECT_LIFETIME: f32 = 1.0;
    pub const EXPLOSION_EFFECT_LIFETIME: f32 = 1.5;

    /// Key of the persisted best score
    pub const HIGH_SCORE_KEY: &str = "HighScore";
}

/// Unit vector for an angle measured counter-clockwise from +X
#[inline]
pub fn unit_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Rotation (radians) that makes the local +Y axis face `dir`
#[inline]
pub fn facing_rotation(dir: Vec2) -> f32 {
    // local up is +Y, so measure from +Y instead of +X
    -dir.x.atan2(dir.y)
}

/// Rescale `vel` to `max` when it is faster, keeping its direction
#[inline]
pub fn clamp_speed(vel: Vec2, max: f32) -> Vec2 {
    if vel.length_squared() > max * max {
        vel.normalize_or_zero() * max
    } else {
        vel
    }
}
