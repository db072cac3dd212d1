//! Headlight Planet - A night drive around a tiny planet
//!
//! Core modules:
//! - `sim`: Per-frame simulation (car kinematics, visibility, collisions, dust)
//! - `engine`: Frame scheduler tying the simulation to a renderer
//! - `renderer`: WebGPU rendering + headless renderer
//! - `fps`: Frame-rate readout for the HUD
//! - `settings`: Persisted preferences and per-round tuning
//! - `error`: Engine and asset error types

pub mod engine;
pub mod error;
pub mod fps;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use engine::{Engine, FrameOutcome};
pub use error::{AssetLoadError, EngineError};
pub use fps::FpsCounter;
pub use settings::{GameConfig, QualityPreset, Settings};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Global "up" for the car's local horizontal plane
    pub const WORLD_UP: Vec3 = Vec3::Z;

    /// Largest frame delta the scheduler will simulate (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.1;
    /// Physics constants are tuned for this frame rate
    pub const TUNED_FPS: f32 = 60.0;
    /// Cap on the frame-rate normalization factor
    pub const MAX_DELTA_FACTOR: f32 = 2.5;

    /// Planet defaults
    pub const PLANET_RADIUS: f32 = 1000.0;
    pub const SURFACE_CLEARANCE: f32 = 6.0;

    /// Car speed limits (reverse tops out at half)
    pub const MAX_SPEED: f32 = 3.0;
    pub const ACCELERATION: f32 = 0.04;
    pub const SPEED_DECAY: f32 = 0.96;

    /// Steering
    pub const STEERING_MAX: f32 = 0.01;
    pub const STEERING_RATE: f32 = 0.0008;
    pub const STEERING_DECAY: f32 = 0.92;

    /// Planet rotations smaller than this are skipped
    pub const MIN_PLANET_ROTATION: f32 = 1e-5;
    /// Cosmetic wheel spin per unit of travel
    pub const WHEEL_SPIN_RATE: f32 = 0.15;

    /// Chase camera framing
    pub const CAMERA_BACK: f32 = 80.0;
    pub const CAMERA_HEIGHT: f32 = 45.0;
    pub const CAMERA_LOOK_AHEAD: f32 = 60.0;
    /// Per-frame camera lerp factor (not scaled by delta)
    pub const CAMERA_LERP: f32 = 0.08;

    /// Headlights
    pub const HEADLIGHT_RANGE: f32 = 1000.0;
    pub const HEADLIGHT_HALF_ANGLE: f32 = std::f32::consts::PI / 3.5;
    pub const HEADLIGHT_FALLOFF: f32 = 0.7;
    /// Below this intensity an obstacle is hidden
    pub const VISIBILITY_CUTOFF: f32 = 0.02;

    /// Obstacles closer than this to the car are hit
    pub const COLLISION_THRESHOLD: f32 = 28.0;

    /// Obstacle counts
    pub const OBSTACLE_COUNT: usize = 1200;
    pub const FALLBACK_OBSTACLE_COUNT: usize = 400;

    /// Dust emitter mount point in car-local space (behind the rear axle)
    pub const DUST_MOUNT_OFFSET: Vec3 = Vec3::new(-22.0, 0.0, -4.0);
    pub const DUST_CAPACITY: usize = 250;

    /// Wind sway frequency (radians per second of elapsed time)
    pub const WIND_FREQUENCY: f32 = 1.3;

    /// Default round length (seconds)
    pub const TIME_LIMIT_SECS: f32 = 60.0;
}

/// Linear interpolation between two vectors
#[inline]
pub fn lerp_vec3(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    from + (to - from) * t
}

/// Frame-rate normalization: 1.0 at the tuned frame rate, capped after stalls
#[inline]
pub fn delta_factor(delta_time: f32) -> f32 {
    (delta_time * consts::TUNED_FPS).min(consts::MAX_DELTA_FACTOR)
}

/// Unit vector pointing along a heading in the car's horizontal plane
#[inline]
pub fn heading_forward(angle: f32) -> Vec3 {
    Vec3::new(angle.cos(), -angle.sin(), 0.0).normalize()
}
