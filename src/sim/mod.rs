//! Per-frame simulation module
//!
//! Everything that runs once per frame lives here and is pure:
//! - Variable timestep, normalized to the 60 fps tuning
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod car;
pub mod collision;
pub mod dust;
pub mod input;
pub mod planet;
pub mod scatter;
pub mod session;
pub mod sky;
pub mod spatial;
pub mod visibility;

pub use car::{Car, CarPart, CarPartKind, ChaseCamera};
pub use collision::check_collisions;
pub use dust::{DustSeed, DustSystem};
pub use input::{Controls, KeyBindings, KeyState};
pub use planet::{Material, Obstacle, ObstacleKind, PlanetFrame};
pub use scatter::{
    ObstacleSource, ObstacleTemplate, fallback_obstacles, resolve_obstacle_load, scatter_obstacles,
};
pub use session::RoundClock;
pub use sky::SkyDome;
pub use spatial::{Headlamp, Pose, Spatial};
pub use visibility::{headlight_intensity, update_visibility};
