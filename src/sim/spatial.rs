//! World-transform capabilities the passes depend on
//!
//! Visibility and collision only need to ask "where is this in the world and
//! which way is it facing". The car implements these directly; tests can use
//! any stand-in.

use glam::{Quat, Vec3};

/// Something with a resolvable world transform
pub trait Spatial {
    fn world_position(&self) -> Vec3;
    fn world_orientation(&self) -> Quat;
}

/// A light source mounted on a spatial object
pub trait Headlamp: Spatial {
    /// Unit direction the lamp points in world space
    fn forward(&self) -> Vec3;
    fn lights_on(&self) -> bool;
}

/// A fixed transform, handy for probes and tests
#[derive(Debug, Clone, Copy)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
    pub forward: Vec3,
    pub lights_on: bool,
}

impl Pose {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            forward: Vec3::X,
            lights_on: true,
        }
    }
}

impl Spatial for Pose {
    fn world_position(&self) -> Vec3 {
        self.position
    }

    fn world_orientation(&self) -> Quat {
        self.orientation
    }
}

impl Headlamp for Pose {
    fn forward(&self) -> Vec3 {
        self.forward
    }

    fn lights_on(&self) -> bool {
        self.lights_on
    }
}
