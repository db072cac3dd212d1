//! The rotating planet frame and the obstacles that ride on it
//!
//! The car never leaves the north pole. Travel is simulated by rotating the
//! whole planet group underneath it, so every obstacle stores a position in
//! planet-local space and resolves its world position through the frame.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Orientation of the planet group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanetFrame {
    pub rotation: Quat,
    pub radius: f32,
}

impl Default for PlanetFrame {
    fn default() -> Self {
        Self::new(PLANET_RADIUS)
    }
}

impl PlanetFrame {
    pub fn new(radius: f32) -> Self {
        Self {
            rotation: Quat::IDENTITY,
            radius,
        }
    }

    /// Planet-local point to world space
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }

    /// Rotate the whole group about a world-space axis (pre-multiplied)
    pub fn rotate_on_world_axis(&mut self, axis: Vec3, angle: f32) {
        self.rotation = (Quat::from_axis_angle(axis, angle) * self.rotation).normalize();
    }

    pub fn reset(&mut self) {
        self.rotation = Quat::IDENTITY;
    }
}

/// What an obstacle was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Clone of the loaded model
    Tree,
    /// Placeholder cuboid used when the model failed to load
    Crate,
}

/// A mesh material with an opacity channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: [f32; 3],
    #[serde(default = "full_opacity")]
    pub opacity: f32,
    /// Opacity only takes effect on transparent materials
    #[serde(default)]
    pub transparent: bool,
}

fn full_opacity() -> f32 {
    1.0
}

impl Material {
    pub fn opaque(color: [f32; 3]) -> Self {
        Self {
            color,
            opacity: 1.0,
            transparent: false,
        }
    }
}

/// A collidable, illuminable prop on the planet surface
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Planet-local position (on the sphere surface)
    pub position: Vec3,
    /// Planet-local orientation (up along the surface normal)
    pub orientation: Quat,
    /// Billboard half-extent for rendering
    pub scale: f32,
    pub materials: Vec<Material>,
    /// Last headlight intensity written by the visibility pass
    pub opacity: f32,
    pub visible: bool,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, position: Vec3, orientation: Quat) -> Self {
        Self {
            id,
            kind,
            position,
            orientation,
            scale: 1.0,
            materials: Vec::new(),
            opacity: 0.0,
            visible: false,
        }
    }

    pub fn world_position(&self, frame: &PlanetFrame) -> Vec3 {
        frame.to_world(self.position)
    }

    pub fn world_orientation(&self, frame: &PlanetFrame) -> Quat {
        frame.rotation * self.orientation
    }

    /// Apply a headlight intensity to every material and the visible flag
    pub fn apply_intensity(&mut self, intensity: f32) {
        let intensity = intensity.clamp(0.0, 1.0);
        for material in &mut self.materials {
            material.transparent = true;
            material.opacity = intensity;
        }
        self.opacity = intensity;
        self.visible = intensity > VISIBILITY_CUTOFF;
    }

    /// Colour of the first material (used for the billboard tint)
    pub fn base_color(&self) -> [f32; 3] {
        self.materials
            .first()
            .map(|m| m.color)
            .unwrap_or([0.5, 0.5, 0.5])
    }
}
