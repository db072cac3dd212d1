//! Headlight illumination pass
//!
//! Everything is dark except what falls inside the headlight cone. Each
//! obstacle's opacity is set from its distance and angle to the car's
//! forward axis; nearly-dark obstacles are hidden so the renderer skips them.

use glam::Vec3;

use super::planet::{Obstacle, PlanetFrame};
use super::spatial::Headlamp;
use crate::consts::*;

/// Illumination in [0, 1] for a point at `offset` from the lamp
///
/// The 0.7 exponent gives a soft, non-linear falloff toward the cone edge and
/// the far end of the range.
pub fn headlight_intensity(offset: Vec3, forward: Vec3, lights_on: bool) -> f32 {
    let distance = offset.length();
    if !lights_on || distance == 0.0 || distance > HEADLIGHT_RANGE {
        return 0.0;
    }

    let cos_half_angle = HEADLIGHT_HALF_ANGLE.cos();
    let direction_dot = (offset / distance).dot(forward);
    if direction_dot <= cos_half_angle {
        return 0.0;
    }

    let distance_factor = 1.3 - distance / HEADLIGHT_RANGE;
    let angle_factor = (direction_dot - cos_half_angle) / (1.0 - cos_half_angle);
    let intensity = (distance_factor * angle_factor).max(0.0).powf(HEADLIGHT_FALLOFF);
    intensity.clamp(0.0, 1.0)
}

/// Write opacity and visibility for every obstacle
pub fn update_visibility<L: Headlamp>(lamp: &L, frame: &PlanetFrame, obstacles: &mut [Obstacle]) {
    let origin = lamp.world_position();
    let forward = lamp.forward();
    let lights_on = lamp.lights_on();

    for obstacle in obstacles.iter_mut() {
        let offset = obstacle.world_position(frame) - origin;
        obstacle.apply_intensity(headlight_intensity(offset, forward, lights_on));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::planet::{Material, ObstacleKind};
    use crate::sim::spatial::Pose;
    use glam::Quat;

    fn obstacle_at(position: Vec3) -> Obstacle {
        let mut obstacle = Obstacle::new(1, ObstacleKind::Tree, position, Quat::IDENTITY);
        obstacle.materials = vec![Material::opaque([0.2, 0.5, 0.2])];
        obstacle
    }

    #[test]
    fn test_obstacle_ahead_is_lit() {
        let lamp = Pose::at(Vec3::new(0.0, 0.0, 1006.0));
        let frame = PlanetFrame::default();
        let mut obstacles = vec![obstacle_at(lamp.position + Vec3::X * 500.0)];

        update_visibility(&lamp, &frame, &mut obstacles);
        assert!(obstacles[0].opacity > 0.0);
        assert!(obstacles[0].visible);
        assert!(obstacles[0].materials[0].transparent);
        // (1.3 - 0.5)^0.7
        assert!((obstacles[0].opacity - 0.8f32.powf(0.7)).abs() < 1e-5);
    }

    #[test]
    fn test_lights_off_hides_everything() {
        let mut lamp = Pose::at(Vec3::ZERO);
        lamp.lights_on = false;
        let frame = PlanetFrame::default();
        let mut obstacles = vec![obstacle_at(Vec3::X * 500.0)];

        update_visibility(&lamp, &frame, &mut obstacles);
        assert_eq!(obstacles[0].opacity, 0.0);
        assert!(!obstacles[0].visible);
    }

    #[test]
    fn test_outside_cone_is_dark() {
        // Directly to the side: cos = 0, well outside a ~51 degree half-angle
        assert_eq!(headlight_intensity(Vec3::Y * 100.0, Vec3::X, true), 0.0);
        // Behind
        assert_eq!(headlight_intensity(Vec3::NEG_X * 100.0, Vec3::X, true), 0.0);
    }

    #[test]
    fn test_range_edges() {
        assert_eq!(headlight_intensity(Vec3::ZERO, Vec3::X, true), 0.0);
        assert!(headlight_intensity(Vec3::X * HEADLIGHT_RANGE, Vec3::X, true) > 0.0);
        assert_eq!(headlight_intensity(Vec3::X * (HEADLIGHT_RANGE + 0.5), Vec3::X, true), 0.0);
    }

    #[test]
    fn test_close_and_centred_saturates() {
        assert_eq!(headlight_intensity(Vec3::X * 10.0, Vec3::X, true), 1.0);
    }

    #[test]
    fn test_planet_rotation_is_respected() {
        let lamp = Pose::at(Vec3::ZERO);
        let mut frame = PlanetFrame::default();
        frame.rotation = Quat::from_rotation_z(std::f32::consts::PI);
        // Local +X ends up behind the lamp
        let mut obstacles = vec![obstacle_at(Vec3::X * 200.0)];

        update_visibility(&lamp, &frame, &mut obstacles);
        assert!(!obstacles[0].visible);
    }
}
