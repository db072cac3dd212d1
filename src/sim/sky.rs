//! Star backdrop that follows the camera

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::scatter::random_surface_point;

pub const SKY_RADIUS: f32 = 4000.0;

#[derive(Debug, Clone)]
pub struct SkyDome {
    /// Tracks the camera so the stars never parallax
    pub center: Vec3,
    pub radius: f32,
    /// Unit directions, generated once
    pub stars: Vec<Vec3>,
}

impl SkyDome {
    pub fn new(star_count: usize, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = (0..star_count)
            .map(|_| random_surface_point(&mut rng, 1.0))
            .collect();
        Self {
            center: Vec3::ZERO,
            radius: SKY_RADIUS,
            stars,
        }
    }

    pub fn track(&mut self, camera_position: Vec3) {
        self.center = camera_position;
    }

    pub fn star_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.stars.iter().map(|dir| self.center + *dir * self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars_move_with_camera() {
        let mut sky = SkyDome::new(10, 1);
        let before: Vec<Vec3> = sky.star_positions().collect();
        sky.track(Vec3::new(5.0, 0.0, 0.0));
        let after: Vec<Vec3> = sky.star_positions().collect();
        for (a, b) in before.iter().zip(&after) {
            assert!(((*b - *a) - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-2);
        }
    }
}
