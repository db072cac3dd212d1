//! Proximity collision pass
//!
//! Any obstacle within `COLLISION_THRESHOLD` of the car is a hit: it is
//! removed from the planet in the same pass, so it can never be counted twice.
//! A linear scan is fine for obstacle counts in the low thousands.

use super::planet::{Obstacle, PlanetFrame};
use super::spatial::Spatial;
use crate::consts::COLLISION_THRESHOLD;

/// Remove every obstacle touching the vehicle, calling `on_hit` once per removal
///
/// Iterates in reverse so removal doesn't shift unvisited indices.
/// Returns the number of obstacles removed.
pub fn check_collisions<S, F>(
    vehicle: &S,
    frame: &PlanetFrame,
    obstacles: &mut Vec<Obstacle>,
    mut on_hit: F,
) -> usize
where
    S: Spatial,
    F: FnMut(&Obstacle),
{
    let origin = vehicle.world_position();
    let mut removed = 0;

    for i in (0..obstacles.len()).rev() {
        let distance = obstacles[i].world_position(frame).distance(origin);
        if distance < COLLISION_THRESHOLD {
            on_hit(&obstacles[i]);
            obstacles.remove(i);
            removed += 1;
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::planet::ObstacleKind;
    use crate::sim::spatial::Pose;
    use glam::{Quat, Vec3};

    fn obstacle(id: u32, position: Vec3) -> Obstacle {
        Obstacle::new(id, ObstacleKind::Crate, position, Quat::IDENTITY)
    }

    #[test]
    fn test_hit_just_inside_threshold() {
        let vehicle = Pose::at(Vec3::ZERO);
        let frame = PlanetFrame::default();
        let mut obstacles = vec![obstacle(1, Vec3::new(27.9, 0.0, 0.0))];

        let mut hits = 0;
        let removed = check_collisions(&vehicle, &frame, &mut obstacles, |_| hits += 1);
        assert_eq!(removed, 1);
        assert_eq!(hits, 1);
        assert!(obstacles.is_empty());
    }

    #[test]
    fn test_miss_just_outside_threshold() {
        let vehicle = Pose::at(Vec3::ZERO);
        let frame = PlanetFrame::default();
        let mut obstacles = vec![obstacle(1, Vec3::new(28.1, 0.0, 0.0))];

        let mut hits = 0;
        check_collisions(&vehicle, &frame, &mut obstacles, |_| hits += 1);
        assert_eq!(hits, 0);
        assert_eq!(obstacles.len(), 1);
    }

    #[test]
    fn test_multiple_hits_keep_order_of_survivors() {
        let vehicle = Pose::at(Vec3::ZERO);
        let frame = PlanetFrame::default();
        let mut obstacles = vec![
            obstacle(1, Vec3::new(5.0, 0.0, 0.0)),
            obstacle(2, Vec3::new(100.0, 0.0, 0.0)),
            obstacle(3, Vec3::new(0.0, 10.0, 0.0)),
            obstacle(4, Vec3::new(0.0, 200.0, 0.0)),
        ];

        let mut hit_ids = Vec::new();
        let removed = check_collisions(&vehicle, &frame, &mut obstacles, |o| hit_ids.push(o.id));
        assert_eq!(removed, 2);
        assert_eq!(hit_ids, vec![3, 1]);
        let survivors: Vec<u32> = obstacles.iter().map(|o| o.id).collect();
        assert_eq!(survivors, vec![2, 4]);

        // Second pass finds nothing new
        let removed = check_collisions(&vehicle, &frame, &mut obstacles, |_| panic!("double hit"));
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_empty_list_is_noop() {
        let vehicle = Pose::at(Vec3::ZERO);
        let frame = PlanetFrame::default();
        let mut obstacles = Vec::new();
        assert_eq!(check_collisions(&vehicle, &frame, &mut obstacles, |_| {}), 0);
    }
}
