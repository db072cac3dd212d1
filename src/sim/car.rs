//! Car kinematic model and chase camera
//!
//! The car sits at the planet's north pole, offset by the surface clearance,
//! and never moves. Speed and heading are integrated from the controls, then
//! the planet frame is rotated underneath the car to simulate travel.
//!
//! Physics constants are tuned for 60 fps; every step is scaled by a capped
//! delta factor so other frame rates behave the same.

use glam::{Quat, Vec3};

use super::dust::DustSystem;
use super::input::Controls;
use super::planet::PlanetFrame;
use super::spatial::{Headlamp, Spatial};
use crate::consts::*;
use crate::{delta_factor, heading_forward, lerp_vec3};

/// Trailing camera framing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaseCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl ChaseCamera {
    fn desired(car_position: Vec3, forward: Vec3) -> Vec3 {
        car_position + forward * -CAMERA_BACK + WORLD_UP * CAMERA_HEIGHT
    }

    fn behind(car_position: Vec3, forward: Vec3) -> Self {
        Self {
            position: Self::desired(car_position, forward),
            target: car_position + forward * CAMERA_LOOK_AHEAD,
            up: WORLD_UP,
        }
    }

    /// Ease toward the framing behind the car
    ///
    /// The lerp factor is per frame, not per second, so low frame rates lag
    /// more. Kept as-is to preserve the tuned feel.
    pub fn follow(&mut self, car_position: Vec3, forward: Vec3) {
        let desired = Self::desired(car_position, forward);
        self.position = lerp_vec3(self.position, desired, CAMERA_LERP);
        self.target = car_position + forward * CAMERA_LOOK_AHEAD;
    }
}

/// A visual child of the car, positioned in car-local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarPart {
    pub kind: CarPartKind,
    pub offset: Vec3,
    /// Billboard half-extent
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarPartKind {
    Body,
    Wheel,
    Headlight,
}

fn default_parts() -> Vec<CarPart> {
    let part = |kind, x, y, z, size| CarPart {
        kind,
        offset: Vec3::new(x, y, z),
        size,
    };
    vec![
        part(CarPartKind::Body, 0.0, 0.0, 2.0, 14.0),
        part(CarPartKind::Wheel, 12.0, 9.0, -3.0, 4.0),
        part(CarPartKind::Wheel, 12.0, -9.0, -3.0, 4.0),
        part(CarPartKind::Wheel, -12.0, 9.0, -3.0, 4.0),
        part(CarPartKind::Wheel, -12.0, -9.0, -3.0, 4.0),
        part(CarPartKind::Headlight, 18.0, 6.0, 1.0, 2.0),
        part(CarPartKind::Headlight, 18.0, -6.0, 1.0, 2.0),
    ]
}

/// The player's car
pub struct Car {
    /// World position (fixed at the pole)
    pub position: Vec3,
    /// Heading in the horizontal plane (radians)
    pub angle: f32,
    /// Bounded to ±STEERING_MAX
    pub steering: f32,
    /// Bounded to [-MAX_SPEED/2, MAX_SPEED]
    pub speed: f32,
    pub lights_on: bool,
    /// Cosmetic wheel rotation, not used by physics
    pub wheel_spin: f32,
    /// Unit heading, recomputed every update
    pub forward: Vec3,
    pub parts: Vec<CarPart>,
    pub camera: ChaseCamera,
    dust: Option<DustSystem>,
    planet_radius: f32,
}

impl Car {
    pub fn new(planet_radius: f32, surface_clearance: f32) -> Self {
        let position = Vec3::new(0.0, 0.0, planet_radius + surface_clearance);
        let forward = heading_forward(0.0);
        Self {
            position,
            angle: 0.0,
            steering: 0.0,
            speed: 0.0,
            lights_on: true,
            wheel_spin: 0.0,
            forward,
            parts: default_parts(),
            camera: ChaseCamera::behind(position, forward),
            dust: None,
            planet_radius,
        }
    }

    /// Back to rest at the pole; the attached dust pool is cleared, not dropped
    pub fn reset(&mut self) {
        self.angle = 0.0;
        self.steering = 0.0;
        self.speed = 0.0;
        self.lights_on = true;
        self.wheel_spin = 0.0;
        self.forward = heading_forward(0.0);
        self.camera = ChaseCamera::behind(self.position, self.forward);
        if let Some(dust) = self.dust.as_mut() {
            dust.reset();
        }
    }

    pub fn attach_dust(&mut self, dust: DustSystem) {
        self.dust = Some(dust);
    }

    pub fn dust(&self) -> Option<&DustSystem> {
        self.dust.as_ref()
    }

    pub fn dust_mut(&mut self) -> Option<&mut DustSystem> {
        self.dust.as_mut()
    }

    /// Yaw about world up (the car's `rotation.z`)
    pub fn yaw(&self) -> f32 {
        -self.angle
    }

    /// Car-local point to world space
    pub fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.world_orientation() * local
    }

    /// Advance one frame: controls, heading, planet rotation, dust, camera
    pub fn update(&mut self, delta_time: f32, controls: Controls, planet: &mut PlanetFrame) {
        let df = delta_factor(delta_time);

        if controls.turn_right {
            self.steering = (self.steering + STEERING_RATE * df).min(STEERING_MAX);
        } else if controls.turn_left {
            self.steering = (self.steering - STEERING_RATE * df).max(-STEERING_MAX);
        } else {
            self.steering *= STEERING_DECAY.powf(df);
        }

        if controls.accelerate {
            self.speed = (self.speed + ACCELERATION * df).min(MAX_SPEED);
        } else if controls.brake {
            self.speed = (self.speed - ACCELERATION * df).max(-MAX_SPEED / 2.0);
        } else {
            self.speed *= SPEED_DECAY.powf(df);
        }

        // Sharper turns bleed speed
        self.speed *= 1.0 - (self.steering / 2.0).abs();

        self.angle += self.steering * self.speed * df;
        self.forward = heading_forward(self.angle);
        self.wheel_spin += self.speed * df * WHEEL_SPIN_RATE;

        let rotation_amount = (self.speed / self.planet_radius) * df;
        if rotation_amount.abs() > MIN_PLANET_ROTATION {
            let axis = self.forward.cross(WORLD_UP).normalize();
            planet.rotate_on_world_axis(axis, rotation_amount);
        }

        if self.dust.is_some() {
            let mount = self.local_to_world(DUST_MOUNT_OFFSET);
            let backward = -self.forward;
            let speed = self.speed;
            if let Some(dust) = self.dust.as_mut() {
                dust.update(delta_time, mount, backward, WORLD_UP, speed);
            }
        }

        self.camera.follow(self.position, self.forward);
    }
}

impl Spatial for Car {
    fn world_position(&self) -> Vec3 {
        self.position
    }

    fn world_orientation(&self) -> Quat {
        Quat::from_rotation_z(self.yaw())
    }
}

impl Headlamp for Car {
    fn forward(&self) -> Vec3 {
        self.forward
    }

    fn lights_on(&self) -> bool {
        self.lights_on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn car() -> (Car, PlanetFrame) {
        (
            Car::new(PLANET_RADIUS, SURFACE_CLEARANCE),
            PlanetFrame::new(PLANET_RADIUS),
        )
    }

    #[test]
    fn test_starts_at_pole() {
        let (car, _) = car();
        assert_eq!(
            car.world_position(),
            Vec3::new(0.0, 0.0, PLANET_RADIUS + SURFACE_CLEARANCE)
        );
        assert_eq!(car.speed, 0.0);
    }

    #[test]
    fn test_zero_speed_stays_zero() {
        let (mut car, mut planet) = car();
        car.update(DT, Controls::default(), &mut planet);
        assert_eq!(car.speed, 0.0);
        assert_eq!(planet.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_steering_bounded() {
        let (mut car, mut planet) = car();
        let right = Controls {
            turn_right: true,
            ..Default::default()
        };
        for _ in 0..200 {
            car.update(0.1, right, &mut planet);
        }
        assert_eq!(car.steering, STEERING_MAX);

        let left = Controls {
            turn_left: true,
            ..Default::default()
        };
        for _ in 0..200 {
            car.update(0.1, left, &mut planet);
        }
        assert_eq!(car.steering, -STEERING_MAX);
    }

    #[test]
    fn test_right_wins_over_left() {
        let (mut car, mut planet) = car();
        let both = Controls {
            turn_left: true,
            turn_right: true,
            ..Default::default()
        };
        car.update(DT, both, &mut planet);
        assert!(car.steering > 0.0);
    }

    #[test]
    fn test_reverse_limited_to_half_speed() {
        let (mut car, mut planet) = car();
        let brake = Controls {
            brake: true,
            ..Default::default()
        };
        for _ in 0..500 {
            car.update(DT, brake, &mut planet);
        }
        assert_eq!(car.speed, -MAX_SPEED / 2.0);
    }

    #[test]
    fn test_driving_rotates_planet_backward() {
        let (mut car, mut planet) = car();
        for _ in 0..60 {
            car.update(DT, Controls::accelerate(), &mut planet);
        }
        // A point just ahead on the surface slides toward -X (behind the car)
        let ahead = Vec3::new(50.0, 0.0, PLANET_RADIUS);
        let moved = planet.to_world(ahead);
        assert!(moved.x < ahead.x);
        assert!(moved.y.abs() < 1e-3);
    }

    #[test]
    fn test_yaw_matches_heading() {
        let (mut car, mut planet) = car();
        let controls = Controls {
            accelerate: true,
            turn_right: true,
            ..Default::default()
        };
        for _ in 0..120 {
            car.update(DT, controls, &mut planet);
        }
        assert!(car.angle > 0.0);
        let local_forward = car.world_orientation() * Vec3::X;
        assert!((local_forward - car.forward).length() < 1e-5);
    }

    #[test]
    fn test_camera_lags_then_settles() {
        let (mut car, mut planet) = car();
        car.angle = std::f32::consts::FRAC_PI_2;
        car.update(DT, Controls::default(), &mut planet);

        let desired = car.position + car.forward * -CAMERA_BACK + WORLD_UP * CAMERA_HEIGHT;
        assert!((car.camera.position - desired).length() > 1.0);
        for _ in 0..400 {
            car.update(DT, Controls::default(), &mut planet);
        }
        assert!((car.camera.position - desired).length() < 1e-2);
        assert!((car.camera.target - (car.position + car.forward * CAMERA_LOOK_AHEAD)).length() < 1e-4);
    }

    #[test]
    fn test_attached_dust_receives_updates() {
        let (mut car, mut planet) = car();
        car.attach_dust(DustSystem::new(64, 3));
        for _ in 0..30 {
            car.update(DT, Controls::accelerate(), &mut planet);
        }
        let dust = car.dust().expect("dust attached");
        assert!(dust.active_count() > 0);
        // Particles start behind the car
        let first = dust.positions()[0];
        assert!(first.x < car.position.x);
    }
}
