//! Dust trail emitter
//!
//! Fixed-capacity struct-of-arrays particle pool. New particles are written at
//! a cursor that advances circularly whether or not the slot is still alive,
//! so under sustained emission the oldest live particle is overwritten. No
//! allocation happens after construction.
//!
//! A slot with `lifetime == 0` is free.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::WORLD_UP;

/// Below this |speed| the car stops kicking up dust
pub const DUST_MIN_SPEED: f32 = 0.2;
/// Emission rate per unit speed, clamped to [min, max] particles/s
pub const EMISSION_PER_SPEED: f32 = 40.0;
pub const EMISSION_MIN_RATE: f32 = 12.0;
pub const EMISSION_MAX_RATE: f32 = 70.0;
/// Accumulator decay when idle
pub const IDLE_DECAY: f32 = 0.6;

/// Slack for age sums like 60 x (1/60) that land a hair under the lifetime
const LIFETIME_EPSILON: f32 = 1e-5;

const HORIZONTAL_DAMPING: f32 = 0.9;
const VERTICAL_DAMPING: f32 = 0.88;
const UPWARD_DRIFT: f32 = 14.0;
const VERTICAL_BIAS: f32 = 6.0;

/// Initial state of one particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DustSeed {
    pub position: Vec3,
    pub velocity: Vec3,
    pub lifetime: f32,
    pub start_size: f32,
    pub end_size: f32,
    pub start_alpha: f32,
}

pub struct DustSystem {
    positions: Box<[Vec3]>,
    velocities: Box<[Vec3]>,
    ages: Box<[f32]>,
    lifetimes: Box<[f32]>,
    start_sizes: Box<[f32]>,
    end_sizes: Box<[f32]>,
    start_alphas: Box<[f32]>,
    /// Current render size/alpha, recomputed each update
    sizes: Box<[f32]>,
    alphas: Box<[f32]>,
    cursor: usize,
    accumulator: f32,
    rng: Pcg32,
    disposed: bool,
}

impl DustSystem {
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self {
            positions: vec![Vec3::ZERO; capacity].into_boxed_slice(),
            velocities: vec![Vec3::ZERO; capacity].into_boxed_slice(),
            ages: vec![0.0; capacity].into_boxed_slice(),
            lifetimes: vec![0.0; capacity].into_boxed_slice(),
            start_sizes: vec![0.0; capacity].into_boxed_slice(),
            end_sizes: vec![0.0; capacity].into_boxed_slice(),
            start_alphas: vec![0.0; capacity].into_boxed_slice(),
            sizes: vec![0.0; capacity].into_boxed_slice(),
            alphas: vec![0.0; capacity].into_boxed_slice(),
            cursor: 0,
            accumulator: 0.0,
            rng: Pcg32::seed_from_u64(seed),
            disposed: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.lifetimes.len()
    }

    /// Advance live particles and emit new ones behind the car
    ///
    /// `backward` and `up` are unit vectors. A non-positive `dt` is a no-op.
    pub fn update(&mut self, dt: f32, emitter: Vec3, backward: Vec3, up: Vec3, speed: f32) {
        if dt <= 0.0 || self.capacity() == 0 {
            return;
        }

        self.integrate(dt, up);

        let speed_abs = speed.abs();
        if speed_abs > DUST_MIN_SPEED {
            let rate = (speed_abs * EMISSION_PER_SPEED).clamp(EMISSION_MIN_RATE, EMISSION_MAX_RATE);
            self.accumulator += rate * dt;
        } else {
            self.accumulator *= IDLE_DECAY;
        }

        let mut spawned = 0;
        while self.accumulator >= 1.0 && spawned < self.capacity() {
            let seed = self.roll_seed(emitter, backward, up, speed);
            self.spawn(seed);
            self.accumulator -= 1.0;
            spawned += 1;
        }
        if self.accumulator >= 1.0 {
            self.accumulator = self.accumulator.fract();
        }
    }

    fn integrate(&mut self, dt: f32, up: Vec3) {
        for i in 0..self.capacity() {
            let lifetime = self.lifetimes[i];
            if lifetime <= 0.0 {
                continue;
            }

            let age = self.ages[i] + dt;
            if age >= lifetime - LIFETIME_EPSILON {
                self.kill(i);
                continue;
            }
            self.ages[i] = age;

            let vel = self.velocities[i];
            self.positions[i] += vel * dt;

            let vertical = up * vel.dot(up);
            let horizontal = vel - vertical;
            let mut vel = horizontal * HORIZONTAL_DAMPING + vertical * VERTICAL_DAMPING;
            vel += up * (UPWARD_DRIFT * dt);
            vel += WORLD_UP * (VERTICAL_BIAS * dt);
            self.velocities[i] = vel;

            let t = age / lifetime;
            self.sizes[i] = self.start_sizes[i] + (self.end_sizes[i] - self.start_sizes[i]) * t;
            let fade = 1.0 - t;
            self.alphas[i] = self.start_alphas[i] * fade * fade;
        }
    }

    fn kill(&mut self, i: usize) {
        self.lifetimes[i] = 0.0;
        self.ages[i] = 0.0;
        self.alphas[i] = 0.0;
        self.sizes[i] = 0.0;
    }

    /// Random spawn placement and launch velocity
    fn roll_seed(&mut self, emitter: Vec3, backward: Vec3, up: Vec3, speed: f32) -> DustSeed {
        let rng = &mut self.rng;

        let side = up.cross(backward);
        let side = (side.length_squared() > 1e-8).then(|| side.normalize());

        let mut position = emitter
            + backward * rng.random_range(3.0_f32..8.0)
            + up * rng.random_range(-2.8_f32..1.0);
        if let Some(side) = side {
            position += side * rng.random_range(-6.0_f32..6.0);
        }

        let spawn_speed = (speed * 55.0).max(8.0);
        let mut velocity = backward * spawn_speed * rng.random_range(0.6_f32..1.0);
        if let Some(side) = side {
            velocity += side * rng.random_range(-10.0_f32..10.0);
        }
        velocity += Vec3::new(
            rng.random_range(-2.0_f32..2.0),
            rng.random_range(-2.0_f32..2.0),
            rng.random_range(-2.0_f32..2.0),
        );
        velocity += up * rng.random_range(10.0_f32..26.0);

        let start_size = rng.random_range(16.0_f32..32.0);
        DustSeed {
            position,
            velocity,
            lifetime: rng.random_range(0.7_f32..1.5),
            start_size,
            end_size: start_size * rng.random_range(0.35_f32..0.6),
            start_alpha: rng.random_range(0.55_f32..0.85),
        }
    }

    /// Write a particle at the cursor, overwriting whatever lives there
    pub fn spawn(&mut self, seed: DustSeed) {
        if self.capacity() == 0 {
            return;
        }
        let i = self.cursor;
        self.cursor = (self.cursor + 1) % self.capacity();

        self.positions[i] = seed.position;
        self.velocities[i] = seed.velocity;
        self.ages[i] = 0.0;
        self.lifetimes[i] = seed.lifetime;
        self.start_sizes[i] = seed.start_size;
        self.end_sizes[i] = seed.end_size;
        self.start_alphas[i] = seed.start_alpha;
        self.sizes[i] = seed.start_size;
        self.alphas[i] = seed.start_alpha;
    }

    /// Kill every particle and drain the emission budget
    pub fn reset(&mut self) {
        for i in 0..self.capacity() {
            self.kill(i);
        }
        self.cursor = 0;
        self.accumulator = 0.0;
    }

    /// Release the particle storage. Returns false if already released.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.positions = Box::default();
        self.velocities = Box::default();
        self.ages = Box::default();
        self.lifetimes = Box::default();
        self.start_sizes = Box::default();
        self.end_sizes = Box::default();
        self.start_alphas = Box::default();
        self.sizes = Box::default();
        self.alphas = Box::default();
        self.cursor = 0;
        self.accumulator = 0.0;
        self.disposed = true;
        log::debug!("Dust buffers released");
        true
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// False for out-of-range slots, including every slot after `dispose`
    pub fn is_active(&self, i: usize) -> bool {
        self.lifetimes.get(i).is_some_and(|&l| l > 0.0)
    }

    pub fn active_count(&self) -> usize {
        self.lifetimes.iter().filter(|&&l| l > 0.0).count()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn ages(&self) -> &[f32] {
        &self.ages
    }

    pub fn lifetimes(&self) -> &[f32] {
        &self.lifetimes
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn alphas(&self) -> &[f32] {
        &self.alphas
    }
}
