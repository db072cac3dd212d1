//! Frame scheduler
//!
//! Runs one simulation step and one render per display refresh, in a fixed
//! order: car (which also rotates the planet and drives the dust), wind,
//! visibility, collisions, sky, render. The host calls `frame` from its
//! animation-frame callback and stops re-scheduling once it returns
//! `FrameOutcome::Stopped`.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::error::{AssetLoadError, EngineError};
use crate::renderer::{FrameView, Renderer};
use crate::settings::GameConfig;
use crate::sim::{
    Car, Controls, DustSystem, KeyState, Obstacle, ObstacleSource, ObstacleTemplate, PlanetFrame,
    RoundClock, SkyDome, check_collisions, fallback_obstacles, resolve_obstacle_load,
    scatter_obstacles, update_visibility,
};

type HitCallback = Box<dyn FnMut(u32)>;
type DisposeHook = Box<dyn FnOnce()>;

/// Whether the host should schedule another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Stopped,
}

pub struct Engine<R: Renderer> {
    config: GameConfig,
    keys: KeyState,
    car: Car,
    planet: PlanetFrame,
    obstacles: Vec<Obstacle>,
    obstacle_source: Option<ObstacleSource>,
    sky: SkyDome,
    clock: RoundClock,
    renderer: R,
    rng: Pcg32,
    hits: u32,
    on_hit: Option<HitCallback>,
    on_finished: Option<HitCallback>,
    dispose_hooks: Vec<DisposeHook>,
    /// Simulated seconds since the round began
    elapsed: f32,
    wind_phase: f32,
    last_time: Option<f64>,
    running: bool,
    disposed: bool,
}

impl<R: Renderer> Engine<R> {
    pub fn new(config: GameConfig, renderer: R) -> Self {
        let mut car = Car::new(config.planet_radius, config.surface_clearance);
        if config.dust_capacity > 0 {
            car.attach_dust(DustSystem::new(config.dust_capacity, config.seed ^ 0xD057));
        }

        log::info!(
            "Engine created (seed {}, planet radius {}, dust {})",
            config.seed,
            config.planet_radius,
            config.dust_capacity
        );

        Self {
            keys: KeyState::new(),
            car,
            planet: PlanetFrame::new(config.planet_radius),
            obstacles: Vec::new(),
            obstacle_source: None,
            sky: SkyDome::new(config.star_count, config.seed.wrapping_add(1)),
            clock: RoundClock::new(config.time_limit_secs),
            renderer,
            rng: Pcg32::seed_from_u64(config.seed),
            hits: 0,
            on_hit: None,
            on_finished: None,
            dispose_hooks: Vec::new(),
            elapsed: 0.0,
            wind_phase: 0.0,
            last_time: None,
            running: false,
            disposed: false,
            config,
        }
    }

    /// Called with the new total after every hit
    pub fn with_hit_callback(mut self, on_hit: impl FnMut(u32) + 'static) -> Self {
        self.on_hit = Some(Box::new(on_hit));
        self
    }

    /// Called once with the final total when the round clock runs out
    pub fn with_finish_callback(mut self, on_finished: impl FnMut(u32) + 'static) -> Self {
        self.on_finished = Some(Box::new(on_finished));
        self
    }

    /// Run `hook` once on the first `dispose()`, e.g. to remove input listeners
    pub fn on_dispose(&mut self, hook: impl FnOnce() + 'static) {
        if self.disposed {
            hook();
            return;
        }
        self.dispose_hooks.push(Box::new(hook));
    }

    /// Begin (or resume) the frame loop
    pub fn start(&mut self) -> Result<bool, EngineError> {
        if self.disposed {
            return Err(EngineError::Disposed);
        }
        if self.running {
            return Ok(false);
        }
        self.running = true;
        self.last_time = None;
        log::info!("Engine started");
        Ok(true)
    }

    /// Pause without releasing anything. Idempotent.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.last_time = None;
        log::info!("Engine stopped after {} hits", self.hits);
        true
    }

    /// Terminal teardown. Releases GPU resources and runs dispose hooks exactly once.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.stop();

        if let Some(dust) = self.car.dust_mut() {
            dust.dispose();
        }
        self.renderer.release();
        self.keys.clear();
        self.obstacles.clear();
        for hook in self.dispose_hooks.drain(..) {
            hook();
        }

        self.disposed = true;
        log::info!("Engine disposed");
        true
    }

    /// External input injection (keyboard handlers, on-screen controls)
    pub fn set_key_state(&mut self, code: &str, pressed: bool) {
        if self.disposed {
            return;
        }
        let was_pressed = self.keys.set(code, pressed);
        if pressed && !was_pressed && self.config.bindings.is_headlight_key(code) {
            self.toggle_headlights();
        }
    }

    pub fn set_headlights(&mut self, on: bool) {
        self.car.lights_on = on;
    }

    pub fn toggle_headlights(&mut self) {
        self.car.lights_on = !self.car.lights_on;
        log::debug!("Headlights {}", if self.car.lights_on { "on" } else { "off" });
    }

    /// Hand over the result of the obstacle loader
    pub fn supply_obstacles(&mut self, loaded: Result<ObstacleTemplate, AssetLoadError>) {
        if self.disposed {
            log::debug!("Ignoring obstacles supplied after dispose");
            return;
        }
        let (obstacles, source) = resolve_obstacle_load(
            loaded,
            self.config.obstacle_count,
            self.config.fallback_obstacle_count,
            self.config.planet_radius,
            &mut self.rng,
        );
        self.obstacles = obstacles;
        self.obstacle_source = Some(source);
    }

    /// Fresh round with a new seed, keeping renderer resources
    pub fn restart(&mut self, seed: u64) -> Result<(), EngineError> {
        if self.disposed {
            return Err(EngineError::Disposed);
        }
        self.config.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);

        self.car.reset();
        self.planet.reset();
        self.hits = 0;
        self.clock.reset();
        self.elapsed = 0.0;
        self.wind_phase = 0.0;
        self.last_time = None;

        let radius = self.config.planet_radius;
        self.obstacles = match &self.obstacle_source {
            Some(ObstacleSource::Model(template)) => {
                scatter_obstacles(template, self.config.obstacle_count, radius, &mut self.rng)
            }
            Some(ObstacleSource::Fallback) => {
                fallback_obstacles(self.config.fallback_obstacle_count, radius, &mut self.rng)
            }
            None => Vec::new(),
        };

        log::info!("Round restarted with seed {}", seed);
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
    }

    /// One animation-frame callback; `now` is a timestamp in seconds
    pub fn frame(&mut self, now: f64) -> Result<FrameOutcome, EngineError> {
        if !self.running || self.disposed {
            return Ok(FrameOutcome::Stopped);
        }
        let delta = match self.last_time {
            Some(last) => (now - last) as f32,
            None => 0.0,
        };
        self.last_time = Some(now);
        self.step(delta)
    }

    /// Simulate and render one frame of `delta` seconds (clamped to [0, 0.1])
    pub fn step(&mut self, delta: f32) -> Result<FrameOutcome, EngineError> {
        if !self.running || self.disposed {
            return Ok(FrameOutcome::Stopped);
        }
        let delta = delta.clamp(0.0, MAX_FRAME_DELTA);

        let controls = Controls::read(&self.keys, &self.config.bindings);
        self.car.update(delta, controls, &mut self.planet);

        self.elapsed += delta;
        self.wind_phase = self.elapsed * WIND_FREQUENCY;

        update_visibility(&self.car, &self.planet, &mut self.obstacles);

        // A round that is already over counts no more hits
        if !self.clock.is_finished() {
            let hits = &mut self.hits;
            let on_hit = &mut self.on_hit;
            check_collisions(&self.car, &self.planet, &mut self.obstacles, |obstacle| {
                *hits += 1;
                log::debug!("Hit obstacle {} (total {})", obstacle.id, *hits);
                if let Some(on_hit) = on_hit.as_mut() {
                    on_hit(*hits);
                }
            });
        }

        self.sky.track(self.car.camera.position);

        let finished = self.clock.advance(delta);

        let view = FrameView {
            camera: &self.car.camera,
            car: &self.car,
            planet: &self.planet,
            obstacles: &self.obstacles,
            dust: self.car.dust(),
            sky: &self.sky,
            wind_phase: self.wind_phase,
        };
        self.renderer.render(&view)?;

        if finished {
            log::info!("Time up: {} hits", self.hits);
            self.stop();
            if let Some(on_finished) = self.on_finished.as_mut() {
                on_finished(self.hits);
            }
            return Ok(FrameOutcome::Stopped);
        }

        Ok(FrameOutcome::Continue)
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_round_over(&self) -> bool {
        self.clock.is_finished()
    }

    pub fn remaining_time(&self) -> Option<f32> {
        self.clock.remaining()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn wind_phase(&self) -> f32 {
        self.wind_phase
    }

    pub fn car(&self) -> &Car {
        &self.car
    }

    pub fn planet(&self) -> &PlanetFrame {
        &self.planet
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Direct access for hosts that place obstacles themselves
    pub fn obstacles_mut(&mut self) -> &mut Vec<Obstacle> {
        &mut self.obstacles
    }

    pub fn sky(&self) -> &SkyDome {
        &self.sky
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::HeadlessRenderer;
    use crate::sim::ObstacleKind;
    use glam::{Quat, Vec3};
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    fn engine() -> Engine<HeadlessRenderer> {
        Engine::new(GameConfig::with_seed(12345), HeadlessRenderer::new())
    }

    #[test]
    fn test_frame_requires_start() {
        let mut engine = engine();
        assert_eq!(engine.frame(0.0).unwrap(), FrameOutcome::Stopped);
        assert_eq!(engine.renderer().frames, 0);

        engine.start().unwrap();
        assert_eq!(engine.frame(0.0).unwrap(), FrameOutcome::Continue);
        assert_eq!(engine.renderer().frames, 1);
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let mut engine = engine();
        engine.start().unwrap();
        engine.frame(1.0).unwrap();
        // Five-second stall only advances 0.1s
        engine.frame(6.0).unwrap();
        assert!((engine.elapsed() - MAX_FRAME_DELTA).abs() < 1e-6);
    }

    #[test]
    fn test_hit_callback_receives_totals() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut engine = engine().with_hit_callback(move |total| sink.borrow_mut().push(total));

        let pole = engine.car().position;
        for id in 0..3 {
            let offset = Vec3::new(id as f32 * 5.0, 0.0, 0.0);
            engine.obstacles_mut().push(Obstacle::new(
                id,
                ObstacleKind::Crate,
                pole + offset,
                Quat::IDENTITY,
            ));
        }

        engine.start().unwrap();
        engine.step(DT).unwrap();
        assert_eq!(engine.hits(), 3);
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
        assert!(engine.obstacles().is_empty());
    }

    #[test]
    fn test_headlight_key_toggles_on_press_edge() {
        let mut engine = engine();
        assert!(engine.car().lights_on);
        engine.set_key_state("KeyL", true);
        assert!(!engine.car().lights_on);
        // Auto-repeat keydown doesn't toggle again
        engine.set_key_state("KeyL", true);
        assert!(!engine.car().lights_on);
        engine.set_key_state("KeyL", false);
        engine.set_key_state("KeyL", true);
        assert!(engine.car().lights_on);
    }

    #[test]
    fn test_round_clock_stops_engine() {
        let finished = Rc::new(RefCell::new(None));
        let sink = finished.clone();
        let mut config = GameConfig::with_seed(1);
        config.time_limit_secs = Some(0.5);
        let mut engine = Engine::new(config, HeadlessRenderer::new())
            .with_finish_callback(move |hits| *sink.borrow_mut() = Some(hits));

        engine.start().unwrap();
        let mut frames = 0;
        while engine.step(0.1).unwrap() == FrameOutcome::Continue {
            frames += 1;
            assert!(frames < 10);
        }
        assert!(!engine.is_running());
        assert!(engine.is_round_over());
        assert_eq!(*finished.borrow(), Some(0));
    }

    #[test]
    fn test_zero_time_limit_ends_round_on_first_frame() {
        let finished = Rc::new(RefCell::new(Vec::new()));
        let sink = finished.clone();
        let mut config = GameConfig::with_seed(3);
        config.time_limit_secs = Some(0.0);
        let mut engine = Engine::new(config, HeadlessRenderer::new())
            .with_finish_callback(move |hits| sink.borrow_mut().push(hits));

        let pole = engine.car().position;
        engine
            .obstacles_mut()
            .push(Obstacle::new(1, ObstacleKind::Crate, pole, Quat::IDENTITY));

        engine.start().unwrap();
        assert_eq!(engine.step(0.05).unwrap(), FrameOutcome::Stopped);
        assert!(!engine.is_running());
        assert!(engine.is_round_over());
        assert_eq!(engine.hits(), 0);
        assert_eq!(engine.obstacles().len(), 1);

        // Resuming a finished round counts nothing and reports nothing new
        engine.start().unwrap();
        for _ in 0..10 {
            engine.step(0.05).unwrap();
        }
        assert_eq!(engine.hits(), 0);
        assert_eq!(*finished.borrow(), vec![0]);
    }

    #[test]
    fn test_failed_load_supplies_fallback() {
        let mut config = GameConfig::with_seed(5);
        config.fallback_obstacle_count = 25;
        let mut engine = Engine::new(config, HeadlessRenderer::new());
        engine.supply_obstacles(Err(AssetLoadError::Fetch {
            path: "assets/tree.json".into(),
            reason: "offline".into(),
        }));
        assert_eq!(engine.obstacles().len(), 25);

        engine.restart(6).unwrap();
        assert_eq!(engine.obstacles().len(), 25);
        assert_eq!(engine.hits(), 0);
    }

    #[test]
    fn test_dispose_runs_hooks_once_and_clears_keys() {
        let calls = Rc::new(RefCell::new(0));
        let mut engine = engine();
        let counter = calls.clone();
        engine.on_dispose(move || *counter.borrow_mut() += 1);
        engine.set_key_state("ArrowUp", true);

        assert!(engine.dispose());
        assert!(!engine.dispose());
        assert_eq!(*calls.borrow(), 1);
        assert!(engine.keys().is_empty());
        assert_eq!(engine.renderer().releases, 1);
        assert!(engine.car().dust().is_some_and(|d| d.is_disposed()));
        assert!(matches!(engine.start(), Err(EngineError::Disposed)));
    }
}
