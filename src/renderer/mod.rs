//! Rendering module
//!
//! The engine only talks to the `Renderer` trait. `BillboardRenderer` draws
//! the scene as camera-facing quads with WebGPU; `HeadlessRenderer` draws
//! nothing and is used natively and in tests.

pub mod billboard;
pub mod instance;

pub use billboard::BillboardRenderer;
pub use instance::{Billboard, collect_billboards};

use crate::error::EngineError;
use crate::sim::{Car, ChaseCamera, DustSystem, Obstacle, PlanetFrame, SkyDome};

/// Everything a renderer may read for one frame
pub struct FrameView<'a> {
    pub camera: &'a ChaseCamera,
    pub car: &'a Car,
    pub planet: &'a PlanetFrame,
    pub obstacles: &'a [Obstacle],
    pub dust: Option<&'a DustSystem>,
    pub sky: &'a SkyDome,
    /// Cosmetic sway phase, derived from elapsed time
    pub wind_phase: f32,
}

pub trait Renderer {
    /// Draw one frame
    fn render(&mut self, view: &FrameView<'_>) -> Result<(), EngineError>;

    fn resize(&mut self, _width: u32, _height: u32) {}

    /// Free GPU resources. Returns false if they were already released.
    fn release(&mut self) -> bool;
}

/// Renderer that only counts what it was asked to do
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    pub frames: u64,
    pub releases: u32,
    /// Billboards produced by the last frame
    pub last_billboards: usize,
    released: bool,
    scratch: Vec<Billboard>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, view: &FrameView<'_>) -> Result<(), EngineError> {
        collect_billboards(view, &mut self.scratch);
        self.last_billboards = self.scratch.len();
        self.frames += 1;
        Ok(())
    }

    fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        self.releases += 1;
        self.scratch = Vec::new();
        true
    }
}
