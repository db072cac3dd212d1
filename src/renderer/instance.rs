//! Per-instance billboard data and scene flattening

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::FrameView;
use crate::sim::CarPartKind;

/// One camera-facing quad (must match `billboard.wgsl`)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Billboard {
    /// xyz = world centre, w = half-extent
    pub position_size: [f32; 4],
    pub color: [f32; 4],
    /// 0 = soft disc, 1 = solid quad
    pub shape: u32,
    pub _pad: [u32; 3],
}

impl Billboard {
    pub const SHAPE_DISC: u32 = 0;
    pub const SHAPE_QUAD: u32 = 1;

    pub fn new(position: Vec3, size: f32, color: [f32; 4], shape: u32) -> Self {
        Self {
            position_size: [position.x, position.y, position.z, size],
            color,
            shape,
            _pad: [0; 3],
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Billboard>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Uint32,
                },
            ],
        }
    }
}

/// Colors for scene elements
pub mod colors {
    pub const STAR: [f32; 4] = [0.85, 0.88, 1.0, 0.7];
    pub const BODY: [f32; 4] = [0.75, 0.12, 0.1, 1.0];
    pub const WHEEL: [f32; 4] = [0.08, 0.08, 0.08, 1.0];
    pub const HEADLIGHT_ON: [f32; 4] = [1.0, 0.95, 0.7, 1.0];
    pub const HEADLIGHT_OFF: [f32; 4] = [0.3, 0.3, 0.25, 1.0];
    pub const DUST: [f32; 3] = [0.62, 0.55, 0.45];
    pub const BACKGROUND: [f64; 4] = [0.005, 0.005, 0.015, 1.0];
}

/// Dust sizes are authored as point-sprite diameters
const DUST_SIZE_SCALE: f32 = 0.25;
/// Fraction of an obstacle's size it sways in the wind
const WIND_SWAY: f32 = 0.04;

/// Flatten the scene into back-to-front-ish draw order: sky, obstacles, car, dust
pub fn collect_billboards(view: &FrameView<'_>, out: &mut Vec<Billboard>) {
    out.clear();

    for star in view.sky.star_positions() {
        out.push(Billboard::new(star, 6.0, colors::STAR, Billboard::SHAPE_DISC));
    }

    for obstacle in view.obstacles.iter().filter(|o| o.visible) {
        let sway_dir = obstacle.world_orientation(view.planet) * Vec3::X;
        let sway = (view.wind_phase + obstacle.id as f32 * 0.37).sin() * WIND_SWAY * obstacle.scale;
        let position = obstacle.world_position(view.planet) + sway_dir * sway;
        let [r, g, b] = obstacle.base_color();
        out.push(Billboard::new(
            position,
            obstacle.scale,
            [r, g, b, obstacle.opacity],
            Billboard::SHAPE_QUAD,
        ));
    }

    for part in &view.car.parts {
        let color = match part.kind {
            CarPartKind::Body => colors::BODY,
            CarPartKind::Wheel => colors::WHEEL,
            CarPartKind::Headlight if view.car.lights_on => colors::HEADLIGHT_ON,
            CarPartKind::Headlight => colors::HEADLIGHT_OFF,
        };
        out.push(Billboard::new(
            view.car.local_to_world(part.offset),
            part.size,
            color,
            Billboard::SHAPE_QUAD,
        ));
    }

    if let Some(dust) = view.dust {
        let [r, g, b] = colors::DUST;
        for ((position, size), alpha) in dust.positions().iter().zip(dust.sizes()).zip(dust.alphas()) {
            if *alpha <= 0.0 {
                continue;
            }
            out.push(Billboard::new(
                *position,
                size * DUST_SIZE_SCALE,
                [r, g, b, *alpha],
                Billboard::SHAPE_DISC,
            ));
        }
    }
}
