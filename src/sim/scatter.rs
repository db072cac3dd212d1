//! Obstacle supply: scatter a loaded model over the planet, or fall back to boxes
//!
//! Loading the model is the host's job and may fail. Either way the result
//! ends up here and becomes a flat list of obstacles at random surface points.

use glam::{Quat, Vec3};
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::planet::{Material, Obstacle, ObstacleKind};
use crate::error::AssetLoadError;

/// A loaded obstacle model, cloned once per obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleTemplate {
    pub name: String,
    /// One material per mesh part
    pub parts: Vec<Material>,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_scale() -> f32 {
    18.0
}

impl ObstacleTemplate {
    /// Parse a JSON model description fetched from `path`
    pub fn from_json(path: &str, json: &str) -> Result<Self, AssetLoadError> {
        let template: Self = serde_json::from_str(json).map_err(|source| AssetLoadError::Parse {
            path: path.to_owned(),
            source,
        })?;
        if template.parts.is_empty() {
            return Err(AssetLoadError::Empty {
                path: path.to_owned(),
            });
        }
        Ok(template)
    }
}

/// Where the current obstacle set came from
#[derive(Debug, Clone, PartialEq)]
pub enum ObstacleSource {
    Model(ObstacleTemplate),
    Fallback,
}

/// Placeholder box colours
const CRATE_COLORS: [[f32; 3]; 5] = [
    [0.85, 0.35, 0.25],
    [0.95, 0.75, 0.2],
    [0.3, 0.6, 0.9],
    [0.55, 0.8, 0.35],
    [0.8, 0.45, 0.85],
];
const CRATE_SCALE: f32 = 12.0;

/// Uniformly random point on a sphere of the given radius
pub fn random_surface_point(rng: &mut Pcg32, radius: f32) -> Vec3 {
    let z: f32 = rng.random_range(-1.0..=1.0);
    let phi: f32 = rng.random_range(0.0..std::f32::consts::TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * phi.cos(), r * phi.sin(), z) * radius
}

/// Stand upright on the surface with a random yaw about the normal
fn surface_orientation(rng: &mut Pcg32, position: Vec3) -> Quat {
    let normal = position.normalize_or(Vec3::Z);
    let yaw: f32 = rng.random_range(0.0..std::f32::consts::TAU);
    Quat::from_rotation_arc(Vec3::Z, normal) * Quat::from_rotation_z(yaw)
}

/// Clone a template `count` times at random surface points
pub fn scatter_obstacles(
    template: &ObstacleTemplate,
    count: usize,
    radius: f32,
    rng: &mut Pcg32,
) -> Vec<Obstacle> {
    (0..count)
        .map(|i| {
            let position = random_surface_point(rng, radius);
            let orientation = surface_orientation(rng, position);
            let mut obstacle = Obstacle::new(i as u32 + 1, ObstacleKind::Tree, position, orientation);
            obstacle.materials = template.parts.clone();
            obstacle.scale = template.scale;
            obstacle
        })
        .collect()
}

/// Simple coloured boxes for when the model is unavailable
pub fn fallback_obstacles(count: usize, radius: f32, rng: &mut Pcg32) -> Vec<Obstacle> {
    (0..count)
        .map(|i| {
            let position = random_surface_point(rng, radius);
            let orientation = surface_orientation(rng, position);
            let color = CRATE_COLORS[rng.random_range(0..CRATE_COLORS.len())];
            let mut obstacle =
                Obstacle::new(i as u32 + 1, ObstacleKind::Crate, position, orientation);
            obstacle.materials = vec![Material::opaque(color)];
            obstacle.scale = CRATE_SCALE * rng.random_range(0.8_f32..1.4);
            obstacle
        })
        .collect()
}

/// Turn a loader outcome into obstacles; failures degrade to placeholder boxes
pub fn resolve_obstacle_load(
    loaded: Result<ObstacleTemplate, AssetLoadError>,
    count: usize,
    fallback_count: usize,
    radius: f32,
    rng: &mut Pcg32,
) -> (Vec<Obstacle>, ObstacleSource) {
    match loaded {
        Ok(template) => {
            let obstacles = scatter_obstacles(&template, count, radius, rng);
            log::info!("Scattered {} '{}' obstacles", obstacles.len(), template.name);
            (obstacles, ObstacleSource::Model(template))
        }
        Err(err) => {
            log::warn!("Obstacle model unavailable ({err}), using placeholder boxes");
            let obstacles = fallback_obstacles(fallback_count, radius, rng);
            (obstacles, ObstacleSource::Fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const TREE_JSON: &str = r#"{
        "name": "pine",
        "parts": [
            { "color": [0.35, 0.22, 0.1] },
            { "color": [0.1, 0.45, 0.2], "opacity": 1.0 }
        ]
    }"#;

    #[test]
    fn test_points_lie_on_sphere() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..200 {
            let p = random_surface_point(&mut rng, 1000.0);
            assert!((p.length() - 1000.0).abs() < 0.05);
        }
    }

    #[test]
    fn test_orientation_points_up_along_normal() {
        let mut rng = Pcg32::seed_from_u64(42);
        let template = ObstacleTemplate::from_json("tree.json", TREE_JSON).unwrap();
        let obstacles = scatter_obstacles(&template, 20, 1000.0, &mut rng);
        for o in &obstacles {
            let up = o.orientation * Vec3::Z;
            assert!((up - o.position.normalize()).length() < 1e-3);
            assert_eq!(o.materials.len(), 2);
            assert_eq!(o.kind, ObstacleKind::Tree);
        }
    }

    #[test]
    fn test_template_parse_errors() {
        assert!(matches!(
            ObstacleTemplate::from_json("bad.json", "{ not json"),
            Err(AssetLoadError::Parse { .. })
        ));
        assert!(matches!(
            ObstacleTemplate::from_json("empty.json", r#"{ "name": "x", "parts": [] }"#),
            Err(AssetLoadError::Empty { .. })
        ));
        let template = ObstacleTemplate::from_json("tree.json", TREE_JSON).unwrap();
        assert_eq!(template.scale, 18.0);
    }

    #[test]
    fn test_failed_load_falls_back_to_crates() {
        let mut rng = Pcg32::seed_from_u64(7);
        let failed = Err(AssetLoadError::Fetch {
            path: "assets/tree.json".into(),
            reason: "404".into(),
        });
        let (obstacles, source) = resolve_obstacle_load(failed, 1200, 40, 1000.0, &mut rng);
        assert_eq!(source, ObstacleSource::Fallback);
        assert_eq!(obstacles.len(), 40);
        assert!(obstacles.iter().all(|o| o.kind == ObstacleKind::Crate));
    }

    #[test]
    fn test_successful_load_uses_primary_count() {
        let mut rng = Pcg32::seed_from_u64(7);
        let template = ObstacleTemplate::from_json("tree.json", TREE_JSON).unwrap();
        let (obstacles, source) = resolve_obstacle_load(Ok(template), 300, 40, 1000.0, &mut rng);
        assert!(matches!(source, ObstacleSource::Model(_)));
        assert_eq!(obstacles.len(), 300);
    }
}
