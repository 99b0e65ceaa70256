//! Scene description consumed by the renderer.
//!
//! A [`Scene`] is the finished output of scene authoring: camera
//! parameters, an ordered list of solids and a background color. The
//! lights subset is derived here so every consumer agrees on it.

use std::collections::HashSet;
use std::path::Path;

use lumen_math::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::solid::{Solid, SolidKind};

/// Errors that can occur while building or loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Solid {id} has unknown kind discriminator {kind}")]
    UnknownKind { id: u32, kind: u32 },

    #[error("Solid {id} has kind {kind:?}, which cannot be intersected")]
    UnsupportedKind { id: u32, kind: SolidKind },

    #[error("Solid {id} has invalid radius {radius}")]
    InvalidRadius { id: u32, radius: f32 },

    #[error("Solid {0} has non-finite position, color or material values")]
    NonFinite(u32),

    #[error("Duplicate solid id {0}")]
    DuplicateId(u32),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Primary camera fields as authored.
///
/// `vfov` is the vertical field of view in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    pub origin: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    pub vfov: f32,
    pub aspect: f32,
    pub aperture: f32,
    pub focus_distance: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            origin: Vec3::new(0.0, 0.0, 3.0),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            vfov: 60.0,
            aspect: 1.0,
            aperture: 0.0,
            focus_distance: 3.0,
        }
    }
}

/// A validated scene ready for rendering.
#[derive(Debug, Clone)]
pub struct Scene {
    camera: CameraParams,
    solids: Vec<Solid>,
    lights: Vec<Solid>,
    background: Vec4,
}

impl Scene {
    /// Build a scene, validating every solid and deriving the lights.
    ///
    /// Lights are the solids with emission > 0, kept in scene order.
    pub fn new(camera: CameraParams, solids: Vec<Solid>, background: Vec4) -> SceneResult<Self> {
        let mut ids = HashSet::with_capacity(solids.len());

        for solid in &solids {
            validate_solid(solid)?;
            if !ids.insert(solid.id()) {
                return Err(SceneError::DuplicateId(solid.id()));
            }
        }

        let lights: Vec<Solid> = solids.iter().copied().filter(Solid::is_light).collect();

        log::info!(
            "Scene loaded: {} solids, {} lights",
            solids.len(),
            lights.len()
        );

        Ok(Self {
            camera,
            solids,
            lights,
            background,
        })
    }

    /// Parse a scene from a JSON string.
    pub fn from_json_str(json: &str) -> SceneResult<Self> {
        let desc: SceneDesc = serde_json::from_str(json)?;
        desc.into_scene()
    }

    /// Load a scene from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        log::info!("Loading scene from: {:?}", path);
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn camera(&self) -> &CameraParams {
        &self.camera
    }

    pub fn solids(&self) -> &[Solid] {
        &self.solids
    }

    pub fn lights(&self) -> &[Solid] {
        &self.lights
    }

    pub fn background(&self) -> Vec4 {
        self.background
    }
}

fn validate_solid(solid: &Solid) -> SceneResult<()> {
    let id = solid.id();
    let kind = solid.kind().ok_or(SceneError::UnknownKind {
        id,
        kind: solid.kind_raw(),
    })?;

    if !kind.is_supported() {
        return Err(SceneError::UnsupportedKind { id, kind });
    }

    let radius = solid.radius();
    if !radius.is_finite() || radius <= 0.0 {
        return Err(SceneError::InvalidRadius { id, radius });
    }

    let finite = solid.position().is_finite()
        && solid.color().is_finite()
        && solid.reflectivity().is_finite()
        && solid.emission().is_finite()
        && solid.roughness().is_finite();
    if !finite {
        return Err(SceneError::NonFinite(id));
    }

    Ok(())
}

/// Serialized form of a solid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolidDesc {
    #[serde(default)]
    pub kind: SolidKind,
    pub id: u32,
    pub radius: f32,
    pub position: Vec3,
    #[serde(default = "default_color")]
    pub color: Vec4,
    #[serde(default)]
    pub reflectivity: f32,
    #[serde(default)]
    pub emission: f32,
    #[serde(default)]
    pub roughness: f32,
}

fn default_color() -> Vec4 {
    Vec4::ONE
}

impl From<&SolidDesc> for Solid {
    fn from(desc: &SolidDesc) -> Self {
        Solid::new(desc.kind, desc.id, desc.position, desc.radius)
            .with_color(desc.color)
            .with_reflectivity(desc.reflectivity)
            .with_emission(desc.emission)
            .with_roughness(desc.roughness)
    }
}

/// Serialized form of a scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDesc {
    #[serde(default)]
    pub camera: CameraParams,
    #[serde(default)]
    pub background: Vec4,
    pub solids: Vec<SolidDesc>,
}

impl SceneDesc {
    /// Validate and convert into a renderable scene.
    pub fn into_scene(self) -> SceneResult<Scene> {
        let solids = self.solids.iter().map(Solid::from).collect();
        Scene::new(self.camera, solids, self.background)
    }
}
