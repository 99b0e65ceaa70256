//! Runtime-tunable path tracer settings.
//!
//! Settings are plain data. The engine copies them at the start of every
//! pass, so edits made between passes take effect on the next one.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub const DEFAULT_MAX_BOUNCES: u32 = 0;
pub const DEFAULT_MINIMUM_ILLUMINATION: f32 = 0.1;
pub const DEFAULT_SAMPLES_PER_PIXEL: u32 = 4;
pub const DEFAULT_TILE_SIZE: u32 = 150;

/// Path tracer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaytracerSettings {
    /// Maximum number of indirect bounces after the primary hit
    pub max_bounces: u32,
    /// Component-wise floor for direct lighting, so no hit is fully black
    pub minimum_illumination: f32,
    /// Camera samples averaged per pixel
    pub samples_per_pixel: u32,
    /// Perturb bounce directions by the surface roughness
    pub randomize_bounce_on_roughness: bool,
    /// Trace shadow rays toward the lights; otherwise use the flat floor
    pub diffuse_light_sampling: bool,
    /// Sample only `sample_light_index` instead of every light
    pub sample_one_light: bool,
    /// Index into the scene's lights when `sample_one_light` is set
    pub sample_light_index: usize,
    /// Jitter camera rays inside the pixel and across the lens
    pub randomize_camera_rays: bool,
    /// Add the primary-ray highlight term
    pub specular_sampling: bool,
    /// Percentage of pixels left untouched each pass (0-100). Defaults to 0
    /// so a single pass fills the whole image.
    pub skip_probability: u32,
    /// Edge length of the square render tiles in pixels
    pub tile_size: u32,
}

impl Default for RaytracerSettings {
    fn default() -> Self {
        Self {
            max_bounces: DEFAULT_MAX_BOUNCES,
            minimum_illumination: DEFAULT_MINIMUM_ILLUMINATION,
            samples_per_pixel: DEFAULT_SAMPLES_PER_PIXEL,
            randomize_bounce_on_roughness: true,
            diffuse_light_sampling: true,
            sample_one_light: true,
            sample_light_index: 0,
            randomize_camera_rays: true,
            specular_sampling: true,
            skip_probability: 0,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl RaytracerSettings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        log::info!("Loading settings from: {:?}", path);
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Return a copy with every field clamped into its usable range.
    pub fn sanitized(&self) -> Self {
        let mut settings = self.clone();

        if settings.samples_per_pixel == 0 {
            log::warn!("samples_per_pixel of 0 raised to 1");
            settings.samples_per_pixel = 1;
        }
        if settings.tile_size == 0 {
            log::warn!("tile_size of 0 raised to 1");
            settings.tile_size = 1;
        }
        if settings.skip_probability > 100 {
            log::warn!("skip_probability {} clamped to 100", settings.skip_probability);
            settings.skip_probability = 100;
        }
        if settings.minimum_illumination.is_nan() || settings.minimum_illumination < 0.0 {
            log::warn!(
                "minimum_illumination {} clamped to 0",
                settings.minimum_illumination
            );
            settings.minimum_illumination = 0.0;
        }

        settings
    }
}
