//! Scene configuration.
//!
//! Every knob has a `Default` that reproduces the stock look; a JSON file may
//! override any subset of fields.

use std::path::Path;

use serde::Deserialize;

use crate::data::ingest::IngestConfig;
use crate::error::{SceneError, SceneResult};

/// How finely the terrain grid is subdivided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum TerrainResolution {
    /// One column per profile segment, one row per topic lane gap.
    DataDriven,
    /// Fixed segment counts (each clamped to at least 1).
    Fixed { x: u32, z: u32 },
}

impl Default for TerrainResolution {
    fn default() -> Self {
        Self::DataDriven
    }
}

impl TerrainResolution {
    /// Segment counts for a profile of `samples` points and `lanes` topic lanes.
    pub fn segments(self, samples: usize, lanes: usize) -> (u32, u32) {
        match self {
            Self::DataDriven => (
                samples.saturating_sub(1).max(1) as u32,
                lanes.saturating_sub(1).max(1) as u32,
            ),
            Self::Fixed { x, z } => (x.max(1), z.max(1)),
        }
    }
}

/// Orbit camera defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    /// Initial eye position [x, y, z]
    pub eye: [f32; 3],
    /// Orbit target [x, y, z]
    pub target: [f32; 3],
    /// Largest polar angle (from +Y) the controls allow, in radians
    pub max_polar: f32,
    /// Fraction of the queued orbit delta applied per frame
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 45.0,
            near: 0.1,
            far: 1500.0,
            eye: [80.0, 60.0, 80.0],
            target: [0.0, 10.0, 0.0],
            max_polar: std::f32::consts::PI * 0.49,
            damping: 0.05,
            min_distance: 5.0,
            max_distance: 600.0,
        }
    }
}

/// Canvas size clamps applied on every resize.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_width: f32,
    pub max_width: f32,
    pub min_height: f32,
    pub max_height: f32,
    /// Desired height as a fraction of width
    pub height_ratio: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_width: 320.0,
            max_width: 1100.0,
            min_height: 420.0,
            max_height: 660.0,
            height_ratio: 0.55,
        }
    }
}

/// Configuration for terrain + marker scene construction
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Field width used when the terrain profile is empty
    pub default_width: f32,
    /// Field depth used when no queries spread along z
    pub default_depth: f32,
    /// Terrain depth never drops below this
    pub min_depth: f32,
    /// Vertical lift that keeps markers clear of the terrain
    pub marker_lift: f32,
    pub marker_radius: f32,
    /// Hue advance per topic lane (fraction of the color wheel)
    pub hue_step: f32,
    pub topic_saturation: f32,
    pub topic_lightness: f32,
    pub fallback_saturation: f32,
    pub fallback_lightness: f32,
    pub matched_opacity: f32,
    pub dimmed_opacity: f32,
    pub hover_scale: f32,
    /// Emissive tint of the hovered marker (0xRRGGBB)
    pub hover_emissive: u32,
    pub terrain_color: u32,
    pub terrain_opacity: f32,
    pub terrain_resolution: TerrainResolution,
    /// Seed for fallback hues; `None` draws from entropy
    pub fallback_seed: Option<u64>,
    pub camera: CameraConfig,
    pub viewport: ViewportConfig,
    /// Bucketing and height mapping for raw search logs
    pub ingest: IngestConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            default_width: 120.0,
            default_depth: 60.0,
            min_depth: 20.0,
            marker_lift: 1.5,
            marker_radius: 1.0,
            hue_step: 0.16,
            topic_saturation: 0.6,
            topic_lightness: 0.55,
            fallback_saturation: 0.7,
            fallback_lightness: 0.55,
            matched_opacity: 0.95,
            dimmed_opacity: 0.2,
            hover_scale: 1.4,
            hover_emissive: 0x4da3ff,
            terrain_color: 0x1f3b73,
            terrain_opacity: 0.85,
            terrain_resolution: TerrainResolution::default(),
            fallback_seed: None,
            camera: CameraConfig::default(),
            viewport: ViewportConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json_str(src: &str) -> SceneResult<Self> {
        let cfg: Self = serde_json::from_str(src)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> SceneResult<Self> {
        let src = std::fs::read_to_string(path)?;
        Self::from_json_str(&src)
    }

    fn validate(&self) -> SceneResult<()> {
        if self.default_width <= 0.0 || self.default_depth <= 0.0 {
            return Err(SceneError::InvalidConfig(
                "default_width and default_depth must be positive".into(),
            ));
        }
        if self.marker_radius <= 0.0 {
            return Err(SceneError::InvalidConfig("marker_radius must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.matched_opacity) || !(0.0..=1.0).contains(&self.dimmed_opacity) {
            return Err(SceneError::InvalidConfig("opacities must lie in [0, 1]".into()));
        }
        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            return Err(SceneError::InvalidConfig("camera needs 0 < near < far".into()));
        }
        if self.ingest.bucket_minutes == 0 {
            return Err(SceneError::InvalidConfig("ingest.bucket_minutes must be positive".into()));
        }
        if self.ingest.length_units <= 0.0 {
            return Err(SceneError::InvalidConfig("ingest.length_units must be positive".into()));
        }
        Ok(())
    }
}
