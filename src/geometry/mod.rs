//! Scene geometry: centering, height profile, terrain mesh.
//!
//! Source data arrives in arbitrary absolute coordinates (timeline units on
//! x, engagement on y, topic lanes on z). Everything here maps it into a
//! frame centered on the origin.

pub mod profile;
pub mod terrain;

use crate::config::SceneConfig;
use crate::data::SceneData;

/// Closed interval on one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: f32,
    pub max: f32,
}

impl Extent {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Smallest extent covering every value; `None` for an empty iterator.
    pub fn of(values: impl IntoIterator<Item = f32>) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(Self::new(v, v)),
            Some(e) => Some(Self::new(e.min.min(v), e.max.max(v))),
        })
    }

    #[inline]
    pub fn center(&self) -> f32 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.max - self.min
    }
}

/// Center of the (a, b) extent, computed independently per axis.
///
/// Callers guarantee at least one point; see [`center_or_default`] for the
/// empty case. A single point is its own center.
pub fn compute_center(points: &[(f32, f32)]) -> (f32, f32) {
    let a = Extent::of(points.iter().map(|p| p.0)).unwrap_or(Extent::new(0.0, 0.0));
    let b = Extent::of(points.iter().map(|p| p.1)).unwrap_or(Extent::new(0.0, 0.0));
    (a.center(), b.center())
}

/// [`compute_center`] with a fixed `[0, width] × [0, depth]` field as the
/// fallback when there are no points.
pub fn center_or_default(points: &[(f32, f32)], default_width: f32, default_depth: f32) -> (f32, f32) {
    if points.is_empty() {
        (default_width * 0.5, default_depth * 0.5)
    } else {
        compute_center(points)
    }
}

/// Centering offsets for one scene generation.
///
/// Every marker lands at `source - center` on x and z, so the query cloud's
/// extent midpoint sits at the origin whatever the source coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFrame {
    pub center_x: f32,
    pub center_z: f32,
}

impl SceneFrame {
    pub fn from_data(data: &SceneData, cfg: &SceneConfig) -> Self {
        let points: Vec<(f32, f32)> = data
            .queries
            .iter()
            .map(|q| (q.position[0], q.position[2]))
            .collect();
        let (center_x, center_z) = center_or_default(&points, cfg.default_width, cfg.default_depth);
        Self { center_x, center_z }
    }
}
