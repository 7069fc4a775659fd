//! Visual State Synchronizer.
//!
//! Marker appearance is a pure function of (base color, hover identity,
//! highlight topic). [`refresh`] recomputes every attribute from scratch, so
//! calling it any number of times with the same inputs never drifts.

use super::palette::Color;
use super::QueryMesh;
use crate::config::SceneConfig;
use crate::data::{QueryId, SceneData};

/// Per-marker visual record. Written only by [`refresh`], read by renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerVisual {
    pub color: Color,
    /// `Color::BLACK` when not glowing
    pub emissive: Color,
    pub opacity: f32,
    /// Blending needed (opacity < 1)
    pub transparent: bool,
    /// Uniform scale
    pub scale: f32,
}

impl MarkerVisual {
    pub fn opaque(color: Color) -> Self {
        Self {
            color,
            emissive: Color::BLACK,
            opacity: 1.0,
            transparent: false,
            scale: 1.0,
        }
    }

    pub fn is_emissive(&self) -> bool {
        !self.emissive.is_black()
    }

    /// Color the renderer should draw (base + glow)
    pub fn shaded(&self) -> Color {
        self.color.add(self.emissive)
    }
}

/// Style constants pulled out of [`SceneConfig`]
#[derive(Debug, Clone, Copy)]
pub struct VisualStyle {
    pub matched_opacity: f32,
    pub dimmed_opacity: f32,
    pub hover_scale: f32,
    pub hover_emissive: Color,
}

impl VisualStyle {
    pub fn from_config(cfg: &SceneConfig) -> Self {
        Self {
            matched_opacity: cfg.matched_opacity,
            dimmed_opacity: cfg.dimmed_opacity,
            hover_scale: cfg.hover_scale,
            hover_emissive: Color::from_hex(cfg.hover_emissive),
        }
    }
}

impl Default for VisualStyle {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

/// Recompute every marker's visual attributes.
pub fn refresh(
    meshes: &mut [QueryMesh],
    data: &SceneData,
    hover: Option<&QueryId>,
    highlight_topic: Option<&str>,
    style: &VisualStyle,
) {
    for mesh in meshes.iter_mut() {
        let Some(node) = data.queries.get(mesh.node_index) else {
            continue;
        };
        let is_topic_match = highlight_topic.map_or(true, |t| node.topic == t);
        let is_hovered = hover.map_or(false, |id| id.matches(node));

        let visual = &mut mesh.visual;
        visual.color = mesh.base_color;
        visual.emissive = if is_hovered { style.hover_emissive } else { Color::BLACK };
        visual.opacity = if is_topic_match {
            style.matched_opacity
        } else {
            style.dimmed_opacity
        };
        visual.transparent = visual.opacity < 1.0;
        visual.scale = if is_hovered { style.hover_scale } else { 1.0 };
    }
}
