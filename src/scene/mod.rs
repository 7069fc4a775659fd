//! Query markers and the interactive scene around them.
//!
//! Architecture:
//!   - `MarkerLayout`: one `QueryMesh` per query, positioned in the
//!     centered frame and colored by topic
//!   - `visuals`: hover / highlight → color, glow, opacity, scale
//!   - `resources`: graphics handles owned per scene generation
//!   - `controller`: load / teardown, per-frame pick loop, input state

pub mod controller;
pub mod palette;
pub mod resources;
pub mod visuals;

use glam::Vec3;
use rand::Rng;

use crate::config::SceneConfig;
use crate::data::{QueryNode, SceneData};
use crate::geometry::SceneFrame;
use palette::{Color, TopicPalette};
use visuals::MarkerVisual;

/// A rendered marker paired with its source query.
#[derive(Debug, Clone)]
pub struct QueryMesh {
    /// Index of the source record in `SceneData::queries` (lookup only)
    pub node_index: usize,
    /// Center in the scene frame
    pub position: Vec3,
    /// Unscaled sphere radius
    pub radius: f32,
    pub base_color: Color,
    pub visual: MarkerVisual,
}

impl QueryMesh {
    pub fn node<'a>(&self, data: &'a SceneData) -> Option<&'a QueryNode> {
        data.queries.get(self.node_index)
    }

    /// Radius the pick ray tests against (grows with the hover scale)
    pub fn pick_radius(&self) -> f32 {
        self.radius * self.visual.scale
    }
}

/// Marker Layout Engine
pub struct MarkerLayout<'a> {
    cfg: &'a SceneConfig,
}

impl<'a> MarkerLayout<'a> {
    pub fn new(cfg: &'a SceneConfig) -> Self {
        Self { cfg }
    }

    /// Place one marker per query at `(x - cx, y + lift, z - cz)`.
    pub fn layout<R: Rng + ?Sized>(
        &self,
        data: &SceneData,
        frame: &SceneFrame,
        rng: &mut R,
    ) -> Vec<QueryMesh> {
        let palette = TopicPalette::new(&data.metadata.topics, self.cfg);
        data.queries
            .iter()
            .enumerate()
            .map(|(node_index, node)| {
                let base_color = palette.color_for(&node.topic, rng);
                QueryMesh {
                    node_index,
                    position: Vec3::new(
                        node.position[0] - frame.center_x,
                        node.position[1] + self.cfg.marker_lift,
                        node.position[2] - frame.center_z,
                    ),
                    radius: self.cfg.marker_radius,
                    base_color,
                    visual: MarkerVisual::opaque(base_color),
                }
            })
            .collect()
    }
}
