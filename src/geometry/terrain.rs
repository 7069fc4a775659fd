//! Terrain builder: height-mapped grid mesh.
//!
//! Steps:
//!   1. Field size: width from the last profile sample, depth from the
//!      query z spread (floored at `min_depth`)
//!   2. Flat grid on the XZ plane, centered on the origin, +Y up
//!   3. Each vertex: elevation ← profile at its normalized x
//!   4. Each vertex: z shifted so the terrain depth band lines up with the
//!      markers (same depth center)
//!   5. Smooth normals recomputed after the elevations change

use glam::Vec3;
use rayon::prelude::*;

use super::profile::HeightProfile;
use super::{Extent, SceneFrame};
use crate::config::SceneConfig;
use crate::data::SceneData;

/// Indexed triangle mesh of the ground surface
#[derive(Debug, Clone)]
pub struct TerrainMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Triangle list, counter-clockwise seen from +Y
    pub indices: Vec<u32>,
    pub width: f32,
    pub depth: f32,
    /// (columns, rows)
    pub segments: (u32, u32),
}

impl TerrainMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex at grid column `ix`, row `iz`.
    pub fn vertex(&self, ix: u32, iz: u32) -> Vec3 {
        let cols = self.segments.0 + 1;
        self.positions[(iz * cols + ix) as usize]
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

/// Builds [`TerrainMesh`]es for one config
pub struct TerrainBuilder<'a> {
    cfg: &'a SceneConfig,
}

impl<'a> TerrainBuilder<'a> {
    pub fn new(cfg: &'a SceneConfig) -> Self {
        Self { cfg }
    }

    pub fn build(&self, data: &SceneData, frame: &SceneFrame) -> TerrainMesh {
        let profile = HeightProfile::from_points(&data.terrain_profile);
        let width = match &profile {
            Some(p) if p.last_x() > f32::EPSILON => p.last_x(),
            _ => self.cfg.default_width,
        };

        // Terrain depth band in source coordinates
        let z_extent = Extent::of(data.queries.iter().map(|q| q.position[2]))
            .unwrap_or(Extent::new(0.0, self.cfg.default_depth));
        let spread = z_extent.size();
        let depth = if spread > 0.0 { spread } else { self.cfg.default_depth }.max(self.cfg.min_depth);
        let z_shift = z_extent.center() - frame.center_z;

        let (seg_x, seg_z) = self
            .cfg
            .terrain_resolution
            .segments(data.terrain_profile.len(), data.metadata.topics.len());

        let mut mesh = flat_grid(width, depth, seg_x, seg_z);

        match &profile {
            Some(profile) => {
                let half_w = width * 0.5;
                mesh.positions.par_iter_mut().for_each(|p| {
                    let normalized = ((p.x + half_w) / width).clamp(0.0, 1.0);
                    p.y = profile.height_at(normalized * width);
                    p.z += z_shift;
                });
            }
            None => {
                log::warn!("Empty terrain profile: building flat terrain at height 0");
                mesh.positions.par_iter_mut().for_each(|p| p.z += z_shift);
            }
        }

        mesh.normals = compute_vertex_normals(&mesh.positions, &mesh.indices);
        log::debug!(
            "Terrain built: {}x{} segments, {} vertices, width {:.1}, depth {:.1}",
            seg_x,
            seg_z,
            mesh.vertex_count(),
            width,
            depth
        );
        mesh
    }
}

/// Flat grid on y = 0 spanning `[-w/2, w/2] × [-d/2, d/2]`, rows along +z.
fn flat_grid(width: f32, depth: f32, seg_x: u32, seg_z: u32) -> TerrainMesh {
    let cols = seg_x + 1;
    let rows = seg_z + 1;
    let step_x = width / seg_x as f32;
    let step_z = depth / seg_z as f32;

    let mut positions = Vec::with_capacity((cols * rows) as usize);
    for iz in 0..rows {
        let z = iz as f32 * step_z - depth * 0.5;
        for ix in 0..cols {
            let x = ix as f32 * step_x - width * 0.5;
            positions.push(Vec3::new(x, 0.0, z));
        }
    }

    let mut indices = Vec::with_capacity((seg_x * seg_z * 6) as usize);
    for iz in 0..seg_z {
        for ix in 0..seg_x {
            let a = ix + cols * iz;
            let b = ix + cols * (iz + 1);
            let c = (ix + 1) + cols * (iz + 1);
            let d = (ix + 1) + cols * iz;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    TerrainMesh {
        normals: vec![Vec3::Y; positions.len()],
        positions,
        indices,
        width,
        depth,
        segments: (seg_x, seg_z),
    }
}

/// Area-weighted smooth normals for an indexed triangle list.
pub fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (positions[ib] - positions[ia]).cross(positions[ic] - positions[ia]);
        normals[ia] += face;
        normals[ib] += face;
        normals[ic] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}
