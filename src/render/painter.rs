//! egui painter renderer.
//!
//! Draws a [`SceneView`] with plain 2D primitives: the terrain becomes one
//! `egui::Mesh` with triangles sorted back to front (painter's algorithm),
//! markers are filled circles sized by perspective, also sorted far to near
//! and drawn over the terrain.

use eframe::egui;
use glam::{Vec2, Vec3};
use rayon::prelude::*;

use super::camera::Viewport;
use super::RenderMode;
use crate::scene::controller::SceneView;
use crate::scene::palette::Color;

/// Light direction (toward the light)
const LIGHT_DIR: Vec3 = Vec3::new(0.4, 1.0, 0.3);
const AMBIENT: f32 = 0.35;
/// Markers smaller than this many pixels are skipped
const MIN_MARKER_PX: f32 = 0.5;

/// Pointer position in `rect` → NDC (+y up)
pub fn screen_to_ndc(rect: egui::Rect, pos: egui::Pos2) -> Vec2 {
    let vp = Viewport {
        width: rect.width(),
        height: rect.height(),
    };
    vp.to_ndc(Vec2::new(pos.x - rect.min.x, pos.y - rect.min.y))
}

fn ndc_to_screen(rect: egui::Rect, ndc: Vec3) -> egui::Pos2 {
    egui::pos2(
        rect.min.x + (ndc.x + 1.0) * 0.5 * rect.width(),
        rect.min.y + (1.0 - ndc.y) * 0.5 * rect.height(),
    )
}

fn color32(color: Color, alpha: f32) -> egui::Color32 {
    let [r, g, b, a] = color.to_rgba8(alpha);
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Paint one frame into `rect`. Returns the number of triangles drawn.
pub fn paint_scene(painter: &egui::Painter, rect: egui::Rect, view: &SceneView<'_>, mode: RenderMode) -> usize {
    painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(11, 16, 28));

    let drawn = paint_terrain(painter, rect, view, mode);
    paint_markers(painter, rect, view);
    drawn
}

fn paint_terrain(painter: &egui::Painter, rect: egui::Rect, view: &SceneView<'_>, mode: RenderMode) -> usize {
    let terrain = view.terrain;
    let camera = view.camera;
    let view_proj = camera.view_projection();
    let light = LIGHT_DIR.normalize();

    // Project every vertex (None = behind the near plane)
    let projected: Vec<Option<Vec3>> = terrain
        .positions
        .par_iter()
        .map(|p| camera.project_with(&view_proj, *p))
        .collect();

    // Visible triangles with their mean depth, sorted far → near
    let mut tris: Vec<([u32; 3], f32)> = terrain
        .triangles()
        .filter_map(|tri| {
            let a = projected[tri[0] as usize]?;
            let b = projected[tri[1] as usize]?;
            let c = projected[tri[2] as usize]?;
            Some((tri, (a.z + b.z + c.z) / 3.0))
        })
        .collect();
    tris.sort_by(|a, b| b.1.total_cmp(&a.1));

    match mode {
        RenderMode::Shaded => {
            let mut mesh = egui::Mesh::default();
            mesh.vertices.reserve(projected.len());
            for (i, p) in projected.iter().enumerate() {
                let lambert = terrain.normals[i].dot(light).max(0.0);
                let shade = AMBIENT + (1.0 - AMBIENT) * lambert;
                let pos = p.map_or(rect.center(), |ndc| ndc_to_screen(rect, ndc));
                mesh.vertices.push(egui::epaint::Vertex {
                    pos,
                    uv: egui::epaint::WHITE_UV,
                    color: color32(view.terrain_color.scale(shade), view.terrain_opacity),
                });
            }
            mesh.indices.reserve(tris.len() * 3);
            for (tri, _) in &tris {
                mesh.indices.extend_from_slice(tri);
            }
            painter.add(egui::Shape::mesh(mesh));
        }
        RenderMode::Wireframe => {
            let stroke = egui::Stroke::new(0.6, color32(view.terrain_color.scale(1.6), view.terrain_opacity));
            for (tri, _) in &tris {
                let pts: Vec<egui::Pos2> = tri
                    .iter()
                    .filter_map(|&i| projected[i as usize].map(|ndc| ndc_to_screen(rect, ndc)))
                    .collect();
                painter.add(egui::Shape::closed_line(pts, stroke));
            }
        }
    }
    tris.len()
}

fn paint_markers(painter: &egui::Painter, rect: egui::Rect, view: &SceneView<'_>) {
    let camera = view.camera;
    let view_proj = camera.view_projection();
    let vp = Viewport {
        width: rect.width(),
        height: rect.height(),
    };

    let mut visible: Vec<(usize, Vec3)> = view
        .markers
        .iter()
        .enumerate()
        .filter_map(|(i, m)| camera.project_with(&view_proj, m.position).map(|ndc| (i, ndc)))
        .collect();
    visible.sort_by(|a, b| b.1.z.total_cmp(&a.1.z));

    for (i, ndc) in visible {
        let marker = &view.markers[i];
        let visual = &marker.visual;
        let radius = camera.projected_radius(marker.position, marker.radius * visual.scale, vp);
        if radius < MIN_MARKER_PX {
            continue;
        }
        let center = ndc_to_screen(rect, ndc);
        painter.circle_filled(center, radius, color32(visual.shaded(), visual.opacity));
        if visual.is_emissive() {
            painter.circle_stroke(center, radius + 2.0, egui::Stroke::new(2.0, color32(visual.emissive, 1.0)));
        }
    }
}
