//! Viewport for `SearchscapeApp`: pointer and camera input feed the
//! controller, the controller runs its frame, the painter draws the result.

use eframe::egui;

use searchscape::render::painter::{paint_scene, screen_to_ndc};

use super::SearchscapeApp;

/// Radians of orbit per dragged pixel
const ORBIT_SPEED: f32 = 0.008;
/// Log-distance per scroll unit
const ZOOM_SPEED: f32 = 0.003;

impl SearchscapeApp {
    pub fn draw_viewport(&mut self, ui: &mut egui::Ui) {
        let Some(viewport) = self.controller.resize(ui.available_width()) else {
            ui.colored_label(egui::Color32::GRAY, "Scene unmounted");
            return;
        };

        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(viewport.width, viewport.height),
            egui::Sense::click_and_drag().union(egui::Sense::hover()),
        );

        // Drag to orbit around the target
        if response.dragged() {
            let delta = response.drag_delta();
            self.controller.orbit(-delta.x * ORBIT_SPEED, delta.y * ORBIT_SPEED);
        }

        // Scroll to dolly in/out
        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                self.controller.zoom(scroll * ZOOM_SPEED);
            }
        }

        // Off-canvas keeps the last position; picking still follows the camera
        if let Some(pos) = response.hover_pos() {
            self.controller.set_pointer_ndc(screen_to_ndc(rect, pos));
        }

        let painter = ui.painter_at(rect);
        match self.controller.frame() {
            Some(view) => {
                self.last_triangles = paint_scene(&painter, rect, &view, self.render_mode);

                // Label next to the pointer while hovering
                if let (Some(node), Some(pos)) = (&self.hovered, response.hover_pos()) {
                    painter.text(
                        pos + egui::vec2(14.0, -14.0),
                        egui::Align2::LEFT_BOTTOM,
                        &node.query,
                        egui::FontId::proportional(14.0),
                        egui::Color32::WHITE,
                    );
                }
            }
            None => {
                painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(11, 16, 28));
                let msg = if self.loading { "Loading scene…" } else { "No scene loaded" };
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    msg,
                    egui::FontId::proportional(16.0),
                    egui::Color32::GRAY,
                );
            }
        }
    }
}
