//! Toolbar rendering for `SearchscapeApp`.
//!
//! Shows the scene source, a reload button, the terrain render-mode
//! selector and the stats toggle.

use eframe::egui;
use searchscape::render::RenderMode;

use super::SearchscapeApp;

impl SearchscapeApp {
    /// Render the top toolbar strip.
    pub fn draw_toolbar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            ui.add_space(4.0);
            ui.strong("Searchscape");
            ui.separator();
            ui.label(egui::RichText::new(self.source.to_string()).monospace());

            if ui
                .add_enabled(!self.loading, egui::Button::new("\u{21BB} Reload"))
                .clicked()
            {
                self.start_load(ctx);
            }
            if self.loading {
                ui.spinner();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.checkbox(&mut self.show_stats, "Stats");
                egui::ComboBox::from_id_salt("render_mode")
                    .selected_text(self.render_mode.label())
                    .show_ui(ui, |ui| {
                        for mode in [RenderMode::Shaded, RenderMode::Wireframe] {
                            ui.selectable_value(&mut self.render_mode, mode, mode.label());
                        }
                    });
            });
        });

        if let Some(err) = &self.error {
            ui.colored_label(egui::Color32::from_rgb(230, 90, 80), err);
        }
    }
}
