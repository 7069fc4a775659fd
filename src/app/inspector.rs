//! Side panel (topic highlight + hovered query inspector) and the bottom
//! stats line.

use eframe::egui;

use super::SearchscapeApp;

impl SearchscapeApp {
    pub fn draw_inspector(&mut self, ui: &mut egui::Ui) {
        ui.heading("Topics");

        let topics: Vec<String> = self
            .controller
            .data()
            .map(|d| d.topic_names().map(str::to_owned).collect())
            .unwrap_or_default();

        let before = self.topic_filter.clone();
        egui::ComboBox::from_label("Highlight")
            .selected_text(self.topic_filter.as_deref().unwrap_or("All"))
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.topic_filter, None, "All");
                for topic in &topics {
                    ui.selectable_value(&mut self.topic_filter, Some(topic.clone()), topic);
                }
            });
        if self.topic_filter != before {
            self.controller.set_highlight_topic(self.topic_filter.as_deref());
        }

        if let Some(data) = self.controller.data() {
            let meta = &data.metadata;
            ui.weak(format!("{} → {}", meta.start, meta.end));
            ui.weak(format!("{}-minute buckets", meta.bucket_minutes));
        }

        ui.separator();
        ui.heading("Hovered query");

        let Some(node) = &self.hovered else {
            ui.weak("Point at a marker");
            return;
        };
        egui::Grid::new("hovered_query")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                let m = &node.metrics;
                for (key, value) in [
                    ("Query", node.query.clone()),
                    ("Topic", node.topic.clone()),
                    ("Time", node.timestamp.clone()),
                    ("Session", node.session_id.clone()),
                    ("Clicks", m.clicks.to_string()),
                    ("Dwell", format!("{:.1} s", m.dwell_seconds)),
                    ("Results", m.results.to_string()),
                    ("Engagement", format!("{:.3}", m.engagement)),
                ] {
                    ui.label(key);
                    ui.label(value);
                    ui.end_row();
                }
            });
    }

    pub fn draw_stats(&self, ui: &mut egui::Ui) {
        let markers = self.controller.markers().len();
        let vertices = self.controller.terrain().map_or(0, |t| t.vertex_count());
        ui.horizontal(|ui| {
            ui.label(format!("markers: {markers}"));
            ui.separator();
            ui.label(format!("terrain vertices: {vertices}"));
            ui.separator();
            ui.label(format!("triangles drawn: {}", self.last_triangles));
            ui.separator();
            ui.label(format!("generation: {}", self.controller.generation()));
            if let Some(topic) = self.controller.highlight_topic() {
                ui.separator();
                ui.label(format!("highlight: {topic}"));
            }
        });
    }
}
