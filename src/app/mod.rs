//! `SearchscapeApp`: the top-level egui application state.
//!
//! This module declares the `SearchscapeApp` struct and its constructor.
//! Methods are split across the sibling sub-modules:
//!
//! - `source`: scene sources and the background load lifecycle
//! - `toolbar`: source label, reload, render mode
//! - `content`: the 3-D viewport (input → controller frame → painter)
//! - `inspector`: topic highlight picker, hovered query details, stats

pub mod content;
pub mod demo;
pub mod inspector;
pub mod source;
pub mod toolbar;

use std::sync::mpsc;

use eframe::egui;

use searchscape::render::RenderMode;
use searchscape::scene::resources::CountingAllocator;
use searchscape::{QueryNode, SceneConfig, SceneController, SceneData, SceneResult};

use source::SceneSource;

// ─── Application state ───────────────────────────────────────────────────────

pub struct SearchscapeApp {
    pub controller: SceneController<CountingAllocator>,
    pub source: SceneSource,
    pub loading: bool,
    pub error: Option<String>,
    pub load_rx: Option<mpsc::Receiver<SceneResult<SceneData>>>,
    /// Hover notifications from the controller's pick loop
    pub hover_rx: mpsc::Receiver<Option<QueryNode>>,
    pub hovered: Option<QueryNode>,
    /// Highlight filter chosen in the inspector (`None` = All)
    pub topic_filter: Option<String>,
    pub render_mode: RenderMode,
    pub show_stats: bool,
    /// Triangles drawn in the last frame
    pub last_triangles: usize,
}

impl SearchscapeApp {
    pub fn new(ctx: &egui::Context, cfg: SceneConfig, source: SceneSource) -> Self {
        let (hover_tx, hover_rx) = mpsc::channel();
        let mut controller = SceneController::new(cfg, CountingAllocator::default());
        controller.set_hover_callback(Box::new(move |node: Option<&QueryNode>| {
            let _ = hover_tx.send(node.cloned());
        }));

        let mut app = Self {
            controller,
            source,
            loading: false,
            error: None,
            load_rx: None,
            hover_rx,
            hovered: None,
            topic_filter: None,
            render_mode: RenderMode::default(),
            show_stats: true,
            last_triangles: 0,
        };
        app.start_load(ctx);
        app
    }

    /// Keep only the latest hover notification.
    pub fn drain_hover(&mut self) {
        while let Ok(node) = self.hover_rx.try_recv() {
            self.hovered = node;
        }
    }
}

impl eframe::App for SearchscapeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load();
        self.drain_hover();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui, ctx);
        });

        if self.show_stats {
            egui::TopBottomPanel::bottom("stats").show(ctx, |ui| {
                self.draw_stats(ui);
            });
        }

        egui::SidePanel::right("inspector")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                self.draw_inspector(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_viewport(ui);
        });

        // Free-running frame loop: picking tracks camera motion too
        ctx.request_repaint();
    }
}
