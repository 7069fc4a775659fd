//! Scene sources and the asynchronous load lifecycle for `SearchscapeApp`.
//!
//! Loading (file read, JSON parse, log ingest) runs on a worker thread; the
//! result comes back over an `mpsc` channel polled once per frame by
//! `check_load`.

use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc;

use eframe::egui;

use searchscape::data::ingest::{self, IngestConfig};
use searchscape::{SceneData, SceneResult};

use super::{demo, SearchscapeApp};

/// Where the scene comes from
#[derive(Debug, Clone)]
pub enum SceneSource {
    /// A `SceneData` JSON file
    File(PathBuf),
    /// A raw search log (`.csv` or JSON array), ingested on load
    Events(PathBuf),
    /// Built-in demo log
    Demo,
}

impl fmt::Display for SceneSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneSource::File(p) => write!(f, "scene {}", p.display()),
            SceneSource::Events(p) => write!(f, "events {}", p.display()),
            SceneSource::Demo => write!(f, "demo log"),
        }
    }
}

impl SceneSource {
    /// Blocking load; run off the UI thread. `ingest_cfg` shapes raw logs.
    pub fn load(&self, ingest_cfg: &IngestConfig) -> SceneResult<SceneData> {
        match self {
            SceneSource::File(path) => SceneData::load(path),
            SceneSource::Events(path) => {
                let events = ingest::load_events(path)?;
                ingest::build_scene(&events, ingest_cfg)
            }
            SceneSource::Demo => ingest::build_scene(&demo::events(), ingest_cfg),
        }
    }
}

impl SearchscapeApp {
    /// Start loading `self.source` in the background.
    pub fn start_load(&mut self, ctx: &egui::Context) {
        if self.loading {
            return;
        }
        self.loading = true;
        self.error = None;

        let (tx, rx) = mpsc::channel();
        self.load_rx = Some(rx);
        let source = self.source.clone();
        let ingest_cfg = self.controller.config().ingest.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = source.load(&ingest_cfg);
            let _ = tx.send(result);
            ctx.request_repaint();
        });
    }

    /// Poll the load channel; hand a finished scene to the controller.
    pub fn check_load(&mut self) {
        let Some(rx) = &self.load_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(data)) => {
                // Reload clears the highlight; re-apply the filter if the
                // topic still exists
                let filter = self
                    .topic_filter
                    .take()
                    .filter(|t| data.topic_names().any(|name| name == t));
                self.controller.load(data);
                self.controller.set_highlight_topic(filter.as_deref());
                self.topic_filter = filter;
                self.hovered = None;
                self.loading = false;
                self.load_rx = None;
            }
            Ok(Err(e)) => {
                log::error!("Failed to load {}: {}", self.source, e);
                self.error = Some(format!("{} error: {}", e.category(), e));
                self.loading = false;
                self.load_rx = None;
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                self.error = Some("loader thread exited".into());
                self.loading = false;
                self.load_rx = None;
            }
        }
    }
}
