//! Scene controller: owns one scene generation at a time and runs the
//! per-frame loop.
//!
//! Frame order is fixed: controls update → pick (may restyle markers and
//! notify the hover observer) → hand the view to the renderer. After
//! [`SceneController::unmount`] nothing runs again: `frame` returns `None`,
//! and loads are ignored.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::palette::Color;
use super::resources::{GeometryDesc, MaterialDesc, ResourceAllocator, ResourceBatch};
use super::visuals::{self, VisualStyle};
use super::{MarkerLayout, QueryMesh};
use crate::config::SceneConfig;
use crate::data::{QueryId, QueryNode, SceneData};
use crate::geometry::terrain::{TerrainBuilder, TerrainMesh};
use crate::geometry::SceneFrame;
use crate::picking::{self, HoverTracker};
use crate::render::camera::{OrbitCamera, Viewport};

/// Hover observer; receives the newly hovered node, or `None` on leave.
pub type HoverCallback = Box<dyn FnMut(Option<&QueryNode>)>;

/// Everything one `SceneData` produced
struct Generation {
    number: u64,
    data: SceneData,
    terrain: TerrainMesh,
    markers: Vec<QueryMesh>,
    resources: ResourceBatch,
}

/// Borrowed scene for one rendered frame
pub struct SceneView<'a> {
    pub terrain: &'a TerrainMesh,
    pub terrain_color: Color,
    pub terrain_opacity: f32,
    pub markers: &'a [QueryMesh],
    pub camera: &'a OrbitCamera,
}

pub struct SceneController<A: ResourceAllocator> {
    cfg: SceneConfig,
    style: VisualStyle,
    allocator: A,
    scene: Option<Generation>,
    generations: u64,

    hover: HoverTracker,
    highlight_topic: Option<String>,
    /// Pointer in NDC, `None` until the first pointer event
    pointer: Option<Vec2>,
    camera: Option<OrbitCamera>,
    viewport: Option<Viewport>,
    on_hover: Option<HoverCallback>,

    rng: StdRng,
    mounted: bool,
}

impl<A: ResourceAllocator> SceneController<A> {
    pub fn new(cfg: SceneConfig, allocator: A) -> Self {
        let rng = match cfg.fallback_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            style: VisualStyle::from_config(&cfg),
            cfg,
            allocator,
            scene: None,
            generations: 0,
            hover: HoverTracker::default(),
            highlight_topic: None,
            pointer: None,
            camera: None,
            viewport: None,
            on_hover: None,
            rng,
            mounted: true,
        }
    }

    pub fn set_hover_callback(&mut self, callback: HoverCallback) {
        self.on_hover = Some(callback);
    }

    // ── Scene lifecycle ──

    /// Replace the current scene. The previous generation's resources are
    /// released before anything for `data` is allocated.
    pub fn load(&mut self, data: SceneData) {
        if !self.mounted {
            log::warn!("Scene load ignored: controller is unmounted");
            return;
        }
        self.release_current();
        if self.hover.current().is_some() {
            self.hover.reset();
            if let Some(cb) = self.on_hover.as_mut() {
                cb(None);
            }
        }
        self.highlight_topic = None;

        let frame = SceneFrame::from_data(&data, &self.cfg);
        let terrain = TerrainBuilder::new(&self.cfg).build(&data, &frame);
        let mut markers = MarkerLayout::new(&self.cfg).layout(&data, &frame, &mut self.rng);
        visuals::refresh(&mut markers, &data, None, None, &self.style);

        let mut resources = ResourceBatch::new();
        resources.geometry(
            &mut self.allocator,
            &GeometryDesc::Terrain {
                vertices: terrain.vertex_count(),
                triangles: terrain.triangle_count(),
            },
        );
        resources.material(
            &mut self.allocator,
            &MaterialDesc {
                color: Color::from_hex(self.cfg.terrain_color),
                opacity: self.cfg.terrain_opacity,
                transparent: self.cfg.terrain_opacity < 1.0,
            },
        );
        if !markers.is_empty() {
            resources.geometry(
                &mut self.allocator,
                &GeometryDesc::MarkerSphere {
                    radius: self.cfg.marker_radius,
                },
            );
        }
        for marker in &markers {
            let desc = MaterialDesc {
                color: marker.visual.color,
                opacity: marker.visual.opacity,
                transparent: marker.visual.transparent,
            };
            resources.material(&mut self.allocator, &desc);
        }

        self.generations += 1;
        log::info!(
            "Scene generation {} loaded: {} markers, {} topics, {} terrain vertices (center x={:.2}, z={:.2})",
            self.generations,
            markers.len(),
            data.metadata.topics.len(),
            terrain.vertex_count(),
            frame.center_x,
            frame.center_z
        );
        self.scene = Some(Generation {
            number: self.generations,
            data,
            terrain,
            markers,
            resources,
        });
    }

    fn release_current(&mut self) {
        if let Some(old) = self.scene.take() {
            let count = old.resources.len();
            old.resources.release(&mut self.allocator);
            log::info!("Scene generation {} released ({} resources)", old.number, count);
        }
    }

    /// Release every resource and stop the frame loop for good.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.release_current();
        self.mounted = false;
        self.camera = None;
        self.pointer = None;
        self.on_hover = None;
        self.hover.reset();
        log::info!("Scene unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    // ── Inputs ──

    pub fn set_highlight_topic(&mut self, topic: Option<&str>) {
        if self.highlight_topic.as_deref() == topic {
            return;
        }
        self.highlight_topic = topic.map(str::to_owned);
        log::debug!("Highlight topic: {:?}", self.highlight_topic);
        self.refresh_visuals();
    }

    pub fn highlight_topic(&self) -> Option<&str> {
        self.highlight_topic.as_deref()
    }

    /// Pointer position in normalized device coordinates (+y up).
    pub fn set_pointer_ndc(&mut self, ndc: Vec2) {
        self.pointer = Some(ndc);
    }

    /// Container resized; creates the camera on first call.
    pub fn resize(&mut self, available_width: f32) -> Option<Viewport> {
        if !self.mounted {
            return None;
        }
        let viewport = Viewport::fit(available_width, &self.cfg.viewport);
        if self.viewport == Some(viewport) {
            return Some(viewport);
        }
        match self.camera.as_mut() {
            Some(camera) => camera.set_viewport(viewport),
            None => self.camera = Some(OrbitCamera::new(&self.cfg.camera, viewport)),
        }
        self.viewport = Some(viewport);
        log::debug!("Viewport resized to {:.0}x{:.0}", viewport.width, viewport.height);
        Some(viewport)
    }

    pub fn orbit(&mut self, d_azimuth: f32, d_elevation: f32) {
        if let Some(camera) = self.camera.as_mut() {
            camera.orbit(d_azimuth, d_elevation);
        }
    }

    pub fn zoom(&mut self, delta: f32) {
        if let Some(camera) = self.camera.as_mut() {
            camera.zoom(delta);
        }
    }

    // ── Frame loop ──

    /// Run one frame. `None` once unmounted, or before a camera and a
    /// scene both exist.
    pub fn frame(&mut self) -> Option<SceneView<'_>> {
        if !self.mounted {
            return None;
        }
        if let Some(camera) = self.camera.as_mut() {
            camera.update();
        }
        self.pick();

        let scene = self.scene.as_ref()?;
        let camera = self.camera.as_ref()?;
        log::trace!("Frame: generation {}, {} markers", scene.number, scene.markers.len());
        Some(SceneView {
            terrain: &scene.terrain,
            terrain_color: Color::from_hex(self.cfg.terrain_color),
            terrain_opacity: self.cfg.terrain_opacity,
            markers: &scene.markers,
            camera,
        })
    }

    /// Pick step: skipped until both a pointer and a camera exist.
    fn pick(&mut self) {
        let (Some(pointer), Some(camera), Some(scene)) =
            (self.pointer, self.camera.as_ref(), self.scene.as_mut())
        else {
            return;
        };
        let Some(ray) = camera.ray_from_ndc(pointer) else {
            return;
        };

        // Resolve through the hit marker's back-reference, never by identity
        let picked = picking::pick_nearest(&ray, &scene.markers).and_then(|i| {
            let node_index = scene.markers[i].node_index;
            scene
                .data
                .queries
                .get(node_index)
                .map(|node| (QueryId::of(node), node_index))
        });
        if !self.hover.observe(picked) {
            return;
        }

        log::debug!(
            "Hover changed: {}",
            self.hover.current().map_or_else(|| "none".to_string(), |id| id.to_string())
        );
        visuals::refresh(
            &mut scene.markers,
            &scene.data,
            self.hover.current(),
            self.highlight_topic.as_deref(),
            &self.style,
        );
        if let Some(cb) = self.on_hover.as_mut() {
            let node = self.hover.node_index().and_then(|i| scene.data.queries.get(i));
            cb(node);
        }
    }

    fn refresh_visuals(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            visuals::refresh(
                &mut scene.markers,
                &scene.data,
                self.hover.current(),
                self.highlight_topic.as_deref(),
                &self.style,
            );
        }
    }

    // ── Accessors ──

    pub fn config(&self) -> &SceneConfig {
        &self.cfg
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    pub fn data(&self) -> Option<&SceneData> {
        self.scene.as_ref().map(|s| &s.data)
    }

    pub fn markers(&self) -> &[QueryMesh] {
        self.scene.as_ref().map_or(&[], |s| s.markers.as_slice())
    }

    pub fn terrain(&self) -> Option<&TerrainMesh> {
        self.scene.as_ref().map(|s| &s.terrain)
    }

    pub fn camera(&self) -> Option<&OrbitCamera> {
        self.camera.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generations
    }

    pub fn hovered(&self) -> Option<&QueryNode> {
        let index = self.hover.node_index()?;
        self.data()?.queries.get(index)
    }
}

impl<A: ResourceAllocator> Drop for SceneController<A> {
    fn drop(&mut self) {
        self.unmount();
    }
}
