//! Orbit camera, viewport sizing and projection.
//!
//! The camera orbits a target on a sphere (azimuth around +Y, elevation
//! above the horizon). Input is queued and applied a damped fraction per
//! frame by [`OrbitCamera::update`], so motion eases out after a drag.

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

use crate::config::{CameraConfig, ViewportConfig};
use crate::picking::Ray;

/// Queued deltas below this are dropped
const SETTLE_EPSILON: f32 = 1e-5;
/// Keep the eye off the pole so `look_at` keeps a valid up vector
const MIN_POLAR: f32 = 1e-3;

/// Render-target size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Size the canvas for a container of `available_width` pixels.
    ///
    /// Width clamps to `[min_width, max_width]`; height follows
    /// `width * height_ratio`, clamped to `[min_height, max_height]`.
    pub fn fit(available_width: f32, cfg: &ViewportConfig) -> Self {
        let width = available_width.clamp(cfg.min_width, cfg.max_width);
        let height = (width * cfg.height_ratio).clamp(cfg.min_height, cfg.max_height);
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    /// Pixel offset inside the viewport → NDC (+y up)
    pub fn to_ndc(&self, px: Vec2) -> Vec2 {
        Vec2::new(
            px.x / self.width * 2.0 - 1.0,
            1.0 - px.y / self.height * 2.0,
        )
    }

    /// NDC → pixel offset inside the viewport
    pub fn to_pixels(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        )
    }
}

/// Perspective camera with damped orbit controls
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Horizontal orbit angle in radians (0 = looking down -Z from +Z)
    pub azimuth: f32,
    /// Angle above the horizon in radians
    pub elevation: f32,
    /// Distance from the eye to the target
    pub distance: f32,
    pub target: Vec3,

    fov_y: f32,
    near: f32,
    far: f32,
    aspect: f32,
    max_polar: f32,
    damping: f32,
    min_distance: f32,
    max_distance: f32,

    pending_orbit: Vec2,
    /// Queued zoom in log-distance units
    pending_zoom: f32,
}

impl OrbitCamera {
    pub fn new(cfg: &CameraConfig, viewport: Viewport) -> Self {
        let target = Vec3::from(cfg.target);
        let offset = Vec3::from(cfg.eye) - target;
        let distance = offset.length().max(cfg.min_distance);
        let polar = (offset.y / distance).clamp(-1.0, 1.0).acos();

        let mut cam = Self {
            azimuth: offset.x.atan2(offset.z),
            elevation: std::f32::consts::FRAC_PI_2 - polar,
            distance: distance.clamp(cfg.min_distance, cfg.max_distance),
            target,
            fov_y: cfg.fov_deg.to_radians(),
            near: cfg.near,
            far: cfg.far,
            aspect: viewport.aspect(),
            max_polar: cfg.max_polar,
            damping: cfg.damping.clamp(0.0, 1.0),
            min_distance: cfg.min_distance,
            max_distance: cfg.max_distance,
            pending_orbit: Vec2::ZERO,
            pending_zoom: 0.0,
        };
        cam.constrain();
        cam
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    /// Horizontal field of view for the current aspect
    pub fn fov_x(&self) -> f32 {
        2.0 * ((self.fov_y * 0.5).tan() * self.aspect).atan()
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();
        self.target + self.distance * Vec3::new(cos_el * sin_az, sin_el, cos_el * cos_az)
    }

    /// Queue an orbit by (azimuth, elevation) radians.
    pub fn orbit(&mut self, d_azimuth: f32, d_elevation: f32) {
        self.pending_orbit += Vec2::new(d_azimuth, d_elevation);
    }

    /// Queue a zoom; positive moves closer.
    pub fn zoom(&mut self, delta: f32) {
        self.pending_zoom += delta;
    }

    /// Controls step: apply a damped share of the queued input.
    /// Returns `true` while the camera is still moving.
    pub fn update(&mut self) -> bool {
        let moving = self.pending_orbit.length_squared() > SETTLE_EPSILON * SETTLE_EPSILON
            || self.pending_zoom.abs() > SETTLE_EPSILON;
        if !moving {
            self.pending_orbit = Vec2::ZERO;
            self.pending_zoom = 0.0;
            return false;
        }

        let orbit = self.pending_orbit * self.damping;
        let zoom = self.pending_zoom * self.damping;
        self.pending_orbit -= orbit;
        self.pending_zoom -= zoom;

        self.azimuth += orbit.x;
        self.elevation += orbit.y;
        self.distance *= (-zoom).exp();
        self.constrain();
        true
    }

    fn constrain(&mut self) {
        let half_pi = std::f32::consts::FRAC_PI_2;
        // polar = pi/2 - elevation, kept in [MIN_POLAR, max_polar]
        self.elevation = self
            .elevation
            .clamp(half_pi - self.max_polar, half_pi - MIN_POLAR);
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
        self.azimuth = self.azimuth.rem_euclid(std::f32::consts::TAU);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World ray through an NDC point (+y up).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray> {
        let inv = self.view_projection().inverse();
        let near = inv.project_point3(ndc.extend(-1.0));
        let far = inv.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }

    /// World point → (NDC x, NDC y, NDC depth); `None` behind the near plane.
    pub fn project(&self, world: Vec3) -> Option<Vec3> {
        self.project_with(&self.view_projection(), world)
    }

    /// [`project`](Self::project) with a precomputed view-projection,
    /// for projecting many points per frame.
    pub fn project_with(&self, view_proj: &Mat4, world: Vec3) -> Option<Vec3> {
        let clip = *view_proj * world.extend(1.0);
        if clip.w <= self.near {
            return None;
        }
        Some(clip.xyz() / clip.w)
    }

    /// Screen-space radius in pixels of a sphere of `radius` at `world`.
    pub fn projected_radius(&self, world: Vec3, radius: f32, viewport: Viewport) -> f32 {
        let dist = (world - self.eye()).length().max(self.near);
        let focal = viewport.height * 0.5 / (self.fov_y * 0.5).tan();
        radius * focal / dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::fit(800.0, &ViewportConfig::default())
    }

    fn camera() -> OrbitCamera {
        OrbitCamera::new(&CameraConfig::default(), viewport())
    }

    #[test]
    fn viewport_clamps() {
        let cfg = ViewportConfig::default();
        let small = Viewport::fit(100.0, &cfg);
        assert_eq!(small.width, 320.0);
        assert_eq!(small.height, 420.0);
        let wide = Viewport::fit(5000.0, &cfg);
        assert_eq!(wide.width, 1100.0);
        assert!((wide.height - 605.0).abs() < 1e-3);
        let tall = Viewport::fit(1100.0, &ViewportConfig { height_ratio: 1.0, ..cfg });
        assert_eq!(tall.height, 660.0);
    }

    #[test]
    fn ndc_pixel_roundtrip_corners() {
        let vp = Viewport { width: 400.0, height: 200.0 };
        assert_eq!(vp.to_ndc(Vec2::new(0.0, 0.0)), Vec2::new(-1.0, 1.0));
        assert_eq!(vp.to_ndc(Vec2::new(200.0, 100.0)), Vec2::ZERO);
        assert_eq!(vp.to_pixels(Vec2::new(1.0, -1.0)), Vec2::new(400.0, 200.0));
    }

    #[test]
    fn initial_eye_matches_config() {
        let cam = camera();
        let eye = cam.eye();
        assert!((eye - Vec3::new(80.0, 60.0, 80.0)).length() < 1e-3, "eye = {eye:?}");
    }

    #[test]
    fn horizontal_fov_follows_aspect() {
        let mut cam = camera();
        cam.set_viewport(Viewport { width: 500.0, height: 500.0 });
        assert!((cam.fov_x() - cam.fov_y()).abs() < 1e-5);
        cam.set_viewport(Viewport { width: 1000.0, height: 500.0 });
        assert!(cam.fov_x() > cam.fov_y());
        assert_eq!(cam.aspect(), 2.0);
    }

    #[test]
    fn center_ray_hits_target() {
        let cam = camera();
        let ray = cam.ray_from_ndc(Vec2::ZERO).unwrap();
        let to_target = (cam.target - ray.origin).normalize();
        assert!(ray.dir.dot(to_target) > 0.9999);
    }

    #[test]
    fn target_projects_to_center() {
        let cam = camera();
        let ndc = cam.project(cam.target).unwrap();
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
        let behind = cam.eye() + (cam.eye() - cam.target);
        assert!(cam.project(behind).is_none());
    }

    #[test]
    fn damping_eases_toward_queued_orbit() {
        let mut cam = camera();
        let start = cam.azimuth;
        cam.orbit(0.5, 0.0);
        assert!(cam.update());
        let first = cam.azimuth - start;
        assert!((first - 0.025).abs() < 1e-5, "first step is damping * delta");
        for _ in 0..2000 {
            cam.update();
        }
        assert!(((cam.azimuth - start) - 0.5).abs() < 1e-3);
        assert!(!cam.update(), "settled");
    }

    #[test]
    fn polar_angle_is_limited() {
        let mut cam = camera();
        cam.orbit(0.0, -10.0);
        for _ in 0..2000 {
            cam.update();
        }
        let polar = std::f32::consts::FRAC_PI_2 - cam.elevation;
        assert!(polar <= CameraConfig::default().max_polar + 1e-5);
        assert!(cam.eye().y > cam.target.y, "never dips below the horizon");
    }

    #[test]
    fn zoom_respects_distance_limits() {
        let mut cam = camera();
        cam.zoom(50.0);
        for _ in 0..2000 {
            cam.update();
        }
        assert_eq!(cam.distance, 5.0);
        cam.zoom(-50.0);
        for _ in 0..2000 {
            cam.update();
        }
        assert_eq!(cam.distance, 600.0);
    }
}
