//! Pointer picking: ray / sphere intersection against the marker batch and
//! the change-gated hover state machine.

use glam::Vec3;

use crate::data::QueryId;
use crate::scene::QueryMesh;

/// World-space ray with a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    /// `None` when `dir` has no length
    pub fn new(origin: Vec3, dir: Vec3) -> Option<Self> {
        dir.try_normalize().map(|dir| Self { origin, dir })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Distance along `ray` to the first hit on the sphere, if any.
///
/// An origin inside the sphere hits at the exit point.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let near = -b - sq;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + sq;
    (far >= 0.0).then_some(far)
}

/// Nearest marker hit by `ray`, linear scan. Returns the mesh index.
pub fn pick_nearest(ray: &Ray, meshes: &[QueryMesh]) -> Option<usize> {
    let mut best_idx = None;
    let mut best_t = f32::MAX;
    for (i, mesh) in meshes.iter().enumerate() {
        if let Some(t) = ray_sphere(ray, mesh.position, mesh.pick_radius()) {
            if t < best_t {
                best_t = t;
                best_idx = Some(i);
            }
        }
    }
    best_idx
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HoverState {
    #[default]
    Unhovered,
    /// `node_index` is the record the hit marker points back to; `id` gates
    /// change notifications.
    Hovering { id: QueryId, node_index: usize },
}

impl HoverState {
    pub fn identity(&self) -> Option<&QueryId> {
        match self {
            HoverState::Unhovered => None,
            HoverState::Hovering { id, .. } => Some(id),
        }
    }

    pub fn node_index(&self) -> Option<usize> {
        match self {
            HoverState::Unhovered => None,
            HoverState::Hovering { node_index, .. } => Some(*node_index),
        }
    }
}

/// Hover state with change gating: [`observe`](Self::observe) reports a
/// transition only when the picked identity differs from the current one.
#[derive(Debug, Default)]
pub struct HoverTracker {
    state: HoverState,
}

impl HoverTracker {
    pub fn state(&self) -> &HoverState {
        &self.state
    }

    pub fn current(&self) -> Option<&QueryId> {
        self.state.identity()
    }

    /// Index into `SceneData::queries` of the hovered record
    pub fn node_index(&self) -> Option<usize> {
        self.state.node_index()
    }

    /// Feed this frame's pick result as `(identity, node index)`. `true` if
    /// the identity changed; the stored index only moves on a change.
    pub fn observe(&mut self, picked: Option<(QueryId, usize)>) -> bool {
        if self.state.identity() == picked.as_ref().map(|(id, _)| id) {
            return false;
        }
        self.state = match picked {
            Some((id, node_index)) => HoverState::Hovering { id, node_index },
            None => HoverState::Unhovered,
        };
        true
    }

    pub fn reset(&mut self) {
        self.state = HoverState::Unhovered;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::palette::Color;
    use crate::scene::visuals::MarkerVisual;

    fn marker(x: f32, z: f32) -> QueryMesh {
        QueryMesh {
            node_index: 0,
            position: Vec3::new(x, 0.0, z),
            radius: 1.0,
            base_color: Color::WHITE,
            visual: MarkerVisual::opaque(Color::WHITE),
        }
    }

    fn id(q: &str) -> QueryId {
        QueryId {
            timestamp: "2024-01-01T00:00:00".into(),
            query: q.into(),
        }
    }

    #[test]
    fn sphere_hit_distance() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z).unwrap();
        let t = ray_sphere(&ray, Vec3::ZERO, 2.0).unwrap();
        assert!((t - 8.0).abs() < 1e-5);
        assert!((ray.at(t).z + 2.0).abs() < 1e-5);
        assert!(ray_sphere(&ray, Vec3::new(5.0, 0.0, 0.0), 2.0).is_none());
    }

    #[test]
    fn sphere_behind_origin_misses() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z).unwrap();
        assert!(ray_sphere(&ray, Vec3::ZERO, 2.0).is_none());
    }

    #[test]
    fn origin_inside_sphere_hits_exit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X).unwrap();
        let t = ray_sphere(&ray, Vec3::ZERO, 3.0).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO).is_none());
    }

    #[test]
    fn nearest_marker_wins() {
        let meshes = vec![marker(0.0, 20.0), marker(0.0, 5.0), marker(3.0, 5.0)];
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z).unwrap();
        assert_eq!(pick_nearest(&ray, &meshes), Some(1));
        assert_eq!(pick_nearest(&ray, &[]), None);
    }

    #[test]
    fn hover_scale_widens_pick_radius() {
        let mut m = marker(1.2, 5.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z).unwrap();
        assert_eq!(pick_nearest(&ray, std::slice::from_ref(&m)), None);
        m.visual.scale = 1.4;
        assert_eq!(pick_nearest(&ray, std::slice::from_ref(&m)), Some(0));
    }

    #[test]
    fn tracker_reports_only_changes() {
        let mut hover = HoverTracker::default();
        assert!(!hover.observe(None));
        assert!(hover.observe(Some((id("a"), 0))));
        for _ in 0..5 {
            assert!(!hover.observe(Some((id("a"), 0))));
        }
        // switch is a single transition
        assert!(hover.observe(Some((id("b"), 1))));
        assert_eq!(
            hover.state(),
            &HoverState::Hovering {
                id: id("b"),
                node_index: 1
            }
        );
        assert!(hover.observe(None));
        assert_eq!(hover.current(), None);
        assert_eq!(hover.node_index(), None);
    }

    #[test]
    fn tracker_keeps_index_of_first_hit_for_same_identity() {
        let mut hover = HoverTracker::default();
        assert!(hover.observe(Some((id("dup"), 3))));
        // Same identity from another record is not a change
        assert!(!hover.observe(Some((id("dup"), 7))));
        assert_eq!(hover.node_index(), Some(3));
    }
}
