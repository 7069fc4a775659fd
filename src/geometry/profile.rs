//! Height-profile interpolation over sparse `(x, height)` samples.

use crate::data::TerrainPoint;

/// Guards the segment ratio when two samples share an x.
pub const SEGMENT_EPSILON: f32 = 1e-6;

#[inline(always)]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Piecewise-linear height curve, clamped at both ends.
///
/// Non-empty by construction: an empty profile has no domain, and callers
/// must handle that case before sampling.
#[derive(Debug, Clone)]
pub struct HeightProfile {
    samples: Vec<(f32, f32)>,
}

impl HeightProfile {
    /// `samples` must be ordered by non-decreasing x. Returns `None` if empty.
    pub fn new(samples: Vec<(f32, f32)>) -> Option<Self> {
        if samples.is_empty() {
            None
        } else {
            Some(Self { samples })
        }
    }

    pub fn from_points(points: &[TerrainPoint]) -> Option<Self> {
        Self::new(points.iter().map(|p| (p.x, p.height)).collect())
    }

    pub fn last_x(&self) -> f32 {
        self.samples[self.samples.len() - 1].0
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Height at `x`.
    ///
    /// Left of the first sample → first height; right of the last → last
    /// height; otherwise the first segment with `cur.x <= x <= next.x` wins,
    /// so a query exactly on a shared sample resolves to the earlier segment.
    pub fn height_at(&self, x: f32) -> f32 {
        let first = self.samples[0];
        if x <= first.0 {
            return first.1;
        }
        for pair in self.samples.windows(2) {
            let (cur, next) = (pair[0], pair[1]);
            if x >= cur.0 && x <= next.0 {
                let ratio = (x - cur.0) / (next.0 - cur.0).max(SEGMENT_EPSILON);
                return lerp(cur.1, next.1, ratio);
            }
        }
        self.samples[self.samples.len() - 1].1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(samples: &[(f32, f32)]) -> HeightProfile {
        HeightProfile::new(samples.to_vec()).unwrap()
    }

    #[test]
    fn empty_profile_has_no_domain() {
        assert!(HeightProfile::new(Vec::new()).is_none());
        assert!(HeightProfile::from_points(&[]).is_none());
    }

    #[test]
    fn linear_midpoint() {
        let p = profile(&[(0.0, 10.0), (10.0, 20.0)]);
        assert_eq!(p.height_at(5.0), 15.0);
    }

    #[test]
    fn clamps_at_both_edges() {
        let p = profile(&[(2.0, 7.0), (4.0, -1.0), (9.0, 3.5)]);
        for x in [-100.0, 0.0, 1.999, 2.0] {
            assert_eq!(p.height_at(x), 7.0, "left clamp at {x}");
        }
        for x in [9.0, 9.001, 1e6] {
            assert_eq!(p.height_at(x), 3.5, "right clamp at {x}");
        }
    }

    #[test]
    fn single_sample_is_flat() {
        let p = profile(&[(5.0, 12.0)]);
        assert_eq!(p.height_at(-1.0), 12.0);
        assert_eq!(p.height_at(5.0), 12.0);
        assert_eq!(p.height_at(50.0), 12.0);
    }

    #[test]
    fn duplicate_x_does_not_divide_by_zero() {
        let p = profile(&[(0.0, 0.0), (5.0, 10.0), (5.0, 30.0), (10.0, 30.0)]);
        // first matching segment [0,5] wins at the shared x
        assert_eq!(p.height_at(5.0), 10.0);
        assert!((p.height_at(7.5) - 30.0).abs() < 1e-5);
        assert!(p.height_at(5.0).is_finite());
    }

    #[test]
    fn interior_samples_are_hit_exactly() {
        let p = profile(&[(0.0, 1.0), (1.0, 4.0), (3.0, 2.0)]);
        assert_eq!(p.height_at(1.0), 4.0);
        assert!((p.height_at(2.0) - 3.0).abs() < 1e-6);
    }
}
