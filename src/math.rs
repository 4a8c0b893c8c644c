//! Planar math helpers shared by the simulation
//!
//! Everything is built on `glam::DVec2`. Degenerate geometry never panics:
//! normalizing a zero-length vector yields the zero vector
//! (`normalize_or_zero`), and projecting onto a degenerate axis yields the
//! zero projection. Collision code relies on this to turn coincident points
//! into a zero correction instead of a NaN.

use glam::DVec2;

use crate::consts::DEGENERATE_AXIS_SQ;

/// Project `v` onto `axis` (dot-projection).
///
/// Returns the zero vector when `axis` is degenerate.
#[inline]
pub fn project(v: DVec2, axis: DVec2) -> DVec2 {
    let len_sq = axis.length_squared();
    if len_sq < DEGENERATE_AXIS_SQ {
        DVec2::ZERO
    } else {
        axis * (v.dot(axis) / len_sq)
    }
}

/// Whether `a` and `b` lie within `radius` of each other.
///
/// Compares squared distances, so a zero or negative radius never matches.
#[inline]
pub fn within(a: DVec2, b: DVec2, radius: f64) -> bool {
    radius > 0.0 && a.distance_squared(b) < radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_onto_axis() {
        let v = DVec2::new(3.0, 4.0);
        let p = project(v, DVec2::new(10.0, 0.0));
        assert!((p.x - 3.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
    }

    #[test]
    fn project_degenerate_axis_is_zero() {
        let p = project(DVec2::new(3.0, 4.0), DVec2::ZERO);
        assert_eq!(p, DVec2::ZERO);
    }

    #[test]
    fn within_combined_radius() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(3.0, 4.0);
        assert!(within(a, b, 5.1));
        assert!(!within(a, b, 5.0)); // strict
        assert!(!within(a, b, 0.0));
    }
}
