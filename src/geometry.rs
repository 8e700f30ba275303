//! Geometric primitives shared across the sweep and the finishing passes
//!
//! Vertices are plain `glam::DVec2` values. An edge endpoint that has not
//! been computed yet is marked with the [`UNDEFINED`] sentinel (both
//! coordinates NaN). Endpoint *identity* checks during cell closing use
//! exact floating-point equality; *geometric* comparisons go through the
//! epsilon helpers below.

use glam::DVec2;

/// A 2D vertex of the diagram
pub type Vertex = DVec2;

/// Sentinel for an edge endpoint that has not been computed yet
pub const UNDEFINED: Vertex = DVec2::NAN;

/// Tolerance for geometric comparisons during clipping and closing
pub(crate) const EPSILON: f64 = 1e-9;

/// Whether a vertex holds real coordinates (not the [`UNDEFINED`] sentinel)
#[inline]
pub fn is_defined(v: Vertex) -> bool {
    !v.x.is_nan() && !v.y.is_nan()
}

#[inline]
pub(crate) fn eq_eps(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

#[inline]
pub(crate) fn gt_eps(a: f64, b: f64) -> bool {
    a - b > EPSILON
}

#[inline]
pub(crate) fn lt_eps(a: f64, b: f64) -> bool {
    b - a > EPSILON
}

/// Exact-equality identity check between two (possibly undefined) vertices
#[inline]
pub(crate) fn same_vertex(a: Vertex, b: Vertex) -> bool {
    a.x == b.x && a.y == b.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_sentinel() {
        assert!(!is_defined(UNDEFINED));
        assert!(is_defined(Vertex::new(0.0, 0.0)));
        assert!(!is_defined(Vertex::new(f64::NAN, 1.0)));
        assert!(!is_defined(Vertex::new(1.0, f64::NAN)));
    }

    #[test]
    fn test_epsilon_comparisons() {
        assert!(eq_eps(1.0, 1.0 + 1e-12));
        assert!(!eq_eps(1.0, 1.0 + 1e-6));
        assert!(gt_eps(1.0 + 1e-6, 1.0));
        assert!(!gt_eps(1.0 + 1e-12, 1.0));
        assert!(lt_eps(1.0, 1.0 + 1e-6));
    }

    #[test]
    fn test_same_vertex_is_exact() {
        let a = Vertex::new(3.0, 4.0);
        assert!(same_vertex(a, a));
        assert!(!same_vertex(a, Vertex::new(3.0 + 1e-15, 4.0)));
        // NaN sentinel never equals anything, including itself
        assert!(!same_vertex(UNDEFINED, UNDEFINED));
    }
}
