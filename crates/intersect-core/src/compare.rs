use geom_core::Point3d;
use serde::{Deserialize, Serialize};

/// A measured value carrying the uncertainty radius of its owning entity.
///
/// Equality between tolerant scalars is decided by the larger of the two
/// tolerances; there is deliberately no `PartialEq` against bare `f64`,
/// because default comparison epsilons are a primary source of
/// non-determinism in geometric kernels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TolerantScalar {
    pub value: f64,
    pub tol: f64,
}

impl TolerantScalar {
    pub fn new(value: f64, tol: f64) -> Self {
        Self { value, tol }
    }

    /// `|a - b| <= max(tol_a, tol_b)`.
    pub fn coincident(&self, other: &Self) -> bool {
        (self.value - other.value).abs() <= self.tol.max(other.tol)
    }
}

/// Tolerant scalar coincidence over raw values.
pub fn params_coincident(a: f64, a_tol: f64, b: f64, b_tol: f64) -> bool {
    (a - b).abs() <= a_tol.max(b_tol)
}

/// Tolerant point coincidence: Euclidean distance at most the combined
/// (summed) tolerance of the two entities.
pub fn points_coincident(a: &Point3d, a_tol: f64, b: &Point3d, b_tol: f64) -> bool {
    a.distance_to(b) <= a_tol + b_tol
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_coincidence_uses_larger_tolerance() {
        let a = TolerantScalar::new(1.0, 0.001);
        let b = TolerantScalar::new(1.0005, 0.0001);
        // Gap 5e-4 is inside a's tolerance even though it exceeds b's.
        assert!(a.coincident(&b));
        assert!(b.coincident(&a));
    }

    #[test]
    fn test_scalar_coincidence_boundary() {
        let a = TolerantScalar::new(0.0, 0.5);
        let b = TolerantScalar::new(0.5, 0.1);
        // Exactly at the larger tolerance counts as coincident.
        assert!(a.coincident(&b));
        let c = TolerantScalar::new(0.5000001, 0.1);
        assert!(!a.coincident(&c));
    }

    #[test]
    fn test_scalar_not_coincident() {
        let a = TolerantScalar::new(1.0, 1e-7);
        let b = TolerantScalar::new(1.001, 1e-7);
        assert!(!a.coincident(&b));
    }

    #[test]
    fn test_point_coincidence_sums_tolerances() {
        let a = Point3d::new(0.0, 0.0, 0.0);
        let b = Point3d::new(0.0, 0.0, 0.003);
        assert!(points_coincident(&a, 0.002, &b, 0.001));
        assert!(!points_coincident(&a, 0.001, &b, 0.001));
    }

    #[test]
    fn test_params_coincident_symmetry() {
        assert_eq!(
            params_coincident(2.0, 1e-3, 2.0005, 1e-4),
            params_coincident(2.0005, 1e-4, 2.0, 1e-3)
        );
    }
}
