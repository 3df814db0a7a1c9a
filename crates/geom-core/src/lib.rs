//! Geometric substrate for the intersection-consolidation core.
//!
//! Provides the analytic curve and surface primitives the consolidation
//! layer evaluates against, together with the evaluator traits
//! (`CurveEval`, `SurfaceEval`) that stand in for the surrounding
//! kernel's geometry adaptors. Nothing in this crate owns topology;
//! every entity carries its own tolerance and is handed to the
//! consolidation layer by value or by reference.

pub mod curves;
pub mod point;
pub mod surfaces;
pub mod vector;

pub use curves::{Curve, CurveEval, CurveSegment};
pub use point::Point3d;
pub use surfaces::{Surface, SurfaceEval};
pub use vector::Vec3;

/// Comparison tolerances for analytic classification decisions
/// (parallelism, coincidence of axes, parameter-space equality).
///
/// Per-entity distance tolerances travel with the entities themselves;
/// this struct only covers the classification thresholds that have no
/// owning entity.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Distances below this are treated as geometric coincidence (model units).
    pub coincidence: f64,
    /// Angles below this (radians) are treated as zero.
    pub angular: f64,
    /// Parameter-space tolerance for curve/surface parameters.
    pub parametric: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coincidence: 1e-7,
            angular: 1e-10,
            parametric: 1e-9,
        }
    }
}

impl Tolerance {
    pub fn is_zero_length(&self, length: f64) -> bool {
        length.abs() < self.coincidence
    }

    pub fn is_zero_angle(&self, angle: f64) -> bool {
        angle.abs() < self.angular
    }

    pub fn same_parameter(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.parametric
    }
}
