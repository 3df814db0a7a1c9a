use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

const TAU: f64 = 2.0 * std::f64::consts::PI;

/// Evaluator interface for parametric curves.
///
/// This is the contract the consolidation layer sees: a point query, a
/// first-derivative query, and the periodicity of the parametrization.
/// Domain bounds live on [`CurveSegment`], not on the curve itself.
pub trait CurveEval {
    fn point_at(&self, t: f64) -> Point3d;
    fn derivative_at(&self, t: f64) -> Vec3;
    /// The parameter period, or `None` for open curves.
    fn period(&self) -> Option<f64>;
    fn is_periodic(&self) -> bool {
        self.period().is_some()
    }
}

/// Analytic curve primitives recognized by the intersection fast paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Curve {
    Line(Line3d),
    Circle(Circle3d),
    Ellipse(Ellipse3d),
}

/// An infinite line; bounded segments carry their range in [`CurveSegment`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Line3d {
    pub origin: Point3d,
    /// Unit direction; the parameter is arc length along this direction.
    pub direction: Vec3,
}

impl Line3d {
    pub fn new(origin: Point3d, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn from_points(a: Point3d, b: Point3d) -> Self {
        Self::new(a, b - a)
    }

    /// Parameter of the closest point on the line to `p`.
    pub fn closest_param(&self, p: &Point3d) -> f64 {
        (*p - self.origin).dot(&self.direction)
    }

    pub fn distance_to_point(&self, p: &Point3d) -> f64 {
        let t = self.closest_param(p);
        p.distance_to(&(self.origin + self.direction * t))
    }
}

impl CurveEval for Line3d {
    fn point_at(&self, t: f64) -> Point3d {
        self.origin + self.direction * t
    }

    fn derivative_at(&self, _t: f64) -> Vec3 {
        self.direction
    }

    fn period(&self) -> Option<f64> {
        None
    }
}

/// A circle in 3D; the parameter is the angle from `x_axis` in radians.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Circle3d {
    pub center: Point3d,
    pub normal: Vec3,
    pub x_axis: Vec3,
    pub radius: f64,
}

impl Circle3d {
    pub fn new(center: Point3d, normal: Vec3, radius: f64) -> Self {
        let normal = normal.normalize();
        Self {
            center,
            normal,
            x_axis: normal.any_perpendicular(),
            radius,
        }
    }

    pub fn with_axes(center: Point3d, normal: Vec3, x_axis: Vec3, radius: f64) -> Self {
        Self {
            center,
            normal: normal.normalize(),
            x_axis: x_axis.normalize(),
            radius,
        }
    }

    fn y_axis(&self) -> Vec3 {
        self.normal.cross(&self.x_axis)
    }
}

impl CurveEval for Circle3d {
    fn point_at(&self, t: f64) -> Point3d {
        self.center
            + self.x_axis * (self.radius * t.cos())
            + self.y_axis() * (self.radius * t.sin())
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        self.x_axis * (-self.radius * t.sin()) + self.y_axis() * (self.radius * t.cos())
    }

    fn period(&self) -> Option<f64> {
        Some(TAU)
    }
}

/// An ellipse in 3D; the parameter is the eccentric angle in radians.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ellipse3d {
    pub center: Point3d,
    pub normal: Vec3,
    pub major_axis: Vec3,
    pub major_radius: f64,
    pub minor_radius: f64,
}

impl Ellipse3d {
    pub fn new(
        center: Point3d,
        normal: Vec3,
        major_axis: Vec3,
        major_radius: f64,
        minor_radius: f64,
    ) -> Self {
        Self {
            center,
            normal: normal.normalize(),
            major_axis: major_axis.normalize(),
            major_radius,
            minor_radius,
        }
    }

    fn minor_axis(&self) -> Vec3 {
        self.normal.cross(&self.major_axis)
    }
}

impl CurveEval for Ellipse3d {
    fn point_at(&self, t: f64) -> Point3d {
        self.center
            + self.major_axis * (self.major_radius * t.cos())
            + self.minor_axis() * (self.minor_radius * t.sin())
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        self.major_axis * (-self.major_radius * t.sin())
            + self.minor_axis() * (self.minor_radius * t.cos())
    }

    fn period(&self) -> Option<f64> {
        Some(TAU)
    }
}

impl CurveEval for Curve {
    fn point_at(&self, t: f64) -> Point3d {
        match self {
            Curve::Line(l) => l.point_at(t),
            Curve::Circle(c) => c.point_at(t),
            Curve::Ellipse(e) => e.point_at(t),
        }
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        match self {
            Curve::Line(l) => l.derivative_at(t),
            Curve::Circle(c) => c.derivative_at(t),
            Curve::Ellipse(e) => e.derivative_at(t),
        }
    }

    fn period(&self) -> Option<f64> {
        match self {
            Curve::Line(_) => None,
            Curve::Circle(_) | Curve::Ellipse(_) => Some(TAU),
        }
    }
}

impl Curve {
    pub fn curve_type_name(&self) -> &'static str {
        match self {
            Curve::Line(_) => "Line",
            Curve::Circle(_) => "Circle",
            Curve::Ellipse(_) => "Ellipse",
        }
    }
}

/// A curve restricted to a closed parameter range, with the owning
/// entity's tolerance attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveSegment {
    pub curve: Curve,
    pub t_min: f64,
    pub t_max: f64,
    /// Tolerance of the owning edge/curve entity (model units, > 0).
    pub tolerance: f64,
}

impl CurveSegment {
    pub fn new(curve: Curve, t0: f64, t1: f64, tolerance: f64) -> Self {
        let (t_min, t_max) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        Self {
            curve,
            t_min,
            t_max,
            tolerance,
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.t_min, self.t_max)
    }

    pub fn span(&self) -> f64 {
        self.t_max - self.t_min
    }

    pub fn clamp(&self, t: f64) -> f64 {
        t.clamp(self.t_min, self.t_max)
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.t_min && t <= self.t_max
    }

    pub fn point_at(&self, t: f64) -> Point3d {
        self.curve.point_at(t)
    }

    pub fn derivative_at(&self, t: f64) -> Vec3 {
        self.curve.derivative_at(t)
    }
}
