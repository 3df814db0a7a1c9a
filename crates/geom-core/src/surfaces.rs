use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// Evaluator interface for parametric surfaces.
pub trait SurfaceEval {
    fn point_at(&self, u: f64, v: f64) -> Point3d;
    fn normal_at(&self, u: f64, v: f64) -> Vec3;
}

/// Analytic surface primitives recognized by the intersection fast paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Surface {
    Plane(Plane),
    Cylinder(Cylinder),
    Cone(Cone),
    Sphere(Sphere),
    Torus(Torus),
}

/// An infinite plane with an in-plane (u, v) frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3d,
    pub normal: Vec3,
    pub u_axis: Vec3,
    pub v_axis: Vec3,
}

impl Plane {
    pub fn new(origin: Point3d, normal: Vec3) -> Self {
        let normal = normal.normalize();
        let u_axis = normal.any_perpendicular();
        let v_axis = normal.cross(&u_axis);
        Self {
            origin,
            normal,
            u_axis,
            v_axis,
        }
    }

    pub fn xy() -> Self {
        Self {
            origin: Point3d::ORIGIN,
            normal: Vec3::Z,
            u_axis: Vec3::X,
            v_axis: Vec3::Y,
        }
    }

    /// Signed distance from `p` to the plane (positive on the normal side).
    pub fn signed_distance(&self, p: &Point3d) -> f64 {
        (*p - self.origin).dot(&self.normal)
    }

    pub fn project_point(&self, p: &Point3d) -> Point3d {
        *p - self.normal * self.signed_distance(p)
    }
}

impl SurfaceEval for Plane {
    fn point_at(&self, u: f64, v: f64) -> Point3d {
        self.origin + self.u_axis * u + self.v_axis * v
    }

    fn normal_at(&self, _u: f64, _v: f64) -> Vec3 {
        self.normal
    }
}

/// A cylinder, infinite along its axis; (u = angle, v = height).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cylinder {
    pub origin: Point3d,
    pub axis: Vec3,
    pub radius: f64,
    pub ref_dir: Vec3,
}

impl Cylinder {
    pub fn new(origin: Point3d, axis: Vec3, radius: f64) -> Self {
        let axis = axis.normalize();
        Self {
            origin,
            axis,
            radius,
            ref_dir: axis.any_perpendicular(),
        }
    }

    /// Distance from `p` to the cylinder axis.
    pub fn radial_distance(&self, p: &Point3d) -> f64 {
        let v = *p - self.origin;
        (v - self.axis * v.dot(&self.axis)).length()
    }
}

impl SurfaceEval for Cylinder {
    fn point_at(&self, u: f64, v: f64) -> Point3d {
        let y_dir = self.axis.cross(&self.ref_dir);
        self.origin
            + self.ref_dir * (self.radius * u.cos())
            + y_dir * (self.radius * u.sin())
            + self.axis * v
    }

    fn normal_at(&self, u: f64, _v: f64) -> Vec3 {
        let y_dir = self.axis.cross(&self.ref_dir);
        (self.ref_dir * u.cos() + y_dir * u.sin()).normalize()
    }
}

/// A double cone; (u = angle, v = signed distance from apex along axis).
/// The parametrization is singular at the apex (v = 0).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cone {
    pub apex: Point3d,
    pub axis: Vec3,
    pub half_angle: f64,
    pub ref_dir: Vec3,
}

impl Cone {
    pub fn new(apex: Point3d, axis: Vec3, half_angle: f64) -> Self {
        let axis = axis.normalize();
        Self {
            apex,
            axis,
            half_angle,
            ref_dir: axis.any_perpendicular(),
        }
    }

    /// Distance from `p` to the (double) cone surface.
    ///
    /// Works in the (radial, axial) half-plane: each nappe is a ray from the
    /// apex; when the perpendicular foot falls behind the apex the distance
    /// degenerates to the apex distance.
    pub fn distance_to_point(&self, p: &Point3d) -> f64 {
        let v = *p - self.apex;
        let h = v.dot(&self.axis);
        let rho = (v - self.axis * h).length();
        let (sin_a, cos_a) = self.half_angle.sin_cos();

        let mut best = f64::MAX;
        for axis_sign in [1.0, -1.0] {
            let hh = h * axis_sign;
            let foot = rho * sin_a + hh * cos_a;
            let d = if foot <= 0.0 {
                (rho * rho + hh * hh).sqrt()
            } else {
                (rho * cos_a - hh * sin_a).abs()
            };
            best = best.min(d);
        }
        best
    }
}

impl SurfaceEval for Cone {
    fn point_at(&self, u: f64, v: f64) -> Point3d {
        let y_dir = self.axis.cross(&self.ref_dir);
        let r = v * self.half_angle.tan();
        self.apex + self.axis * v + self.ref_dir * (r * u.cos()) + y_dir * (r * u.sin())
    }

    fn normal_at(&self, u: f64, _v: f64) -> Vec3 {
        let y_dir = self.axis.cross(&self.ref_dir);
        let (sin_a, cos_a) = self.half_angle.sin_cos();
        let radial = self.ref_dir * u.cos() + y_dir * u.sin();
        (radial * cos_a - self.axis * sin_a).normalize()
    }
}

/// A sphere; (u = longitude about Z, v = latitude). The parametrization is
/// singular at the two poles `center ± radius * Z`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Point3d,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Point3d, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl SurfaceEval for Sphere {
    fn point_at(&self, u: f64, v: f64) -> Point3d {
        let cos_v = v.cos();
        Point3d::new(
            self.center.x + self.radius * cos_v * u.cos(),
            self.center.y + self.radius * cos_v * u.sin(),
            self.center.z + self.radius * v.sin(),
        )
    }

    fn normal_at(&self, u: f64, v: f64) -> Vec3 {
        (self.point_at(u, v) - self.center).normalize()
    }
}

/// A torus; (u = major angle about the axis, v = minor angle around the tube).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Torus {
    pub center: Point3d,
    pub axis: Vec3,
    pub major_radius: f64,
    pub minor_radius: f64,
}

impl Torus {
    pub fn new(center: Point3d, axis: Vec3, major_radius: f64, minor_radius: f64) -> Self {
        Self {
            center,
            axis: axis.normalize(),
            major_radius,
            minor_radius,
        }
    }
}

impl SurfaceEval for Torus {
    fn point_at(&self, u: f64, v: f64) -> Point3d {
        let ref_dir = self.axis.any_perpendicular();
        let y_dir = self.axis.cross(&ref_dir);
        let ring = self.center
            + ref_dir * (self.major_radius * u.cos())
            + y_dir * (self.major_radius * u.sin());
        let radial = (ring - self.center).normalized().unwrap_or(ref_dir);
        ring + radial * (self.minor_radius * v.cos()) + self.axis * (self.minor_radius * v.sin())
    }

    fn normal_at(&self, u: f64, v: f64) -> Vec3 {
        let ref_dir = self.axis.any_perpendicular();
        let y_dir = self.axis.cross(&ref_dir);
        let ring = self.center
            + ref_dir * (self.major_radius * u.cos())
            + y_dir * (self.major_radius * u.sin());
        (self.point_at(u, v) - ring).normalized().unwrap_or(self.axis)
    }
}

impl SurfaceEval for Surface {
    fn point_at(&self, u: f64, v: f64) -> Point3d {
        match self {
            Surface::Plane(s) => s.point_at(u, v),
            Surface::Cylinder(s) => s.point_at(u, v),
            Surface::Cone(s) => s.point_at(u, v),
            Surface::Sphere(s) => s.point_at(u, v),
            Surface::Torus(s) => s.point_at(u, v),
        }
    }

    fn normal_at(&self, u: f64, v: f64) -> Vec3 {
        match self {
            Surface::Plane(s) => s.normal_at(u, v),
            Surface::Cylinder(s) => s.normal_at(u, v),
            Surface::Cone(s) => s.normal_at(u, v),
            Surface::Sphere(s) => s.normal_at(u, v),
            Surface::Torus(s) => s.normal_at(u, v),
        }
    }
}

impl Surface {
    /// Exact distance from a point to the unbounded analytic surface.
    pub fn distance_to_point(&self, p: &Point3d) -> f64 {
        match self {
            Surface::Plane(s) => s.signed_distance(p).abs(),
            Surface::Cylinder(s) => (s.radial_distance(p) - s.radius).abs(),
            Surface::Cone(s) => s.distance_to_point(p),
            Surface::Sphere(s) => (p.distance_to(&s.center) - s.radius).abs(),
            Surface::Torus(s) => {
                let v = *p - s.center;
                let h = v.dot(&s.axis);
                let rho = (v - s.axis * h).length();
                let ring_gap = rho - s.major_radius;
                ((ring_gap * ring_gap + h * h).sqrt() - s.minor_radius).abs()
            }
        }
    }

    /// Points where the parametrization's partial derivative vanishes
    /// (sphere poles, cone apex). Empty for the other primitives.
    pub fn poles(&self) -> Vec<Point3d> {
        self.pole_v_values().into_iter().map(|(_, p)| p).collect()
    }

    /// First partial derivatives `(dS/du, dS/dv)` of the parametrization.
    ///
    /// `dS/du` vanishes at the sphere poles and the cone apex; callers doing
    /// Newton-style projection must guard against that (see `pole_v_values`).
    pub fn partials(&self, u: f64, v: f64) -> (Vec3, Vec3) {
        match self {
            Surface::Plane(s) => (s.u_axis, s.v_axis),
            Surface::Cylinder(s) => {
                let y_dir = s.axis.cross(&s.ref_dir);
                let du = (s.ref_dir * (-u.sin()) + y_dir * u.cos()) * s.radius;
                (du, s.axis)
            }
            Surface::Cone(s) => {
                let y_dir = s.axis.cross(&s.ref_dir);
                let tan_a = s.half_angle.tan();
                let radial = s.ref_dir * u.cos() + y_dir * u.sin();
                let tangent = s.ref_dir * (-u.sin()) + y_dir * u.cos();
                (tangent * (v * tan_a), s.axis + radial * tan_a)
            }
            Surface::Sphere(s) => {
                let (sin_u, cos_u) = u.sin_cos();
                let (sin_v, cos_v) = v.sin_cos();
                let du = Vec3::new(-cos_v * sin_u, cos_v * cos_u, 0.0) * s.radius;
                let dv = Vec3::new(-sin_v * cos_u, -sin_v * sin_u, cos_v) * s.radius;
                (du, dv)
            }
            Surface::Torus(s) => {
                let ref_dir = s.axis.any_perpendicular();
                let y_dir = s.axis.cross(&ref_dir);
                let radial = ref_dir * u.cos() + y_dir * u.sin();
                let tangent = ref_dir * (-u.sin()) + y_dir * u.cos();
                let du = tangent * (s.major_radius + s.minor_radius * v.cos());
                let dv = radial * (-s.minor_radius * v.sin()) + s.axis * (s.minor_radius * v.cos());
                (du, dv)
            }
        }
    }

    /// The `v` parameter values at which `dS/du` vanishes, paired with the
    /// degenerate point itself.
    pub fn pole_v_values(&self) -> Vec<(f64, Point3d)> {
        match self {
            Surface::Sphere(s) => {
                let half_pi = std::f64::consts::FRAC_PI_2;
                vec![
                    (half_pi, s.center + Vec3::Z * s.radius),
                    (-half_pi, s.center - Vec3::Z * s.radius),
                ]
            }
            Surface::Cone(c) => vec![(0.0, c.apex)],
            _ => Vec::new(),
        }
    }

    pub fn surface_type_name(&self) -> &'static str {
        match self {
            Surface::Plane(_) => "Plane",
            Surface::Cylinder(_) => "Cylinder",
            Surface::Cone(_) => "Cone",
            Surface::Sphere(_) => "Sphere",
            Surface::Torus(_) => "Torus",
        }
    }
}

/// A surface restricted to a closed `(u, v)` parameter rectangle, with the
/// owning face's tolerance attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfacePatch {
    pub surface: Surface,
    pub u_min: f64,
    pub u_max: f64,
    pub v_min: f64,
    pub v_max: f64,
    /// Tolerance of the owning face entity (model units, > 0).
    pub tolerance: f64,
}

impl SurfacePatch {
    pub fn new(surface: Surface, u_range: (f64, f64), v_range: (f64, f64), tolerance: f64) -> Self {
        let (u_min, u_max) = if u_range.0 <= u_range.1 {
            (u_range.0, u_range.1)
        } else {
            (u_range.1, u_range.0)
        };
        let (v_min, v_max) = if v_range.0 <= v_range.1 {
            (v_range.0, v_range.1)
        } else {
            (v_range.1, v_range.0)
        };
        Self {
            surface,
            u_min,
            u_max,
            v_min,
            v_max,
            tolerance,
        }
    }

    pub fn clamp_uv(&self, u: f64, v: f64) -> (f64, f64) {
        (u.clamp(self.u_min, self.u_max), v.clamp(self.v_min, self.v_max))
    }

    pub fn contains_uv(&self, u: f64, v: f64) -> bool {
        u >= self.u_min && u <= self.u_max && v >= self.v_min && v <= self.v_max
    }

    pub fn point_at(&self, u: f64, v: f64) -> Point3d {
        self.surface.point_at(u, v)
    }

    pub fn partials(&self, u: f64, v: f64) -> (Vec3, Vec3) {
        self.surface.partials(u, v)
    }

    /// Degenerate parametrization points of the underlying surface that fall
    /// inside this patch's `v` range.
    pub fn poles_in_patch(&self) -> Vec<(f64, Point3d)> {
        self.surface
            .pole_v_values()
            .into_iter()
            .filter(|(v, _)| *v >= self.v_min && *v <= self.v_max)
            .collect()
    }
}
