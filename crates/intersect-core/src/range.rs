//! Curve-on-bounded-surface range intersection.
//!
//! Computes the sub-ranges of a curve segment's parameter over which the
//! curve lies within distance tolerance of a bounded surface patch. Analytic
//! shortcuts handle the recognized primitive pairs exactly; everything else
//! goes through extremum probing (cheap rejection) and boundary-anchored
//! growth with bisection sharpening. The outcome is a tri-state status, so
//! callers can tell "provably disjoint" from "ran out of effort".

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use geom_core::curves::{Circle3d, Curve, CurveEval, CurveSegment, Line3d};
use geom_core::surfaces::{Plane, Sphere, Surface, SurfacePatch};
use geom_core::{Point3d, Tolerance, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A closed sub-range of a curve parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub start: f64,
    pub end: f64,
}

impl ParamRange {
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A degenerate range covering a single parameter.
    pub fn point(t: f64) -> Self {
        Self { start: t, end: t }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }

    fn touches(&self, other: &Self, slack: f64) -> bool {
        other.start <= self.end + slack && self.start <= other.end + slack
    }

    fn merged_with(&self, other: &Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Outcome classification of a range query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeStatus {
    /// At least one in-tolerance sub-range was bracketed.
    Found,
    /// The extremal distance proves the curve never comes within tolerance.
    Disjoint,
    /// Cancelled or out of refinement budget; the ranges are a lower bound,
    /// not a verdict.
    Incomplete,
}

/// Sub-ranges plus the status needed to interpret them.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeResult {
    pub ranges: Vec<ParamRange>,
    pub status: RangeStatus,
}

impl RangeResult {
    fn disjoint() -> Self {
        Self {
            ranges: Vec::new(),
            status: RangeStatus::Disjoint,
        }
    }

    fn found(ranges: Vec<ParamRange>) -> Self {
        Self {
            ranges,
            status: RangeStatus::Found,
        }
    }

    fn incomplete(ranges: Vec<ParamRange>) -> Self {
        Self {
            ranges,
            status: RangeStatus::Incomplete,
        }
    }
}

/// Cooperative cancellation flag, checked between refinement steps.
///
/// Cancellation never corrupts state: the query returns the ranges grown so
/// far with [`RangeStatus::Incomplete`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Tuning for the sampled fallback path.
#[derive(Debug, Clone, Copy)]
pub struct RefineOptions {
    /// Samples across the curve domain for probing and seeding.
    pub samples: usize,
    /// Bisection iterations when sharpening a tolerance crossing.
    pub max_bisections: u32,
    /// Newton iterations per point-to-patch projection.
    pub max_projection_steps: u32,
    /// Total distance-evaluation budget for one query.
    pub max_evaluations: u32,
    /// Parameter width below which a crossing counts as bracketed.
    pub param_resolution: f64,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            samples: 64,
            max_bisections: 48,
            max_projection_steps: 24,
            max_evaluations: 20_000,
            param_resolution: 1e-9,
        }
    }
}

struct Budget {
    remaining: u32,
}

impl Budget {
    fn new(limit: u32) -> Self {
        Self { remaining: limit }
    }

    fn spend(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    fn exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// A closed scalar interval; empty when `lo > hi`.
#[derive(Debug, Clone, Copy)]
struct Interval {
    lo: f64,
    hi: f64,
}

impl Interval {
    fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    fn empty() -> Self {
        Self { lo: 1.0, hi: 0.0 }
    }

    fn is_empty(&self) -> bool {
        self.lo > self.hi
    }

    fn intersect(&self, other: &Self) -> Self {
        Self {
            lo: self.lo.max(other.lo),
            hi: self.hi.min(other.hi),
        }
    }
}

/// Range intersection of one curve segment against one surface patch.
pub struct RangeIntersector<'a> {
    segment: &'a CurveSegment,
    patch: &'a SurfacePatch,
    opts: RefineOptions,
    classify: Tolerance,
}

impl<'a> RangeIntersector<'a> {
    pub fn new(segment: &'a CurveSegment, patch: &'a SurfacePatch) -> Self {
        Self {
            segment,
            patch,
            opts: RefineOptions::default(),
            classify: Tolerance::default(),
        }
    }

    pub fn with_options(mut self, opts: RefineOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Run the query. `known_params` are caller-supplied parameters already
    /// known (or suspected) to lie within tolerance, typically boundary
    /// intersections found by the pairwise solvers; they seed the growth step.
    #[instrument(skip_all, fields(curve = self.segment.curve.curve_type_name(),
                                   surface = self.patch.surface.surface_type_name()))]
    pub fn run(&self, known_params: &[f64], cancel: &CancelToken) -> RangeResult {
        let tol = self.segment.tolerance + self.patch.tolerance;
        let (t0, t1) = self.segment.domain();
        let mut budget = Budget::new(self.opts.max_evaluations);

        // Zero-length segment: a point query, recovered locally.
        if self.segment.span() <= self.opts.param_resolution {
            let result = if self.clearance(t0, &mut budget) <= tol {
                RangeResult::found(vec![ParamRange::point(t0)])
            } else {
                RangeResult::disjoint()
            };
            return result;
        }

        if let Some(result) = self.analytic_fast_path(tol) {
            debug!(status = ?result.status, ranges = result.ranges.len(), "analytic fast path");
            return result;
        }

        // Extremum probing: cheap rejection before any growth is attempted.
        let minima = self.probe_minima(&mut budget);
        let min_dist = minima
            .iter()
            .map(|&(d, _)| d)
            .fold(f64::MAX, f64::min);
        if min_dist > tol {
            if budget.exhausted() {
                // The probe could not be refined to the end; this is not a
                // disjointness proof.
                return RangeResult::incomplete(Vec::new());
            }
            debug!(min_dist, tol, "extremal distance exceeds tolerance");
            return RangeResult::disjoint();
        }

        let probe_seeds: Vec<f64> = minima
            .iter()
            .filter(|&&(d, _)| d <= tol)
            .map(|&(_, t)| t)
            .collect();
        let result = self.grow_ranges(tol, &probe_seeds, known_params, cancel, &mut budget);
        debug!(status = ?result.status, ranges = result.ranges.len(), "range query complete");
        result
    }

    // ─── Pointwise distance with degenerate-pole handling ───────────────────

    /// Distance from the curve point at `t` to the bounded patch.
    fn clearance(&self, t: f64, budget: &mut Budget) -> f64 {
        let p = self.segment.point_at(t);
        self.patch_distance(&p, budget)
    }

    /// Seeded Newton projection of a point onto the patch, clamped to the
    /// patch rectangle. Falls back to the offset-evaluation trick when the
    /// u-derivative vanishes (sphere poles, cone apex).
    fn patch_distance(&self, p: &Point3d, budget: &mut Budget) -> f64 {
        budget.spend();
        let patch = self.patch;

        // Coarse seed over the parameter rectangle.
        const GRID: usize = 6;
        let mut u = patch.u_min;
        let mut v = patch.v_min;
        let mut best = f64::MAX;
        for i in 0..=GRID {
            for j in 0..=GRID {
                let gu = patch.u_min + (patch.u_max - patch.u_min) * (i as f64 / GRID as f64);
                let gv = patch.v_min + (patch.v_max - patch.v_min) * (j as f64 / GRID as f64);
                let d = p.distance_to(&patch.point_at(gu, gv));
                if d < best {
                    best = d;
                    u = gu;
                    v = gv;
                }
            }
        }

        // Newton refinement on the squared-distance gradient.
        const DEGENERATE_DERIV: f64 = 1e-20; // squared length
        for _ in 0..self.opts.max_projection_steps {
            let s = patch.point_at(u, v);
            let r = *p - s;
            let (su, sv) = patch.partials(u, v);
            let su2 = su.length_squared();
            let sv2 = sv.length_squared();

            if su2 < DEGENERATE_DERIV {
                // Degenerate parametrization: the u direction carries no
                // information here. Reseed from a neighboring non-degenerate
                // row, testing direction from the pole instead of position.
                match self.reseed_near_pole(p, v) {
                    Some((nu, nv)) => {
                        u = nu;
                        v = nv;
                        continue;
                    }
                    None => break,
                }
            }

            let du = r.dot(&su) / su2;
            let dv = if sv2 > DEGENERATE_DERIV {
                r.dot(&sv) / sv2
            } else {
                0.0
            };
            let (nu, nv) = patch.clamp_uv(u + du, v + dv);
            let step = (nu - u).abs() + (nv - v).abs();
            u = nu;
            v = nv;
            if step < 1e-13 {
                break;
            }
        }

        let projected = p.distance_to(&patch.point_at(u, v));
        // A pole inside the patch is a surface point the parametric walk
        // cannot always reach; account for it directly.
        patch
            .poles_in_patch()
            .iter()
            .fold(projected, |acc, (_, pole)| acc.min(p.distance_to(pole)))
    }

    /// Offset evaluation near a pole: pick the `u` on a neighboring,
    /// non-degenerate `v` row whose surface direction from the pole best
    /// aligns with the direction toward the query point.
    fn reseed_near_pole(&self, p: &Point3d, v: f64) -> Option<(f64, f64)> {
        let patch = self.patch;
        let (pole_v, pole_point) = patch
            .poles_in_patch()
            .into_iter()
            .min_by(|a, b| (a.0 - v).abs().partial_cmp(&(b.0 - v).abs()).unwrap())?;

        let v_span = (patch.v_max - patch.v_min).max(1e-6);
        let offset = 0.05 * v_span;
        let toward_interior = if pole_v - patch.v_min < patch.v_max - pole_v {
            offset
        } else {
            -offset
        };
        let v_n = (pole_v + toward_interior).clamp(patch.v_min, patch.v_max);
        if (v_n - pole_v).abs() < 1e-12 {
            return None;
        }

        let dir = (*p - pole_point).normalized()?;
        const RING: usize = 16;
        let mut best_u = None;
        let mut best_score = f64::NEG_INFINITY;
        for k in 0..RING {
            let u = patch.u_min
                + (patch.u_max - patch.u_min) * (k as f64 / (RING - 1) as f64);
            let q = patch.point_at(u, v_n);
            let score = (q - pole_point)
                .normalized()
                .map(|w| w.dot(&dir))
                .unwrap_or(f64::NEG_INFINITY);
            if score > best_score {
                best_score = score;
                best_u = Some(u);
            }
        }
        best_u.map(|u| (u, v_n))
    }

    // ─── Step 1: analytic fast path ────────────────────────────────────────

    /// Closed-form handling for recognized primitive pairs. Returns `None`
    /// when the pair has no shortcut, or when the shortcut cannot decide
    /// exactly and the numeric path must take over.
    fn analytic_fast_path(&self, tol: f64) -> Option<RangeResult> {
        match (&self.segment.curve, &self.patch.surface) {
            (Curve::Line(line), Surface::Plane(plane)) => self.line_plane(line, plane, tol),
            (Curve::Line(line), Surface::Sphere(sphere)) => {
                self.reject_by_extrema(line_sphere_distance_extrema(
                    line,
                    sphere,
                    self.segment.domain(),
                ), tol)
            }
            (Curve::Line(line), Surface::Cylinder(cyl)) => {
                let axis_line = Line3d::new(cyl.origin, cyl.axis);
                let (d_min, d_max) =
                    line_line_distance_extrema(line, &axis_line, self.segment.domain());
                // The axis distance sweeps [d_min, d_max]; the wall sits at
                // the radius, so the nearest approach to the wall is exact.
                let wall_min = if d_min <= cyl.radius && cyl.radius <= d_max {
                    0.0
                } else {
                    (d_min - cyl.radius).abs().min((d_max - cyl.radius).abs())
                };
                self.reject_by_extrema((wall_min, (d_max - cyl.radius).abs()), tol)
            }
            (Curve::Circle(circle), Surface::Plane(plane)) => {
                self.reject_by_extrema(circle_plane_distance_extrema(circle, plane), tol)
            }
            (Curve::Circle(circle), Surface::Sphere(sphere)) => {
                self.reject_by_extrema(circle_sphere_distance_extrema(circle, sphere), tol)
            }
            _ => None,
        }
    }

    /// `Disjoint` when the exact distance extrema against the unbounded
    /// surface prove the curve stays outside tolerance (distance to the
    /// bounded patch can only be larger). Otherwise undecided.
    fn reject_by_extrema(&self, extrema: (f64, f64), tol: f64) -> Option<RangeResult> {
        let (min_d, _max_d) = extrema;
        if min_d > tol {
            Some(RangeResult::disjoint())
        } else {
            None
        }
    }

    /// Full closed form for line vs plane: the signed plane distance and both
    /// in-plane patch coordinates are affine in `t`, so the in-tolerance
    /// sub-range is exact interval arithmetic.
    fn line_plane(&self, line: &Line3d, plane: &Plane, tol: f64) -> Option<RangeResult> {
        let (t0, t1) = self.segment.domain();
        let domain = Interval::new(t0, t1);

        let d0 = (line.origin - plane.origin).dot(&plane.normal);
        let slope = line.direction.dot(&plane.normal);
        let normal_band = if self.classify.is_zero_angle(slope) {
            // Parallel to the plane: inside or outside the slab for all t.
            if d0.abs() <= tol {
                Interval::new(f64::NEG_INFINITY, f64::INFINITY)
            } else {
                Interval::empty()
            }
        } else {
            affine_in_band(d0, slope, -tol, tol)
        };
        if normal_band.intersect(&domain).is_empty() {
            // The line leaves the tolerance slab of the infinite plane over
            // the whole domain; the patch is a subset of that slab.
            return Some(RangeResult::disjoint());
        }

        let u0 = (line.origin - plane.origin).dot(&plane.u_axis);
        let us = line.direction.dot(&plane.u_axis);
        let v0 = (line.origin - plane.origin).dot(&plane.v_axis);
        let vs = line.direction.dot(&plane.v_axis);

        let patch = self.patch;
        let strict = domain
            .intersect(&normal_band)
            .intersect(&affine_in_band(u0, us, patch.u_min, patch.u_max))
            .intersect(&affine_in_band(v0, vs, patch.v_min, patch.v_max));
        let loose = domain
            .intersect(&normal_band)
            .intersect(&affine_in_band(u0, us, patch.u_min - tol, patch.u_max + tol))
            .intersect(&affine_in_band(v0, vs, patch.v_min - tol, patch.v_max + tol));

        if loose.is_empty() {
            // Even with the rectangle grown by the tolerance there is no
            // overlap, which bounds the true patch distance from below.
            return Some(RangeResult::disjoint());
        }
        let resolution = self.opts.param_resolution;
        if !strict.is_empty()
            && (strict.lo - loose.lo).abs() <= resolution
            && (strict.hi - loose.hi).abs() <= resolution
        {
            return Some(RangeResult::found(vec![ParamRange::new(strict.lo, strict.hi)]));
        }
        // Near-edge sliver: the exact answer depends on the rounded patch
        // boundary, which the numeric path resolves.
        None
    }

    // ─── Step 2: extremum probing ──────────────────────────────────────────

    /// Sample the domain densely, then sharpen every local minimum of the
    /// sampled distance by ternary search. Local minima (not just the global
    /// one) matter: each narrow tolerance well needs its own growth seed.
    fn probe_minima(&self, budget: &mut Budget) -> Vec<(f64, f64)> {
        let (t0, t1) = self.segment.domain();
        let n = self.opts.samples.max(2);
        let step = (t1 - t0) / n as f64;

        let samples: Vec<f64> = (0..=n)
            .map(|i| self.clearance(t0 + step * i as f64, budget))
            .collect();

        let mut minima = Vec::new();
        for i in 0..=n {
            let left_rising = i == 0 || samples[i - 1] >= samples[i];
            let right_rising = i == n || samples[i + 1] >= samples[i];
            if left_rising && right_rising {
                minima.push(i);
            }
        }

        minima
            .into_iter()
            .map(|i| {
                let mut lo = t0 + step * i.saturating_sub(1) as f64;
                let mut hi = (t0 + step * (i + 1) as f64).min(t1);
                let mut best_d = samples[i];
                let mut best_t = t0 + step * i as f64;
                for _ in 0..self.opts.max_bisections {
                    if hi - lo < self.opts.param_resolution || budget.exhausted() {
                        break;
                    }
                    let m1 = lo + (hi - lo) / 3.0;
                    let m2 = hi - (hi - lo) / 3.0;
                    let d1 = self.clearance(m1, budget);
                    let d2 = self.clearance(m2, budget);
                    if d1 < d2 {
                        hi = m2;
                    } else {
                        lo = m1;
                    }
                    if d1 < best_d {
                        best_d = d1;
                        best_t = m1;
                    }
                    if d2 < best_d {
                        best_d = d2;
                        best_t = m2;
                    }
                }
                (best_d, best_t)
            })
            .collect()
    }

    // ─── Step 3: boundary-anchored growth ──────────────────────────────────

    fn grow_ranges(
        &self,
        tol: f64,
        probe_seeds: &[f64],
        known_params: &[f64],
        cancel: &CancelToken,
        budget: &mut Budget,
    ) -> RangeResult {
        let (t0, t1) = self.segment.domain();
        let n = self.opts.samples.max(2);
        let step = (t1 - t0) / n as f64;

        // Seeds: domain boundaries, the refined probe minima, caller-known
        // parameters, and every in-tolerance sample.
        let mut seeds = vec![t0, t1];
        seeds.extend_from_slice(probe_seeds);
        seeds.extend(known_params.iter().map(|t| t.clamp(t0, t1)));
        for i in 1..n {
            seeds.push(t0 + step * i as f64);
        }
        seeds.sort_by(|a, b| a.partial_cmp(b).unwrap());
        seeds.dedup_by(|a, b| (*a - *b).abs() < self.opts.param_resolution);

        let mut ranges: Vec<ParamRange> = Vec::new();
        let mut incomplete = false;

        for &seed in &seeds {
            if cancel.is_cancelled() || budget.exhausted() {
                incomplete = true;
                break;
            }
            if ranges.iter().any(|r| r.contains(seed)) {
                continue;
            }
            if self.clearance(seed, budget) > tol {
                continue;
            }
            let lo = self.grow_direction(seed, -step, tol, cancel, budget, &mut incomplete);
            let hi = self.grow_direction(seed, step, tol, cancel, budget, &mut incomplete);
            ranges.push(ParamRange::new(lo, hi));
        }

        let ranges = merge_ranges(ranges, self.opts.param_resolution);
        if incomplete {
            RangeResult::incomplete(ranges)
        } else if ranges.is_empty() {
            // The probe found an in-tolerance point but growth could not hold
            // it; report the uncertainty rather than claiming disjointness.
            RangeResult::incomplete(ranges)
        } else {
            RangeResult::found(ranges)
        }
    }

    /// March from an in-tolerance seed until the clearance exceeds tolerance
    /// or the domain ends, then bisect the crossing.
    fn grow_direction(
        &self,
        seed: f64,
        signed_step: f64,
        tol: f64,
        cancel: &CancelToken,
        budget: &mut Budget,
        incomplete: &mut bool,
    ) -> f64 {
        let (t0, t1) = self.segment.domain();
        let mut good = seed;
        loop {
            if cancel.is_cancelled() || budget.exhausted() {
                *incomplete = true;
                return good;
            }
            let next = (good + signed_step).clamp(t0, t1);
            if (next - good).abs() < self.opts.param_resolution {
                return good;
            }
            if self.clearance(next, budget) <= tol {
                good = next;
                if next == t0 || next == t1 {
                    return good;
                }
                continue;
            }
            // Bracket the crossing between `good` (inside) and `next` (outside).
            let mut lo = good;
            let mut hi = next;
            for _ in 0..self.opts.max_bisections {
                if (hi - lo).abs() < self.opts.param_resolution {
                    break;
                }
                if cancel.is_cancelled() || budget.exhausted() {
                    *incomplete = true;
                    break;
                }
                let mid = 0.5 * (lo + hi);
                if self.clearance(mid, budget) <= tol {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            if (hi - lo).abs() >= self.opts.param_resolution && !*incomplete {
                // Bisection budget ran out before the crossing was sharp.
                *incomplete = true;
            }
            return lo;
        }
    }
}

/// Sort by start and merge ranges that overlap or touch within `slack`.
fn merge_ranges(mut ranges: Vec<ParamRange>, slack: f64) -> Vec<ParamRange> {
    ranges.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap());
    let mut merged: Vec<ParamRange> = Vec::new();
    for range in ranges {
        match merged.last_mut() {
            Some(last) if last.touches(&range, slack) => *last = last.merged_with(&range),
            _ => merged.push(range),
        }
    }
    merged
}

/// Interval of `t` where `c0 + slope * t` stays within `[lo, hi]`.
fn affine_in_band(c0: f64, slope: f64, lo: f64, hi: f64) -> Interval {
    if slope.abs() < 1e-14 {
        if c0 >= lo && c0 <= hi {
            Interval::new(f64::NEG_INFINITY, f64::INFINITY)
        } else {
            Interval::empty()
        }
    } else {
        let a = (lo - c0) / slope;
        let b = (hi - c0) / slope;
        Interval::new(a.min(b), a.max(b))
    }
}

// ─── Exact distance extrema for the rejection shortcuts ─────────────────────

/// Extrema over `[t0, t1]` of the distance from a line point to a sphere.
fn line_sphere_distance_extrema(
    line: &Line3d,
    sphere: &Sphere,
    (t0, t1): (f64, f64),
) -> (f64, f64) {
    // Squared center distance is quadratic in t with unit leading coefficient.
    let w = line.origin - sphere.center;
    let b = w.dot(&line.direction);
    let c = w.length_squared();
    let q = |t: f64| (t * t + 2.0 * b * t + c).max(0.0);

    let vertex = -b;
    let mut q_min = q(t0).min(q(t1));
    let q_max = q(t0).max(q(t1));
    if vertex > t0 && vertex < t1 {
        q_min = q_min.min(q(vertex));
    }
    let (r_min, r_max) = (q_min.sqrt(), q_max.sqrt());

    let min_d = if r_min <= sphere.radius && sphere.radius <= r_max {
        0.0
    } else {
        (r_min - sphere.radius).abs().min((r_max - sphere.radius).abs())
    };
    let max_d = (r_min - sphere.radius).abs().max((r_max - sphere.radius).abs());
    (min_d, max_d)
}

/// Extrema over `[t0, t1]` of the distance from points of `line` to the
/// infinite line `other` (used with a cylinder axis).
fn line_line_distance_extrema(
    line: &Line3d,
    other: &Line3d,
    (t0, t1): (f64, f64),
) -> (f64, f64) {
    let d = |t: f64| other.distance_to_point(&line.point_at(t));
    // Distance to a line is a convex function of t; the interior minimum (if
    // any) is where the derivative of the squared distance vanishes.
    let w = line.origin - other.origin;
    let cross_dir = line.direction - other.direction * line.direction.dot(&other.direction);
    let w_perp = w - other.direction * w.dot(&other.direction);
    let a = cross_dir.length_squared();
    let mut min_d = d(t0).min(d(t1));
    let max_d = d(t0).max(d(t1));
    if a > 1e-30 {
        let vertex = -w_perp.dot(&cross_dir) / a;
        if vertex > t0 && vertex < t1 {
            min_d = min_d.min(d(vertex));
        }
    }
    (min_d, max_d)
}

/// Extrema of the unsigned plane distance over a full circle.
fn circle_plane_distance_extrema(circle: &Circle3d, plane: &Plane) -> (f64, f64) {
    let center_d = (circle.center - plane.origin).dot(&plane.normal);
    let y_axis = circle.normal.cross(&circle.x_axis);
    let a = circle.radius * circle.x_axis.dot(&plane.normal);
    let b = circle.radius * y_axis.dot(&plane.normal);
    let swing = (a * a + b * b).sqrt();
    let lo = center_d - swing;
    let hi = center_d + swing;
    let min_d = if lo <= 0.0 && hi >= 0.0 {
        0.0
    } else {
        lo.abs().min(hi.abs())
    };
    (min_d, lo.abs().max(hi.abs()))
}

/// Extrema of the distance from a full circle to a sphere.
fn circle_sphere_distance_extrema(circle: &Circle3d, sphere: &Sphere) -> (f64, f64) {
    let w = circle.center - sphere.center;
    let y_axis = circle.normal.cross(&circle.x_axis);
    let base = w.length_squared() + circle.radius * circle.radius;
    let swing = 2.0
        * circle.radius
        * (w.dot(&circle.x_axis).powi(2) + w.dot(&y_axis).powi(2)).sqrt();
    let q_min = (base - swing).max(0.0);
    let q_max = base + swing;
    let (r_min, r_max) = (q_min.sqrt(), q_max.sqrt());
    let min_d = if r_min <= sphere.radius && sphere.radius <= r_max {
        0.0
    } else {
        (r_min - sphere.radius).abs().min((r_max - sphere.radius).abs())
    };
    (min_d, (r_min - sphere.radius).abs().max((r_max - sphere.radius).abs()))
}
