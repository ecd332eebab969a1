use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::segment::Segment;
use super::triangle::Triangle;
use super::vector::Vec3;

/// Samples taken along a segment before refining local minima.
const SEGMENT_SAMPLES: usize = 64;
/// Golden-section iterations per bracketed minimum.
const REFINE_ITERATIONS: usize = 80;
const PARALLEL_EPSILON: f64 = 1e-12;

/// A circle in 3D space: the closed curve of points at `radius` from
/// `center` in the plane orthogonal to `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle3d {
    pub center: Point3d,
    pub normal: Vec3,
    pub radius: f64,
    /// Reference direction in the plane (x-axis of the local frame).
    pub x_axis: Vec3,
}

impl Circle3d {
    /// Returns `None` for a zero normal.
    pub fn new(center: Point3d, normal: Vec3, radius: f64) -> Option<Self> {
        let normal = normal.normalized()?;
        let x_axis = normal.any_perpendicular()?;
        Some(Self {
            center,
            normal,
            radius: radius.abs(),
            x_axis,
        })
    }

    fn y_axis(&self) -> Vec3 {
        self.normal.cross(&self.x_axis)
    }

    /// Evaluate at angle t (radians, 0..2*PI).
    pub fn point_at(&self, t: f64) -> Point3d {
        self.center + self.x_axis * (self.radius * t.cos()) + self.y_axis() * (self.radius * t.sin())
    }

    pub fn closest_point(&self, p: &Point3d) -> Point3d {
        let v = *p - self.center;
        let radial = v - self.normal * v.dot(&self.normal);
        // On the axis every circle point is equidistant.
        let dir = radial.normalized().unwrap_or(self.x_axis);
        self.center + dir * self.radius
    }

    pub fn distance_to_point(&self, p: &Point3d) -> f64 {
        let v = *p - self.center;
        let h = v.dot(&self.normal);
        let rho = (v - self.normal * h).length();
        (h * h + (rho - self.radius) * (rho - self.radius)).sqrt()
    }

    /// Distance to a segment, by sampling the segment and refining each
    /// sampled local minimum with a golden-section search.
    pub fn distance_to_segment(&self, segment: &Segment) -> f64 {
        let f = |t: f64| self.distance_to_point(&segment.point_at(t));
        let step = 1.0 / SEGMENT_SAMPLES as f64;
        let samples: Vec<f64> = (0..=SEGMENT_SAMPLES).map(|i| f(i as f64 * step)).collect();

        let mut best = samples.iter().copied().fold(f64::INFINITY, f64::min);
        for i in 0..=SEGMENT_SAMPLES {
            let left = if i == 0 { f64::INFINITY } else { samples[i - 1] };
            let right = if i == SEGMENT_SAMPLES { f64::INFINITY } else { samples[i + 1] };
            if samples[i] <= left && samples[i] <= right {
                let lo = (i as f64 - 1.0).max(0.0) * step;
                let hi = (i as f64 + 1.0).min(SEGMENT_SAMPLES as f64) * step;
                best = best.min(golden_section_min(&f, lo, hi));
            }
        }
        best
    }

    /// Distance to a triangle.
    ///
    /// The closest pair either touches a triangle edge, or its triangle
    /// point is interior and its circle point is a crossing of, or an
    /// extreme point with respect to, the triangle plane.
    pub fn distance_to_triangle(&self, triangle: &Triangle) -> f64 {
        let mut best = triangle
            .edges()
            .iter()
            .map(|e| self.distance_to_segment(e))
            .fold(f64::INFINITY, f64::min);

        let Some(plane) = triangle.plane() else {
            return best;
        };
        let inside = |p: &Point3d| {
            let projected = plane.project_point(p);
            triangle.distance_to_point(&projected) <= 1e-12 * self.radius.max(1.0)
        };

        let h = plane.signed_distance(&self.center);
        let tilt = plane.normal - self.normal * plane.normal.dot(&self.normal);
        match tilt.normalized() {
            Some(u) if tilt.length() > PARALLEL_EPSILON => {
                // Extreme points of the signed distance along the circle.
                for sign in [-1.0, 1.0] {
                    let q = self.center + u * (sign * self.radius);
                    if inside(&q) {
                        best = best.min(plane.signed_distance(&q).abs());
                    }
                }
                // Crossings: h + R cos(theta) (u . n) = 0.
                let slope = self.radius * u.dot(&plane.normal);
                if slope.abs() > PARALLEL_EPSILON {
                    let cos_theta = -h / slope;
                    if cos_theta.abs() <= 1.0 {
                        let w = self.normal.cross(&u);
                        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
                        for sign in [-1.0, 1.0] {
                            let q = self.center
                                + u * (self.radius * cos_theta)
                                + w * (self.radius * sign * sin_theta);
                            if inside(&q) {
                                return 0.0;
                            }
                        }
                    }
                }
            }
            _ => {
                // Parallel planes: every circle point sits at |h|. The ring
                // overlaps the triangle region iff the triangle is neither
                // strictly inside the disk nor strictly outside it.
                let c = plane.project_point(&self.center);
                let nearest = triangle.distance_to_point(&c);
                let farthest = triangle
                    .vertices()
                    .iter()
                    .map(|v| v.distance_to(&c))
                    .fold(0.0, f64::max);
                if nearest <= self.radius && self.radius <= farthest {
                    best = best.min(h.abs());
                }
            }
        }
        best
    }
}

/// Minimize a function on `[lo, hi]` by golden-section search.
fn golden_section_min(f: &impl Fn(f64) -> f64, mut lo: f64, mut hi: f64) -> f64 {
    let ratio = (5.0f64.sqrt() - 1.0) / 2.0;
    let mut x1 = hi - ratio * (hi - lo);
    let mut x2 = lo + ratio * (hi - lo);
    let mut f1 = f(x1);
    let mut f2 = f(x2);
    for _ in 0..REFINE_ITERATIONS {
        if f1 < f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - ratio * (hi - lo);
            f1 = f(x1);
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + ratio * (hi - lo);
            f2 = f(x2);
        }
    }
    f1.min(f2).min(f(lo)).min(f(hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_circle() -> Circle3d {
        Circle3d::new(Point3d::ORIGIN, Vec3::Z, 1.0).unwrap()
    }

    #[test]
    fn test_point_at_lies_on_circle() {
        let c = unit_circle();
        for i in 0..8 {
            let p = c.point_at(i as f64 * 0.7);
            assert!((p.distance_to(&c.center) - 1.0).abs() < 1e-12);
            assert!(p.z.abs() < 1e-12);
        }
    }

    #[test]
    fn test_distance_to_point() {
        let c = unit_circle();
        assert!((c.distance_to_point(&Point3d::new(3.0, 0.0, 0.0)) - 2.0).abs() < 1e-12);
        assert!((c.distance_to_point(&Point3d::new(0.0, 0.0, 1.0)) - 2f64.sqrt()).abs() < 1e-12);
        let q = c.closest_point(&Point3d::new(0.0, 5.0, 2.0));
        assert!((q.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_to_segment() {
        let c = unit_circle();
        // Segment through the axis above the circle plane.
        let s = Segment::new(Point3d::new(-3.0, 0.0, 1.0), Point3d::new(3.0, 0.0, 1.0));
        assert!((c.distance_to_segment(&s) - 1.0).abs() < 1e-9);
        // Segment piercing the ring.
        let s = Segment::new(Point3d::new(1.0, 0.0, -1.0), Point3d::new(1.0, 0.0, 1.0));
        assert!(c.distance_to_segment(&s) < 1e-9);
    }

    #[test]
    fn test_distance_to_parallel_triangle() {
        let c = unit_circle();
        let big = Triangle::new(
            Point3d::new(-5.0, -5.0, 2.0),
            Point3d::new(5.0, -5.0, 2.0),
            Point3d::new(0.0, 5.0, 2.0),
        );
        assert!((c.distance_to_triangle(&big) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_to_pierced_triangle() {
        let c = unit_circle();
        // Vertical triangle that the ring passes through at (1, 0, 0).
        let t = Triangle::new(
            Point3d::new(1.0, -0.5, -0.5),
            Point3d::new(1.0, 0.5, -0.5),
            Point3d::new(1.0, 0.0, 0.5),
        );
        assert!(c.distance_to_triangle(&t) < 1e-9);
    }

    #[test]
    fn test_distance_to_tilted_triangle_uses_extreme_point() {
        let c = unit_circle();
        // Horizontal-ish triangle just below the ring's lowest point after tilting.
        let tilted = Circle3d::new(Point3d::ORIGIN, Vec3::new(1.0, 0.0, 1.0), 1.0).unwrap();
        let t = Triangle::new(
            Point3d::new(-3.0, -3.0, -2.0),
            Point3d::new(3.0, -3.0, -2.0),
            Point3d::new(0.0, 3.0, -2.0),
        );
        let lowest = 1.0 / 2f64.sqrt();
        assert!((tilted.distance_to_triangle(&t) - (2.0 - lowest)).abs() < 1e-9);
        assert!((c.distance_to_triangle(&t) - 2.0).abs() < 1e-9);
    }
}
