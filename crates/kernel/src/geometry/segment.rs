use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// Squared lengths and denominators below this are treated as zero.
const DEGENERATE_EPSILON: f64 = 1e-12;

/// A finite line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point3d,
    pub end: Point3d,
}

/// Closest points between two segments, with their parameters in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProximity {
    pub distance: f64,
    pub s: f64,
    pub t: f64,
    pub on_self: Point3d,
    pub on_other: Point3d,
}

impl Segment {
    pub fn new(start: Point3d, end: Point3d) -> Self {
        Self { start, end }
    }

    /// Unnormalized direction `end - start`.
    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    pub fn point_at(&self, t: f64) -> Point3d {
        self.start.lerp(&self.end, t)
    }

    pub fn midpoint(&self) -> Point3d {
        self.start.midpoint(&self.end)
    }

    /// Closest point on the segment to `p`, with its parameter.
    pub fn closest_point(&self, p: &Point3d) -> (Point3d, f64) {
        let d = self.direction();
        let len_sq = d.length_squared();
        if len_sq <= DEGENERATE_EPSILON {
            return (self.start, 0.0);
        }
        let t = ((*p - self.start).dot(&d) / len_sq).clamp(0.0, 1.0);
        (self.point_at(t), t)
    }

    pub fn distance_to_point(&self, p: &Point3d) -> f64 {
        let (closest, _) = self.closest_point(p);
        closest.distance_to(p)
    }

    /// Closest points between two segments.
    ///
    /// Minimizes `|P(s) - Q(t)|^2` over the unit square. The unconstrained
    /// minimizer for `s` is clamped first, then `t` is derived from it; if
    /// `t` leaves `[0, 1]` it is clamped to the boundary and `s` is
    /// re-derived. Nearly parallel segments pin `s = 0` instead of dividing
    /// by the vanishing determinant.
    pub fn closest_points(&self, other: &Segment) -> SegmentProximity {
        let d1 = self.direction();
        let d2 = other.direction();
        let r = self.start - other.start;
        let a = d1.dot(&d1);
        let e = d2.dot(&d2);
        let f = d2.dot(&r);

        let (s, t) = if a <= DEGENERATE_EPSILON && e <= DEGENERATE_EPSILON {
            (0.0, 0.0)
        } else if a <= DEGENERATE_EPSILON {
            (0.0, (f / e).clamp(0.0, 1.0))
        } else {
            let c = d1.dot(&r);
            if e <= DEGENERATE_EPSILON {
                ((-c / a).clamp(0.0, 1.0), 0.0)
            } else {
                let b = d1.dot(&d2);
                let denom = a * e - b * b;
                let s = if denom > DEGENERATE_EPSILON * a * e {
                    ((b * f - c * e) / denom).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let t = (b * s + f) / e;
                if t < 0.0 {
                    ((-c / a).clamp(0.0, 1.0), 0.0)
                } else if t > 1.0 {
                    (((b - c) / a).clamp(0.0, 1.0), 1.0)
                } else {
                    (s, t)
                }
            }
        };

        let on_self = self.point_at(s);
        let on_other = other.point_at(t);
        SegmentProximity {
            distance: on_self.distance_to(&on_other),
            s,
            t,
            on_self,
            on_other,
        }
    }

    pub fn distance_to_segment(&self, other: &Segment) -> f64 {
        self.closest_points(other).distance
    }
}
