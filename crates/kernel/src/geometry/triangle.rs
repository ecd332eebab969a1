use serde::{Deserialize, Serialize};

use super::circle::Circle3d;
use super::plane::Plane;
use super::point::Point3d;
use super::segment::Segment;
use super::vector::Vec3;

/// Slack for the plane-crossing and containment tests.
const CONTACT_EPSILON: f64 = 1e-12;

/// A triangle in 3D space, counter-clockwise when seen from its normal side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub a: Point3d,
    pub b: Point3d,
    pub c: Point3d,
}

impl Triangle {
    pub fn new(a: Point3d, b: Point3d, c: Point3d) -> Self {
        Self { a, b, c }
    }

    pub fn vertices(&self) -> [Point3d; 3] {
        [self.a, self.b, self.c]
    }

    pub fn edges(&self) -> [Segment; 3] {
        [
            Segment::new(self.a, self.b),
            Segment::new(self.b, self.c),
            Segment::new(self.c, self.a),
        ]
    }

    /// Unit normal by the right-hand rule; `None` for a degenerate triangle.
    pub fn normal(&self) -> Option<Vec3> {
        (self.b - self.a).cross(&(self.c - self.a)).normalized()
    }

    pub fn plane(&self) -> Option<Plane> {
        Plane::from_points(&self.a, &self.b, &self.c)
    }

    pub fn area(&self) -> f64 {
        0.5 * (self.b - self.a).cross(&(self.c - self.a)).length()
    }

    pub fn centroid(&self) -> Point3d {
        Point3d::centroid(&self.vertices())
    }

    /// Closest point on the triangle to `p`, found by walking the Voronoi
    /// regions of the vertices, edges and face.
    pub fn closest_point(&self, p: &Point3d) -> Point3d {
        let (a, b, c) = (self.a, self.b, self.c);
        let ab = b - a;
        let ac = c - a;
        let ap = *p - a;

        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = *p - b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        let cp = *p - c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = va + vb + vc;
        if denom.abs() < f64::MIN_POSITIVE {
            // Collinear vertices: fall back to the closest edge point.
            return self
                .edges()
                .iter()
                .map(|e| e.closest_point(p).0)
                .min_by(|x, y| x.distance_squared_to(p).total_cmp(&y.distance_squared_to(p)))
                .unwrap_or(a);
        }
        let v = vb / denom;
        let w = vc / denom;
        a + ab * v + ac * w
    }

    pub fn distance_to_point(&self, p: &Point3d) -> f64 {
        self.closest_point(p).distance_to(p)
    }

    fn contact_scale(&self) -> f64 {
        let scale = (self.b - self.a)
            .length()
            .max((self.c - self.a).length())
            .max((self.c - self.b).length());
        CONTACT_EPSILON * scale.max(1.0)
    }

    pub fn intersects_segment(&self, segment: &Segment) -> bool {
        let eps = self.contact_scale();
        let Some(plane) = self.plane() else {
            // Degenerate triangle: compare against its edges.
            return self
                .edges()
                .iter()
                .any(|e| e.distance_to_segment(segment) <= eps);
        };

        let ds = plane.signed_distance(&segment.start);
        let de = plane.signed_distance(&segment.end);
        if (ds > eps && de > eps) || (ds < -eps && de < -eps) {
            return false;
        }

        if ds.abs() <= eps && de.abs() <= eps {
            // Coplanar: an endpoint inside, or a crossing with an edge.
            return self.distance_to_point(&segment.start) <= eps
                || self.distance_to_point(&segment.end) <= eps
                || self
                    .edges()
                    .iter()
                    .any(|e| e.distance_to_segment(segment) <= eps);
        }

        let t = if (ds - de).abs() < f64::MIN_POSITIVE {
            0.0
        } else {
            (ds / (ds - de)).clamp(0.0, 1.0)
        };
        let hit = segment.point_at(t);
        self.distance_to_point(&hit) <= eps
    }

    pub fn distance_to_segment(&self, segment: &Segment) -> f64 {
        if self.intersects_segment(segment) {
            return 0.0;
        }
        let endpoint = self
            .distance_to_point(&segment.start)
            .min(self.distance_to_point(&segment.end));
        self.edges()
            .iter()
            .map(|e| e.distance_to_segment(segment))
            .fold(endpoint, f64::min)
    }

    pub fn intersects_triangle(&self, other: &Triangle) -> bool {
        self.edges().iter().any(|e| other.intersects_segment(e))
            || other.edges().iter().any(|e| self.intersects_segment(e))
    }

    pub fn distance_to_triangle(&self, other: &Triangle) -> f64 {
        if self.intersects_triangle(other) {
            return 0.0;
        }
        let mut best = f64::INFINITY;
        for v in other.vertices() {
            best = best.min(self.distance_to_point(&v));
        }
        for v in self.vertices() {
            best = best.min(other.distance_to_point(&v));
        }
        for e in self.edges() {
            for f in other.edges() {
                best = best.min(e.distance_to_segment(&f));
            }
        }
        best
    }

    pub fn distance_to_circle(&self, circle: &Circle3d) -> f64 {
        circle.distance_to_triangle(self)
    }
}
