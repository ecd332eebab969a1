use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ConvexPolyhedron;
use super::sat::PARALLEL_AXIS_EPSILON;
use crate::Tolerance;
use crate::geometry::Point3d;

/// A closest-point pair between two disjoint polyhedra.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosestPoints {
    pub on_self: Point3d,
    pub on_other: Point3d,
}

/// Result of [`ConvexPolyhedron::separation`]. Intersecting polyhedra have
/// distance zero and no closest points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Separation {
    pub distance: f64,
    pub closest: Option<ClosestPoints>,
}

impl Separation {
    pub fn is_intersecting(&self) -> bool {
        self.closest.is_none()
    }
}

/// Running minimum over candidate point pairs, by squared distance.
#[derive(Default)]
struct Nearest {
    best: Option<(f64, ClosestPoints)>,
    candidates: usize,
}

impl Nearest {
    fn offer(&mut self, on_self: Point3d, on_other: Point3d) {
        self.candidates += 1;
        let d2 = on_self.distance_squared_to(&on_other);
        if self.best.is_none_or(|(best, _)| d2 < best) {
            self.best = Some((d2, ClosestPoints { on_self, on_other }));
        }
    }
}

impl ConvexPolyhedron {
    /// Minimum distance and a closest-point pair.
    ///
    /// Disjoint convex polyhedra are closest either at a vertex and a face
    /// or at two non-parallel edges, so only those candidates are compared.
    pub fn separation(&self, other: &Self, tol: &Tolerance) -> Separation {
        if self.intersects(other, tol) {
            return Separation {
                distance: 0.0,
                closest: None,
            };
        }
        let tol = self.resolve_pair(other, tol);
        let mut nearest = Nearest::default();

        self.vertex_face_candidates(other, &tol, false, &mut nearest);
        other.vertex_face_candidates(self, &tol, true, &mut nearest);

        for a in self.boundary_segments() {
            for b in other.boundary_segments() {
                let (da, db) = (a.direction(), b.direction());
                if da.cross(&db).length() <= PARALLEL_AXIS_EPSILON * (da.length() * db.length()) {
                    continue;
                }
                let prox = a.closest_points(b);
                nearest.offer(prox.on_self, prox.on_other);
            }
        }

        if nearest.best.is_none() {
            // Only parallel edges and no supported vertex: fall back to the
            // vertex pairs, which is exact for such configurations.
            for a in &self.vertices {
                for b in &other.vertices {
                    nearest.offer(*a, *b);
                }
            }
        }

        let closest = nearest.best.map(|(_, pair)| pair);
        let distance = nearest.best.map_or(0.0, |(d2, _)| d2.sqrt());
        debug!(candidates = nearest.candidates, distance, "separation computed");
        Separation { distance, closest }
    }

    /// For every face of `self` with all of `other` in front of it, project
    /// each vertex of `other` onto the face and keep the projections that
    /// land inside the polygon.
    fn vertex_face_candidates(
        &self,
        other: &Self,
        tol: &Tolerance,
        swapped: bool,
        nearest: &mut Nearest,
    ) {
        for face in &self.faces {
            let offsets: Vec<f64> = other
                .vertices
                .iter()
                .map(|v| face.signed_distance(self, v))
                .collect();
            if !offsets.iter().all(|&d| tol.greater(d, 0.0)) {
                continue;
            }
            for (v, d) in other.vertices.iter().zip(offsets) {
                let projected = *v - face.normal * d;
                if face.contains_projection(self, &projected, tol.epsilon) {
                    if swapped {
                        nearest.offer(*v, projected);
                    } else {
                        nearest.offer(projected, *v);
                    }
                }
            }
        }
    }

    pub fn distance_to_polyhedron(&self, other: &Self, tol: &Tolerance) -> f64 {
        self.separation(other, tol).distance
    }

    /// `None` when the polyhedra intersect.
    pub fn closest_points_to(&self, other: &Self, tol: &Tolerance) -> Option<ClosestPoints> {
        self.separation(other, tol).closest
    }
}
