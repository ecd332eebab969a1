use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ConvexPolyhedron;
use crate::Tolerance;
use crate::geometry::{Point3d, Vec3};

/// Fixed slack for projection intervals on edge-pair axes.
pub const EDGE_AXIS_EPSILON: f64 = 1e-9;

/// Edge pairs whose directions are this close to parallel (sine of the
/// angle between them) produce no axis.
pub const PARALLEL_AXIS_EPSILON: f64 = 1e-9;

/// The axis that proved two polyhedra disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeparatingAxis {
    /// World axis `0..3` along which the bounding boxes are apart.
    CoordinateAxis(usize),
    FaceOfSelf(usize),
    FaceOfOther(usize),
    EdgePair {
        edge_of_self: usize,
        edge_of_other: usize,
    },
}

/// `(min, max)` of the points projected on `axis`.
fn project(points: impl IntoIterator<Item = Point3d>, axis: &Vec3) -> (f64, f64) {
    points
        .into_iter()
        .map(|p| p.to_vec3().dot(axis))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| (lo.min(d), hi.max(d)))
}

/// Gap-based so that swapping the operands or negating the axis gives the
/// same answer bit for bit.
fn intervals_apart(a: (f64, f64), b: (f64, f64), eps: f64) -> bool {
    b.0 - a.1 > eps || a.0 - b.1 > eps
}

/// Unit cross axis of two edge directions, `None` when near-parallel.
fn cross_axis(da: &Vec3, db: &Vec3) -> Option<Vec3> {
    let axis = da.cross(db);
    let len = axis.length();
    if len <= PARALLEL_AXIS_EPSILON * (da.length() * db.length()) || len == 0.0 {
        None
    } else {
        Some(axis / len)
    }
}

impl ConvexPolyhedron {
    /// Separating-axis test. Touching counts as intersecting.
    pub fn intersects(&self, other: &Self, tol: &Tolerance) -> bool {
        self.separating_axis(other, tol).is_none()
    }

    /// The first axis found that separates the two polyhedra, if any.
    ///
    /// Candidates are tried in order: bounding-box coordinate axes, faces
    /// of `self`, faces of `other`, then the cross products of edge pairs.
    pub fn separating_axis(&self, other: &Self, tol: &Tolerance) -> Option<SeparatingAxis> {
        let tol = self.resolve_pair(other, tol);
        let found = self.find_separating_axis(other, &tol);
        match found {
            Some(axis) => debug!(?axis, "separating axis found"),
            None => debug!("no separating axis"),
        }
        found
    }

    fn find_separating_axis(&self, other: &Self, tol: &Tolerance) -> Option<SeparatingAxis> {
        let (a, b) = (self.bounding_box(), other.bounding_box());
        let ahead = b.min - a.max;
        let behind = a.min - b.max;
        let gaps = [
            (ahead.x, behind.x),
            (ahead.y, behind.y),
            (ahead.z, behind.z),
        ];
        if let Some(k) = gaps
            .iter()
            .position(|&(ahead, behind)| ahead > tol.epsilon || behind > tol.epsilon)
        {
            return Some(SeparatingAxis::CoordinateAxis(k));
        }

        if let Some(i) = self.separating_face(&other.vertices, tol) {
            return Some(SeparatingAxis::FaceOfSelf(i));
        }
        if let Some(i) = other.separating_face(&self.vertices, tol) {
            return Some(SeparatingAxis::FaceOfOther(i));
        }

        for (i, ea) in self.edges.iter().enumerate() {
            let da = ea.direction(self);
            for (j, eb) in other.edges.iter().enumerate() {
                let Some(axis) = cross_axis(&da, &eb.direction(other)) else {
                    continue;
                };
                let pa = project(self.vertices.iter().copied(), &axis);
                let pb = project(other.vertices.iter().copied(), &axis);
                if intervals_apart(pa, pb, EDGE_AXIS_EPSILON) {
                    return Some(SeparatingAxis::EdgePair {
                        edge_of_self: i,
                        edge_of_other: j,
                    });
                }
            }
        }
        None
    }

    /// Index of a face with every point strictly in front of it.
    pub(crate) fn separating_face(&self, points: &[Point3d], tol: &Tolerance) -> Option<usize> {
        self.faces.iter().position(|face| {
            points
                .iter()
                .all(|p| tol.greater(face.signed_distance(self, p), 0.0))
        })
    }

    /// Separating-axis test against a convex primitive given by its
    /// points, its face normals and its edge directions. Segments have no
    /// normals.
    pub(crate) fn separated_from_primitive(
        &self,
        points: &[Point3d],
        normals: &[Vec3],
        directions: &[Vec3],
        tol: &Tolerance,
    ) -> bool {
        let tol = self.resolve(tol);
        if self.separating_face(points, &tol).is_some() {
            return true;
        }

        let ours = |axis: &Vec3| project(self.vertices.iter().copied(), axis);
        let theirs = |axis: &Vec3| project(points.iter().copied(), axis);
        if normals
            .iter()
            .any(|n| intervals_apart(ours(n), theirs(n), tol.epsilon))
        {
            return true;
        }

        self.edges.iter().any(|e| {
            let de = e.direction(self);
            directions.iter().any(|d| {
                cross_axis(&de, d)
                    .is_some_and(|axis| intervals_apart(ours(&axis), theirs(&axis), EDGE_AXIS_EPSILON))
            })
        })
    }
}
