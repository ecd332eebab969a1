use serde::{Deserialize, Serialize};

use super::ConvexPolyhedron;
use crate::Tolerance;
use crate::geometry::Point3d;

/// Classification of a point relative to a polyhedron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointClassification {
    Inside,
    Outside,
    OnBoundary,
}

impl ConvexPolyhedron {
    /// Classify a point against every face plane.
    ///
    /// A single face more than eps in front of the point makes it Outside.
    /// Otherwise any face within eps makes it OnBoundary.
    pub fn classify_point(&self, point: &Point3d, tol: &Tolerance) -> PointClassification {
        let tol = self.resolve(tol);
        let mut on_boundary = false;
        for face in &self.faces {
            let d = face.signed_distance(self, point);
            if tol.greater(d, 0.0) {
                return PointClassification::Outside;
            }
            if !tol.smaller(d, 0.0) {
                on_boundary = true;
            }
        }
        if on_boundary {
            PointClassification::OnBoundary
        } else {
            PointClassification::Inside
        }
    }

    /// True for points inside or on the boundary.
    pub fn contains_point(&self, point: &Point3d, tol: &Tolerance) -> bool {
        self.classify_point(point, tol) != PointClassification::Outside
    }
}
