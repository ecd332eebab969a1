use serde::{Deserialize, Serialize};

use super::point::Point3d;

/// A tetrahedron given by its four corners, in any order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tetrahedron {
    pub vertices: [Point3d; 4],
}

impl Default for Tetrahedron {
    fn default() -> Self {
        Self::new(
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(0.0, 1.0, 1.0),
            Point3d::new(1.0, 0.0, 1.0),
            Point3d::new(1.0, 1.0, 0.0),
        )
    }
}

impl Tetrahedron {
    pub fn new(a: Point3d, b: Point3d, c: Point3d, d: Point3d) -> Self {
        Self {
            vertices: [a, b, c, d],
        }
    }

    /// Positive when `d` lies on the side of triangle `abc` its
    /// right-hand normal points to.
    pub fn signed_volume(&self) -> f64 {
        let [a, b, c, d] = self.vertices;
        (b - a).triple(&(c - a), &(d - a)) / 6.0
    }

    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    pub fn centroid(&self) -> Point3d {
        Point3d::centroid(&self.vertices)
    }
}
