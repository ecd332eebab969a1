use serde::{Deserialize, Serialize};

use super::point::Point3d;

/// A solid ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Point3d,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Point3d, radius: f64) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }

    /// Distance from the ball to `p`; zero inside.
    pub fn distance_to_point(&self, p: &Point3d) -> f64 {
        (self.center.distance_to(p) - self.radius).max(0.0)
    }

    pub fn contains_point(&self, p: &Point3d) -> bool {
        self.center.distance_to(p) <= self.radius
    }

    pub fn volume(&self) -> f64 {
        4.0 / 3.0 * std::f64::consts::PI * self.radius.powi(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_distance() {
        let s = Sphere::new(Point3d::new(1.0, 0.0, 0.0), 2.0);
        assert!((s.distance_to_point(&Point3d::new(5.0, 0.0, 0.0)) - 2.0).abs() < 1e-12);
        assert_eq!(s.distance_to_point(&Point3d::ORIGIN), 0.0);
        assert!(s.contains_point(&Point3d::new(2.5, 0.0, 0.0)));
        assert!(!s.contains_point(&Point3d::new(3.5, 0.0, 0.0)));
    }
}
