pub mod error;
pub mod geometry;
pub mod polyhedron;

use serde::{Deserialize, Serialize};

// Re-export the core types at crate root for convenience.
pub use error::{GeometryError, GeometryResult};
pub use polyhedron::{
    ClosestPoints, ConvexPolyhedron, Edge, Face, MeshAudit, MeshDefect, PointClassification,
    SeparatingAxis, Separation,
};

/// How a [`Tolerance`] epsilon is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToleranceMode {
    /// The epsilon is used as-is, in model units.
    #[default]
    Absolute,
    /// The epsilon is a fraction of the characteristic size of the shape
    /// being queried.
    Relative,
}

/// Tolerance used by every geometric predicate in the kernel.
///
/// Passed explicitly to each query; there is no process-wide epsilon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub epsilon: f64,
    pub mode: ToleranceMode,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            epsilon: 1e-9,
            mode: ToleranceMode::Absolute,
        }
    }
}

impl Tolerance {
    pub fn absolute(epsilon: f64) -> Self {
        Self {
            epsilon: epsilon.abs(),
            mode: ToleranceMode::Absolute,
        }
    }

    pub fn relative(epsilon: f64) -> Self {
        Self {
            epsilon: epsilon.abs(),
            mode: ToleranceMode::Relative,
        }
    }

    pub fn loose() -> Self {
        Self::absolute(1e-6)
    }

    pub fn tight() -> Self {
        Self::absolute(1e-12)
    }

    /// Resolve against a characteristic size, yielding an absolute tolerance.
    ///
    /// In relative mode the epsilon is multiplied by `size`; a zero or
    /// non-finite size falls back to a unit size.
    pub fn for_size(&self, size: f64) -> Tolerance {
        match self.mode {
            ToleranceMode::Absolute => *self,
            ToleranceMode::Relative => {
                let size = if size.is_finite() && size > 0.0 { size } else { 1.0 };
                Tolerance::absolute(self.epsilon * size)
            }
        }
    }

    pub fn almost_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.epsilon
    }

    /// `a` exceeds `b` by more than epsilon.
    pub fn greater(&self, a: f64, b: f64) -> bool {
        a > b + self.epsilon
    }

    /// `a` is below `b` by more than epsilon.
    pub fn smaller(&self, a: f64, b: f64) -> bool {
        a < b - self.epsilon
    }

    pub fn is_zero(&self, value: f64) -> bool {
        value.abs() <= self.epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_absolute() {
        let tol = Tolerance::default();
        assert_eq!(tol.mode, ToleranceMode::Absolute);
        assert!(tol.almost_equal(1.0, 1.0 + 1e-10));
        assert!(!tol.almost_equal(1.0, 1.0 + 1e-8));
    }

    #[test]
    fn test_greater_and_smaller_are_strict_beyond_epsilon() {
        let tol = Tolerance::absolute(0.1);
        assert!(!tol.greater(1.05, 1.0));
        assert!(tol.greater(1.2, 1.0));
        assert!(!tol.smaller(0.95, 1.0));
        assert!(tol.smaller(0.8, 1.0));
    }

    #[test]
    fn test_relative_scales_with_size() {
        let tol = Tolerance::relative(1e-3);
        let resolved = tol.for_size(100.0);
        assert_eq!(resolved.mode, ToleranceMode::Absolute);
        assert!((resolved.epsilon - 0.1).abs() < 1e-12);
        // Absolute tolerances ignore the size.
        let abs = Tolerance::absolute(1e-3).for_size(100.0);
        assert!((abs.epsilon - 1e-3).abs() < 1e-15);
    }

    #[test]
    fn test_relative_zero_size_falls_back_to_unit() {
        let resolved = Tolerance::relative(1e-4).for_size(0.0);
        assert!((resolved.epsilon - 1e-4).abs() < 1e-15);
    }

    #[test]
    fn test_tolerance_deserializes_from_config() {
        let tol: Tolerance =
            serde_json::from_str(r#"{"epsilon":1e-6,"mode":"Relative"}"#).unwrap();
        assert_eq!(tol, Tolerance::relative(1e-6));
    }
}
