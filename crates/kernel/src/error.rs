use thiserror::Error;

use crate::polyhedron::MeshDefect;

/// Failures reported by polyhedron construction and queries.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum GeometryError {
    #[error("face {face} has {count} vertices, at least 3 are required")]
    TooFewVertices { face: usize, count: usize },

    #[error("{what} references vertex {index}, but only {len} vertices exist")]
    InvalidIndex {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("face {face} is degenerate: its first three vertices are collinear")]
    DegenerateFace { face: usize },

    #[error("inconsistent convex mesh: {0}")]
    InconsistentMesh(MeshDefect),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{operation} is not supported for convex polyhedra")]
    Unsupported { operation: &'static str },
}

pub type GeometryResult<T> = Result<T, GeometryError>;
