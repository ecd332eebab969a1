//! Convex polyhedra: a flat vertex/edge/face mesh with outward-oriented
//! faces, and the separating-axis algorithms built on it.
//!
//! Edges and faces are plain index structs. Anything that needs coordinates
//! takes the owning [`ConvexPolyhedron`] explicitly.

mod audit;
mod classify;
mod distance;
mod primitive;
mod sat;
mod solids;
mod transform;

pub use audit::{MeshAudit, MeshDefect};
pub use classify::PointClassification;
pub use distance::{ClosestPoints, Separation};
pub use sat::{EDGE_AXIS_EPSILON, PARALLEL_AXIS_EPSILON, SeparatingAxis};

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::Tolerance;
use crate::error::{GeometryError, GeometryResult};
use crate::geometry::{BoundingBox, OrientedBox, Plane, Point3d, Segment, Sphere, Triangle, Vec3};

// ─── Edge ────────────────────────────────────────────────────────────────────

/// An unordered pair of vertex indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
}

impl Edge {
    pub fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }

    /// Order-independent key.
    pub fn key(&self) -> (usize, usize) {
        (self.a.min(self.b), self.a.max(self.b))
    }

    pub fn segment(&self, owner: &ConvexPolyhedron) -> Segment {
        Segment::new(owner.vertices[self.a], owner.vertices[self.b])
    }

    pub fn direction(&self, owner: &ConvexPolyhedron) -> Vec3 {
        owner.vertices[self.b] - owner.vertices[self.a]
    }
}

// ─── Face ────────────────────────────────────────────────────────────────────

/// A planar polygon, counter-clockwise when seen from outside, with its
/// cached outward unit normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub vertices: Vec<usize>,
    pub normal: Vec3,
}

impl Face {
    pub fn points<'a>(&'a self, owner: &'a ConvexPolyhedron) -> impl Iterator<Item = Point3d> + 'a {
        self.vertices.iter().map(move |&i| owner.vertices[i])
    }

    /// Consecutive boundary index pairs, closing back to the first vertex.
    pub fn boundary(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Supporting plane through the first vertex.
    pub fn plane(&self, owner: &ConvexPolyhedron) -> Plane {
        Plane {
            origin: owner.vertices[self.vertices[0]],
            normal: self.normal,
        }
    }

    pub fn signed_distance(&self, owner: &ConvexPolyhedron, p: &Point3d) -> f64 {
        (*p - owner.vertices[self.vertices[0]]).dot(&self.normal)
    }

    /// Fan triangulation sharing vertex 0.
    pub fn triangles<'a>(&'a self, owner: &'a ConvexPolyhedron) -> impl Iterator<Item = Triangle> + 'a {
        let v0 = owner.vertices[self.vertices[0]];
        self.vertices.windows(2).skip(1).map(move |w| {
            Triangle::new(v0, owner.vertices[w[0]], owner.vertices[w[1]])
        })
    }

    pub fn area(&self, owner: &ConvexPolyhedron) -> f64 {
        self.triangles(owner).map(|t| t.area()).sum()
    }

    /// Whether a point already lying in the face plane falls inside the
    /// polygon, walking the boundary and checking the sign of
    /// `cross(edge, point - edge_start) . normal`.
    pub fn contains_projection(&self, owner: &ConvexPolyhedron, p: &Point3d, eps: f64) -> bool {
        self.boundary().all(|(i, j)| {
            let start = owner.vertices[i];
            let edge = owner.vertices[j] - start;
            // The cross product scales with the edge length.
            edge.cross(&(*p - start)).dot(&self.normal) >= -eps * edge.length()
        })
    }
}

/// Unit normal of the polygon's first three vertices.
fn face_normal(vertices: &[Point3d], face: &[usize]) -> Option<Vec3> {
    let a = vertices[face[0]];
    (vertices[face[1]] - a).cross(&(vertices[face[2]] - a)).normalized()
}

// ─── ConvexPolyhedron ────────────────────────────────────────────────────────

/// A convex polyhedron owning its vertices, edges and faces.
///
/// Convexity is a precondition supplied by the constructing code; debug
/// builds audit it on construction. Deserialization goes through
/// [`ConvexPolyhedron::new`], so stored normals are recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawPolyhedron")]
pub struct ConvexPolyhedron {
    vertices: Vec<Point3d>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
    #[serde(skip)]
    bounding_box: OnceLock<BoundingBox>,
    #[serde(skip)]
    segments: OnceLock<Vec<Segment>>,
}

/// Serialized layout of a [`ConvexPolyhedron`], before validation.
#[derive(Deserialize)]
struct RawPolyhedron {
    vertices: Vec<Point3d>,
    edges: Vec<Edge>,
    faces: Vec<RawFace>,
}

#[derive(Deserialize)]
struct RawFace {
    vertices: Vec<usize>,
}

impl TryFrom<RawPolyhedron> for ConvexPolyhedron {
    type Error = GeometryError;

    fn try_from(raw: RawPolyhedron) -> GeometryResult<Self> {
        let faces = raw.faces.into_iter().map(|f| f.vertices).collect();
        Self::new(raw.vertices, raw.edges, faces, false)
    }
}

impl PartialEq for ConvexPolyhedron {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices && self.edges == other.edges && self.faces == other.faces
    }
}

impl ConvexPolyhedron {
    /// Build a polyhedron from explicit arrays.
    ///
    /// Each face's normal comes from its first three vertices. With
    /// `correct_orientation`, faces whose normal points toward the centroid
    /// are reversed. Debug builds reject meshes that fail [`Self::audit`].
    #[instrument(skip_all, fields(vertices = vertices.len(), edges = edges.len(), faces = faces.len()))]
    pub fn new(
        vertices: Vec<Point3d>,
        edges: Vec<Edge>,
        faces: Vec<Vec<usize>>,
        correct_orientation: bool,
    ) -> GeometryResult<Self> {
        let n = vertices.len();
        for (i, edge) in edges.iter().enumerate() {
            for index in [edge.a, edge.b] {
                if index >= n {
                    return Err(GeometryError::InvalidIndex {
                        what: "edge",
                        index,
                        len: n,
                    });
                }
            }
            if edge.a == edge.b {
                return Err(GeometryError::InvalidArgument(format!(
                    "edge {i} joins vertex {} to itself",
                    edge.a
                )));
            }
        }
        for (f, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(GeometryError::TooFewVertices {
                    face: f,
                    count: face.len(),
                });
            }
            if let Some(&index) = face.iter().find(|&&i| i >= n) {
                return Err(GeometryError::InvalidIndex {
                    what: "face",
                    index,
                    len: n,
                });
            }
        }

        let center = Point3d::centroid(&vertices);
        let mut built = Vec::with_capacity(faces.len());
        let mut corrected = 0usize;
        for (f, mut indices) in faces.into_iter().enumerate() {
            let mut normal =
                face_normal(&vertices, &indices).ok_or(GeometryError::DegenerateFace { face: f })?;
            if correct_orientation && (center - vertices[indices[0]]).dot(&normal) > 0.0 {
                indices.reverse();
                normal = face_normal(&vertices, &indices)
                    .ok_or(GeometryError::DegenerateFace { face: f })?;
                corrected += 1;
            }
            built.push(Face {
                vertices: indices,
                normal,
            });
        }
        if corrected > 0 {
            debug!(corrected, "reversed inward-facing faces");
        }

        let poly = Self {
            vertices,
            edges,
            faces: built,
            bounding_box: OnceLock::new(),
            segments: OnceLock::new(),
        };

        if cfg!(debug_assertions) {
            if let Some(defect) = poly.audit(&Tolerance::relative(1e-9)).first_defect() {
                return Err(GeometryError::InconsistentMesh(defect.clone()));
            }
        }
        Ok(poly)
    }

    /// Build a polyhedron whose edge list is derived from the face
    /// boundaries.
    pub fn from_faces(
        vertices: Vec<Point3d>,
        faces: Vec<Vec<usize>>,
        correct_orientation: bool,
    ) -> GeometryResult<Self> {
        let edges = edges_from_faces(&faces);
        Self::new(vertices, edges, faces, correct_orientation)
    }

    pub fn vertices(&self) -> &[Point3d] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Mean of the vertices.
    pub fn center(&self) -> Point3d {
        Point3d::centroid(&self.vertices)
    }

    /// Sum of signed tetrahedra spanned by the center and each fan triangle.
    pub fn volume(&self) -> f64 {
        let c = self.center();
        self.fan_triangles()
            .map(|t| (t.a - c).triple(&(t.b - c), &(t.c - c)) / 6.0)
            .sum()
    }

    pub fn area(&self) -> f64 {
        self.faces.iter().map(|f| f.area(self)).sum()
    }

    /// Every face's fan triangles.
    pub fn fan_triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().flat_map(move |f| f.triangles(self))
    }

    /// Memoized axis-aligned bounding box.
    pub fn bounding_box(&self) -> BoundingBox {
        *self
            .bounding_box
            .get_or_init(|| BoundingBox::from_points(&self.vertices))
    }

    /// Memoized edge list resolved to segments.
    pub fn boundary_segments(&self) -> &[Segment] {
        self.segments
            .get_or_init(|| self.edges.iter().map(|e| e.segment(self)).collect())
    }

    /// Bounding-box diagonal; the size relative tolerances scale by.
    pub fn characteristic_size(&self) -> f64 {
        self.bounding_box().diagonal()
    }

    pub(crate) fn resolve(&self, tol: &Tolerance) -> Tolerance {
        tol.for_size(self.characteristic_size())
    }

    pub(crate) fn resolve_pair(&self, other: &Self, tol: &Tolerance) -> Tolerance {
        tol.for_size(self.characteristic_size().max(other.characteristic_size()))
    }

    /// Drop memoized data after a vertex mutation.
    pub(crate) fn invalidate_caches(&mut self) {
        self.bounding_box = OnceLock::new();
        self.segments = OnceLock::new();
    }

    pub fn minimum_bounding_box(&self) -> GeometryResult<OrientedBox> {
        Err(GeometryError::Unsupported {
            operation: "minimum bounding box",
        })
    }

    pub fn bounding_sphere(&self) -> GeometryResult<Sphere> {
        Err(GeometryError::Unsupported {
            operation: "bounding sphere",
        })
    }
}

/// Unique undirected edges of the face boundaries, in first-seen order.
pub(crate) fn edges_from_faces(faces: &[Vec<usize>]) -> Vec<Edge> {
    let mut seen = std::collections::HashSet::new();
    let mut edges = Vec::new();
    for face in faces {
        let n = face.len();
        for i in 0..n {
            let edge = Edge::new(face[i], face[(i + 1) % n]);
            if seen.insert(edge.key()) {
                edges.push(edge);
            }
        }
    }
    edges
}

/// Prints a construction literal that rebuilds this exact polyhedron.
impl fmt::Display for ConvexPolyhedron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ConvexPolyhedron::new(")?;
        writeln!(f, "    vec![")?;
        for v in &self.vertices {
            writeln!(f, "        Point3d::new({:?}, {:?}, {:?}),", v.x, v.y, v.z)?;
        }
        writeln!(f, "    ],")?;
        write!(f, "    vec![")?;
        for (i, e) in self.edges.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "Edge::new({}, {})", e.a, e.b)?;
        }
        writeln!(f, "],")?;
        writeln!(f, "    vec![")?;
        for face in &self.faces {
            writeln!(f, "        vec!{:?},", face.vertices)?;
        }
        writeln!(f, "    ],")?;
        writeln!(f, "    false,")?;
        write!(f, ")")
    }
}
