use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, instrument};

use super::ConvexPolyhedron;
use crate::Tolerance;

/// A single consistency violation found by [`ConvexPolyhedron::audit`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshDefect {
    #[error("face {face} has zero area")]
    ZeroAreaFace { face: usize },

    #[error("vertex {vertex} lies {distance:e} off the plane of face {face}")]
    NonPlanarFace {
        face: usize,
        vertex: usize,
        distance: f64,
    },

    #[error("vertex {vertex} lies {distance:e} outside face {face}; the mesh is not convex or the face points inward")]
    VertexOutsideFace {
        face: usize,
        vertex: usize,
        distance: f64,
    },

    #[error("boundary {a}-{b} of face {face} is missing from the edge list")]
    MissingEdge { face: usize, a: usize, b: usize },

    #[error("edge {edge} is not on the boundary of any face")]
    DanglingEdge { edge: usize },

    #[error("a closed polyhedron needs at least 4 faces, found {count}")]
    TooFewFaces { count: usize },

    #[error("edge {a}-{b} borders {faces} face(s); a closed mesh needs exactly 2")]
    OpenEdge { a: usize, b: usize, faces: usize },

    #[error("both faces on edge {a}-{b} traverse it in the same direction")]
    InconsistentWinding { a: usize, b: usize },

    #[error("vertex {vertex} is not on any face")]
    UnusedVertex { vertex: usize },
}

/// Outcome of an audit: every defect found, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshAudit {
    pub defects: Vec<MeshDefect>,
}

impl MeshAudit {
    pub fn is_valid(&self) -> bool {
        self.defects.is_empty()
    }

    pub fn first_defect(&self) -> Option<&MeshDefect> {
        self.defects.first()
    }
}

impl ConvexPolyhedron {
    /// Check that the mesh is a consistent convex polyhedron: planar faces
    /// with non-zero area, every vertex on or behind every face plane, an
    /// edge list matching the face boundaries, and a closed surface.
    #[instrument(skip_all)]
    pub fn audit(&self, tol: &Tolerance) -> MeshAudit {
        let tol = self.resolve(tol);
        let mut defects = Vec::new();

        if self.faces.len() < 4 {
            defects.push(MeshDefect::TooFewFaces {
                count: self.faces.len(),
            });
        }

        for (f, face) in self.faces.iter().enumerate() {
            if tol.is_zero(face.area(self)) {
                defects.push(MeshDefect::ZeroAreaFace { face: f });
            }
            for &v in &face.vertices {
                let distance = face.signed_distance(self, &self.vertices[v]);
                if !tol.is_zero(distance) {
                    defects.push(MeshDefect::NonPlanarFace {
                        face: f,
                        vertex: v,
                        distance,
                    });
                }
            }
            for (v, p) in self.vertices.iter().enumerate() {
                let distance = face.signed_distance(self, p);
                if tol.greater(distance, 0.0) {
                    defects.push(MeshDefect::VertexOutsideFace {
                        face: f,
                        vertex: v,
                        distance,
                    });
                }
            }
        }

        let edge_keys: HashSet<(usize, usize)> = self.edges.iter().map(|e| e.key()).collect();
        let mut boundary_keys = HashSet::new();
        for (f, face) in self.faces.iter().enumerate() {
            for (a, b) in face.boundary() {
                let key = (a.min(b), a.max(b));
                if !edge_keys.contains(&key) {
                    defects.push(MeshDefect::MissingEdge { face: f, a, b });
                }
                boundary_keys.insert(key);
            }
        }
        for (i, edge) in self.edges.iter().enumerate() {
            if !boundary_keys.contains(&edge.key()) {
                defects.push(MeshDefect::DanglingEdge { edge: i });
            }
        }

        self.closure_defects(&mut defects);

        debug!(defects = defects.len(), "mesh audit complete");
        MeshAudit { defects }
    }

    /// Every boundary edge must be shared by exactly two faces that walk it
    /// in opposite directions, and every vertex must lie on some face.
    fn closure_defects(&self, defects: &mut Vec<MeshDefect>) {
        // Edge key -> (faces using it, faces walking it from low to high).
        let mut uses: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
        for face in &self.faces {
            for (a, b) in face.boundary() {
                let entry = uses.entry((a.min(b), a.max(b))).or_default();
                entry.0 += 1;
                if a < b {
                    entry.1 += 1;
                }
            }
        }

        let mut reported = HashSet::new();
        for face in &self.faces {
            for (a, b) in face.boundary() {
                let key = (a.min(b), a.max(b));
                if !reported.insert(key) {
                    continue;
                }
                match uses[&key] {
                    (2, 1) => {}
                    (2, _) => defects.push(MeshDefect::InconsistentWinding {
                        a: key.0,
                        b: key.1,
                    }),
                    (faces, _) => defects.push(MeshDefect::OpenEdge {
                        a: key.0,
                        b: key.1,
                        faces,
                    }),
                }
            }
        }

        let used: HashSet<usize> = self.faces.iter().flat_map(|f| f.vertices.iter().copied()).collect();
        for vertex in (0..self.vertices.len()).filter(|v| !used.contains(v)) {
            defects.push(MeshDefect::UnusedVertex { vertex });
        }
    }

    pub fn is_valid(&self, tol: &Tolerance) -> bool {
        self.audit(tol).is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3d;

    #[test]
    fn test_factory_solids_are_valid() {
        let tol = Tolerance::default();
        let solids = [
            ConvexPolyhedron::tetrahedron().unwrap(),
            ConvexPolyhedron::cube(Point3d::ORIGIN, 2.0).unwrap(),
            ConvexPolyhedron::octahedron(Point3d::ORIGIN, 1.0).unwrap(),
            ConvexPolyhedron::icosahedron(Point3d::ORIGIN, 1.0).unwrap(),
            ConvexPolyhedron::dodecahedron(Point3d::ORIGIN, 1.0).unwrap(),
        ];
        for solid in &solids {
            let audit = solid.audit(&tol);
            assert!(audit.is_valid(), "unexpected defects: {:?}", audit.defects);
        }
    }

    #[test]
    fn test_reports_flipped_face() {
        let mut cube = ConvexPolyhedron::cube(Point3d::ORIGIN, 1.0).unwrap();
        let face = &mut cube.faces[0];
        face.vertices.reverse();
        face.normal = -face.normal;
        let audit = cube.audit(&Tolerance::default());
        assert!(!audit.is_valid());
        assert!(matches!(
            audit.first_defect(),
            Some(MeshDefect::VertexOutsideFace { face: 0, .. })
        ));
        let reversed = audit
            .defects
            .iter()
            .filter(|d| matches!(d, MeshDefect::InconsistentWinding { .. }))
            .count();
        assert_eq!(reversed, 4);
    }

    #[test]
    fn test_reports_open_cube() {
        let mut open = ConvexPolyhedron::cube(Point3d::ORIGIN, 1.0).unwrap();
        let lid = open.faces.pop().unwrap();
        let audit = open.audit(&Tolerance::default());
        assert!(!audit.is_valid());
        for (a, b) in lid.boundary() {
            assert!(audit.defects.contains(&MeshDefect::OpenEdge {
                a: a.min(b),
                b: a.max(b),
                faces: 1,
            }));
        }
        assert_eq!(audit.defects.len(), 4);
    }

    #[test]
    fn test_reports_empty_mesh() {
        let mut empty = ConvexPolyhedron::cube(Point3d::ORIGIN, 1.0).unwrap();
        empty.faces.clear();
        empty.edges.clear();
        let audit = empty.audit(&Tolerance::default());
        assert_eq!(audit.first_defect(), Some(&MeshDefect::TooFewFaces { count: 0 }));
        assert!(audit.defects.contains(&MeshDefect::UnusedVertex { vertex: 7 }));
    }

    #[cfg(debug_assertions)]
    #[test]
    fn test_debug_build_rejects_open_meshes() {
        let cube = ConvexPolyhedron::cube(Point3d::ORIGIN, 1.0).unwrap();
        let corners = cube.vertices().to_vec();
        let five: Vec<Vec<usize>> = cube.faces()[..5].iter().map(|f| f.vertices.clone()).collect();
        let err = ConvexPolyhedron::from_faces(corners.clone(), five, true).unwrap_err();
        assert!(matches!(
            err,
            crate::GeometryError::InconsistentMesh(MeshDefect::OpenEdge { faces: 1, .. })
        ));

        let err = ConvexPolyhedron::new(corners, vec![], vec![], false).unwrap_err();
        assert_eq!(
            err,
            crate::GeometryError::InconsistentMesh(MeshDefect::TooFewFaces { count: 0 })
        );
    }

    #[test]
    fn test_reports_non_planar_face() {
        let mut cube = ConvexPolyhedron::cube(Point3d::ORIGIN, 1.0).unwrap();
        let v = cube.faces()[0].vertices[3];
        let normal = cube.faces()[0].normal;
        cube.vertices[v] = cube.vertices[v] + normal * 0.1;
        let audit = cube.audit(&Tolerance::default());
        assert!(audit.defects.iter().any(|d| matches!(
            d,
            MeshDefect::NonPlanarFace { face: 0, vertex, .. } if *vertex == v
        )));
    }

    #[test]
    fn test_reports_edge_mismatch() {
        let mut broken = ConvexPolyhedron::cube(Point3d::ORIGIN, 1.0).unwrap();
        let removed = broken.edges.pop().unwrap();
        // Diagonal of the -z face.
        broken.edges.push(crate::Edge::new(0, 3));
        broken.invalidate_caches();

        let audit = broken.audit(&Tolerance::default());
        assert!(audit.defects.contains(&MeshDefect::DanglingEdge { edge: 11 }));
        assert!(audit.defects.iter().any(|d| matches!(
            d,
            MeshDefect::MissingEdge { a, b, .. }
                if (*a.min(b), *a.max(b)) == removed.key()
        )));
    }

    #[test]
    fn test_defect_messages() {
        let defect = MeshDefect::DanglingEdge { edge: 4 };
        assert_eq!(defect.to_string(), "edge 4 is not on the boundary of any face");
        let defect = MeshDefect::OpenEdge { a: 1, b: 5, faces: 1 };
        assert_eq!(
            defect.to_string(),
            "edge 1-5 borders 1 face(s); a closed mesh needs exactly 2"
        );
    }
}
