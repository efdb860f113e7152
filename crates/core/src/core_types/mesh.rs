//! Tetrahedral mesh container and load-time validation.

use crate::core_types::Vec3;

/// Immutable tetrahedral volume mesh.
///
/// Node indices stored in `triangles` and `tetrahedra` are 0-based. Input
/// documents are 1-based and are decremented on ingestion (see `io`).
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Node coordinates; the index is the global node id.
    pub nodes: Vec<Vec3>,
    /// Boundary faces as node-index triples.
    pub triangles: Vec<[usize; 3]>,
    /// Volume elements as node-index 4-tuples.
    pub tetrahedra: Vec<[usize; 4]>,
}

/// Validation failures for a freshly ingested mesh.
#[derive(Debug)]
pub enum MeshError {
    /// A triangle references a node index outside `nodes`.
    TriangleIndexOutOfRange { triangle: usize, index: usize },
    /// A tetrahedron references a node index outside `nodes`.
    TetrahedronIndexOutOfRange { tetrahedron: usize, index: usize },
    /// A tetrahedron's four nodes are (near-)coplanar and carry no volume.
    DegenerateTetrahedron { tetrahedron: usize },
}

impl std::fmt::Display for MeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshError::TriangleIndexOutOfRange { triangle, index } => {
                write!(f, "Triangle {triangle} references invalid node {index}")
            }
            MeshError::TetrahedronIndexOutOfRange { tetrahedron, index } => {
                write!(f, "Tetrahedron {tetrahedron} references invalid node {index}")
            }
            MeshError::DegenerateTetrahedron { tetrahedron } => {
                write!(f, "Tetrahedron {tetrahedron} is degenerate (coplanar nodes)")
            }
        }
    }
}

impl std::error::Error for MeshError {}

impl Mesh {
    /// Number of nodes in the mesh.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Local vertices of tetrahedron `tet` with `vertex` taken as apex O;
    /// the remaining three follow in cyclic order as A, B, C.
    pub fn apex_ordering(&self, tet: usize, vertex: usize) -> [usize; 4] {
        let t = &self.tetrahedra[tet];
        [
            t[vertex],
            t[(vertex + 1) % 4],
            t[(vertex + 2) % 4],
            t[(vertex + 3) % 4],
        ]
    }

    /// Check index ranges and reject degenerate elements.
    ///
    /// A tetrahedron is degenerate when its signed volume is below a
    /// tolerance relative to the cube of its longest edge.
    pub fn validate(&self) -> Result<(), MeshError> {
        let count = self.nodes.len();
        for (i, triangle) in self.triangles.iter().enumerate() {
            for &index in triangle {
                if index >= count {
                    return Err(MeshError::TriangleIndexOutOfRange { triangle: i, index });
                }
            }
        }
        for (i, tet) in self.tetrahedra.iter().enumerate() {
            for &index in tet {
                if index >= count {
                    return Err(MeshError::TetrahedronIndexOutOfRange {
                        tetrahedron: i,
                        index,
                    });
                }
            }
            let o = self.nodes[tet[0]];
            let oa = self.nodes[tet[1]] - o;
            let ob = self.nodes[tet[2]] - o;
            let oc = self.nodes[tet[3]] - o;
            let jacobi = oa.cross(&ob).dot(&oc);
            let edge = oa.norm().max(ob.norm()).max(oc.norm());
            if jacobi.abs() <= 1e-12 * edge * edge * edge {
                return Err(MeshError::DegenerateTetrahedron { tetrahedron: i });
            }
        }
        Ok(())
    }
}
