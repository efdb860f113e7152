//! Per-node boundary classification.
//!
//! Several tagged surfaces can meet at one mesh node (edges and corners of
//! the domain). The solver needs a single composed condition per node, with
//! inlet dominating everything and outlet/symmetry combining into a mixed
//! condition. Symmetry nodes additionally carry the plane normal(s) used to
//! project gradients.

use rustc_hash::FxHashMap;

use crate::core_types::{Boundary, BoundaryKind, Mesh, Vec3};

/// Composed boundary classification of a mesh node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeCondition {
    /// Interior node or untagged surface.
    #[default]
    None,
    /// Dirichlet: field frozen.
    Inlet,
    /// Free outflow.
    Outlet,
    /// Mirror plane.
    Symmetry,
    /// Node on the intersection of outlet and symmetry surfaces.
    OutletSymmetry,
}

/// Configuration failures while composing node conditions.
#[derive(Debug)]
pub enum BoundaryError {
    /// A triangle carries a tag with no entry in the boundary table.
    UnknownBoundaryTag { tag: u32, triangle: usize },
    /// A symmetry boundary whose plane orientation could not be resolved.
    MissingSymmetryOrientation { tag: u32 },
    /// Three or more symmetry planes meet at one node; that node is a
    /// point and cannot move.
    TooManySymmetryPlanes { node: usize },
}

impl std::fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryError::UnknownBoundaryTag { tag, triangle } => {
                write!(f, "Triangle {triangle} carries unknown boundary tag {tag}")
            }
            BoundaryError::MissingSymmetryOrientation { tag } => {
                write!(f, "Symmetry boundary {tag} has no resolvable plane normal")
            }
            BoundaryError::TooManySymmetryPlanes { node } => {
                write!(f, "More than 2 symmetry planes at node {node}. This is a point.")
            }
        }
    }
}

impl std::error::Error for BoundaryError {}

/// Composed per-node boundary data derived from the tag table and the
/// tagged boundary triangles.
#[derive(Debug, Clone, Default)]
pub struct BoundaryModel {
    /// Tags touching each node, in discovery order, duplicates suppressed.
    pub node_conditions: Vec<Vec<u32>>,
    /// Composed classification per node.
    pub conditions: Vec<NodeCondition>,
    /// Symmetry plane unit normals per symmetry node (at most two).
    pub symmetry_normals: FxHashMap<usize, Vec<Vec3>>,
}

impl BoundaryModel {
    /// Build the model from the boundary tag table and the per-triangle tag
    /// list (one tag per mesh triangle, 0 meaning untagged).
    pub fn compose(
        mesh: &Mesh,
        boundaries: &FxHashMap<u32, Boundary>,
        triangle_tags: &[u32],
    ) -> Result<Self, BoundaryError> {
        let mut node_conditions: Vec<Vec<u32>> = vec![Vec::new(); mesh.node_count()];
        for (triangle, &tag) in triangle_tags.iter().enumerate() {
            if tag == 0 {
                continue;
            }
            if !boundaries.contains_key(&tag) {
                return Err(BoundaryError::UnknownBoundaryTag { tag, triangle });
            }
            for &node in &mesh.triangles[triangle] {
                if !node_conditions[node].contains(&tag) {
                    node_conditions[node].push(tag);
                }
            }
        }

        let mut conditions = vec![NodeCondition::None; mesh.node_count()];
        let mut symmetry_normals: FxHashMap<usize, Vec<Vec3>> = FxHashMap::default();

        for (node, tags) in node_conditions.iter().enumerate() {
            let current = &mut conditions[node];
            for &tag in tags {
                // Inlet dominates; nothing can override it.
                if *current == NodeCondition::Inlet {
                    break;
                }
                let boundary = &boundaries[&tag];
                match boundary.kind {
                    BoundaryKind::Inlet => *current = NodeCondition::Inlet,
                    BoundaryKind::Outlet => {
                        *current = match *current {
                            NodeCondition::Symmetry | NodeCondition::OutletSymmetry => {
                                NodeCondition::OutletSymmetry
                            }
                            _ => NodeCondition::Outlet,
                        };
                    }
                    BoundaryKind::Symmetry => {
                        *current = match *current {
                            NodeCondition::Outlet | NodeCondition::OutletSymmetry => {
                                NodeCondition::OutletSymmetry
                            }
                            _ => NodeCondition::Symmetry,
                        };
                        let normal = boundary
                            .plane_normal()
                            .ok_or(BoundaryError::MissingSymmetryOrientation { tag })?;
                        let normals = symmetry_normals.entry(node).or_default();
                        if normals.len() == 2 {
                            return Err(BoundaryError::TooManySymmetryPlanes { node });
                        }
                        normals.push(normal);
                    }
                }
            }
        }

        Ok(Self {
            node_conditions,
            conditions,
            symmetry_normals,
        })
    }
}
