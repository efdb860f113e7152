//! Mutable field buffers for one simulation.

use crate::core_types::Vec3;

/// Per-run mutable state: the tracked scalar field and the work buffers the
/// iteration writes. Allocated to mesh size on a fresh run and preserved
/// across a resume.
#[derive(Debug, Clone, Default)]
pub struct ComputationData {
    /// Scalar field value per node (burn depth / signed progress).
    pub u_vertex: Vec<f64>,
    /// Reconstructed mean gradient per tetrahedron.
    pub gradient: Vec<Vec3>,
    /// Solid-angle-averaged gradient per node (the Hamiltonian argument).
    pub vertex_gradient: Vec<Vec3>,
    /// Hyperbolic flux channel per node.
    pub flux_hamiltonian: Vec<f64>,
    /// Diffusive flux channel per node.
    pub flux_diffusive: Vec<f64>,
}

impl ComputationData {
    /// Allocate buffers for a mesh, seeding the field with `u_initial`.
    pub fn new(node_count: usize, tetrahedra_count: usize, u_initial: f64) -> Self {
        Self {
            u_vertex: vec![u_initial; node_count],
            gradient: vec![Vec3::zeros(); tetrahedra_count],
            vertex_gradient: vec![Vec3::zeros(); node_count],
            flux_hamiltonian: vec![0.0; node_count],
            flux_diffusive: vec![0.0; node_count],
        }
    }
}
