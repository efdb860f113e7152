//! Vertex flux assembly, boundary flux application, and the explicit update.
//!
//! The hyperbolic channel carries the Eikonal residual `1 − r·|∇u|`; the
//! diffusive channel accumulates each element's departure from the
//! node-averaged gradient, a Laplacian-like upwind correction weighted by
//! the solid-angle vertex weights.

use rayon::prelude::*;

use crate::core_types::{Mesh, Vec3};
use crate::solver::boundary::{BoundaryModel, NodeCondition};
use crate::solver::fields::ComputationData;
use crate::solver::geometry::TetrahedraGeometry;
use crate::solver::recession::RecessionField;

/// Assemble the per-node averaged gradient and the diffusive flux channel.
///
/// Three steps, in order: scatter each element gradient to its nodes with
/// the solid-angle weights; project the averaged gradient flat along any
/// symmetry plane(s) at the node; accumulate the diffusive correction
/// `weight · (∇u_T − ∇u_node)·n` per incident element.
pub fn compute_fluxes(
    mesh: &Mesh,
    geometry: &TetrahedraGeometry,
    boundary: &BoundaryModel,
    data: &mut ComputationData,
) {
    data.vertex_gradient.fill(Vec3::zeros());
    data.flux_hamiltonian.fill(0.0);
    data.flux_diffusive.fill(0.0);

    for (tet, nodes) in mesh.tetrahedra.iter().enumerate() {
        let gradient = data.gradient[tet];
        for (vertex, &node) in nodes.iter().enumerate() {
            let weight = geometry.vertex_weight[tet][vertex];
            data.vertex_gradient[node] += gradient * weight;
        }
    }

    // Mirror condition: remove the gradient component(s) along the
    // symmetry plane normal(s) before the averaged gradient is used.
    data.vertex_gradient
        .par_iter_mut()
        .enumerate()
        .for_each(|(node, vertex_gradient)| {
            match boundary.conditions[node] {
                NodeCondition::Symmetry | NodeCondition::OutletSymmetry => {}
                _ => return,
            }
            let normals = &boundary.symmetry_normals[&node];
            if let [normal] = normals.as_slice() {
                *vertex_gradient = normal.cross(vertex_gradient).cross(normal);
            } else if let [normal_1, normal_2] = normals.as_slice() {
                let along_1 = normal_1 * vertex_gradient.dot(normal_1);
                let along_2 = normal_2 * vertex_gradient.dot(normal_2);
                *vertex_gradient -= along_1 + along_2;
            }
        });

    for (tet, nodes) in mesh.tetrahedra.iter().enumerate() {
        let gradient = data.gradient[tet];
        for (vertex, &node) in nodes.iter().enumerate() {
            let weight = geometry.vertex_weight[tet][vertex];
            let normal = geometry.normal[tet][vertex];
            let departure = gradient - data.vertex_gradient[node];
            data.flux_diffusive[node] += departure.dot(&normal) * weight;
        }
    }
}

/// Apply the composed boundary condition of every node to its flux
/// channels. Inlets freeze the field (both channels zeroed); everything
/// else receives the normalized Eikonal residual.
pub fn apply_boundary_conditions(
    boundary: &BoundaryModel,
    recession: &RecessionField,
    data: &mut ComputationData,
) {
    let vertex_gradient = &data.vertex_gradient;
    data.flux_hamiltonian
        .par_iter_mut()
        .zip(data.flux_diffusive.par_iter_mut())
        .enumerate()
        .for_each(|(node, (flux_hamiltonian, flux_diffusive))| {
            match boundary.conditions[node] {
                NodeCondition::Inlet => {
                    *flux_hamiltonian = 0.0;
                    *flux_diffusive = 0.0;
                }
                NodeCondition::None
                | NodeCondition::Outlet
                | NodeCondition::Symmetry
                | NodeCondition::OutletSymmetry => {
                    *flux_hamiltonian = 1.0 - recession.rate(node) * vertex_gradient[node].norm();
                }
            }
        });
}

/// Explicit Euler update of the scalar field from both flux channels.
pub fn compute_results(
    recession: &RecessionField,
    diffusive_weight: f64,
    time_step: f64,
    data: &mut ComputationData,
) {
    let flux_hamiltonian = &data.flux_hamiltonian;
    let flux_diffusive = &data.flux_diffusive;
    data.u_vertex
        .par_iter_mut()
        .enumerate()
        .for_each(|(node, u)| {
            *u += time_step
                * (flux_hamiltonian[node]
                    + diffusive_weight * recession.rate(node) * flux_diffusive[node]);
        });
}

/// Root-mean-square of the hyperbolic flux channel: the Eikonal residual
/// used for convergence monitoring and divergence detection.
pub fn residual(data: &ComputationData) -> f64 {
    let count = data.flux_hamiltonian.len();
    if count == 0 {
        return 0.0;
    }
    let sum: f64 = data.flux_hamiltonian.iter().map(|flux| flux * flux).sum();
    (sum / count as f64).sqrt()
}
