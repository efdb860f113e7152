//! One-time geometric precomputation over the tetrahedral mesh.
//!
//! For every tetrahedron and every local vertex taken as apex, this pass
//! derives the solid angle subtended at the apex, the unit-sphere-projected
//! normal and area of the opposite face, the element Jacobian, and the
//! solid-angle vertex weights that make gradient averaging consistent
//! across elements. It also yields the stable explicit time-step bound.

use rayon::prelude::*;

use crate::core_types::{Mesh, Vec3};

/// Per-tetrahedron, per-local-vertex geometric quantities.
///
/// `jacobi_det` is the signed triple product of the edge vectors taken from
/// local vertex 0; its absolute value equals six times the element volume.
/// The signed value feeds gradient reconstruction, the absolute value feeds
/// volume and time-step uses.
#[derive(Debug, Clone, Default)]
pub struct TetrahedraGeometry {
    /// Solid angle subtended at each local vertex (steradians, unsigned).
    pub solid_angle: Vec<[f64; 4]>,
    /// Area of the unit-sphere projection of the face opposite each vertex.
    pub triangle_area: Vec<[f64; 4]>,
    /// Outward unit normal of the face opposite each vertex.
    pub normal: Vec<[Vec3; 4]>,
    /// Solid angle normalized against the total angle around the global
    /// node; the weights incident to one node sum to 1.
    pub vertex_weight: Vec<[f64; 4]>,
    /// Signed Jacobian per tetrahedron.
    pub jacobi_det: Vec<f64>,
    /// Accumulated solid angle around each global node.
    pub angle_total: Vec<f64>,
    /// Unscaled stable time-step bound, `min |J| / (2·face area)` over all
    /// (tetrahedron, vertex) pairs. Scale with
    /// [`TetrahedraGeometry::scaled_time_step`].
    pub stable_step: f64,
}

struct TetGeometry {
    solid_angle: [f64; 4],
    triangle_area: [f64; 4],
    normal: [Vec3; 4],
    jacobi_det: f64,
    step_candidate: f64,
}

fn compute_tet(mesh: &Mesh, tet: usize) -> TetGeometry {
    let mut solid_angle = [0.0; 4];
    let mut triangle_area = [0.0; 4];
    let mut normal = [Vec3::zeros(); 4];
    let mut jacobi_det = 0.0;
    let mut step_candidate = f64::INFINITY;

    for vertex in 0..4 {
        let [node_o, node_a, node_b, node_c] = mesh.apex_ordering(tet, vertex);
        let coord_o = mesh.nodes[node_o];

        let oa = mesh.nodes[node_a] - coord_o;
        let ob = mesh.nodes[node_b] - coord_o;
        let oc = mesh.nodes[node_c] - coord_o;

        // Solid angle at O: Van Oosterom–Strackee formula.
        let triple = oa.dot(&ob.cross(&oc));
        let mag_oa = oa.norm();
        let mag_ob = ob.norm();
        let mag_oc = oc.norm();
        let denominator = mag_oa * mag_ob * mag_oc
            + oa.dot(&ob) * mag_oc
            + ob.dot(&oc) * mag_oa
            + oc.dot(&oa) * mag_ob;
        solid_angle[vertex] = (2.0 * triple.atan2(denominator)).abs();

        // Normal and area of the opposite face projected onto the unit
        // sphere centered at O.
        let u_oa = oa.normalize();
        let u_ob = ob.normalize();
        let u_oc = oc.normalize();
        let projected = (u_ob - u_oa).cross(&(u_oc - u_oa));
        let mut unit_normal = projected.normalize();
        // The transport normal must point away from the apex.
        if unit_normal.dot(&oa) < 0.0 {
            unit_normal = -unit_normal;
        }
        normal[vertex] = unit_normal;
        triangle_area[vertex] = projected.norm() / 2.0;

        if vertex == 0 {
            jacobi_det = oa.cross(&ob).dot(&oc);
        }

        // Stable explicit step bound from this vertex's face.
        let face_area = oa.cross(&ob).norm() / 2.0;
        step_candidate = step_candidate.min(jacobi_det.abs() / (2.0 * face_area));
    }

    TetGeometry {
        solid_angle,
        triangle_area,
        normal,
        jacobi_det,
        step_candidate,
    }
}

impl TetrahedraGeometry {
    /// Run the geometric precomputation over the whole mesh.
    pub fn compute(mesh: &Mesh) -> Self {
        let per_tet: Vec<TetGeometry> = (0..mesh.tetrahedra.len())
            .into_par_iter()
            .map(|tet| compute_tet(mesh, tet))
            .collect();

        let mut geometry = TetrahedraGeometry {
            solid_angle: Vec::with_capacity(per_tet.len()),
            triangle_area: Vec::with_capacity(per_tet.len()),
            normal: Vec::with_capacity(per_tet.len()),
            vertex_weight: vec![[0.0; 4]; per_tet.len()],
            jacobi_det: Vec::with_capacity(per_tet.len()),
            angle_total: vec![0.0; mesh.node_count()],
            stable_step: f64::INFINITY,
        };

        for (tet, local) in per_tet.into_iter().enumerate() {
            for vertex in 0..4 {
                let node = mesh.tetrahedra[tet][vertex];
                geometry.angle_total[node] += local.solid_angle[vertex];
            }
            geometry.stable_step = geometry.stable_step.min(local.step_candidate);
            geometry.solid_angle.push(local.solid_angle);
            geometry.triangle_area.push(local.triangle_area);
            geometry.normal.push(local.normal);
            geometry.jacobi_det.push(local.jacobi_det);
        }

        // Second pass: partition-of-unity weights per global node.
        let angle_total = &geometry.angle_total;
        let solid_angle = &geometry.solid_angle;
        geometry
            .vertex_weight
            .par_iter_mut()
            .enumerate()
            .for_each(|(tet, weights)| {
                for vertex in 0..4 {
                    let node = mesh.tetrahedra[tet][vertex];
                    weights[vertex] = solid_angle[tet][vertex] / angle_total[node];
                }
            });

        geometry
    }

    /// Final explicit time step: the geometric bound scaled by the CFL
    /// number and the fastest recession rate anywhere in the domain.
    pub fn scaled_time_step(&self, cfl: f64, max_recession: f64) -> f64 {
        self.stable_step * cfl / (6.0 * max_recession)
    }
}
