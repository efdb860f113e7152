//! Mean-gradient reconstruction per tetrahedron.
//!
//! Cramer's rule on the element's linear interpolant: for each coordinate
//! axis, substitute the four field values into that axis's column of the
//! node coordinates and divide the resulting triple product by the signed
//! element Jacobian. Exact for fields linear over the tetrahedron.

use rayon::prelude::*;

use crate::core_types::{Mesh, Vec3};
use crate::solver::geometry::TetrahedraGeometry;

/// Rebuild the per-tetrahedron gradient of `u_vertex` into `gradient`.
pub fn compute_mean_gradient(
    mesh: &Mesh,
    geometry: &TetrahedraGeometry,
    u_vertex: &[f64],
    gradient: &mut [Vec3],
) {
    gradient.par_iter_mut().enumerate().for_each(|(tet, out)| {
        let nodes = mesh.tetrahedra[tet];
        let u = nodes.map(|node| u_vertex[node]);
        let coordinates = nodes.map(|node| mesh.nodes[node]);

        let mut result = Vec3::zeros();
        for axis in 0..3 {
            let mut substituted = coordinates;
            for vertex in 0..4 {
                substituted[vertex][axis] = u[vertex];
            }
            let r12 = substituted[1] - substituted[0];
            let r13 = substituted[2] - substituted[0];
            let r14 = substituted[3] - substituted[0];
            result[axis] = r12.cross(&r13).dot(&r14) / geometry.jacobi_det[tet];
        }
        *out = result;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mesh() -> Mesh {
        Mesh {
            nodes: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 1.0, 1.0),
            ],
            triangles: vec![],
            tetrahedra: vec![[0, 1, 2, 3], [4, 1, 2, 3]],
        }
    }

    #[test]
    fn test_linear_field_reproduced_exactly() {
        let mesh = mesh();
        let geometry = TetrahedraGeometry::compute(&mesh);
        // u(x) = a·x + b with a = (2, -3, 0.5).
        let a = Vec3::new(2.0, -3.0, 0.5);
        let u: Vec<f64> = mesh.nodes.iter().map(|x| a.dot(x) + 7.0).collect();

        let mut gradient = vec![Vec3::zeros(); mesh.tetrahedra.len()];
        compute_mean_gradient(&mesh, &geometry, &u, &mut gradient);

        for g in &gradient {
            assert_relative_eq!(g.x, a.x, epsilon = 1e-12);
            assert_relative_eq!(g.y, a.y, epsilon = 1e-12);
            assert_relative_eq!(g.z, a.z, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_constant_field_has_zero_gradient() {
        let mesh = mesh();
        let geometry = TetrahedraGeometry::compute(&mesh);
        let u = vec![4.2; mesh.node_count()];

        let mut gradient = vec![Vec3::zeros(); mesh.tetrahedra.len()];
        compute_mean_gradient(&mesh, &geometry, &u, &mut gradient);

        for g in &gradient {
            assert_relative_eq!(g.norm(), 0.0, epsilon = 1e-12);
        }
    }
}
