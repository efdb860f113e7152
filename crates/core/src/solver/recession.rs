//! Per-node recession rates scaling how fast the surface regresses.
//!
//! The field is either a flat list of scalars or, in anisotropic mode, a
//! per-node tensor built from three principal rates and three Euler
//! rotation angles. The mode is a load-time choice and never changes
//! during a run.

use rayon::prelude::*;

use crate::core_types::{Mat3, Vec3};

/// Recession rate field over the mesh nodes.
#[derive(Debug, Clone)]
pub enum RecessionField {
    /// One scalar rate per node.
    Isotropic(Vec<f64>),
    /// One 3×3 tensor per node; the effective scalar rate follows the
    /// local gradient direction and is refreshed every iteration.
    Anisotropic {
        /// Raw `[r1, r2, r3, rotX°, rotY°, rotZ°]` tuples as loaded.
        raw: Vec<[f64; 6]>,
        /// `Rᵗ·diag(r1,r2,r3)·R` per node.
        tensors: Vec<Mat3>,
        /// `|tensor·gradient direction|` per node, from the last refresh.
        effective: Vec<f64>,
    },
}

/// Euler XYZ rotation matrix from angles in degrees.
fn rotation_matrix(rot_x: f64, rot_y: f64, rot_z: f64) -> Mat3 {
    let (sx, cx) = rot_x.to_radians().sin_cos();
    let (sy, cy) = rot_y.to_radians().sin_cos();
    let (sz, cz) = rot_z.to_radians().sin_cos();
    Mat3::new(
        cy * cz,
        sx * sy * cz - cx * sz,
        cx * sy * cz + sx * sz,
        cy * sz,
        sx * sy * sz + cx * cz,
        cx * sy * sz - sx * cz,
        -sy,
        sx * cy,
        cx * cy,
    )
}

impl RecessionField {
    /// Uniform unit rate over `node_count` nodes; the fallback when the
    /// scenario document carries no recession section.
    pub fn uniform(node_count: usize) -> Self {
        RecessionField::Isotropic(vec![1.0; node_count])
    }

    /// Anisotropic field from raw per-node tuples.
    pub fn anisotropic(raw: Vec<[f64; 6]>) -> Self {
        let tensors: Vec<Mat3> = raw
            .par_iter()
            .map(|tuple| {
                let rotation = rotation_matrix(tuple[3], tuple[4], tuple[5]);
                let principal = Mat3::from_diagonal(&Vec3::new(tuple[0], tuple[1], tuple[2]));
                rotation.transpose() * principal * rotation
            })
            .collect();
        let effective = vec![0.0; raw.len()];
        RecessionField::Anisotropic {
            raw,
            tensors,
            effective,
        }
    }

    /// Is this the anisotropic mode?
    pub fn is_anisotropic(&self) -> bool {
        matches!(self, RecessionField::Anisotropic { .. })
    }

    /// Current scalar rate at a node.
    pub fn rate(&self, node: usize) -> f64 {
        match self {
            RecessionField::Isotropic(rates) => rates[node],
            RecessionField::Anisotropic { effective, .. } => effective[node],
        }
    }

    /// Fastest possible front speed anywhere in the domain; ties the
    /// explicit stability bound to the worst case. For tensors this is the
    /// largest principal rate magnitude, which bounds `|tensor·d|` over
    /// unit directions `d`.
    pub fn max_rate(&self) -> f64 {
        match self {
            RecessionField::Isotropic(rates) => rates.iter().copied().fold(0.0, f64::max),
            RecessionField::Anisotropic { raw, .. } => raw
                .iter()
                .map(|t| t[0].abs().max(t[1].abs()).max(t[2].abs()))
                .fold(0.0, f64::max),
        }
    }

    /// Refresh the effective anisotropic rates from the node-averaged
    /// gradient directions. A no-op in isotropic mode.
    pub fn update_effective(&mut self, vertex_gradient: &[Vec3]) {
        if let RecessionField::Anisotropic {
            tensors, effective, ..
        } = self
        {
            effective
                .par_iter_mut()
                .zip(tensors.par_iter())
                .zip(vertex_gradient.par_iter())
                .for_each(|((rate, tensor), gradient)| {
                    let magnitude = gradient.norm();
                    if magnitude == 0.0 {
                        *rate = 0.0;
                    } else {
                        *rate = (tensor * (gradient / magnitude)).norm();
                    }
                });
        }
    }
}
