//! Vector and matrix type aliases for mesh geometry.

use nalgebra::{Matrix3, Vector3};

/// 3D vector type for node coordinates, face normals, and field gradients.
///
/// This is a simple alias for `nalgebra::Vector3<f64>`, used throughout
/// the solver for mesh coordinates, reconstructed gradients, and symmetry
/// plane normals. Cross products, dot products, and normalization come
/// from nalgebra.
pub type Vec3 = Vector3<f64>;

/// 3×3 matrix type for anisotropic recession tensors and Euler rotations.
pub type Mat3 = Matrix3<f64>;
