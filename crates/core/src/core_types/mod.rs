//! Core data types shared by the solver, extraction, and I/O layers.

pub mod boundary;
pub mod input;
pub mod mesh;
pub mod vec3;

pub use boundary::{Boundary, BoundaryKind, BoundaryValue};
pub use input::{SolverInput, DEFAULT_TARGET_ITER};
pub use mesh::{Mesh, MeshError};
pub use vec3::{Mat3, Vec3};
