//! Burnback Solver Core Library
//!
//! Simulates the regression of a solid surface (a burning propellant
//! grain) over a tetrahedral volume mesh by solving a level-set-like
//! Hamilton–Jacobi equation with a solid-angle-weighted finite-volume
//! scheme.
//!
//! The crate covers the numerical core and its companion geometry
//! routines:
//! - one-time per-mesh precomputation (solid angles, face normals,
//!   vertex weights, Jacobians, stable time-step bound)
//! - the explicit iteration engine (gradient reconstruction, flux
//!   assembly, boundary conditions, Euler update, residual monitoring)
//! - marching-tetrahedra isocontour extraction for previews and
//!   burn-area analytics
//!
//! GUI, rendering, and file dialogs live in the surrounding application;
//! this crate only consumes scenario documents and produces field results
//! and surface geometry.

// Shared data types
pub mod core_types;

// Scenario input and result/export output
pub mod io;

// Isocontour extraction and burn-area analytics
pub mod isosurface;

// The iteration engine
pub mod solver;

// Re-export core types
pub use core_types::{Boundary, BoundaryKind, BoundaryValue, Mat3, Mesh, SolverInput, Vec3};

// Re-export the solver surface
pub use solver::{
    BoundaryModel, ComputationData, NodeCondition, Progress, RecessionField, RunOutcome,
    SimulationContext, SolverHandle, SolverState, TetrahedraGeometry,
};

// Re-export extraction and I/O entry points
pub use io::{LoadError, Scenario};
pub use isosurface::{burn_area_curve, isosurface, BurnAreaCurve, IsosurfaceMesh};
