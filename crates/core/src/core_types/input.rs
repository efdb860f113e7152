//! Run configuration supplied by the external caller.

use serde::{Deserialize, Serialize};

/// Fallback iteration target when the caller passes 0.
pub const DEFAULT_TARGET_ITER: u32 = 300;

/// Solver run configuration.
///
/// These are the knobs the surrounding application exposes; everything else
/// (time step, geometry) is derived from the mesh.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolverInput {
    /// Initial value of the scalar field on every node.
    pub u_initial: f64,
    /// Continue from the stored state instead of resetting geometry,
    /// counters, and field buffers.
    pub resume: bool,
    /// CFL number scaling the stable explicit time step.
    pub cfl: f64,
    /// Number of iterations to run; 0 falls back to
    /// [`DEFAULT_TARGET_ITER`].
    pub target_iter: u32,
    /// Weight of the diffusive flux channel in the explicit update.
    pub diffusive_weight: f64,
}

impl Default for SolverInput {
    fn default() -> Self {
        Self {
            u_initial: 0.0,
            resume: false,
            cfl: 0.5,
            target_iter: DEFAULT_TARGET_ITER,
            diffusive_weight: 1.0,
        }
    }
}

impl SolverInput {
    /// Iteration target with the zero fallback applied.
    pub fn effective_target_iter(&self) -> u32 {
        if self.target_iter == 0 {
            DEFAULT_TARGET_ITER
        } else {
            self.target_iter
        }
    }
}
