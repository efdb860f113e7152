//! Simulation state bundle and the per-iteration step.
//!
//! All mutable run state lives in one [`SimulationContext`] owned by the
//! caller (or by a [`SolverHandle`](crate::solver::runner::SolverHandle)
//! while a worker iterates). Geometry and the boundary model are computed
//! artifacts of the context, rebuilt explicitly on reset and never stale.

use rustc_hash::FxHashMap;
use tracing::info;

use crate::core_types::{Boundary, Mesh, SolverInput};
use crate::solver::boundary::{BoundaryError, BoundaryModel};
use crate::solver::fields::ComputationData;
use crate::solver::fluxes::{apply_boundary_conditions, compute_fluxes, compute_results, residual};
use crate::solver::geometry::TetrahedraGeometry;
use crate::solver::gradient::compute_mean_gradient;
use crate::solver::recession::RecessionField;

/// Lifecycle of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    /// No mesh loaded yet; a context in this state holds empty buffers.
    Uninitialized,
    /// Geometry and buffers ready, no iteration run yet.
    Initialized,
    /// The iteration loop is advancing the field.
    Iterating,
    /// The target iteration count was reached.
    Converged,
    /// An external stop request ended the loop between iterations.
    Stopped,
    /// The Eikonal residual exceeded 1; partial results remain valid.
    Diverged,
}

/// Everything one simulation owns: the mesh, its derived geometry and
/// boundary model, the recession field, and the mutable computation
/// buffers.
#[derive(Debug, Clone)]
pub struct SimulationContext {
    /// The volume mesh (immutable for the lifetime of the context).
    pub mesh: Mesh,
    /// Run configuration.
    pub input: SolverInput,
    /// Boundary tag table.
    pub boundaries: FxHashMap<u32, Boundary>,
    /// Per-triangle boundary tag, 0 meaning untagged.
    pub triangle_tags: Vec<u32>,
    /// Derived per-element geometry.
    pub geometry: TetrahedraGeometry,
    /// Composed per-node boundary conditions.
    pub boundary_model: BoundaryModel,
    /// Per-node recession rates.
    pub recession: RecessionField,
    /// Mutable field buffers.
    pub data: ComputationData,
    /// Stable explicit time step for this mesh and CFL.
    pub time_step: f64,
    /// Simulated time accumulated across iterations.
    pub time_total: f64,
    /// Iterations completed so far.
    pub current_iter: u32,
    /// Eikonal residual per completed iteration.
    pub error_iter: Vec<f64>,
    /// Lifecycle state.
    pub state: SolverState,
}

impl SimulationContext {
    /// Build a context from loaded scenario data, computing geometry and
    /// composing boundary conditions immediately.
    pub fn new(
        mesh: Mesh,
        boundaries: FxHashMap<u32, Boundary>,
        triangle_tags: Vec<u32>,
        recession: RecessionField,
        input: SolverInput,
    ) -> Result<Self, BoundaryError> {
        let mut context = Self {
            mesh,
            input,
            boundaries,
            triangle_tags,
            geometry: TetrahedraGeometry::default(),
            boundary_model: BoundaryModel::default(),
            recession,
            data: ComputationData::default(),
            time_step: 0.0,
            time_total: 0.0,
            current_iter: 0,
            error_iter: Vec::new(),
            state: SolverState::Uninitialized,
        };
        context.reset()?;
        Ok(context)
    }

    /// Recompute geometry and boundary conditions, reallocate the field
    /// buffers, and zero the counters. Called on construction and on every
    /// non-resumed run start; a resumed run skips it.
    pub fn reset(&mut self) -> Result<(), BoundaryError> {
        self.geometry = TetrahedraGeometry::compute(&self.mesh);
        self.boundary_model =
            BoundaryModel::compose(&self.mesh, &self.boundaries, &self.triangle_tags)?;
        self.data = ComputationData::new(
            self.mesh.node_count(),
            self.mesh.tetrahedra.len(),
            self.input.u_initial,
        );
        self.time_step = self
            .geometry
            .scaled_time_step(self.input.cfl, self.recession.max_rate());
        self.time_total = 0.0;
        self.current_iter = 0;
        self.error_iter.clear();
        self.state = SolverState::Initialized;
        info!(
            nodes = self.mesh.node_count(),
            tetrahedra = self.mesh.tetrahedra.len(),
            time_step = self.time_step,
            "simulation context reset"
        );
        Ok(())
    }

    /// Advance the field by one explicit iteration and return the Eikonal
    /// residual. The four phases run to completion or not at all; the field
    /// is only mutated in the final phase.
    pub fn step(&mut self) -> f64 {
        compute_mean_gradient(
            &self.mesh,
            &self.geometry,
            &self.data.u_vertex,
            &mut self.data.gradient,
        );
        compute_fluxes(&self.mesh, &self.geometry, &self.boundary_model, &mut self.data);
        self.recession.update_effective(&self.data.vertex_gradient);
        apply_boundary_conditions(&self.boundary_model, &self.recession, &mut self.data);
        compute_results(
            &self.recession,
            self.input.diffusive_weight,
            self.time_step,
            &mut self.data,
        );

        self.current_iter += 1;
        self.time_total += self.time_step;
        let error = residual(&self.data);
        self.error_iter.push(error);
        error
    }
}
