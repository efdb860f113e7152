//! The iteration loop and its worker-thread harness.
//!
//! The loop itself is synchronous; [`SolverHandle`] moves it onto a
//! dedicated thread so the caller stays responsive, with a cooperative stop
//! flag checked on a real-time cadence between iterations (never
//! mid-iteration) and the context handed back on join.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::solver::context::{SimulationContext, SolverState};

/// How often the loop surfaces progress and polls the stop flag.
const PROGRESS_CADENCE: Duration = Duration::from_millis(10);

/// How an iteration loop ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunOutcome {
    /// The target iteration count was reached.
    Completed,
    /// An external stop request ended the loop; state is resumable.
    Stopped,
    /// The Eikonal residual exceeded 1. Partial results remain valid;
    /// a lower CFL usually cures it.
    Diverged {
        /// Residual at the diverged iteration.
        residual: f64,
    },
}

/// Snapshot handed to the progress callback on the polling cadence.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    /// Iterations completed.
    pub iteration: u32,
    /// Iteration target for this run.
    pub target: u32,
    /// Simulated time accumulated so far.
    pub time_total: f64,
    /// Residual of the last completed iteration.
    pub residual: f64,
}

/// Run the iteration loop to completion, stop, or divergence.
///
/// A non-resumed run resets the context first (geometry, boundary model,
/// buffers, counters); a resumed run continues from the stored state.
/// Returns the outcome and leaves the matching [`SolverState`] on the
/// context.
pub fn run(
    context: &mut SimulationContext,
    stop: &AtomicBool,
    mut on_progress: Option<&mut dyn FnMut(Progress)>,
) -> RunOutcome {
    if !context.input.resume {
        // Reset was already validated when the context was built; the tag
        // table has not changed since.
        context
            .reset()
            .expect("boundary conditions changed underneath a run");
    }
    let target = context.input.effective_target_iter();
    context.state = SolverState::Iterating;
    info!(
        resume = context.input.resume,
        from = context.current_iter,
        target,
        "starting iteration loop"
    );

    let mut clock = Instant::now();
    while context.current_iter < target {
        let error = context.step();

        if error > 1.0 {
            warn!(
                iteration = context.current_iter,
                residual = error,
                "divergence detected; stopping. Try reducing the CFL."
            );
            context.state = SolverState::Diverged;
            return RunOutcome::Diverged { residual: error };
        }

        if clock.elapsed() > PROGRESS_CADENCE {
            clock = Instant::now();
            if let Some(callback) = on_progress.as_deref_mut() {
                callback(Progress {
                    iteration: context.current_iter,
                    target,
                    time_total: context.time_total,
                    residual: error,
                });
            }
            if stop.load(Ordering::Relaxed) {
                info!(iteration = context.current_iter, "stop requested");
                context.state = SolverState::Stopped;
                return RunOutcome::Stopped;
            }
        }
    }

    info!(iterations = context.current_iter, "iteration loop completed");
    context.state = SolverState::Converged;
    RunOutcome::Completed
}

/// A solver run in flight on its own worker thread.
///
/// The handle owns the context while iterating; `join` hands it back once
/// the loop exits (normal completion, stop, or divergence), so reads of the
/// final field are ordered after the last iteration.
pub struct SolverHandle {
    stop: Arc<AtomicBool>,
    worker: JoinHandle<(SimulationContext, RunOutcome)>,
}

impl SolverHandle {
    /// Move the context onto a worker thread and start iterating.
    pub fn spawn(mut context: SimulationContext) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_worker = Arc::clone(&stop);
        let worker = std::thread::spawn(move || {
            let outcome = run(&mut context, &stop_worker, None);
            (context, outcome)
        });
        Self { stop, worker }
    }

    /// Request a cooperative stop; the loop exits after the current
    /// iteration completes.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Wait for the loop to exit and take the context back.
    ///
    /// # Panics
    ///
    /// Panics if the worker thread itself panicked.
    pub fn join(self) -> (SimulationContext, RunOutcome) {
        self.worker.join().expect("solver worker panicked")
    }

    /// Has the worker finished iterating?
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{Mesh, SolverInput, Vec3};
    use crate::solver::recession::RecessionField;
    use rustc_hash::FxHashMap;

    fn context(input: SolverInput) -> SimulationContext {
        let mesh = Mesh {
            nodes: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            triangles: vec![[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]],
            tetrahedra: vec![[0, 1, 2, 3]],
        };
        let recession = RecessionField::uniform(mesh.node_count());
        SimulationContext::new(mesh, FxHashMap::default(), vec![0; 4], recession, input).unwrap()
    }

    #[test]
    fn test_run_completes_target_iterations() {
        let mut context = context(SolverInput {
            target_iter: 10,
            ..Default::default()
        });
        let outcome = run(&mut context, &AtomicBool::new(false), None);
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(context.current_iter, 10);
        assert_eq!(context.state, SolverState::Converged);
        assert_eq!(context.error_iter.len(), 10);
    }

    #[test]
    fn test_resume_continues_counters() {
        let mut context = context(SolverInput {
            target_iter: 5,
            ..Default::default()
        });
        run(&mut context, &AtomicBool::new(false), None);

        context.input.resume = true;
        context.input.target_iter = 8;
        let outcome = run(&mut context, &AtomicBool::new(false), None);
        assert_eq!(outcome, RunOutcome::Completed);
        // 5 prior iterations survive the resumed run.
        assert_eq!(context.current_iter, 8);
        assert_eq!(context.error_iter.len(), 8);
    }

    #[test]
    fn test_fresh_run_resets_counters() {
        let mut context = context(SolverInput {
            target_iter: 5,
            ..Default::default()
        });
        run(&mut context, &AtomicBool::new(false), None);
        let first_total = context.time_total;

        let outcome = run(&mut context, &AtomicBool::new(false), None);
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(context.current_iter, 5);
        assert_eq!(context.time_total, first_total);
    }

    #[test]
    fn test_spawned_run_hands_context_back() {
        let context = context(SolverInput {
            target_iter: 20,
            ..Default::default()
        });
        let handle = SolverHandle::spawn(context);
        let (context, outcome) = handle.join();
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(context.current_iter, 20);
    }

    #[test]
    fn test_pre_set_stop_flag_stops_early() {
        // With the flag already set the loop exits at the first cadence
        // poll; the exact iteration depends on timing, so only the outcome
        // and resumability are asserted.
        let mut context = context(SolverInput {
            target_iter: u32::MAX,
            ..Default::default()
        });
        let stop = AtomicBool::new(true);
        let outcome = run(&mut context, &stop, None);
        assert_eq!(outcome, RunOutcome::Stopped);
        assert_eq!(context.state, SolverState::Stopped);
        assert!(context.current_iter > 0);
    }
}
