//! Scenario loading and result/export writing.
//!
//! This is the data-exchange boundary with the surrounding application:
//! scenario JSON in, results JSON and OBJ-style surface exports out.

pub mod obj;
pub mod results;
pub mod scenario;

pub use obj::{write_boundary_surface, write_isosurface};
pub use results::{
    boundaries_json, results_json, update_boundaries, update_recessions, write_results, WriteError,
};
pub use scenario::{LoadError, Scenario};
