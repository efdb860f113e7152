//! Headless burnback run: load a scenario, iterate, export results.
//!
//! Plays the role the GUI normally does — it only feeds the solver a
//! scenario document and consumes field results and surface geometry.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use burnback_core::io::{write_boundary_surface, write_isosurface, write_results};
use burnback_core::{
    burn_area_curve, isosurface, RunOutcome, Scenario, SimulationContext, SolverHandle, SolverInput,
};

/// Burnback simulation demo over a tetrahedral scenario document
#[derive(Parser, Debug)]
#[command(name = "burnback-demo")]
#[command(about = "Solid-surface burnback simulation demo", long_about = None)]
struct Args {
    /// Scenario JSON file (mesh + conditions)
    scenario: PathBuf,

    /// Number of iterations to run (0 uses the built-in default)
    #[arg(short = 'n', long, default_value_t = 300)]
    iterations: u32,

    /// CFL number for the explicit time step
    #[arg(long, default_value_t = 0.5)]
    cfl: f64,

    /// Weight of the diffusive flux channel
    #[arg(long, default_value_t = 1.0)]
    diffusive_weight: f64,

    /// Initial field value on every node
    #[arg(long, default_value_t = 0.0)]
    u_initial: f64,

    /// Where to write the merged results document
    #[arg(short, long, default_value = "results.json")]
    output: PathBuf,

    /// Pretty-print the results document
    #[arg(long)]
    pretty: bool,

    /// Extract and export the isocontour surface at these field values
    #[arg(short = 's', long = "surface")]
    surfaces: Vec<f64>,

    /// Export the mesh boundary as boundary.obj
    #[arg(long)]
    export_boundary: bool,

    /// Sample the burn-area-vs-depth curve at this many depths
    #[arg(long, default_value_t = 0)]
    burn_areas: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let scenario = match Scenario::load(&args.scenario) {
        Ok(scenario) => scenario,
        Err(cause) => {
            error!("Error: {cause}");
            return ExitCode::FAILURE;
        }
    };
    let document = scenario.document.clone();

    let input = SolverInput {
        u_initial: args.u_initial,
        resume: false,
        cfl: args.cfl,
        target_iter: args.iterations,
        diffusive_weight: args.diffusive_weight,
    };
    let context = match SimulationContext::new(
        scenario.mesh,
        scenario.boundaries,
        scenario.triangle_tags,
        scenario.recession,
        input,
    ) {
        Ok(context) => context,
        Err(cause) => {
            error!("Error: {cause}");
            return ExitCode::FAILURE;
        }
    };

    if args.export_boundary {
        if let Err(cause) = write_boundary_surface("boundary.obj", &context.mesh) {
            error!("Error: unable to write boundary.obj: {cause}");
            return ExitCode::FAILURE;
        }
    }

    info!(target = input.effective_target_iter(), "starting run");
    let handle = SolverHandle::spawn(context);
    let (context, outcome) = handle.join();
    match outcome {
        RunOutcome::Completed => {
            info!(
                iterations = context.current_iter,
                time_total = context.time_total,
                "run completed"
            );
        }
        RunOutcome::Stopped => info!(iterations = context.current_iter, "run stopped"),
        RunOutcome::Diverged { residual } => {
            error!(
                residual,
                "divergence detected; partial results exported. Try reducing the CFL."
            );
        }
    }

    if let Err(cause) = write_results(&args.output, &document, &context, args.pretty) {
        error!("Error: {cause}");
        return ExitCode::FAILURE;
    }

    for (index, &value) in args.surfaces.iter().enumerate() {
        let surface = isosurface(
            &context.mesh,
            &context.data.u_vertex,
            &context.data.gradient,
            value,
        );
        let path = format!("isosurface_{index}.obj");
        info!(
            value,
            vertices = surface.nodes.len(),
            triangles = surface.triangles.len(),
            path = %path,
            "isosurface extracted"
        );
        if let Err(cause) = write_isosurface(&path, &surface) {
            error!("Error: unable to write {path}: {cause}");
            return ExitCode::FAILURE;
        }
    }

    if args.burn_areas > 0 {
        let curve = burn_area_curve(
            &context.mesh,
            &context.data.u_vertex,
            &context.data.gradient,
            args.burn_areas,
        );
        for (depth, area) in curve.depth.iter().zip(&curve.area) {
            println!("depth {depth:.6} area {area:.6}");
        }
    }

    ExitCode::SUCCESS
}
