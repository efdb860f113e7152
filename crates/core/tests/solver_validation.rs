//! End-to-end validation of the iteration engine on small meshes with
//! known analytic behavior.

use approx::assert_relative_eq;
use rustc_hash::FxHashMap;

use burnback_core::solver::run;
use burnback_core::{
    isosurface, Boundary, BoundaryKind, BoundaryValue, Mesh, RecessionField, RunOutcome,
    SimulationContext, SolverInput, SolverState, Vec3,
};

use std::sync::atomic::AtomicBool;

fn unit_tetrahedron() -> Mesh {
    Mesh {
        nodes: vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ],
        triangles: vec![[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]],
        tetrahedra: vec![[0, 1, 2, 3]],
    }
}

fn two_tetrahedra() -> Mesh {
    Mesh {
        nodes: vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
        ],
        triangles: vec![[0, 1, 2], [4, 1, 2], [0, 1, 3], [4, 1, 3]],
        tetrahedra: vec![[0, 1, 2, 3], [4, 1, 2, 3]],
    }
}

fn simple_context(mesh: Mesh, input: SolverInput) -> SimulationContext {
    let recession = RecessionField::uniform(mesh.node_count());
    let tags = vec![0; mesh.triangles.len()];
    SimulationContext::new(mesh, FxHashMap::default(), tags, recession, input).unwrap()
}

#[test]
fn test_regular_tetrahedron_first_iteration_residual_is_one() {
    // Flat initial field: |∇u| = 0, so every node's hyperbolic flux is
    // exactly 1 - 1·0 = 1 and the RMS residual is exactly 1.
    let mut context = simple_context(
        unit_tetrahedron(),
        SolverInput {
            target_iter: 1,
            ..Default::default()
        },
    );
    let outcome = run(&mut context, &AtomicBool::new(false), None);

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(context.error_iter, vec![1.0]);
    // One explicit step moves every node by exactly one time step.
    for u in &context.data.u_vertex {
        assert_eq!(*u, context.time_step);
    }
    assert_eq!(context.time_total, context.time_step);
}

#[test]
fn test_all_inlet_boundaries_freeze_field() {
    let mesh = unit_tetrahedron();
    let mut boundaries = FxHashMap::default();
    boundaries.insert(
        1,
        Boundary {
            kind: BoundaryKind::Inlet,
            value: BoundaryValue::Scalar(0.0),
            description: String::new(),
        },
    );
    let recession = RecessionField::uniform(mesh.node_count());
    let mut context = SimulationContext::new(
        mesh,
        boundaries,
        vec![1; 4],
        recession,
        SolverInput {
            u_initial: 2.5,
            target_iter: 50,
            ..Default::default()
        },
    )
    .unwrap();

    let outcome = run(&mut context, &AtomicBool::new(false), None);
    assert_eq!(outcome, RunOutcome::Completed);
    for u in &context.data.u_vertex {
        assert_eq!(*u, 2.5);
    }
    // With both flux channels zeroed the residual history is all zeros.
    assert!(context.error_iter.iter().all(|e| *e == 0.0));
}

#[test]
fn test_partition_of_unity_on_shared_nodes() {
    let mesh = two_tetrahedra();
    let context = simple_context(mesh, SolverInput::default());

    let mut sums = vec![0.0; context.mesh.node_count()];
    for tet in 0..context.mesh.tetrahedra.len() {
        for vertex in 0..4 {
            let node = context.mesh.tetrahedra[tet][vertex];
            sums[node] += context.geometry.vertex_weight[tet][vertex];
        }
    }
    for sum in &sums {
        assert_relative_eq!(*sum, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_symmetry_normals_accumulate_on_shared_face_nodes() {
    // The two boundary triangles of each tag meet along the edge (1, 2)
    // resp. (1, 3); nodes on both surfaces carry both normals and no node
    // exceeds the two-normal limit.
    let mesh = two_tetrahedra();
    let mut boundaries = FxHashMap::default();
    boundaries.insert(
        1,
        Boundary {
            kind: BoundaryKind::Symmetry,
            value: BoundaryValue::Vector([0.0, 0.0, 1.0]),
            description: String::new(),
        },
    );
    boundaries.insert(
        2,
        Boundary {
            kind: BoundaryKind::Symmetry,
            value: BoundaryValue::Vector([0.0, 0.0, -1.0]),
            description: String::new(),
        },
    );
    let recession = RecessionField::uniform(mesh.node_count());
    let context = SimulationContext::new(
        mesh,
        boundaries,
        vec![1, 1, 2, 2],
        recession,
        SolverInput::default(),
    )
    .unwrap();

    let model = &context.boundary_model;
    // Node 1 lies on triangles of both tags.
    assert_eq!(model.symmetry_normals[&1].len(), 2);
    for normals in model.symmetry_normals.values() {
        assert!(normals.len() <= 2);
        for normal in normals {
            assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_linear_field_gradient_exact_through_context() {
    let mut context = simple_context(two_tetrahedra(), SolverInput::default());
    let a = Vec3::new(1.0, -2.0, 0.25);
    context.data.u_vertex = context.mesh.nodes.iter().map(|x| a.dot(x) - 3.0).collect();

    context.step();

    for gradient in &context.data.gradient {
        assert_relative_eq!(gradient.x, a.x, epsilon = 1e-12);
        assert_relative_eq!(gradient.y, a.y, epsilon = 1e-12);
        assert_relative_eq!(gradient.z, a.z, epsilon = 1e-12);
    }
}

#[test]
fn test_divergence_detected_and_recoverable() {
    // An inlet pins one face so a gradient develops, and an absurd CFL
    // overshoots it; the run must end as Diverged with usable state.
    let mesh = two_tetrahedra();
    let mut boundaries = FxHashMap::default();
    boundaries.insert(
        1,
        Boundary {
            kind: BoundaryKind::Inlet,
            value: BoundaryValue::Scalar(0.0),
            description: String::new(),
        },
    );
    let recession = RecessionField::Isotropic(vec![50.0; mesh.node_count()]);
    let mut context = SimulationContext::new(
        mesh,
        boundaries,
        vec![1, 0, 0, 0],
        recession,
        SolverInput {
            cfl: 500.0,
            target_iter: 100,
            ..Default::default()
        },
    )
    .unwrap();

    let outcome = run(&mut context, &AtomicBool::new(false), None);
    let RunOutcome::Diverged { residual } = outcome else {
        panic!("expected divergence, got {outcome:?}");
    };
    assert!(residual > 1.0);
    assert_eq!(context.state, SolverState::Diverged);
    // Partial results are surfaced, not discarded.
    assert!(!context.error_iter.is_empty());
    assert_eq!(context.current_iter as usize, context.error_iter.len());
}

#[test]
fn test_isosurface_of_solved_field() {
    let mut context = simple_context(
        unit_tetrahedron(),
        SolverInput {
            target_iter: 5,
            ..Default::default()
        },
    );
    run(&mut context, &AtomicBool::new(false), None);

    // Thresholds beyond the field range yield empty surfaces.
    let u = &context.data.u_vertex;
    let above = u.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 1.0;
    let surface = isosurface(&context.mesh, u, &context.data.gradient, above);
    assert!(surface.nodes.is_empty());
    assert!(surface.triangles.is_empty());

    // A threshold exactly on a node value must not crash.
    let surface = isosurface(&context.mesh, u, &context.data.gradient, u[0]);
    for triangle in &surface.triangles {
        let area = (surface.nodes[triangle[1]] - surface.nodes[triangle[0]])
            .cross(&(surface.nodes[triangle[2]] - surface.nodes[triangle[0]]))
            .norm()
            / 2.0;
        assert!(area > 0.0, "zero-measure triangle emitted at a node value");
    }
}

#[test]
fn test_anisotropic_recession_drives_update() {
    // Unit principal rates reduce to the isotropic behavior once a
    // gradient direction exists; zero gradient gives zero effective rate.
    let mesh = unit_tetrahedron();
    let raw = vec![[1.0, 1.0, 1.0, 0.0, 0.0, 0.0]; 4];
    let recession = RecessionField::anisotropic(raw);
    let mut context = SimulationContext::new(
        mesh,
        FxHashMap::default(),
        vec![0; 4],
        recession,
        SolverInput {
            target_iter: 3,
            ..Default::default()
        },
    )
    .unwrap();

    let outcome = run(&mut context, &AtomicBool::new(false), None);
    assert_eq!(outcome, RunOutcome::Completed);
    // First iteration: zero gradient, zero effective rate, flux exactly 1.
    assert_eq!(context.error_iter[0], 1.0);
    assert!(context.data.u_vertex.iter().all(|u| *u > 0.0));
}
