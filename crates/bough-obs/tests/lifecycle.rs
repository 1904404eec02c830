//! Episode lifecycle of every observation function against the mock
//! solver: terminal extraction, stage windows, cache rebuilds, and
//! dimension tracking as the problem changes.

use bough_core::{ConsId, ConstraintRecord, ObsError, RowState, SolverState, Stage, VarId};
use bough_obs::{
    ColumnFeature, Khalil2016, KhalilFeature, NodeBipartite, Nothing, ObservationFunction,
    Pseudocosts, RowFeature, StrongBranchingScores,
};
use bough_test_utils::{random_problem, toy_problem, MockSolver};
use smallvec::smallvec;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Run `f` on a terminal extraction from a solver in every stage.
fn assert_done_is_none<F: ObservationFunction>(mut f: F) {
    for stage in [
        Stage::Init,
        Stage::Problem,
        Stage::Presolved,
        Stage::Solving,
        Stage::Solved,
    ] {
        let mut solver = MockSolver::new(toy_problem());
        solver.set_stage(stage);
        assert!(f.extract(&mut solver, true).unwrap().is_none(), "{}", f.name());
        assert_eq!(solver.queries(), 0, "{} queried the solver", f.name());
    }
}

// ── Terminal extraction ────────────────────────────────────────────

#[test]
fn done_yields_no_observation_without_before_reset() {
    assert_done_is_none(Nothing);
    assert_done_is_none(NodeBipartite::new());
    assert_done_is_none(StrongBranchingScores::default());
    assert_done_is_none(Pseudocosts::new());
    assert_done_is_none(Khalil2016::new());
}

#[test]
fn done_yields_no_observation_after_before_reset() {
    let mut solver = MockSolver::new(toy_problem());
    let mut bipartite = NodeBipartite::new();
    let mut khalil = Khalil2016::new();
    bipartite.before_reset(&mut solver).unwrap();
    khalil.before_reset(&mut solver).unwrap();
    solver.start_solving();
    assert!(bipartite.extract(&mut solver, true).unwrap().is_none());
    assert!(khalil.extract(&mut solver, true).unwrap().is_none());
}

// ── Stage windows ──────────────────────────────────────────────────

#[test]
fn extract_outside_solving_is_invalid_stage() {
    init_logging();
    for stage in [Stage::Init, Stage::Problem, Stage::Presolved, Stage::Solved] {
        let mut solver = MockSolver::new(toy_problem());
        solver.set_stage(stage);
        let err = NodeBipartite::new().extract(&mut solver, false).unwrap_err();
        assert_eq!(
            err,
            ObsError::InvalidStage {
                operation: "extract",
                stage
            }
        );
        assert!(matches!(
            Khalil2016::new().extract(&mut solver, false),
            Err(ObsError::InvalidStage { .. })
        ));
        assert!(matches!(
            Pseudocosts::new().extract(&mut solver, false),
            Err(ObsError::InvalidStage { .. })
        ));
        assert!(matches!(
            StrongBranchingScores::default().extract(&mut solver, false),
            Err(ObsError::InvalidStage { .. })
        ));
    }
}

#[test]
fn before_reset_accepts_problem_and_presolved_only() {
    for (stage, ok) in [
        (Stage::Init, false),
        (Stage::Problem, true),
        (Stage::Presolved, true),
        (Stage::Solving, false),
        (Stage::Solved, false),
    ] {
        let mut solver = MockSolver::new(toy_problem());
        solver.set_stage(stage);
        assert_eq!(NodeBipartite::new().before_reset(&mut solver).is_ok(), ok);
        assert_eq!(Khalil2016::new().before_reset(&mut solver).is_ok(), ok);
        assert_eq!(Pseudocosts::new().before_reset(&mut solver).is_ok(), ok);
        assert_eq!(
            StrongBranchingScores::default()
                .before_reset(&mut solver)
                .is_ok(),
            ok
        );
    }
}

// ── Dimensions and caching ─────────────────────────────────────────

#[test]
fn bipartite_dimensions_follow_the_problem() {
    init_logging();
    for seed in 0..5 {
        let problem = random_problem(seed, 10 + seed as usize, 4 + 2 * seed as usize);
        let (n_vars, n_cons) = (problem.variables.len(), problem.constraints.len());
        let mut solver = MockSolver::new(problem);
        let mut obs = NodeBipartite::new();
        obs.before_reset(&mut solver).unwrap();
        solver.start_solving();

        let o = obs.extract(&mut solver, false).unwrap().unwrap();
        assert_eq!(o.column_features.dim(), (n_vars, ColumnFeature::COUNT));
        assert_eq!(o.row_features.dim(), (n_cons, RowFeature::COUNT));
        assert_eq!(o.edge_features.shape(), (n_cons, n_vars));
        let nnz: usize = solver
            .problem()
            .constraints
            .iter()
            .map(|c| c.entries.len())
            .sum();
        assert_eq!(o.edge_features.nnz(), nnz);
    }
}

#[test]
fn added_cut_triggers_rebuild_and_new_row() {
    init_logging();
    let mut solver = MockSolver::new(toy_problem());
    let mut obs = NodeBipartite::new();
    obs.before_reset(&mut solver).unwrap();
    solver.start_solving();
    obs.extract(&mut solver, false).unwrap();
    assert_eq!(obs.cache_builds(), 1);

    solver.add_constraint(
        ConstraintRecord {
            id: ConsId(100),
            lhs: 1.0,
            rhs: f64::INFINITY,
            entries: smallvec![(0, 1.0), (2, 1.0)],
        },
        RowState {
            activity: 0.5,
            dual: 0.0,
            age: 0,
        },
    );
    let o = obs.extract(&mut solver, false).unwrap().unwrap();
    assert_eq!(obs.cache_builds(), 2);
    assert_eq!(o.row_features.nrows(), 3);
    assert_eq!(o.edge_features.nnz(), 6);
    // Only the left side is finite: bias = 1 / sqrt(2).
    let bias = o.row_features[[2, RowFeature::Bias.index()]];
    assert!((bias - 1.0 / 2.0f64.sqrt()).abs() < 1e-12);

    // No further change, no further rebuild.
    obs.extract(&mut solver, false).unwrap();
    assert_eq!(obs.cache_builds(), 2);
}

#[test]
fn before_reset_twice_tracks_the_current_problem() {
    let mut solver = MockSolver::new(toy_problem());
    let mut bipartite = NodeBipartite::new();
    let mut khalil = Khalil2016::new();
    bipartite.before_reset(&mut solver).unwrap();
    khalil.before_reset(&mut solver).unwrap();

    solver.load(random_problem(3, 12, 7));
    bipartite.before_reset(&mut solver).unwrap();
    khalil.before_reset(&mut solver).unwrap();
    assert_eq!(bipartite.cache_builds(), 2);
    assert_eq!(khalil.cache_builds(), 2);

    solver.start_solving();
    let o = bipartite.extract(&mut solver, false).unwrap().unwrap();
    assert_eq!(o.column_features.nrows(), 12);
    assert_eq!(o.row_features.nrows(), 7);
    let k = khalil.extract(&mut solver, false).unwrap().unwrap();
    assert_eq!(k.features.ncols(), KhalilFeature::COUNT);
    assert_eq!(k.features.nrows(), k.candidates.len());
    // Both extracts reused the caches built in before_reset.
    assert_eq!(bipartite.cache_builds(), 2);
    assert_eq!(khalil.cache_builds(), 2);
}

#[test]
fn presolve_rewriting_data_under_same_ids_rebuilds() {
    init_logging();
    let mut solver = MockSolver::new(toy_problem());
    let mut bipartite = NodeBipartite::new();
    let mut khalil = Khalil2016::new();
    bipartite.before_reset(&mut solver).unwrap();
    khalil.before_reset(&mut solver).unwrap();

    // Same ids, same shape; only a coefficient and an objective change.
    let mut presolved = toy_problem();
    presolved.constraints[0].entries[0].1 = 7.0;
    presolved.variables[0].objective = 100.0;
    solver.load(presolved);
    solver.start_solving();

    let o = bipartite.extract(&mut solver, false).unwrap().unwrap();
    assert_eq!(bipartite.cache_builds(), 2);
    assert!(o.edge_features.values().iter().any(|&v| v == 7.0));
    let norm = (100.0f64 * 100.0 + 2.0 * 2.0 + 0.5 * 0.5).sqrt();
    let obj = o.column_features[[0, ColumnFeature::Objective.index()]];
    assert!((obj - 100.0 / norm).abs() < 1e-12);

    let k = khalil.extract(&mut solver, false).unwrap().unwrap();
    assert_eq!(khalil.cache_builds(), 2);
    let row = k
        .candidates
        .iter()
        .position(|&v| v == VarId(0))
        .unwrap();
    assert_eq!(k.features[[row, KhalilFeature::ObjCoef.index()]], 100.0);

    // The rewritten problem is now the cached one.
    bipartite.extract(&mut solver, false).unwrap();
    khalil.extract(&mut solver, false).unwrap();
    assert_eq!(bipartite.cache_builds(), 2);
    assert_eq!(khalil.cache_builds(), 2);
}

#[test]
fn lp_failure_surfaces_as_solver_error() {
    let mut solver = MockSolver::at_node(toy_problem());
    solver.truncate_lp_columns(1);
    let err = NodeBipartite::new().extract(&mut solver, false).unwrap_err();
    assert!(matches!(err, ObsError::Solver(_)));
    assert!(solver.stage().at_node());
}
