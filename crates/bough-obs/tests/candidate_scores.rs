//! Candidate-score observations over seeded random problems: NaN exactly
//! off the candidate set, strong-branching sessions always closed, and
//! Khalil static columns stable across nodes.

use bough_core::{BranchHistory, CandidateMode, SolverState, VarId};
use bough_obs::{
    AccessorConfig, Khalil2016, KhalilFeature, ObservationFunction, Pseudocosts,
    StrongBranchingScores,
};
use bough_test_utils::{random_problem, MockSolver};
use proptest::prelude::*;

fn candidate_set(solver: &MockSolver, mode: CandidateMode) -> Vec<usize> {
    let cands = solver.branching_candidates(mode).unwrap();
    solver
        .problem()
        .variables
        .iter()
        .enumerate()
        .filter(|(_, v)| cands.contains(&v.id))
        .map(|(pos, _)| pos)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn strong_branching_nan_exactly_off_candidates(
        seed in 0u64..1_000,
        n_vars in 1usize..25,
        n_cons in 0usize..15,
        pseudo in any::<bool>(),
    ) {
        let mut solver = MockSolver::at_node(random_problem(seed, n_vars, n_cons));
        let mode = if pseudo { CandidateMode::Pseudo } else { CandidateMode::Lp };
        let cands = candidate_set(&solver, mode);

        let mut obs = StrongBranchingScores::new(pseudo);
        let v = obs.extract(&mut solver, false).unwrap().unwrap();
        prop_assert_eq!(v.len(), n_vars);
        for (pos, score) in v.iter().enumerate() {
            prop_assert_eq!(score.is_nan(), !cands.contains(&pos));
        }
        prop_assert!(!solver.in_strong_branching());
    }

    #[test]
    fn pseudocosts_nan_off_candidates_and_without_history(
        seed in 0u64..1_000,
        n_vars in 1usize..25,
    ) {
        let mut solver = MockSolver::at_node(random_problem(seed, n_vars, 5));
        let cands = candidate_set(&solver, CandidateMode::Lp);
        // History only for even positions.
        let ids: Vec<VarId> = solver.problem().variables.iter().map(|v| v.id).collect();
        for (pos, id) in ids.iter().enumerate().filter(|(p, _)| p % 2 == 0) {
            solver.set_history(*id, BranchHistory {
                pseudocost_down: Some(1.0 + pos as f64),
                pseudocost_up: Some(2.0),
                ..Default::default()
            });
        }

        let v = Pseudocosts::new().extract(&mut solver, false).unwrap().unwrap();
        for (pos, score) in v.iter().enumerate() {
            let expected_finite = cands.contains(&pos) && pos % 2 == 0;
            prop_assert_eq!(score.is_finite(), expected_finite);
        }
    }

    #[test]
    fn khalil_static_columns_are_bit_identical(seed in 0u64..1_000) {
        let mut solver = MockSolver::new(random_problem(seed, 15, 10));
        let mut obs = Khalil2016::new();
        obs.before_reset(&mut solver).unwrap();
        solver.start_solving();

        let first = obs.extract(&mut solver, false).unwrap().unwrap();
        for pos in 0..solver.problem().columns.len() {
            let x = solver.problem().columns[pos].value;
            solver.set_lp_value(pos, x * 0.5 + 0.25);
        }
        let second = obs.extract(&mut solver, false).unwrap().unwrap();

        prop_assert_eq!(&first.candidates, &second.candidates);
        for (a, b) in first.features.outer_iter().zip(second.features.outer_iter()) {
            for j in 0..KhalilFeature::STATIC_COUNT {
                prop_assert_eq!(a[j].to_bits(), b[j].to_bits());
            }
        }
        prop_assert!(first.features.iter().all(|v| v.is_finite()));
        prop_assert_eq!(obs.cache_builds(), 1);
    }
}

#[test]
fn exhausted_probes_are_nan_and_the_rest_still_scored() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut solver = MockSolver::at_node(random_problem(11, 20, 10));
    let cands = solver.branching_candidates(CandidateMode::Pseudo).unwrap();
    assert!(cands.len() >= 2, "fixture should have several candidates");
    let failing = cands[0];
    solver.fail_probes(failing, 10);

    let config = AccessorConfig {
        max_probe_attempts: 3,
        ..Default::default()
    };
    let mut obs = StrongBranchingScores::with_config(true, config).unwrap();
    let v = obs.extract(&mut solver, false).unwrap().unwrap();

    let pos = |id: VarId| {
        solver
            .problem()
            .variables
            .iter()
            .position(|v| v.id == id)
            .unwrap()
    };
    assert!(v[pos(failing)].is_nan());
    for &c in &cands[1..] {
        assert!(v[pos(c)].is_finite());
    }
    assert_eq!(solver.strong_branching_begun(), 1);
    assert_eq!(solver.strong_branching_ended(), 1);
    // Three attempts on the failing candidate, one on each other.
    assert_eq!(solver.probe_calls() as usize, 3 + cands.len() - 1);
}
