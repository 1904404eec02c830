//! Benchmark profiles and utilities for the Bough observation framework.
//!
//! Provides pre-built problems for benchmarking:
//!
//! - [`reference_profile`]: 500 variables, 300 constraints
//! - [`stress_profile`]: 5 000 variables, 3 000 constraints
//! - [`node_solver`]: a mock solver paused at a node, with branching
//!   history for every variable

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use bough_core::{BranchHistory, VarId};
use bough_test_utils::{random_problem, MockProblem, MockSolver};

/// Build a reference benchmark problem: 500 variables, 300 constraints.
pub fn reference_profile(seed: u64) -> MockProblem {
    random_problem(seed, 500, 300)
}

/// Build a stress benchmark problem: 5 000 variables, 3 000 constraints.
///
/// Same generator as [`reference_profile`] at 10x the size.
pub fn stress_profile(seed: u64) -> MockProblem {
    random_problem(seed, 5_000, 3_000)
}

/// Generate deterministic branching history for `n` variables.
///
/// Uses a simple multiplicative hash of the seed so profiles stay
/// reproducible without pulling an RNG into the library.
pub fn init_histories(n: usize, seed: u64) -> Vec<(VarId, BranchHistory)> {
    (0..n)
        .map(|i| {
            let h = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add((i as u64).wrapping_mul(1442695040888963407));
            let count_down = 1 + (h >> 8) % 16;
            let count_up = 1 + (h >> 16) % 16;
            let history = BranchHistory {
                pseudocost_down: Some(1.0 + ((h >> 24) % 100) as f64 / 10.0),
                pseudocost_up: Some(1.0 + ((h >> 32) % 100) as f64 / 10.0),
                count_down,
                count_up,
                cutoffs_down: (h >> 40) % (count_down + 1),
                cutoffs_up: (h >> 48) % (count_up + 1),
            };
            (VarId(i as u32), history)
        })
        .collect()
}

/// A solver paused at a node of `problem`, with history for every
/// variable.
pub fn node_solver(problem: MockProblem, seed: u64) -> MockSolver {
    let n = problem.variables.len();
    let mut solver = MockSolver::at_node(problem);
    for (var, history) in init_histories(n, seed) {
        solver.set_history(var, history);
    }
    solver
}
