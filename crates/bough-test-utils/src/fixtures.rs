//! Reusable MILP fixtures.
//!
//! - [`toy_problem`]: three variables, two constraints, a hand-checked LP
//!   solution. The coefficient matrix is `[[1, 1, 0], [0, 1, 1]]`.
//! - [`random_problem`]: a seeded random problem with a consistent LP
//!   state, for property tests and benchmarks.

use bough_core::{
    BasisStatus, ColumnState, ConsId, ConstraintRecord, RowState, VarId, VarType, VariableRecord,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use smallvec::smallvec;

/// A problem together with the LP state of one node.
#[derive(Clone, Debug)]
pub struct MockProblem {
    pub variables: Vec<VariableRecord>,
    pub constraints: Vec<ConstraintRecord>,
    /// Aligned with `variables`.
    pub columns: Vec<ColumnState>,
    /// Aligned with `constraints`.
    pub rows: Vec<RowState>,
    pub lp_objective: f64,
}

fn column(value: f64, reduced_cost: f64, basis: BasisStatus, age: u32) -> ColumnState {
    ColumnState {
        value,
        reduced_cost,
        basis,
        age,
        incumbent: None,
        average_incumbent: None,
    }
}

/// The toy problem.
///
/// ```text
/// min   x0 - 2 x1 + 0.5 x2
/// c0:   x0 + x1      <= 4
/// c1:        x1 + x2 <= 2.5
/// x0 binary, x1 integer in [0, 5], x2 continuous >= 0
/// ```
///
/// LP solution at the node: `x = (0.5, 2.5, 0)`, so `c0` is slack
/// (activity 3) and `c1` is tight. Both integral variables are
/// fractional.
pub fn toy_problem() -> MockProblem {
    let variables = vec![
        VariableRecord {
            id: VarId(0),
            var_type: VarType::Binary,
            lower: 0.0,
            upper: 1.0,
            objective: 1.0,
        },
        VariableRecord {
            id: VarId(1),
            var_type: VarType::Integer,
            lower: 0.0,
            upper: 5.0,
            objective: -2.0,
        },
        VariableRecord {
            id: VarId(2),
            var_type: VarType::Continuous,
            lower: 0.0,
            upper: f64::INFINITY,
            objective: 0.5,
        },
    ];
    let constraints = vec![
        ConstraintRecord {
            id: ConsId(0),
            lhs: f64::NEG_INFINITY,
            rhs: 4.0,
            entries: smallvec![(0, 1.0), (1, 1.0)],
        },
        ConstraintRecord {
            id: ConsId(1),
            lhs: f64::NEG_INFINITY,
            rhs: 2.5,
            entries: smallvec![(1, 1.0), (2, 1.0)],
        },
    ];
    let columns = vec![
        column(0.5, 0.0, BasisStatus::Basic, 0),
        column(2.5, 0.0, BasisStatus::Basic, 2),
        column(0.0, 0.5, BasisStatus::Lower, 1),
    ];
    let rows = vec![
        RowState {
            activity: 3.0,
            dual: 0.0,
            age: 1,
        },
        RowState {
            activity: 2.5,
            dual: -1.0,
            age: 0,
        },
    ];
    MockProblem {
        variables,
        constraints,
        columns,
        rows,
        lp_objective: 0.5 - 5.0,
    }
}

/// A random problem with `n_vars` variables and `n_cons` constraints.
///
/// Deterministic in `seed`. Every constraint has between one and five
/// nonzeros; roughly a third of the rows are made tight at the LP
/// solution, and the rest have slack.
pub fn random_problem(seed: u64, n_vars: usize, n_cons: usize) -> MockProblem {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut variables = Vec::with_capacity(n_vars);
    let mut columns = Vec::with_capacity(n_vars);
    for j in 0..n_vars {
        let var_type = match rng.random_range(0..4) {
            0 => VarType::Binary,
            1 => VarType::Integer,
            2 => VarType::ImplicitInteger,
            _ => VarType::Continuous,
        };
        let upper = match var_type {
            VarType::Binary => 1.0,
            _ if rng.random_bool(0.2) => f64::INFINITY,
            _ => f64::from(rng.random_range(1u32..20)),
        };
        let finite_upper = if upper.is_finite() { upper } else { 25.0 };
        let value = match rng.random_range(0..3) {
            0 => 0.0,
            1 => finite_upper.min(f64::from(rng.random_range(0u32..20))),
            _ => rng.random::<f64>() * finite_upper,
        };
        let basis = if value == 0.0 {
            BasisStatus::Lower
        } else if value == upper {
            BasisStatus::Upper
        } else {
            BasisStatus::Basic
        };
        let incumbent = rng.random_bool(0.5).then(|| value.round());
        variables.push(VariableRecord {
            id: VarId(j as u32),
            var_type,
            lower: 0.0,
            upper,
            objective: rng.random_range(-10.0..10.0),
        });
        columns.push(ColumnState {
            value,
            reduced_cost: rng.random_range(-1.0..1.0),
            basis,
            age: rng.random_range(0..10),
            incumbent,
            average_incumbent: incumbent,
        });
    }

    let mut constraints = Vec::with_capacity(n_cons);
    let mut rows = Vec::with_capacity(n_cons);
    for i in 0..n_cons {
        let k = rng.random_range(1..=n_vars.clamp(1, 5));
        let entries: smallvec::SmallVec<[(usize, f64); 8]> =
            rand::seq::index::sample(&mut rng, n_vars.max(1), k)
                .into_iter()
                .filter(|&j| j < n_vars)
                .map(|j| {
                    let magnitude = rng.random_range(0.5..5.0);
                    let sign = if rng.random_bool(0.7) { 1.0 } else { -1.0 };
                    (j, sign * magnitude)
                })
                .collect();
        let activity: f64 = entries.iter().map(|&(j, a)| a * columns[j].value).sum();
        let tight = rng.random_bool(1.0 / 3.0);
        let rhs = if tight {
            activity
        } else {
            activity + rng.random_range(0.5..10.0)
        };
        constraints.push(ConstraintRecord {
            id: ConsId(i as u32),
            lhs: f64::NEG_INFINITY,
            rhs,
            entries,
        });
        rows.push(RowState {
            activity,
            dual: if tight { rng.random_range(-2.0..0.0) } else { 0.0 },
            age: if tight { 0 } else { rng.random_range(0..10) },
        });
    }

    let lp_objective = variables
        .iter()
        .zip(&columns)
        .map(|(v, c)| v.objective * c.value)
        .sum();

    MockProblem {
        variables,
        constraints,
        columns,
        rows,
        lp_objective,
    }
}
