//! Pseudocost scores of the LP branching candidates.

use ndarray::Array1;

use bough_core::{CandidateMode, ObsError, SolverState};

use crate::accessor::StateAccessor;
use crate::config::AccessorConfig;
use crate::function::{checked, require_fresh, ObservationFunction};
use crate::scores::{positions, scores_to_dense};

/// Extracts a per-variable pseudocost score vector.
///
/// Cheap: reads branching history the solver already keeps. Entries are
/// NaN for non-candidates and for candidates without history in both
/// directions.
#[derive(Debug, Default)]
pub struct Pseudocosts {
    config: AccessorConfig,
}

impl Pseudocosts {
    /// With default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// With custom tolerances.
    pub fn with_config(config: AccessorConfig) -> Result<Self, ObsError> {
        Ok(Self {
            config: checked(config)?,
        })
    }
}

impl ObservationFunction for Pseudocosts {
    type Observation = Array1<f64>;

    fn name(&self) -> &str {
        "pseudocosts"
    }

    fn before_reset(&mut self, solver: &mut dyn SolverState) -> Result<(), ObsError> {
        require_fresh(solver, &self.config)
    }

    fn extract(
        &mut self,
        solver: &mut dyn SolverState,
        done: bool,
    ) -> Result<Option<Array1<f64>>, ObsError> {
        if done {
            return Ok(None);
        }
        let acc = StateAccessor::new(solver, &self.config);
        acc.require_node("extract")?;
        let positions = positions(&acc.variable_records()?);
        let candidates = acc.branching_candidates(CandidateMode::Lp)?;
        let scores = acc.pseudocosts(&candidates)?;
        scores_to_dense(&positions, &scores).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bough_core::{BranchHistory, VarId};
    use bough_test_utils::{toy_problem, MockSolver};

    #[test]
    fn scores_only_candidates_with_history() {
        let mut solver = MockSolver::at_node(toy_problem());
        solver.set_history(
            VarId(1),
            BranchHistory {
                pseudocost_down: Some(1.0),
                pseudocost_up: Some(3.0),
                count_down: 2,
                count_up: 1,
                ..Default::default()
            },
        );
        let mut obs = Pseudocosts::new();
        let v = obs.extract(&mut solver, false).unwrap().unwrap();

        assert_eq!(v.len(), 3);
        assert!(v[0].is_nan());
        // x1 = 2.5: (0.5 * 1) * (0.5 * 3).
        assert_eq!(v[1], 0.75);
        assert!(v[2].is_nan());
    }

    #[test]
    fn done_skips_the_solver() {
        let mut solver = MockSolver::new(toy_problem());
        let mut obs = Pseudocosts::new();
        assert_eq!(obs.extract(&mut solver, true).unwrap(), None);
        assert_eq!(solver.queries(), 0);
    }
}
