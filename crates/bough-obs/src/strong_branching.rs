//! Strong-branching scores of the branching candidates.
//!
//! Every candidate is probed by re-solving the LP in both branching
//! directions, which makes this the most expensive observation in the
//! crate. It is mainly used as an imitation-learning target.

use ndarray::Array1;

use bough_core::{CandidateMode, ObsError, SolverState};

use crate::accessor::StateAccessor;
use crate::config::AccessorConfig;
use crate::function::{checked, require_fresh, ObservationFunction};
use crate::scores::{positions, scores_to_dense};

/// Extracts a per-variable strong-branching score vector.
///
/// The vector has one entry per variable. Non-candidates are NaN, as is a
/// candidate whose probe failed on every attempt.
#[derive(Debug)]
pub struct StrongBranchingScores {
    mode: CandidateMode,
    config: AccessorConfig,
}

impl Default for StrongBranchingScores {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StrongBranchingScores {
    /// Score pseudo candidates (every unfixed integral variable) when
    /// `pseudo_candidates` is true, LP candidates otherwise.
    pub fn new(pseudo_candidates: bool) -> Self {
        Self {
            mode: if pseudo_candidates {
                CandidateMode::Pseudo
            } else {
                CandidateMode::Lp
            },
            config: AccessorConfig::default(),
        }
    }

    /// With custom tolerances and probe limits.
    pub fn with_config(pseudo_candidates: bool, config: AccessorConfig) -> Result<Self, ObsError> {
        Ok(Self {
            config: checked(config)?,
            ..Self::new(pseudo_candidates)
        })
    }

    /// Candidate source in use.
    pub fn mode(&self) -> CandidateMode {
        self.mode
    }
}

impl ObservationFunction for StrongBranchingScores {
    type Observation = Array1<f64>;

    fn name(&self) -> &str {
        "strong_branching_scores"
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
        let mut acc = StateAccessor::new(solver, &self.config);
        acc.require_node("extract")?;
        let positions = positions(&acc.variable_records()?);
        let candidates = acc.branching_candidates(self.mode)?;
        let scores = acc.strong_branching_scores(&candidates)?;
        scores_to_dense(&positions, &scores).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bough_core::{DirectionOutcome, StrongBranchOutcome, VarId};
    use bough_test_utils::{toy_problem, MockSolver};

    fn gains(down: f64, up: f64) -> StrongBranchOutcome {
        let dir = |objective| DirectionOutcome {
            objective,
            valid: true,
            infeasible: false,
        };
        StrongBranchOutcome {
            down: dir(down),
            up: dir(up),
        }
    }

    #[test]
    fn defaults_to_pseudo_candidates() {
        assert_eq!(StrongBranchingScores::default().mode(), CandidateMode::Pseudo);
        assert_eq!(StrongBranchingScores::new(false).mode(), CandidateMode::Lp);
    }

    #[test]
    fn scores_candidates_and_nans_the_rest() {
        let mut solver = MockSolver::at_node(toy_problem());
        solver.set_lp_objective(1.0);
        solver.set_probe(VarId(0), gains(3.0, 2.0));
        solver.set_probe(VarId(1), gains(1.5, 5.0));
        let mut obs = StrongBranchingScores::new(false);
        let v = obs.extract(&mut solver, false).unwrap().unwrap();

        assert_eq!(v.len(), 3);
        assert_eq!(v[0], 2.0 * 1.0);
        assert_eq!(v[1], 0.5 * 4.0);
        assert!(v[2].is_nan());
    }

    #[test]
    fn before_reset_rejects_a_running_search() {
        let mut solver = MockSolver::at_node(toy_problem());
        let mut obs = StrongBranchingScores::default();
        assert!(matches!(
            obs.before_reset(&mut solver),
            Err(ObsError::InvalidStage {
                operation: "before_reset",
                ..
            })
        ));
    }
}
