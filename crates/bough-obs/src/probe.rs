//! Scoped strong-branching sessions.
//!
//! [`ProbeSession`] enters strong-branching mode on construction and
//! leaves it exactly once: through [`finish`](ProbeSession::finish) on the
//! normal path, or on drop when a probe loop exits early. Either way the
//! solver's node LP is restored before the borrow ends.

use bough_core::{SolverError, SolverState, StrongBranchOutcome, VarId};

/// Guard around `begin_strong_branching` / `end_strong_branching`.
pub struct ProbeSession<'s> {
    solver: &'s mut dyn SolverState,
    open: bool,
}

impl<'s> ProbeSession<'s> {
    /// Enter strong-branching mode.
    pub fn begin(solver: &'s mut dyn SolverState) -> Result<Self, SolverError> {
        solver.begin_strong_branching()?;
        Ok(Self { solver, open: true })
    }

    /// Probe both branching directions of `var`.
    pub fn strong_branch(&mut self, var: VarId) -> Result<StrongBranchOutcome, SolverError> {
        self.solver.strong_branch(var)
    }

    /// Leave strong-branching mode, reporting any failure to restore.
    pub fn finish(mut self) -> Result<(), SolverError> {
        self.open = false;
        self.solver.end_strong_branching()
    }
}

impl Drop for ProbeSession<'_> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        if let Err(e) = self.solver.end_strong_branching() {
            log::warn!("strong branching left open, restoring node LP failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bough_test_utils::{toy_problem, MockSolver};

    #[test]
    fn finish_ends_once() {
        let mut solver = MockSolver::at_node(toy_problem());
        let session = ProbeSession::begin(&mut solver).unwrap();
        session.finish().unwrap();
        assert_eq!(solver.strong_branching_begun(), 1);
        assert_eq!(solver.strong_branching_ended(), 1);
    }

    #[test]
    fn drop_ends_an_abandoned_session() {
        let mut solver = MockSolver::at_node(toy_problem());
        {
            let mut session = ProbeSession::begin(&mut solver).unwrap();
            let _ = session.strong_branch(VarId(1));
        }
        assert_eq!(solver.strong_branching_ended(), 1);
        assert!(!solver.in_strong_branching());
    }
}
