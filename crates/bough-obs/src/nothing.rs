//! An observation function that observes nothing.

use bough_core::{ObsError, SolverState};

use crate::function::ObservationFunction;

/// Always returns no observation; for environments that need none.
#[derive(Clone, Copy, Debug, Default)]
pub struct Nothing;

impl ObservationFunction for Nothing {
    type Observation = ();

    fn name(&self) -> &str {
        "nothing"
    }

    fn before_reset(&mut self, _solver: &mut dyn SolverState) -> Result<(), ObsError> {
        Ok(())
    }

    fn extract(
        &mut self,
        _solver: &mut dyn SolverState,
        _done: bool,
    ) -> Result<Option<()>, ObsError> {
        Ok(None)
    }
}
