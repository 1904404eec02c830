//! The observation-function lifecycle.

use bough_core::{ObsError, SolverState};

use crate::accessor::StateAccessor;
use crate::config::AccessorConfig;

/// A feature extractor driven by the environment loop.
///
/// Once per episode, [`before_reset`](Self::before_reset) runs while the
/// solver holds a fresh problem (stage `Problem` or `Presolved`). Then, at
/// every decision node, [`extract`](Self::extract) reads the current
/// solver state. When `done` is true the episode is over and `extract`
/// returns `Ok(None)` without querying the solver.
///
/// Implementations own their caches; the solver is borrowed only for the
/// duration of each call.
pub trait ObservationFunction: Send {
    /// The observation produced at each node.
    type Observation;

    /// Short name for logging and registries.
    fn name(&self) -> &str;

    /// Prepare for a new episode.
    fn before_reset(&mut self, solver: &mut dyn SolverState) -> Result<(), ObsError>;

    /// Observe the current node, or `None` once the episode is done.
    fn extract(
        &mut self,
        solver: &mut dyn SolverState,
        done: bool,
    ) -> Result<Option<Self::Observation>, ObsError>;
}

/// Validate `config` the way every `with_config` constructor does.
pub(crate) fn checked(config: AccessorConfig) -> Result<AccessorConfig, ObsError> {
    config.validate()?;
    Ok(config)
}

/// Stage check shared by every `before_reset`.
pub(crate) fn require_fresh(
    solver: &mut dyn SolverState,
    config: &AccessorConfig,
) -> Result<(), ObsError> {
    StateAccessor::new(solver, config).require_fresh("before_reset")
}
