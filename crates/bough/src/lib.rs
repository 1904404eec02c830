//! Bough: branch-and-bound observation extraction for learning-based MILP
//! solving.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Bough sub-crates. For most users, adding `bough` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! A solver backend implements [`types::SolverState`]; observation
//! functions read through it once per episode and once per node.
//!
//! ```rust
//! use bough::prelude::*;
//!
//! fn run_episode(
//!     solver: &mut dyn SolverState,
//!     nodes: usize,
//! ) -> Result<Vec<NodeBipartiteObs>, ObsError> {
//!     let mut obs = NodeBipartite::new();
//!     obs.before_reset(solver)?;
//!     let mut out = Vec::new();
//!     for _ in 0..nodes {
//!         // ... the solver advances to its next node here ...
//!         if let Some(o) = obs.extract(solver, false)? {
//!             out.push(o);
//!         }
//!     }
//!     Ok(out)
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `bough-core` | IDs, solver records, `SolverState`, errors, sparse encoding |
//! | [`obs`] | `bough-obs` | State accessor, episode cache, observation functions |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`bough-core`).
///
/// Contains the raw solver records, the [`types::SolverState`] capability
/// trait, the error taxonomy, and [`types::SparseMatrix`].
pub use bough_core as types;

/// State accessor and observation functions (`bough-obs`).
///
/// [`obs::NodeBipartite`], [`obs::StrongBranchingScores`],
/// [`obs::Pseudocosts`], [`obs::Khalil2016`] and [`obs::Nothing`], plus the
/// [`obs::StateAccessor`] they are built on.
pub use bough_obs as obs;

/// The array crate observations are expressed in.
pub use ndarray;

/// Common imports for typical Bough usage.
///
/// ```rust
/// use bough::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use bough_core::{CandidateMode, ConsId, SolverState, SparseMatrix, Stage, VarId};

    // Errors
    pub use bough_core::{ObsError, SolverError, Unavailable};

    // Observation
    pub use bough_obs::{
        AccessorConfig, ColumnFeature, Khalil2016, Khalil2016Obs, KhalilFeature, NodeBipartite,
        NodeBipartiteObs, Nothing, ObservationFunction, Pseudocosts, RowFeature,
        StrongBranchingScores,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use bough_test_utils::{toy_problem, MockSolver};

    #[test]
    fn prelude_drives_a_full_episode() {
        let mut solver = MockSolver::new(toy_problem());
        let mut bipartite = NodeBipartite::new();
        let mut khalil = Khalil2016::new();
        let mut sb = StrongBranchingScores::default();
        let mut pc = Pseudocosts::new();
        let mut nothing = Nothing;

        bipartite.before_reset(&mut solver).unwrap();
        khalil.before_reset(&mut solver).unwrap();
        sb.before_reset(&mut solver).unwrap();
        pc.before_reset(&mut solver).unwrap();
        nothing.before_reset(&mut solver).unwrap();

        solver.start_solving();
        assert!(bipartite.extract(&mut solver, false).unwrap().is_some());
        assert!(khalil.extract(&mut solver, false).unwrap().is_some());
        assert!(sb.extract(&mut solver, false).unwrap().is_some());
        assert!(pc.extract(&mut solver, false).unwrap().is_some());
        assert!(nothing.extract(&mut solver, false).unwrap().is_none());

        solver.set_stage(Stage::Solved);
        assert!(bipartite.extract(&mut solver, true).unwrap().is_none());
    }
}
