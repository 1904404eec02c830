//! The [`SolverState`] capability trait and solving stages.
//!
//! Observation functions never see a solver's internal representation.
//! They read through `&mut dyn SolverState`, a narrow query surface that a
//! backend implements on top of its own node, LP, and branching APIs.

use std::fmt;

use crate::error::SolverError;
use crate::id::VarId;
use crate::record::{
    BranchHistory, ColumnState, ConstraintRecord, RowState, StrongBranchOutcome, VariableRecord,
};

/// Stage of the solver's episode state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// No problem loaded.
    Init,
    /// Problem loaded, solving not started. Fresh episode.
    Problem,
    /// Presolve finished, branch-and-bound not started.
    Presolved,
    /// Paused at a branch-and-bound node with a solved LP relaxation.
    Solving,
    /// Search finished.
    Solved,
}

impl Stage {
    /// Whether the problem data (variables, constraints) can be queried.
    pub fn has_problem(self) -> bool {
        !matches!(self, Self::Init)
    }

    /// Whether the solver sits at an active node with LP information.
    pub fn at_node(self) -> bool {
        matches!(self, Self::Solving)
    }

    /// Whether this is the start of an episode (before any node is solved).
    pub fn is_fresh(self) -> bool {
        matches!(self, Self::Problem | Self::Presolved)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Problem => "problem",
            Self::Presolved => "presolved",
            Self::Solving => "solving",
            Self::Solved => "solved",
        };
        f.write_str(name)
    }
}

/// Source of branching candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CandidateMode {
    /// Integral variables with a fractional LP value.
    Lp,
    /// Every unfixed integral variable.
    Pseudo,
}

/// Read and probe access to a solver paused in its episode.
///
/// # Contract
///
/// - Problem queries ([`variables`](Self::variables),
///   [`constraints`](Self::constraints)) succeed whenever
///   [`stage`](Self::stage) has a problem loaded.
/// - LP and branching queries succeed only at an active node
///   ([`Stage::Solving`]); otherwise they return
///   [`SolverError::InvalidStage`].
/// - [`lp_columns`](Self::lp_columns) is aligned with `variables()` and
///   [`lp_rows`](Self::lp_rows) with `constraints()` in the same query
///   window.
/// - Strong-branching probes mutate solver scratch state; they are only
///   issued between [`begin_strong_branching`](Self::begin_strong_branching)
///   and [`end_strong_branching`](Self::end_strong_branching), and the
///   solver restores its node LP afterwards.
///
/// Methods take `&mut self` where the solver may perform work that touches
/// internal state. Exclusive borrowing serializes all observation calls on
/// one solver instance.
pub trait SolverState {
    /// Current stage of the episode.
    fn stage(&self) -> Stage;

    /// Variables of the current problem, in column order.
    fn variables(&self) -> Result<Vec<VariableRecord>, SolverError>;

    /// Constraints of the current problem (including cuts), in row order.
    fn constraints(&self) -> Result<Vec<ConstraintRecord>, SolverError>;

    /// LP state of every column, aligned with `variables()`.
    fn lp_columns(&self) -> Result<Vec<ColumnState>, SolverError>;

    /// LP state of every row, aligned with `constraints()`.
    fn lp_rows(&self) -> Result<Vec<RowState>, SolverError>;

    /// Objective value of the node LP relaxation.
    fn lp_objective(&self) -> Result<f64, SolverError>;

    /// Number of LPs solved so far in the episode.
    fn lp_count(&self) -> u64;

    /// Branching candidates at the current node.
    fn branching_candidates(&self, mode: CandidateMode) -> Result<Vec<VarId>, SolverError>;

    /// Accumulated branching statistics for a variable.
    fn branching_history(&self, var: VarId) -> Result<BranchHistory, SolverError>;

    /// Enter strong-branching mode at the current node.
    fn begin_strong_branching(&mut self) -> Result<(), SolverError>;

    /// Tentatively branch on `var` in both directions and re-solve the LP.
    fn strong_branch(&mut self, var: VarId) -> Result<StrongBranchOutcome, SolverError>;

    /// Leave strong-branching mode and restore the node LP.
    fn end_strong_branching(&mut self) -> Result<(), SolverError>;
}
