//! Error types for the Bough observation framework.
//!
//! Organized by layer: the raw solver capability ([`SolverError`]), the
//! sparse encoder ([`SparseError`]), per-candidate score availability
//! ([`Unavailable`]), and observation extraction as seen by the caller
//! ([`ObsError`]).

use std::error::Error;
use std::fmt;

use crate::id::VarId;
use crate::solver::Stage;

/// Errors reported by a [`SolverState`](crate::SolverState) implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolverError {
    /// The query is not answerable in the solver's current stage.
    InvalidStage {
        /// Name of the rejected query.
        operation: &'static str,
        /// Stage the solver was in.
        stage: Stage,
    },
    /// An LP solve inside the solver failed (numerical trouble, iteration
    /// limit, lost basis).
    LpFailed {
        /// Human-readable description from the solver.
        reason: String,
    },
    /// The variable is not part of the current problem.
    UnknownVariable {
        /// The offending variable.
        var: VarId,
    },
    /// Two queries in the same window disagree (e.g. `lp_columns()` is not
    /// aligned with `variables()`).
    Inconsistent {
        /// Description of the disagreement.
        reason: String,
    },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStage { operation, stage } => {
                write!(f, "'{operation}' is not available in stage {stage}")
            }
            Self::LpFailed { reason } => write!(f, "LP solve failed: {reason}"),
            Self::UnknownVariable { var } => write!(f, "unknown variable {var}"),
            Self::Inconsistent { reason } => write!(f, "inconsistent solver state: {reason}"),
        }
    }
}

impl Error for SolverError {}

/// Errors from building a [`SparseMatrix`](crate::SparseMatrix).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SparseError {
    /// `values` and `indices` disagree on the number of nonzeros, or the
    /// index matrix does not have exactly two rows.
    LengthMismatch {
        /// Number of values supplied.
        values: usize,
        /// Shape of the supplied index matrix.
        indices: (usize, usize),
    },
    /// An index lies outside the declared shape.
    IndexOutOfBounds {
        /// Dimension (0 = rows, 1 = columns).
        dim: usize,
        /// The offending index.
        index: usize,
        /// Extent of that dimension.
        bound: usize,
    },
}

impl fmt::Display for SparseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { values, indices } => write!(
                f,
                "{values} values do not match an index matrix of shape {}x{}",
                indices.0, indices.1
            ),
            Self::IndexOutOfBounds { dim, index, bound } => {
                write!(f, "index {index} out of bounds for dimension {dim} of size {bound}")
            }
        }
    }
}

impl Error for SparseError {}

/// Why a per-candidate score could not be produced.
///
/// Scores are computed as `Result<f64, Unavailable>` per candidate and only
/// flattened to NaN when the dense observation vector is assembled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Unavailable {
    /// Every strong-branching probe attempt for the candidate failed.
    ProbeFailed {
        /// Number of attempts made.
        attempts: u32,
        /// The error returned by the final attempt.
        last: SolverError,
    },
    /// The solver has no branching history for the variable yet.
    NoHistory,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProbeFailed { attempts, last } => {
                write!(f, "probe failed after {attempts} attempt(s): {last}")
            }
            Self::NoHistory => write!(f, "no branching history"),
        }
    }
}

impl Error for Unavailable {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ProbeFailed { last, .. } => Some(last),
            Self::NoHistory => None,
        }
    }
}

/// Errors surfaced by observation functions to the environment loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObsError {
    /// Extraction was attempted outside its valid lifecycle window.
    InvalidStage {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Stage the solver was in.
        stage: Stage,
    },
    /// The solver failed a query that is not tolerated per candidate.
    Solver(SolverError),
    /// The solver reported data that does not form a valid sparse matrix.
    Sparse(SparseError),
    /// The observation function was constructed with an invalid config.
    InvalidConfig {
        /// Description of the violated invariant.
        reason: String,
    },
}

impl fmt::Display for ObsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStage { operation, stage } => {
                write!(f, "invalid solving stage for '{operation}': {stage}")
            }
            Self::Solver(e) => write!(f, "solver: {e}"),
            Self::Sparse(e) => write!(f, "sparse encoding: {e}"),
            Self::InvalidConfig { reason } => write!(f, "invalid config: {reason}"),
        }
    }
}

impl Error for ObsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Solver(e) => Some(e),
            Self::Sparse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SolverError> for ObsError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::InvalidStage { operation, stage } => {
                Self::InvalidStage { operation, stage }
            }
            other => Self::Solver(other),
        }
    }
}

impl From<SparseError> for ObsError {
    fn from(e: SparseError) -> Self {
        Self::Sparse(e)
    }
}
