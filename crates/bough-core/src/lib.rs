//! Core types and traits for the Bough observation framework.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! vocabulary shared by every other crate in the workspace: variable and
//! constraint identifiers, the raw records a solver reports, the
//! [`SolverState`] capability trait, the error taxonomy, and the
//! coordinate-format [`SparseMatrix`] with its encoder.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod record;
pub mod solver;
pub mod sparse;

pub use error::{ObsError, SolverError, SparseError, Unavailable};
pub use id::{ConsId, VarId};
pub use record::{
    BasisStatus, BranchHistory, ColumnState, ConstraintRecord, DirectionOutcome, RowState,
    StrongBranchOutcome, VarType, VariableRecord,
};
pub use solver::{CandidateMode, SolverState, Stage};
pub use sparse::{encode, encode_rows, encode_with, SparseMatrix};
