//! Solver state access and observation functions for Bough.
//!
//! A [`StateAccessor`] borrows a paused solver and derives canonical
//! per-variable and per-constraint quantities. Observation functions build
//! on it and follow the [`ObservationFunction`] lifecycle: `before_reset`
//! once per episode, `extract` once per decision node.
//!
//! | Function | Observation |
//! |----------|-------------|
//! | [`Nothing`] | none |
//! | [`NodeBipartite`] | [`NodeBipartiteObs`] |
//! | [`StrongBranchingScores`] | `Array1<f64>`, one score per variable |
//! | [`Pseudocosts`] | `Array1<f64>`, one score per variable |
//! | [`Khalil2016`] | [`Khalil2016Obs`] |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod accessor;
pub mod cache;
pub mod config;
pub mod function;
pub mod khalil;
pub mod node_bipartite;
pub mod nothing;
pub mod probe;
pub mod pseudocosts;
pub mod scores;
pub mod stats;
pub mod strong_branching;

pub use accessor::{ConstraintView, StateAccessor, VariableView};
pub use cache::{EpisodeCache, ProblemFingerprint};
pub use config::{AccessorConfig, ConfigError};
pub use function::ObservationFunction;
pub use khalil::{Khalil2016, Khalil2016Obs, KhalilFeature};
pub use node_bipartite::{ColumnFeature, NodeBipartite, NodeBipartiteObs, RowFeature};
pub use nothing::Nothing;
pub use probe::ProbeSession;
pub use pseudocosts::Pseudocosts;
pub use scores::{product_score, scores_to_dense, CandidateScores};
pub use stats::Summary;
pub use strong_branching::StrongBranchingScores;
