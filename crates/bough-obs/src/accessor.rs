//! Canonical views over raw solver state.
//!
//! [`StateAccessor`] borrows a solver for the duration of one observation
//! call and turns its raw records into the normalized quantities every
//! observation function shares: scaled ages, objective-normalized costs,
//! row biases, tightness, and the two candidate scoring rules.
//!
//! Every query checks the solver stage first, so a call outside its window
//! fails with [`ObsError::InvalidStage`] before the solver is touched.

use bough_core::{
    encode_rows, BasisStatus, BranchHistory, CandidateMode, ColumnState, ConsId,
    ConstraintRecord, DirectionOutcome, ObsError, RowState, SolverError, SolverState, SparseMatrix,
    Stage, Unavailable, VarId, VarType, VariableRecord,
};
use log::{trace, warn};

use crate::config::AccessorConfig;
use crate::probe::ProbeSession;
use crate::scores::{positions, product_score, CandidateScores};

// ── Views ──────────────────────────────────────────────────────────

/// Canonical per-variable quantities at the current node.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableView {
    /// Identity of the variable.
    pub id: VarId,
    /// Integrality class.
    pub var_type: VarType,
    /// Whether the local lower bound is finite.
    pub has_lower_bound: bool,
    /// Whether the local upper bound is finite.
    pub has_upper_bound: bool,
    /// Objective coefficient divided by the objective norm.
    pub normed_objective: f64,
    /// LP solution value.
    pub solution_value: f64,
    /// Fractional part of the LP value; 0 for continuous variables.
    pub solution_frac: f64,
    /// Whether the LP value sits on the finite lower bound.
    pub at_lower_bound: bool,
    /// Whether the LP value sits on the finite upper bound.
    pub at_upper_bound: bool,
    /// Reduced cost divided by the objective norm.
    pub normed_reduced_cost: f64,
    /// Basis status of the column.
    pub basis: BasisStatus,
    /// `age / (lp_count + age_offset)`.
    pub scaled_age: f64,
    /// Value in the incumbent solution.
    pub incumbent: Option<f64>,
    /// Average value over primal solutions found.
    pub average_incumbent: Option<f64>,
}

/// Canonical per-constraint quantities at the current node.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintView {
    /// Identity of the constraint.
    pub id: ConsId,
    /// Finite side divided by the row norm; NaN for a free row.
    pub bias: f64,
    /// Whether the activity is at either finite side.
    pub is_tight: bool,
    /// `age / (lp_count + age_offset)`.
    pub scaled_age: f64,
    /// Cosine of the angle between the row and the objective; NaN when
    /// either vector is zero.
    pub objective_cosine_similarity: f64,
    /// Dual value divided by row norm times objective norm.
    pub normed_dual: f64,
}

// ── Free helpers ───────────────────────────────────────────────────

/// Euclidean norm of the objective vector, with 0 mapped to 1.
pub fn objective_norm(variables: &[VariableRecord]) -> f64 {
    let norm = variables
        .iter()
        .map(|v| v.objective * v.objective)
        .sum::<f64>()
        .sqrt();
    if norm > 0.0 {
        norm
    } else {
        1.0
    }
}

/// Constraint coefficients as an `(n_constraints, n_vars)` sparse matrix.
pub fn coefficient_matrix(
    n_vars: usize,
    constraints: &[ConstraintRecord],
) -> Result<SparseMatrix<f64>, ObsError> {
    let rows = constraints.iter().map(|c| c.entries.iter().copied());
    Ok(encode_rows(constraints.len(), n_vars, rows, |v: &f64| {
        *v != 0.0
    })?)
}

/// Finite side of a row over its norm: `rhs` when finite, else `lhs`.
fn row_bias(c: &ConstraintRecord, norm: f64) -> f64 {
    let Some(side) = c.finite_side() else {
        return f64::NAN;
    };
    if norm > 0.0 {
        side / norm
    } else {
        side
    }
}

fn check_aligned(what: &'static str, records: usize, states: usize) -> Result<(), ObsError> {
    if records == states {
        return Ok(());
    }
    Err(ObsError::Solver(SolverError::Inconsistent {
        reason: format!("{what}: {records} records but {states} LP states"),
    }))
}

// ── StateAccessor ──────────────────────────────────────────────────

/// Read access to one solver for the duration of one observation call.
pub struct StateAccessor<'a> {
    solver: &'a mut dyn SolverState,
    config: &'a AccessorConfig,
}

impl<'a> StateAccessor<'a> {
    /// Borrow `solver` with the given tolerances.
    pub fn new(solver: &'a mut dyn SolverState, config: &'a AccessorConfig) -> Self {
        Self { solver, config }
    }

    /// Current solver stage.
    pub fn stage(&self) -> Stage {
        self.solver.stage()
    }

    /// Fail unless the solver is at the start of an episode.
    pub fn require_fresh(&self, operation: &'static str) -> Result<(), ObsError> {
        let stage = self.stage();
        if stage.is_fresh() {
            Ok(())
        } else {
            Err(ObsError::InvalidStage { operation, stage })
        }
    }

    /// Fail unless the solver is paused at a node.
    pub fn require_node(&self, operation: &'static str) -> Result<(), ObsError> {
        let stage = self.stage();
        if stage.at_node() {
            Ok(())
        } else {
            Err(ObsError::InvalidStage { operation, stage })
        }
    }

    fn require_problem(&self, operation: &'static str) -> Result<(), ObsError> {
        let stage = self.stage();
        if stage.has_problem() {
            Ok(())
        } else {
            Err(ObsError::InvalidStage { operation, stage })
        }
    }

    // ── Raw records ────────────────────────────────────────────

    /// Raw variable records, in column order.
    pub fn variable_records(&self) -> Result<Vec<VariableRecord>, ObsError> {
        self.require_problem("variables")?;
        Ok(self.solver.variables()?)
    }

    /// Raw constraint records, in row order.
    pub fn constraint_records(&self) -> Result<Vec<ConstraintRecord>, ObsError> {
        self.require_problem("constraints")?;
        Ok(self.solver.constraints()?)
    }

    /// LP column states aligned with `variables`.
    pub fn column_states(&self, variables: &[VariableRecord]) -> Result<Vec<ColumnState>, ObsError> {
        self.require_node("lp_columns")?;
        let columns = self.solver.lp_columns()?;
        check_aligned("lp_columns", variables.len(), columns.len())?;
        Ok(columns)
    }

    /// LP row states aligned with `constraints`.
    pub fn row_states(&self, constraints: &[ConstraintRecord]) -> Result<Vec<RowState>, ObsError> {
        self.require_node("lp_rows")?;
        let rows = self.solver.lp_rows()?;
        check_aligned("lp_rows", constraints.len(), rows.len())?;
        Ok(rows)
    }

    /// Branching statistics for `var`.
    pub fn branching_history(&self, var: VarId) -> Result<BranchHistory, ObsError> {
        self.require_node("branching_history")?;
        Ok(self.solver.branching_history(var)?)
    }

    /// Objective value of the node LP.
    pub fn lp_objective(&self) -> Result<f64, ObsError> {
        self.require_node("lp_objective")?;
        Ok(self.solver.lp_objective()?)
    }

    fn scale_age(&self, age: u32) -> f64 {
        f64::from(age) / (self.solver.lp_count() as f64 + self.config.age_offset)
    }

    // ── Canonical views ────────────────────────────────────────

    /// Canonical view of every variable at the current node.
    pub fn variables(&self) -> Result<Vec<VariableView>, ObsError> {
        let records = self.variable_records()?;
        self.variable_views(&records, objective_norm(&records))
    }

    /// Canonical variable views from already-fetched records.
    ///
    /// `objective_norm` is passed in so callers holding a cached norm do
    /// not recompute it.
    pub fn variable_views(
        &self,
        records: &[VariableRecord],
        objective_norm: f64,
    ) -> Result<Vec<VariableView>, ObsError> {
        let columns = self.column_states(records)?;
        let tol = self.config.feasibility_tol;
        let views = records
            .iter()
            .zip(&columns)
            .map(|(var, col)| {
                let x = col.value;
                let solution_frac = if var.var_type.is_integral() {
                    let frac = x - x.floor();
                    if frac < tol || frac > 1.0 - tol {
                        0.0
                    } else {
                        frac
                    }
                } else {
                    0.0
                };
                VariableView {
                    id: var.id,
                    var_type: var.var_type,
                    has_lower_bound: var.has_lower_bound(),
                    has_upper_bound: var.has_upper_bound(),
                    normed_objective: var.objective / objective_norm,
                    solution_value: x,
                    solution_frac,
                    at_lower_bound: var.has_lower_bound() && (x - var.lower).abs() <= tol,
                    at_upper_bound: var.has_upper_bound() && (x - var.upper).abs() <= tol,
                    normed_reduced_cost: col.reduced_cost / objective_norm,
                    basis: col.basis,
                    scaled_age: self.scale_age(col.age),
                    incumbent: col.incumbent,
                    average_incumbent: col.average_incumbent,
                }
            })
            .collect();
        Ok(views)
    }

    /// Canonical view of every constraint at the current node.
    pub fn constraints(&self) -> Result<Vec<ConstraintView>, ObsError> {
        let variables = self.variable_records()?;
        let constraints = self.constraint_records()?;
        self.constraint_views(&variables, &constraints, objective_norm(&variables))
    }

    /// Canonical constraint views from already-fetched records.
    pub fn constraint_views(
        &self,
        variables: &[VariableRecord],
        constraints: &[ConstraintRecord],
        objective_norm: f64,
    ) -> Result<Vec<ConstraintView>, ObsError> {
        let rows = self.row_states(constraints)?;
        let tol = self.config.feasibility_tol;
        let objective_is_zero = variables.iter().all(|v| v.objective == 0.0);

        let mut views = Vec::with_capacity(constraints.len());
        for (cons, row) in constraints.iter().zip(&rows) {
            let norm = cons.norm();
            let is_tight = (cons.lhs.is_finite() && (row.activity - cons.lhs).abs() <= tol)
                || (cons.rhs.is_finite() && (row.activity - cons.rhs).abs() <= tol);

            let objective_cosine_similarity = if objective_is_zero || norm == 0.0 {
                f64::NAN
            } else {
                let mut dot = 0.0;
                for &(pos, a) in &cons.entries {
                    let var = variables.get(pos).ok_or_else(|| {
                        ObsError::Solver(SolverError::Inconsistent {
                            reason: format!(
                                "constraint {} references column {pos} of {}",
                                cons.id,
                                variables.len()
                            ),
                        })
                    })?;
                    dot += a * var.objective;
                }
                dot / (norm * objective_norm)
            };

            let dual_scale = if norm > 0.0 { norm } else { 1.0 } * objective_norm;
            views.push(ConstraintView {
                id: cons.id,
                bias: row_bias(cons, norm),
                is_tight,
                scaled_age: self.scale_age(row.age),
                objective_cosine_similarity,
                normed_dual: row.dual / dual_scale,
            });
        }
        Ok(views)
    }

    /// Coefficient matrix of the current problem.
    pub fn coefficient_matrix(&self) -> Result<SparseMatrix<f64>, ObsError> {
        let n_vars = self.variable_records()?.len();
        let constraints = self.constraint_records()?;
        coefficient_matrix(n_vars, &constraints)
    }

    // ── Candidates and scores ──────────────────────────────────

    /// Branching candidates at the current node.
    pub fn branching_candidates(&self, mode: CandidateMode) -> Result<Vec<VarId>, ObsError> {
        self.require_node("branching_candidates")?;
        Ok(self.solver.branching_candidates(mode)?)
    }

    fn direction_gain(&self, outcome: &DirectionOutcome, lp_objective: f64) -> f64 {
        if outcome.infeasible {
            self.config.infeasible_gain
        } else if outcome.valid {
            (outcome.objective - lp_objective).max(0.0)
        } else {
            0.0
        }
    }

    /// Strong-branching product score of each candidate.
    ///
    /// This is the most expensive query in the crate: every candidate costs
    /// at least two LP re-solves. A probe that fails is retried up to
    /// `max_probe_attempts` times before the candidate is marked
    /// [`Unavailable::ProbeFailed`]; the remaining candidates are still
    /// probed. A stage error aborts the whole call.
    pub fn strong_branching_scores(
        &mut self,
        candidates: &[VarId],
    ) -> Result<CandidateScores, ObsError> {
        let lp_objective = self.lp_objective()?;
        let max_attempts = self.config.max_probe_attempts;
        let mut gains = Vec::with_capacity(candidates.len());

        let mut session = ProbeSession::begin(&mut *self.solver)?;
        for &var in candidates {
            let mut attempts = 0;
            let result = loop {
                attempts += 1;
                match session.strong_branch(var) {
                    Ok(outcome) => break Ok(outcome),
                    Err(e @ SolverError::InvalidStage { .. }) => return Err(e.into()),
                    Err(e @ SolverError::UnknownVariable { .. }) => {
                        break Err(Unavailable::ProbeFailed { attempts, last: e })
                    }
                    Err(e) if attempts >= max_attempts => {
                        warn!("strong branching on {var} gave up after {attempts} attempt(s): {e}");
                        break Err(Unavailable::ProbeFailed { attempts, last: e });
                    }
                    Err(e) => trace!("strong branching on {var}, attempt {attempts} failed: {e}"),
                }
            };
            gains.push((var, result));
        }
        session.finish()?;

        let eps = self.config.score_epsilon;
        Ok(gains
            .into_iter()
            .map(|(var, result)| {
                let score = result.map(|o| {
                    product_score(
                        self.direction_gain(&o.down, lp_objective),
                        self.direction_gain(&o.up, lp_objective),
                        eps,
                    )
                });
                (var, score)
            })
            .collect())
    }

    /// Pseudocost product score of each candidate.
    pub fn pseudocosts(&self, candidates: &[VarId]) -> Result<CandidateScores, ObsError> {
        let records = self.variable_records()?;
        let columns = self.column_states(&records)?;
        let positions = positions(&records);
        let eps = self.config.score_epsilon;

        let mut scores = CandidateScores::with_capacity(candidates.len());
        for &var in candidates {
            let pos = *positions
                .get(&var)
                .ok_or(ObsError::Solver(SolverError::UnknownVariable { var }))?;
            let x = columns[pos].value;
            let history = self.branching_history(var)?;
            let score = match (history.pseudocost_down, history.pseudocost_up) {
                (Some(down), Some(up)) => {
                    Ok(product_score((x - x.floor()) * down, (x.ceil() - x) * up, eps))
                }
                _ => Err(Unavailable::NoHistory),
            };
            scores.insert(var, score);
        }
        Ok(scores)
    }
}
