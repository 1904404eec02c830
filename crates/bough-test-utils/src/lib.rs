//! Test utilities and mock types for Bough development.
//!
//! Provides [`MockSolver`], an in-memory [`SolverState`] whose stage, LP
//! solution, branching history and strong-branching outcomes are all set
//! by the test, and the [`fixtures`] problems it is usually loaded with.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::Cell;
use std::collections::HashMap;

use bough_core::{
    BranchHistory, CandidateMode, ColumnState, ConstraintRecord, DirectionOutcome, RowState,
    SolverError, SolverState, Stage, StrongBranchOutcome, VarId, VariableRecord,
};

pub use fixtures::{random_problem, toy_problem, MockProblem};

/// Integrality tolerance used to derive LP candidates.
const FRAC_TOL: f64 = 1e-6;

/// Mock implementation of [`SolverState`].
///
/// Backed by a [`MockProblem`]. Every trait call is counted (see
/// [`queries`](MockSolver::queries)) so tests can assert that a code path
/// never touched the solver. Strong-branching outcomes default to a gain
/// proportional to the distance to the rounded value; override them with
/// [`set_probe`](MockSolver::set_probe) and inject failures with
/// [`fail_probes`](MockSolver::fail_probes).
pub struct MockSolver {
    stage: Stage,
    problem: MockProblem,
    lp_count: u64,
    candidates: HashMap<CandidateMode, Vec<VarId>>,
    histories: HashMap<VarId, BranchHistory>,
    probes: HashMap<VarId, StrongBranchOutcome>,
    failures: HashMap<VarId, u32>,
    in_strong_branching: bool,
    begun: u32,
    ended: u32,
    probe_calls: u32,
    queries: Cell<u64>,
}

impl MockSolver {
    /// A solver holding `problem`, before solving starts.
    pub fn new(problem: MockProblem) -> Self {
        Self {
            stage: Stage::Problem,
            problem,
            lp_count: 1,
            candidates: HashMap::new(),
            histories: HashMap::new(),
            probes: HashMap::new(),
            failures: HashMap::new(),
            in_strong_branching: false,
            begun: 0,
            ended: 0,
            probe_calls: 0,
            queries: Cell::new(0),
        }
    }

    /// A solver paused at a node of `problem`.
    pub fn at_node(problem: MockProblem) -> Self {
        let mut solver = Self::new(problem);
        solver.start_solving();
        solver
    }

    // ── Scenario setup ─────────────────────────────────────────

    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    /// Move from a fresh problem to the first node.
    pub fn start_solving(&mut self) {
        self.stage = Stage::Solving;
    }

    pub fn set_lp_count(&mut self, n: u64) {
        self.lp_count = n;
    }

    pub fn set_lp_objective(&mut self, value: f64) {
        self.problem.lp_objective = value;
    }

    /// Set the LP value of the column at `pos`.
    pub fn set_lp_value(&mut self, pos: usize, value: f64) {
        self.problem.columns[pos].value = value;
    }

    /// Set the incumbent (and average incumbent) of every column.
    pub fn set_incumbent(&mut self, values: &[f64]) {
        for (col, &v) in self.problem.columns.iter_mut().zip(values) {
            col.incumbent = Some(v);
            col.average_incumbent = Some(v);
        }
    }

    /// Drop trailing LP columns so `lp_columns()` disagrees with
    /// `variables()`.
    pub fn truncate_lp_columns(&mut self, len: usize) {
        self.problem.columns.truncate(len);
    }

    /// Append a constraint (a cut) together with its LP row state.
    pub fn add_constraint(&mut self, record: ConstraintRecord, row: RowState) {
        self.problem.constraints.push(record);
        self.problem.rows.push(row);
    }

    /// Replace the loaded problem, keeping counters.
    pub fn load(&mut self, problem: MockProblem) {
        self.problem = problem;
        self.stage = Stage::Problem;
        self.candidates.clear();
        self.histories.clear();
        self.probes.clear();
        self.failures.clear();
    }

    /// Override the candidate list for `mode`.
    pub fn set_candidates(&mut self, mode: CandidateMode, vars: Vec<VarId>) {
        self.candidates.insert(mode, vars);
    }

    pub fn set_history(&mut self, var: VarId, history: BranchHistory) {
        self.histories.insert(var, history);
    }

    pub fn set_probe(&mut self, var: VarId, outcome: StrongBranchOutcome) {
        self.probes.insert(var, outcome);
    }

    /// Make the next `times` probes of `var` fail with an LP error.
    pub fn fail_probes(&mut self, var: VarId, times: u32) {
        self.failures.insert(var, times);
    }

    // ── Inspection ─────────────────────────────────────────────

    pub fn problem(&self) -> &MockProblem {
        &self.problem
    }

    /// Total number of [`SolverState`] calls made so far.
    pub fn queries(&self) -> u64 {
        self.queries.get()
    }

    pub fn strong_branching_begun(&self) -> u32 {
        self.begun
    }

    pub fn strong_branching_ended(&self) -> u32 {
        self.ended
    }

    pub fn in_strong_branching(&self) -> bool {
        self.in_strong_branching
    }

    pub fn probe_calls(&self) -> u32 {
        self.probe_calls
    }

    // ── Internals ──────────────────────────────────────────────

    fn count(&self) {
        self.queries.set(self.queries.get() + 1);
    }

    fn require(&self, operation: &'static str, ok: bool) -> Result<(), SolverError> {
        if ok {
            Ok(())
        } else {
            Err(SolverError::InvalidStage {
                operation,
                stage: self.stage,
            })
        }
    }

    fn position(&self, var: VarId) -> Result<usize, SolverError> {
        self.problem
            .variables
            .iter()
            .position(|v| v.id == var)
            .ok_or(SolverError::UnknownVariable { var })
    }

    fn derived_candidates(&self, mode: CandidateMode) -> Vec<VarId> {
        self.problem
            .variables
            .iter()
            .zip(&self.problem.columns)
            .filter(|(v, col)| {
                v.var_type.is_integral()
                    && match mode {
                        CandidateMode::Lp => {
                            let frac = col.value - col.value.floor();
                            frac > FRAC_TOL && frac < 1.0 - FRAC_TOL
                        }
                        CandidateMode::Pseudo => v.lower < v.upper,
                    }
            })
            .map(|(v, _)| v.id)
            .collect()
    }

    fn default_probe(&self, pos: usize) -> StrongBranchOutcome {
        let x = self.problem.columns[pos].value;
        let weight = 1.0 + self.problem.variables[pos].objective.abs();
        let base = self.problem.lp_objective;
        let dir = |dist: f64| DirectionOutcome {
            objective: base + dist * weight,
            valid: true,
            infeasible: false,
        };
        StrongBranchOutcome {
            down: dir(x - x.floor()),
            up: dir(x.ceil() - x),
        }
    }
}

impl SolverState for MockSolver {
    fn stage(&self) -> Stage {
        self.count();
        self.stage
    }

    fn variables(&self) -> Result<Vec<VariableRecord>, SolverError> {
        self.count();
        self.require("variables", self.stage.has_problem())?;
        Ok(self.problem.variables.clone())
    }

    fn constraints(&self) -> Result<Vec<ConstraintRecord>, SolverError> {
        self.count();
        self.require("constraints", self.stage.has_problem())?;
        Ok(self.problem.constraints.clone())
    }

    fn lp_columns(&self) -> Result<Vec<ColumnState>, SolverError> {
        self.count();
        self.require("lp_columns", self.stage.at_node())?;
        Ok(self.problem.columns.clone())
    }

    fn lp_rows(&self) -> Result<Vec<RowState>, SolverError> {
        self.count();
        self.require("lp_rows", self.stage.at_node())?;
        Ok(self.problem.rows.clone())
    }

    fn lp_objective(&self) -> Result<f64, SolverError> {
        self.count();
        self.require("lp_objective", self.stage.at_node())?;
        Ok(self.problem.lp_objective)
    }

    fn lp_count(&self) -> u64 {
        self.count();
        self.lp_count
    }

    fn branching_candidates(&self, mode: CandidateMode) -> Result<Vec<VarId>, SolverError> {
        self.count();
        self.require("branching_candidates", self.stage.at_node())?;
        Ok(match self.candidates.get(&mode) {
            Some(vars) => vars.clone(),
            None => self.derived_candidates(mode),
        })
    }

    fn branching_history(&self, var: VarId) -> Result<BranchHistory, SolverError> {
        self.count();
        self.require("branching_history", self.stage.at_node())?;
        self.position(var)?;
        Ok(self.histories.get(&var).cloned().unwrap_or_default())
    }

    fn begin_strong_branching(&mut self) -> Result<(), SolverError> {
        self.count();
        self.require("begin_strong_branching", self.stage.at_node())?;
        self.in_strong_branching = true;
        self.begun += 1;
        Ok(())
    }

    fn strong_branch(&mut self, var: VarId) -> Result<StrongBranchOutcome, SolverError> {
        self.count();
        self.require("strong_branch", self.in_strong_branching)?;
        self.probe_calls += 1;
        let pos = self.position(var)?;
        if let Some(remaining) = self.failures.get_mut(&var) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SolverError::LpFailed {
                    reason: format!("injected failure on {var}"),
                });
            }
        }
        Ok(match self.probes.get(&var) {
            Some(outcome) => *outcome,
            None => self.default_probe(pos),
        })
    }

    fn end_strong_branching(&mut self) -> Result<(), SolverError> {
        self.count();
        self.require("end_strong_branching", self.in_strong_branching)?;
        self.in_strong_branching = false;
        self.ended += 1;
        Ok(())
    }
}
