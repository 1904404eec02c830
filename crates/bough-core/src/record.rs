//! Raw records reported by a solver backend.
//!
//! These are plain data, copied out of the solver on each query. Nothing
//! here borrows solver memory, so records may be kept after the call that
//! produced them returns.

use smallvec::SmallVec;

use crate::id::{ConsId, VarId};

/// Integrality class of a variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarType {
    /// Integer variable with bounds `[0, 1]`.
    Binary,
    /// General integer variable.
    Integer,
    /// Continuous variable the solver has proven to take integral values
    /// in every feasible solution.
    ImplicitInteger,
    /// Continuous variable.
    Continuous,
}

impl VarType {
    /// Whether branching on the variable is meaningful.
    pub fn is_integral(self) -> bool {
        !matches!(self, Self::Continuous)
    }
}

/// Status of a column in the current LP basis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BasisStatus {
    /// Nonbasic at its lower bound.
    Lower,
    /// Basic.
    Basic,
    /// Nonbasic at its upper bound.
    Upper,
    /// Nonbasic free variable at zero.
    Zero,
}

/// Static description of one problem variable.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableRecord {
    /// Stable identity of the variable.
    pub id: VarId,
    /// Integrality class.
    pub var_type: VarType,
    /// Local lower bound (`-inf` when unbounded).
    pub lower: f64,
    /// Local upper bound (`+inf` when unbounded).
    pub upper: f64,
    /// Objective coefficient.
    pub objective: f64,
}

impl VariableRecord {
    /// Whether the lower bound is finite.
    pub fn has_lower_bound(&self) -> bool {
        self.lower.is_finite()
    }

    /// Whether the upper bound is finite.
    pub fn has_upper_bound(&self) -> bool {
        self.upper.is_finite()
    }
}

/// One constraint `lhs <= a·x <= rhs`.
///
/// `entries` hold `(variable position, coefficient)` pairs, where the
/// position indexes the sequence returned by
/// [`SolverState::variables`](crate::SolverState::variables) in the same
/// query window.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintRecord {
    /// Stable identity of the constraint.
    pub id: ConsId,
    /// Left-hand side (`-inf` when absent).
    pub lhs: f64,
    /// Right-hand side (`+inf` when absent).
    pub rhs: f64,
    /// Nonzero coefficients as `(variable position, value)`.
    pub entries: SmallVec<[(usize, f64); 8]>,
}

impl ConstraintRecord {
    /// Euclidean norm of the coefficient row.
    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|&(_, a)| a * a).sum::<f64>().sqrt()
    }

    /// Whether both sides are infinite.
    pub fn is_free(&self) -> bool {
        !self.lhs.is_finite() && !self.rhs.is_finite()
    }

    /// The side used as the row's constant: `rhs` when finite, else `lhs`.
    ///
    /// `None` for a free row.
    pub fn finite_side(&self) -> Option<f64> {
        if self.is_free() {
            None
        } else if self.rhs.is_finite() {
            Some(self.rhs)
        } else {
            Some(self.lhs)
        }
    }
}

/// LP state of one column at the current node.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnState {
    /// Value in the current LP solution.
    pub value: f64,
    /// Reduced cost in the current LP solution.
    pub reduced_cost: f64,
    /// Basis status in the current LP solution.
    pub basis: BasisStatus,
    /// Number of consecutive LPs the column has been out of the basis
    /// with a zero value.
    pub age: u32,
    /// Value in the best known primal solution, if one exists.
    pub incumbent: Option<f64>,
    /// Average value over all primal solutions found so far.
    pub average_incumbent: Option<f64>,
}

/// LP state of one row at the current node.
#[derive(Clone, Debug, PartialEq)]
pub struct RowState {
    /// Row activity `a·x` in the current LP solution.
    pub activity: f64,
    /// Dual value of the row.
    pub dual: f64,
    /// Number of consecutive LPs the row has been non-binding.
    pub age: u32,
}

/// Branching statistics accumulated by the solver for one variable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BranchHistory {
    /// Average objective gain per unit of downward change, if any history.
    pub pseudocost_down: Option<f64>,
    /// Average objective gain per unit of upward change, if any history.
    pub pseudocost_up: Option<f64>,
    /// Number of downward branchings recorded.
    pub count_down: u64,
    /// Number of upward branchings recorded.
    pub count_up: u64,
    /// Number of downward branchings whose child was cut off.
    pub cutoffs_down: u64,
    /// Number of upward branchings whose child was cut off.
    pub cutoffs_up: u64,
}

/// Result of re-solving the LP in one branching direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionOutcome {
    /// LP objective value of the child relaxation.
    pub objective: f64,
    /// Whether `objective` is a valid dual bound (false on iteration limit).
    pub valid: bool,
    /// Whether the child was proven infeasible.
    pub infeasible: bool,
}

/// Result of one strong-branching probe on a candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrongBranchOutcome {
    /// Outcome of the child whose upper bound is tightened.
    pub down: DirectionOutcome,
    /// Outcome of the child whose lower bound is tightened.
    pub up: DirectionOutcome,
}
