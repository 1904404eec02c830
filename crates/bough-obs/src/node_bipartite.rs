//! Bipartite variable/constraint graph observation.
//!
//! The node state is encoded as a bipartite graph: one node per variable
//! (column features), one node per constraint (row features), and an edge
//! for every nonzero constraint coefficient. Dimensions follow the current
//! problem and are recomputed at every node, so cuts added during the
//! search show up as extra rows.

use ndarray::Array2;

use bough_core::{
    BasisStatus, ConstraintRecord, ObsError, SolverState, SparseMatrix, VarType, VariableRecord,
};

use crate::accessor::{coefficient_matrix, objective_norm, StateAccessor};
use crate::cache::{EpisodeCache, ProblemFingerprint};
use crate::config::AccessorConfig;
use crate::function::{checked, ObservationFunction};

// ── Feature enums ──────────────────────────────────────────────────

/// Column (variable) features, in matrix column order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnFeature {
    /// 1 if the lower bound is finite.
    HasLowerBound,
    /// 1 if the upper bound is finite.
    HasUpperBound,
    /// Reduced cost over the objective norm.
    NormedReducedCost,
    /// Objective coefficient over the objective norm.
    Objective,
    /// LP solution value.
    SolutionValue,
    /// Fractional part of the LP value.
    SolutionFrac,
    /// 1 if the LP value is at the lower bound.
    IsSolutionAtLowerBound,
    /// 1 if the LP value is at the upper bound.
    IsSolutionAtUpperBound,
    /// Column age over LP count.
    ScaledAge,
    /// Basis status one-hot.
    IsBasisLower,
    /// Basis status one-hot.
    IsBasisBasic,
    /// Basis status one-hot.
    IsBasisUpper,
    /// Basis status one-hot.
    IsBasisZero,
    /// Value in the incumbent; NaN without one.
    IncumbentValue,
    /// Average primal solution value; NaN without one.
    AverageIncumbentValue,
    /// Type one-hot.
    IsTypeBinary,
    /// Type one-hot.
    IsTypeInteger,
    /// Type one-hot.
    IsTypeImplicitInteger,
    /// Type one-hot.
    IsTypeContinuous,
}

impl ColumnFeature {
    /// Number of column features.
    pub const COUNT: usize = 19;

    /// Every feature, in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::HasLowerBound,
        Self::HasUpperBound,
        Self::NormedReducedCost,
        Self::Objective,
        Self::SolutionValue,
        Self::SolutionFrac,
        Self::IsSolutionAtLowerBound,
        Self::IsSolutionAtUpperBound,
        Self::ScaledAge,
        Self::IsBasisLower,
        Self::IsBasisBasic,
        Self::IsBasisUpper,
        Self::IsBasisZero,
        Self::IncumbentValue,
        Self::AverageIncumbentValue,
        Self::IsTypeBinary,
        Self::IsTypeInteger,
        Self::IsTypeImplicitInteger,
        Self::IsTypeContinuous,
    ];

    /// Column of this feature in `column_features`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Snake-case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::HasLowerBound => "has_lower_bound",
            Self::HasUpperBound => "has_upper_bound",
            Self::NormedReducedCost => "normed_reduced_cost",
            Self::Objective => "objective",
            Self::SolutionValue => "solution_value",
            Self::SolutionFrac => "solution_frac",
            Self::IsSolutionAtLowerBound => "is_solution_at_lower_bound",
            Self::IsSolutionAtUpperBound => "is_solution_at_upper_bound",
            Self::ScaledAge => "scaled_age",
            Self::IsBasisLower => "is_basis_lower",
            Self::IsBasisBasic => "is_basis_basic",
            Self::IsBasisUpper => "is_basis_upper",
            Self::IsBasisZero => "is_basis_zero",
            Self::IncumbentValue => "incumbent_value",
            Self::AverageIncumbentValue => "average_incumbent_value",
            Self::IsTypeBinary => "is_type_binary",
            Self::IsTypeInteger => "is_type_integer",
            Self::IsTypeImplicitInteger => "is_type_implicit_integer",
            Self::IsTypeContinuous => "is_type_continuous",
        }
    }
}

/// Row (constraint) features, in matrix column order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowFeature {
    /// Finite side over the row norm.
    Bias,
    /// 1 if the row is tight in the LP solution.
    IsTight,
    /// Row age over LP count.
    ScaledAge,
    /// Cosine similarity with the objective.
    ObjectiveCosineSimilarity,
    /// Dual value over row norm times objective norm.
    DualSolutionValue,
}

impl RowFeature {
    /// Number of row features.
    pub const COUNT: usize = 5;

    /// Every feature, in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Bias,
        Self::IsTight,
        Self::ScaledAge,
        Self::ObjectiveCosineSimilarity,
        Self::DualSolutionValue,
    ];

    /// Column of this feature in `row_features`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Snake-case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bias => "bias",
            Self::IsTight => "is_tight",
            Self::ScaledAge => "scaled_age",
            Self::ObjectiveCosineSimilarity => "objective_cosine_similarity",
            Self::DualSolutionValue => "dual_solution_value",
        }
    }
}

// ── Observation ────────────────────────────────────────────────────

/// Bipartite graph observation of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeBipartiteObs {
    /// `[n_vars × ColumnFeature::COUNT]`.
    pub column_features: Array2<f64>,
    /// `[n_constraints × RowFeature::COUNT]`.
    pub row_features: Array2<f64>,
    /// Constraint coefficients, shape `(n_constraints, n_vars)`.
    pub edge_features: SparseMatrix<f64>,
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Data that depends only on the problem structure.
#[derive(Debug)]
struct BipartiteStatic {
    objective_norm: f64,
    /// Column features with the static columns filled, dynamic columns 0.
    column_template: Array2<f64>,
    edges: SparseMatrix<f64>,
}

impl BipartiteStatic {
    fn build(
        variables: &[VariableRecord],
        constraints: &[ConstraintRecord],
    ) -> Result<Self, ObsError> {
        let objective_norm = objective_norm(variables);
        let mut column_template = Array2::zeros((variables.len(), ColumnFeature::COUNT));
        for (mut row, var) in column_template.outer_iter_mut().zip(variables) {
            row[ColumnFeature::Objective.index()] = var.objective / objective_norm;
            let type_feature = match var.var_type {
                VarType::Binary => ColumnFeature::IsTypeBinary,
                VarType::Integer => ColumnFeature::IsTypeInteger,
                VarType::ImplicitInteger => ColumnFeature::IsTypeImplicitInteger,
                VarType::Continuous => ColumnFeature::IsTypeContinuous,
            };
            row[type_feature.index()] = 1.0;
        }
        Ok(Self {
            objective_norm,
            column_template,
            edges: coefficient_matrix(variables.len(), constraints)?,
        })
    }
}

// ── NodeBipartite ──────────────────────────────────────────────────

/// Extracts a [`NodeBipartiteObs`] at every node.
#[derive(Debug)]
pub struct NodeBipartite {
    config: AccessorConfig,
    cache: EpisodeCache<BipartiteStatic>,
}

impl Default for NodeBipartite {
    fn default() -> Self {
        Self {
            config: AccessorConfig::default(),
            cache: EpisodeCache::new("node_bipartite"),
        }
    }
}

impl NodeBipartite {
    /// With default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// With custom tolerances.
    pub fn with_config(config: AccessorConfig) -> Result<Self, ObsError> {
        Ok(Self {
            config: checked(config)?,
            ..Self::default()
        })
    }

    /// Whether the per-episode cache has been built.
    pub fn is_ready(&self) -> bool {
        self.cache.is_built()
    }

    /// Number of cache builds so far.
    pub fn cache_builds(&self) -> u64 {
        self.cache.builds()
    }
}

impl ObservationFunction for NodeBipartite {
    type Observation = NodeBipartiteObs;

    fn name(&self) -> &str {
        "node_bipartite"
    }

    fn before_reset(&mut self, solver: &mut dyn SolverState) -> Result<(), ObsError> {
        let acc = StateAccessor::new(solver, &self.config);
        acc.require_fresh("before_reset")?;
        let variables = acc.variable_records()?;
        let constraints = acc.constraint_records()?;
        let fingerprint = ProblemFingerprint::of(&variables, &constraints);
        self.cache.rebuild(fingerprint, || {
            BipartiteStatic::build(&variables, &constraints)
        })?;
        Ok(())
    }

    fn extract(
        &mut self,
        solver: &mut dyn SolverState,
        done: bool,
    ) -> Result<Option<NodeBipartiteObs>, ObsError> {
        if done {
            return Ok(None);
        }
        let acc = StateAccessor::new(solver, &self.config);
        acc.require_node("extract")?;
        let variables = acc.variable_records()?;
        let constraints = acc.constraint_records()?;
        let fingerprint = ProblemFingerprint::of(&variables, &constraints);
        let statics = self.cache.get_or_build(fingerprint, || {
            BipartiteStatic::build(&variables, &constraints)
        })?;

        let var_views = acc.variable_views(&variables, statics.objective_norm)?;
        let mut column_features = statics.column_template.clone();
        for (mut row, v) in column_features.outer_iter_mut().zip(&var_views) {
            row[ColumnFeature::HasLowerBound.index()] = flag(v.has_lower_bound);
            row[ColumnFeature::HasUpperBound.index()] = flag(v.has_upper_bound);
            row[ColumnFeature::NormedReducedCost.index()] = v.normed_reduced_cost;
            row[ColumnFeature::SolutionValue.index()] = v.solution_value;
            row[ColumnFeature::SolutionFrac.index()] = v.solution_frac;
            row[ColumnFeature::IsSolutionAtLowerBound.index()] = flag(v.at_lower_bound);
            row[ColumnFeature::IsSolutionAtUpperBound.index()] = flag(v.at_upper_bound);
            row[ColumnFeature::ScaledAge.index()] = v.scaled_age;
            let basis_feature = match v.basis {
                BasisStatus::Lower => ColumnFeature::IsBasisLower,
                BasisStatus::Basic => ColumnFeature::IsBasisBasic,
                BasisStatus::Upper => ColumnFeature::IsBasisUpper,
                BasisStatus::Zero => ColumnFeature::IsBasisZero,
            };
            row[basis_feature.index()] = 1.0;
            row[ColumnFeature::IncumbentValue.index()] = v.incumbent.unwrap_or(f64::NAN);
            row[ColumnFeature::AverageIncumbentValue.index()] =
                v.average_incumbent.unwrap_or(f64::NAN);
        }

        let cons_views = acc.constraint_views(&variables, &constraints, statics.objective_norm)?;
        let mut row_features = Array2::zeros((cons_views.len(), RowFeature::COUNT));
        for (mut row, c) in row_features.outer_iter_mut().zip(&cons_views) {
            row[RowFeature::Bias.index()] = c.bias;
            row[RowFeature::IsTight.index()] = flag(c.is_tight);
            row[RowFeature::ScaledAge.index()] = c.scaled_age;
            row[RowFeature::ObjectiveCosineSimilarity.index()] = c.objective_cosine_similarity;
            row[RowFeature::DualSolutionValue.index()] = c.normed_dual;
        }

        Ok(Some(NodeBipartiteObs {
            column_features,
            row_features,
            edge_features: statics.edges.clone(),
        }))
    }
}
