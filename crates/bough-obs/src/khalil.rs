//! Candidate features from Khalil et al. (2016), "Learning to Branch in
//! Mixed Integer Programming".
//!
//! One row per pseudo branching candidate. The first
//! [`KhalilFeature::STATIC_COUNT`] columns depend only on the problem and
//! are computed once per episode for every variable; the rest are
//! recomputed at each node from the LP solution and branching history.
//!
//! Statistics over an empty set are 0, as are ratios with a zero
//! denominator.

use indexmap::IndexMap;
use ndarray::{Array2, ArrayViewMut1};

use bough_core::{
    BasisStatus, CandidateMode, ConstraintRecord, ObsError, SolverError, SolverState, VarId,
    VariableRecord,
};

use crate::accessor::{objective_norm, StateAccessor};
use crate::cache::{EpisodeCache, ProblemFingerprint};
use crate::config::AccessorConfig;
use crate::function::{checked, ObservationFunction};
use crate::scores::positions;
use crate::stats::{ratio_or_zero, Summary};

// ── KhalilFeature ──────────────────────────────────────────────────

/// Candidate features, in matrix column order.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KhalilFeature {
    // Static.
    ObjCoef,
    ObjCoefPositivePart,
    ObjCoefNegativePart,
    NRows,
    RowsDegMean,
    RowsDegStddev,
    RowsDegMin,
    RowsDegMax,
    RowsPosCoefsCount,
    RowsPosCoefsMean,
    RowsPosCoefsStddev,
    RowsPosCoefsMin,
    RowsPosCoefsMax,
    RowsNegCoefsCount,
    RowsNegCoefsMean,
    RowsNegCoefsStddev,
    RowsNegCoefsMin,
    RowsNegCoefsMax,
    // Dynamic.
    SolutionValue,
    Slack,
    CeilDist,
    ReducedCost,
    IsBasisLower,
    IsBasisBasic,
    IsBasisUpper,
    IsBasisZero,
    PseudocostUp,
    PseudocostDown,
    PseudocostRatio,
    PseudocostSum,
    PseudocostProduct,
    NCutoffUp,
    NCutoffDown,
    NCutoffUpRatio,
    NCutoffDownRatio,
    RowsDynamicDegMean,
    RowsDynamicDegStddev,
    RowsDynamicDegMin,
    RowsDynamicDegMax,
    CoefPosRhsRatioMin,
    CoefPosRhsRatioMax,
    CoefNegRhsRatioMin,
    CoefNegRhsRatioMax,
    ActiveCoefWeightCount,
    ActiveCoefWeightSum,
    ActiveCoefWeightMean,
    ActiveCoefWeightStddev,
    ActiveCoefWeightMin,
    ActiveCoefWeightMax,
}

impl KhalilFeature {
    /// Number of features.
    pub const COUNT: usize = 49;
    /// Number of leading static features.
    pub const STATIC_COUNT: usize = 18;

    /// Every feature, in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::ObjCoef,
        Self::ObjCoefPositivePart,
        Self::ObjCoefNegativePart,
        Self::NRows,
        Self::RowsDegMean,
        Self::RowsDegStddev,
        Self::RowsDegMin,
        Self::RowsDegMax,
        Self::RowsPosCoefsCount,
        Self::RowsPosCoefsMean,
        Self::RowsPosCoefsStddev,
        Self::RowsPosCoefsMin,
        Self::RowsPosCoefsMax,
        Self::RowsNegCoefsCount,
        Self::RowsNegCoefsMean,
        Self::RowsNegCoefsStddev,
        Self::RowsNegCoefsMin,
        Self::RowsNegCoefsMax,
        Self::SolutionValue,
        Self::Slack,
        Self::CeilDist,
        Self::ReducedCost,
        Self::IsBasisLower,
        Self::IsBasisBasic,
        Self::IsBasisUpper,
        Self::IsBasisZero,
        Self::PseudocostUp,
        Self::PseudocostDown,
        Self::PseudocostRatio,
        Self::PseudocostSum,
        Self::PseudocostProduct,
        Self::NCutoffUp,
        Self::NCutoffDown,
        Self::NCutoffUpRatio,
        Self::NCutoffDownRatio,
        Self::RowsDynamicDegMean,
        Self::RowsDynamicDegStddev,
        Self::RowsDynamicDegMin,
        Self::RowsDynamicDegMax,
        Self::CoefPosRhsRatioMin,
        Self::CoefPosRhsRatioMax,
        Self::CoefNegRhsRatioMin,
        Self::CoefNegRhsRatioMax,
        Self::ActiveCoefWeightCount,
        Self::ActiveCoefWeightSum,
        Self::ActiveCoefWeightMean,
        Self::ActiveCoefWeightStddev,
        Self::ActiveCoefWeightMin,
        Self::ActiveCoefWeightMax,
    ];

    /// Column of this feature in the feature matrix.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether the feature is computed once per episode.
    pub fn is_static(self) -> bool {
        self.index() < Self::STATIC_COUNT
    }

    /// Snake-case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::ObjCoef => "obj_coef",
            Self::ObjCoefPositivePart => "obj_coef_pos_part",
            Self::ObjCoefNegativePart => "obj_coef_neg_part",
            Self::NRows => "n_rows",
            Self::RowsDegMean => "rows_deg_mean",
            Self::RowsDegStddev => "rows_deg_stddev",
            Self::RowsDegMin => "rows_deg_min",
            Self::RowsDegMax => "rows_deg_max",
            Self::RowsPosCoefsCount => "rows_pos_coefs_count",
            Self::RowsPosCoefsMean => "rows_pos_coefs_mean",
            Self::RowsPosCoefsStddev => "rows_pos_coefs_stddev",
            Self::RowsPosCoefsMin => "rows_pos_coefs_min",
            Self::RowsPosCoefsMax => "rows_pos_coefs_max",
            Self::RowsNegCoefsCount => "rows_neg_coefs_count",
            Self::RowsNegCoefsMean => "rows_neg_coefs_mean",
            Self::RowsNegCoefsStddev => "rows_neg_coefs_stddev",
            Self::RowsNegCoefsMin => "rows_neg_coefs_min",
            Self::RowsNegCoefsMax => "rows_neg_coefs_max",
            Self::SolutionValue => "solution_value",
            Self::Slack => "slack",
            Self::CeilDist => "ceil_dist",
            Self::ReducedCost => "reduced_cost",
            Self::IsBasisLower => "is_basis_lower",
            Self::IsBasisBasic => "is_basis_basic",
            Self::IsBasisUpper => "is_basis_upper",
            Self::IsBasisZero => "is_basis_zero",
            Self::PseudocostUp => "pseudocost_up",
            Self::PseudocostDown => "pseudocost_down",
            Self::PseudocostRatio => "pseudocost_ratio",
            Self::PseudocostSum => "pseudocost_sum",
            Self::PseudocostProduct => "pseudocost_product",
            Self::NCutoffUp => "n_cutoff_up",
            Self::NCutoffDown => "n_cutoff_down",
            Self::NCutoffUpRatio => "n_cutoff_up_ratio",
            Self::NCutoffDownRatio => "n_cutoff_down_ratio",
            Self::RowsDynamicDegMean => "rows_dynamic_deg_mean",
            Self::RowsDynamicDegStddev => "rows_dynamic_deg_stddev",
            Self::RowsDynamicDegMin => "rows_dynamic_deg_min",
            Self::RowsDynamicDegMax => "rows_dynamic_deg_max",
            Self::CoefPosRhsRatioMin => "coef_pos_rhs_ratio_min",
            Self::CoefPosRhsRatioMax => "coef_pos_rhs_ratio_max",
            Self::CoefNegRhsRatioMin => "coef_neg_rhs_ratio_min",
            Self::CoefNegRhsRatioMax => "coef_neg_rhs_ratio_max",
            Self::ActiveCoefWeightCount => "active_coef_weight_count",
            Self::ActiveCoefWeightSum => "active_coef_weight_sum",
            Self::ActiveCoefWeightMean => "active_coef_weight_mean",
            Self::ActiveCoefWeightStddev => "active_coef_weight_stddev",
            Self::ActiveCoefWeightMin => "active_coef_weight_min",
            Self::ActiveCoefWeightMax => "active_coef_weight_max",
        }
    }
}

// ── Observation ────────────────────────────────────────────────────

/// Khalil2016 features of the pseudo candidates at one node.
#[derive(Clone, Debug, PartialEq)]
pub struct Khalil2016Obs {
    /// `[candidates.len() × KhalilFeature::COUNT]`.
    pub features: Array2<f64>,
    /// Variable described by each row of `features`.
    pub candidates: Vec<VarId>,
}

// ── Static data ────────────────────────────────────────────────────

/// Problem-only data shared by every node of an episode.
#[derive(Debug)]
struct KhalilStatic {
    positions: IndexMap<VarId, usize>,
    /// `[n_vars × STATIC_COUNT]`.
    features: Array2<f64>,
    /// For each column, its nonzero `(row, coefficient)` pairs.
    columns: Vec<Vec<(usize, f64)>>,
    /// Number of nonzeros of each row.
    row_degree: Vec<usize>,
}

fn put_summary(
    row: &mut ArrayViewMut1<'_, f64>,
    s: &Summary,
    [count, mean, stddev, min, max]: [Option<KhalilFeature>; 5],
) {
    for (feature, value) in [
        (count, s.count as f64),
        (mean, s.mean),
        (stddev, s.stddev),
        (min, s.min),
        (max, s.max),
    ] {
        if let Some(f) = feature {
            row[f.index()] = value;
        }
    }
}

impl KhalilStatic {
    fn build(
        variables: &[VariableRecord],
        constraints: &[ConstraintRecord],
    ) -> Result<Self, ObsError> {
        use KhalilFeature as K;

        let mut columns = vec![Vec::new(); variables.len()];
        let mut row_degree = Vec::with_capacity(constraints.len());
        for (r, cons) in constraints.iter().enumerate() {
            let mut degree = 0;
            for &(pos, a) in &cons.entries {
                if a == 0.0 {
                    continue;
                }
                let column = columns.get_mut(pos).ok_or_else(|| {
                    ObsError::Solver(SolverError::Inconsistent {
                        reason: format!(
                            "constraint {} references column {pos} of {}",
                            cons.id,
                            variables.len()
                        ),
                    })
                })?;
                column.push((r, a));
                degree += 1;
            }
            row_degree.push(degree);
        }

        let mut features = Array2::zeros((variables.len(), KhalilFeature::STATIC_COUNT));
        for ((mut row, var), column) in features.outer_iter_mut().zip(variables).zip(&columns) {
            let c = var.objective;
            row[K::ObjCoef.index()] = c;
            row[K::ObjCoefPositivePart.index()] = c.max(0.0);
            row[K::ObjCoefNegativePart.index()] = c.min(0.0);
            row[K::NRows.index()] = column.len() as f64;

            let degrees = Summary::of(column.iter().map(|&(r, _)| row_degree[r] as f64));
            put_summary(
                &mut row,
                &degrees,
                [
                    None,
                    Some(K::RowsDegMean),
                    Some(K::RowsDegStddev),
                    Some(K::RowsDegMin),
                    Some(K::RowsDegMax),
                ],
            );
            let pos = Summary::of(column.iter().map(|&(_, a)| a).filter(|a| *a > 0.0));
            put_summary(
                &mut row,
                &pos,
                [
                    Some(K::RowsPosCoefsCount),
                    Some(K::RowsPosCoefsMean),
                    Some(K::RowsPosCoefsStddev),
                    Some(K::RowsPosCoefsMin),
                    Some(K::RowsPosCoefsMax),
                ],
            );
            let neg = Summary::of(column.iter().map(|&(_, a)| a).filter(|a| *a < 0.0));
            put_summary(
                &mut row,
                &neg,
                [
                    Some(K::RowsNegCoefsCount),
                    Some(K::RowsNegCoefsMean),
                    Some(K::RowsNegCoefsStddev),
                    Some(K::RowsNegCoefsMin),
                    Some(K::RowsNegCoefsMax),
                ],
            );
        }

        Ok(Self {
            positions: positions(variables),
            features,
            columns,
            row_degree,
        })
    }
}

// ── Khalil2016 ─────────────────────────────────────────────────────

/// Extracts a [`Khalil2016Obs`] at every node.
#[derive(Debug)]
pub struct Khalil2016 {
    config: AccessorConfig,
    cache: EpisodeCache<KhalilStatic>,
}

impl Default for Khalil2016 {
    fn default() -> Self {
        Self {
            config: AccessorConfig::default(),
            cache: EpisodeCache::new("khalil2016"),
        }
    }
}

impl Khalil2016 {
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

impl ObservationFunction for Khalil2016 {
    type Observation = Khalil2016Obs;

    fn name(&self) -> &str {
        "khalil2016"
    }

    fn before_reset(&mut self, solver: &mut dyn SolverState) -> Result<(), ObsError> {
        let acc = StateAccessor::new(solver, &self.config);
        acc.require_fresh("before_reset")?;
        let variables = acc.variable_records()?;
        let constraints = acc.constraint_records()?;
        let fingerprint = ProblemFingerprint::of(&variables, &constraints);
        self.cache
            .rebuild(fingerprint, || KhalilStatic::build(&variables, &constraints))?;
        Ok(())
    }

    fn extract(
        &mut self,
        solver: &mut dyn SolverState,
        done: bool,
    ) -> Result<Option<Khalil2016Obs>, ObsError> {
        use KhalilFeature as K;

        if done {
            return Ok(None);
        }
        let acc = StateAccessor::new(solver, &self.config);
        acc.require_node("extract")?;
        let variables = acc.variable_records()?;
        let constraints = acc.constraint_records()?;
        let fingerprint = ProblemFingerprint::of(&variables, &constraints);
        let statics = self
            .cache
            .get_or_build(fingerprint, || KhalilStatic::build(&variables, &constraints))?;

        let columns = acc.column_states(&variables)?;
        let tight: Vec<bool> = acc
            .constraint_views(&variables, &constraints, objective_norm(&variables))?
            .iter()
            .map(|c| c.is_tight)
            .collect();
        let candidates = acc.branching_candidates(CandidateMode::Pseudo)?;

        let mut features = Array2::zeros((candidates.len(), KhalilFeature::COUNT));
        for (mut row, &var) in features.outer_iter_mut().zip(&candidates) {
            let pos = *statics
                .positions
                .get(&var)
                .ok_or(ObsError::Solver(SolverError::UnknownVariable { var }))?;
            for (dst, src) in row.iter_mut().zip(statics.features.row(pos)) {
                *dst = *src;
            }

            let col = &columns[pos];
            let x = col.value;
            row[K::SolutionValue.index()] = x;
            row[K::Slack.index()] = (x - x.floor()).min(x.ceil() - x);
            row[K::CeilDist.index()] = x.ceil() - x;
            row[K::ReducedCost.index()] = col.reduced_cost;
            let basis = match col.basis {
                BasisStatus::Lower => K::IsBasisLower,
                BasisStatus::Basic => K::IsBasisBasic,
                BasisStatus::Upper => K::IsBasisUpper,
                BasisStatus::Zero => K::IsBasisZero,
            };
            row[basis.index()] = 1.0;

            let history = acc.branching_history(var)?;
            let up = history.pseudocost_up.unwrap_or(0.0);
            let down = history.pseudocost_down.unwrap_or(0.0);
            row[K::PseudocostUp.index()] = up;
            row[K::PseudocostDown.index()] = down;
            row[K::PseudocostRatio.index()] = ratio_or_zero(up.min(down), up.max(down));
            row[K::PseudocostSum.index()] = up + down;
            row[K::PseudocostProduct.index()] = up * down;
            let cutoffs_up = history.cutoffs_up as f64;
            let cutoffs_down = history.cutoffs_down as f64;
            row[K::NCutoffUp.index()] = cutoffs_up;
            row[K::NCutoffDown.index()] = cutoffs_down;
            row[K::NCutoffUpRatio.index()] = ratio_or_zero(cutoffs_up, history.count_up as f64);
            row[K::NCutoffDownRatio.index()] =
                ratio_or_zero(cutoffs_down, history.count_down as f64);

            let column = &statics.columns[pos];
            let dynamic_deg = Summary::of(
                column
                    .iter()
                    .filter(|&&(r, _)| !tight[r])
                    .map(|&(r, _)| statics.row_degree[r] as f64),
            );
            put_summary(
                &mut row,
                &dynamic_deg,
                [
                    None,
                    Some(K::RowsDynamicDegMean),
                    Some(K::RowsDynamicDegStddev),
                    Some(K::RowsDynamicDegMin),
                    Some(K::RowsDynamicDegMax),
                ],
            );

            let side_ratios = |positive: bool| {
                Summary::of(column.iter().filter_map(|&(r, a)| {
                    let b = constraints[r].finite_side()?;
                    let keep = if positive { b > 0.0 } else { b < 0.0 };
                    keep.then(|| a / b)
                }))
            };
            let pos_ratio = side_ratios(true);
            row[K::CoefPosRhsRatioMin.index()] = pos_ratio.min;
            row[K::CoefPosRhsRatioMax.index()] = pos_ratio.max;
            let neg_ratio = side_ratios(false);
            row[K::CoefNegRhsRatioMin.index()] = neg_ratio.min;
            row[K::CoefNegRhsRatioMax.index()] = neg_ratio.max;

            let weights = Summary::of(column.iter().filter(|&&(r, _)| tight[r]).map(|&(r, a)| {
                let row_abs: f64 = constraints[r].entries.iter().map(|&(_, v)| v.abs()).sum();
                ratio_or_zero(a, row_abs)
            }));
            row[K::ActiveCoefWeightCount.index()] = weights.count as f64;
            row[K::ActiveCoefWeightSum.index()] = weights.sum;
            row[K::ActiveCoefWeightMean.index()] = weights.mean;
            row[K::ActiveCoefWeightStddev.index()] = weights.stddev;
            row[K::ActiveCoefWeightMin.index()] = weights.min;
            row[K::ActiveCoefWeightMax.index()] = weights.max;
        }

        Ok(Some(Khalil2016Obs {
            features,
            candidates,
        }))
    }
}
