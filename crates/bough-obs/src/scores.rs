//! Per-candidate scores and their dense flattening.
//!
//! Scores are produced as an [`IndexMap`] from candidate to
//! `Result<f64, Unavailable>`, preserving candidate order. Only at the
//! observation boundary does [`scores_to_dense`] turn them into a
//! full-length vector where every non-candidate and every unavailable
//! score is NaN.

use indexmap::IndexMap;
use ndarray::Array1;

use bough_core::{ObsError, SolverError, Unavailable, VarId, VariableRecord};

/// Scores keyed by candidate, in candidate order.
pub type CandidateScores = IndexMap<VarId, Result<f64, Unavailable>>;

/// Combine two directional gains into one score.
///
/// Each gain is floored at `epsilon` before multiplying, so a candidate
/// with no gain in one direction still ranks by the other.
pub fn product_score(down: f64, up: f64, epsilon: f64) -> f64 {
    down.max(epsilon) * up.max(epsilon)
}

/// Column position of every variable, keyed by id.
pub fn positions(variables: &[VariableRecord]) -> IndexMap<VarId, usize> {
    variables
        .iter()
        .enumerate()
        .map(|(pos, v)| (v.id, pos))
        .collect()
}

/// Flatten candidate scores to a vector of length `positions.len()`.
///
/// A candidate missing from `positions` means the solver reported a
/// candidate that is not one of its variables; that is an error rather
/// than a silently dropped score.
pub fn scores_to_dense(
    positions: &IndexMap<VarId, usize>,
    scores: &CandidateScores,
) -> Result<Array1<f64>, ObsError> {
    let mut dense = Array1::from_elem(positions.len(), f64::NAN);
    for (var, score) in scores {
        let pos = *positions
            .get(var)
            .ok_or(ObsError::Solver(SolverError::UnknownVariable { var: *var }))?;
        if let Ok(value) = score {
            dense[pos] = *value;
        }
    }
    Ok(dense)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bough_core::VarType;

    fn vars(ids: &[u32]) -> Vec<VariableRecord> {
        ids.iter()
            .map(|&i| VariableRecord {
                id: VarId(i),
                var_type: VarType::Integer,
                lower: 0.0,
                upper: 10.0,
                objective: 1.0,
            })
            .collect()
    }

    #[test]
    fn product_score_floors_each_side() {
        assert_eq!(product_score(2.0, 3.0, 1e-6), 6.0);
        assert_eq!(product_score(0.0, 4.0, 0.5), 2.0);
        assert_eq!(product_score(-1.0, -1.0, 0.1), 0.1 * 0.1);
    }

    #[test]
    fn dense_scores_are_nan_outside_candidates() {
        let pos = positions(&vars(&[7, 3, 9]));
        let mut scores = CandidateScores::new();
        scores.insert(VarId(9), Ok(1.5));
        scores.insert(VarId(7), Err(Unavailable::NoHistory));

        let dense = scores_to_dense(&pos, &scores).unwrap();
        assert_eq!(dense.len(), 3);
        assert!(dense[0].is_nan());
        assert!(dense[1].is_nan());
        assert_eq!(dense[2], 1.5);
    }

    #[test]
    fn unknown_candidate_is_an_error() {
        let pos = positions(&vars(&[0]));
        let mut scores = CandidateScores::new();
        scores.insert(VarId(4), Ok(1.0));
        assert_eq!(
            scores_to_dense(&pos, &scores),
            Err(ObsError::Solver(SolverError::UnknownVariable { var: VarId(4) }))
        );
    }
}
