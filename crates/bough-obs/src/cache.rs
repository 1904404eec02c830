//! Episode cache with problem-structure-based invalidation.
//!
//! [`EpisodeCache`] holds data an observation function derives once per
//! episode from the static problem (objective norm, edge matrix, Khalil
//! static features). Every lookup carries the current
//! [`ProblemFingerprint`]; on mismatch the data is rebuilt before use, so
//! a stale cache is never served.
//!
//! The fingerprint keys on the problem data the static part is derived
//! from (identities, variable types, objective, row sides and
//! coefficients), never on per-node LP state or bounds. A cache built in
//! `before_reset` survives every node of the episode until presolve
//! rewrites the problem, cuts are added, or the problem is swapped.

use bough_core::{ConstraintRecord, ObsError, VarType, VariableRecord};
use log::debug;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

#[inline]
fn fnv1a_u32(hash: u64, v: u32) -> u64 {
    fnv1a_bytes(hash, &v.to_le_bytes())
}

#[inline]
fn fnv1a_u64(hash: u64, v: u64) -> u64 {
    fnv1a_bytes(hash, &v.to_le_bytes())
}

#[inline]
fn fnv1a_f64(hash: u64, v: f64) -> u64 {
    fnv1a_u64(hash, v.to_bits())
}

fn type_tag(t: VarType) -> u32 {
    match t {
        VarType::Binary => 0,
        VarType::Integer => 1,
        VarType::ImplicitInteger => 2,
        VarType::Continuous => 3,
    }
}

fn digest_variable(hash: u64, v: &VariableRecord) -> u64 {
    let hash = fnv1a_u32(hash, v.id.0);
    let hash = fnv1a_u32(hash, type_tag(v.var_type));
    fnv1a_f64(hash, v.objective)
}

fn digest_constraint(hash: u64, c: &ConstraintRecord) -> u64 {
    let hash = fnv1a_u32(hash, c.id.0);
    let hash = fnv1a_f64(hash, c.lhs);
    let hash = fnv1a_f64(hash, c.rhs);
    let hash = fnv1a_u64(hash, c.entries.len() as u64);
    c.entries.iter().fold(hash, |h, &(pos, coef)| {
        fnv1a_f64(fnv1a_u64(h, pos as u64), coef)
    })
}

/// Identity of the static problem data, cheap to recompute per node.
///
/// Bitwise on floats: `0.0` and `-0.0` fingerprint differently, and a
/// NaN coefficient matches only the same NaN payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProblemFingerprint {
    n_vars: usize,
    var_digest: u64,
    n_cons: usize,
    cons_digest: u64,
    nnz: usize,
}

impl ProblemFingerprint {
    /// Fingerprint of the given records, order-sensitive.
    pub fn of(variables: &[VariableRecord], constraints: &[ConstraintRecord]) -> Self {
        let var_digest = variables.iter().fold(FNV_OFFSET, digest_variable);
        let cons_digest = constraints.iter().fold(FNV_OFFSET, digest_constraint);
        Self {
            n_vars: variables.len(),
            var_digest,
            n_cons: constraints.len(),
            cons_digest,
            nnz: constraints.iter().map(|c| c.entries.len()).sum(),
        }
    }

    /// Number of variables.
    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    /// Number of constraints.
    pub fn n_cons(&self) -> usize {
        self.n_cons
    }
}

#[derive(Debug)]
struct Cached<T> {
    data: T,
    fingerprint: ProblemFingerprint,
}

/// Per-episode cache of problem-derived data.
///
/// Empty until the first [`rebuild`](Self::rebuild) or
/// [`get_or_build`](Self::get_or_build); an empty cache is the
/// uninitialized state of its owning observation function.
#[derive(Debug)]
pub struct EpisodeCache<T> {
    label: &'static str,
    cached: Option<Cached<T>>,
    builds: u64,
}

impl<T> EpisodeCache<T> {
    /// An empty cache; `label` names it in log output.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            cached: None,
            builds: 0,
        }
    }

    /// Whether data has been built.
    pub fn is_built(&self) -> bool {
        self.cached.is_some()
    }

    /// Number of times the data has been (re)built.
    pub fn builds(&self) -> u64 {
        self.builds
    }

    /// Drop the cached data.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Build unconditionally, replacing whatever was cached.
    pub fn rebuild<F>(&mut self, fingerprint: ProblemFingerprint, build: F) -> Result<&T, ObsError>
    where
        F: FnOnce() -> Result<T, ObsError>,
    {
        self.invalidate();
        self.get_or_build(fingerprint, build)
    }

    /// Return the cached data if it matches `fingerprint`, else rebuild.
    ///
    /// A failed build leaves the cache empty.
    pub fn get_or_build<F>(
        &mut self,
        fingerprint: ProblemFingerprint,
        build: F,
    ) -> Result<&T, ObsError>
    where
        F: FnOnce() -> Result<T, ObsError>,
    {
        let cached = match self.cached.take() {
            Some(c) if c.fingerprint == fingerprint => c,
            stale => {
                match stale {
                    Some(old) => debug!(
                        "{}: problem changed ({}x{} -> {}x{}), rebuilding",
                        self.label,
                        old.fingerprint.n_cons(),
                        old.fingerprint.n_vars(),
                        fingerprint.n_cons(),
                        fingerprint.n_vars()
                    ),
                    None => debug!(
                        "{}: building for {} constraints x {} variables",
                        self.label,
                        fingerprint.n_cons(),
                        fingerprint.n_vars()
                    ),
                }
                let data = build()?;
                self.builds += 1;
                Cached { data, fingerprint }
            }
        };
        Ok(&self.cached.insert(cached).data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bough_core::{ConsId, SolverError, VarId, VarType};

    fn var(id: u32) -> VariableRecord {
        VariableRecord {
            id: VarId(id),
            var_type: VarType::Binary,
            lower: 0.0,
            upper: 1.0,
            objective: 1.0,
        }
    }

    fn cons(id: u32, cols: &[usize]) -> ConstraintRecord {
        ConstraintRecord {
            id: ConsId(id),
            lhs: f64::NEG_INFINITY,
            rhs: 1.0,
            entries: cols.iter().map(|&c| (c, 1.0)).collect(),
        }
    }

    fn fp(vars: &[u32], conss: &[(u32, &[usize])]) -> ProblemFingerprint {
        let v: Vec<_> = vars.iter().map(|&i| var(i)).collect();
        let c: Vec<_> = conss.iter().map(|&(i, cols)| cons(i, cols)).collect();
        ProblemFingerprint::of(&v, &c)
    }

    #[test]
    fn fingerprint_tracks_structure() {
        let base = fp(&[0, 1], &[(0, &[0, 1])]);
        assert_eq!(base, fp(&[0, 1], &[(0, &[0, 1])]));
        assert_ne!(base, fp(&[1, 0], &[(0, &[0, 1])]));
        assert_ne!(base, fp(&[0, 1], &[(0, &[0, 1]), (1, &[1])]));
        assert_ne!(base, fp(&[0, 1], &[(3, &[0, 1])]));
        assert_ne!(base, fp(&[0, 1], &[(0, &[0])]));
        assert_eq!(base.n_vars(), 2);
        assert_eq!(base.n_cons(), 1);
    }

    #[test]
    fn fingerprint_tracks_problem_data_under_same_ids() {
        let vars = vec![var(0), var(1)];
        let conss = vec![cons(0, &[0, 1])];
        let base = ProblemFingerprint::of(&vars, &conss);

        let mut coef = conss.clone();
        coef[0].entries[0].1 = 7.0;
        assert_ne!(base, ProblemFingerprint::of(&vars, &coef));

        let mut moved = conss.clone();
        moved[0].entries[0].0 = 1;
        moved[0].entries[1].0 = 0;
        assert_ne!(base, ProblemFingerprint::of(&vars, &moved));

        let mut side = conss.clone();
        side[0].rhs = 2.0;
        assert_ne!(base, ProblemFingerprint::of(&vars, &side));

        let mut obj = vars.clone();
        obj[0].objective = 100.0;
        assert_ne!(base, ProblemFingerprint::of(&obj, &conss));

        let mut ty = vars.clone();
        ty[1].var_type = VarType::Integer;
        assert_ne!(base, ProblemFingerprint::of(&ty, &conss));
    }

    #[test]
    fn fingerprint_ignores_bounds() {
        let vars = vec![var(0), var(1)];
        let mut tightened = vars.clone();
        tightened[0].upper = 0.0;
        assert_eq!(
            ProblemFingerprint::of(&vars, &[]),
            ProblemFingerprint::of(&tightened, &[])
        );
    }

    #[test]
    fn empty_cache_is_not_built() {
        let cache: EpisodeCache<u32> = EpisodeCache::new("test");
        assert!(!cache.is_built());
        assert_eq!(cache.builds(), 0);
    }

    #[test]
    fn same_fingerprint_reuses_data() {
        let mut cache = EpisodeCache::new("test");
        let f = fp(&[0], &[]);
        assert_eq!(*cache.get_or_build(f, || Ok(7)).unwrap(), 7);
        assert_eq!(*cache.get_or_build(f, || Ok(8)).unwrap(), 7);
        assert_eq!(cache.builds(), 1);
    }

    #[test]
    fn fingerprint_mismatch_rebuilds() {
        let mut cache = EpisodeCache::new("test");
        cache.get_or_build(fp(&[0], &[]), || Ok(1)).unwrap();
        let v = *cache.get_or_build(fp(&[0, 1], &[]), || Ok(2)).unwrap();
        assert_eq!(v, 2);
        assert_eq!(cache.builds(), 2);
    }

    #[test]
    fn rebuild_is_unconditional() {
        let mut cache = EpisodeCache::new("test");
        let f = fp(&[0], &[]);
        cache.rebuild(f, || Ok(1)).unwrap();
        assert_eq!(*cache.rebuild(f, || Ok(2)).unwrap(), 2);
    }

    #[test]
    fn failed_build_leaves_cache_empty() {
        let mut cache: EpisodeCache<u32> = EpisodeCache::new("test");
        let f = fp(&[0], &[]);
        cache.get_or_build(f, || Ok(1)).unwrap();
        let err = cache
            .rebuild(f, || {
                Err(ObsError::Solver(SolverError::LpFailed {
                    reason: "x".into(),
                }))
            })
            .unwrap_err();
        assert!(matches!(err, ObsError::Solver(_)));
        assert!(!cache.is_built());
    }

    #[test]
    fn invalidate_forces_rebuild() {
        let mut cache = EpisodeCache::new("test");
        let f = fp(&[0], &[]);
        cache.get_or_build(f, || Ok(1)).unwrap();
        cache.invalidate();
        assert_eq!(*cache.get_or_build(f, || Ok(2)).unwrap(), 2);
    }
}
