//! Strongly-typed identifiers for solver variables and constraints.

use std::fmt;

/// Identifies a variable of the problem being solved.
///
/// A `VarId` is stable for the lifetime of the variable inside one
/// episode: the solver never reuses an id for a different variable, and
/// the objective coefficient and type behind an id do not change. Cached
/// per-episode data is keyed on these ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u32);

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<u32> for VarId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a constraint (LP row) of the problem being solved.
///
/// Like [`VarId`], a `ConsId` is never reused within an episode and the
/// coefficient row behind it is immutable. Cuts added during the search
/// receive fresh ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsId(pub u32);

impl fmt::Display for ConsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ConsId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_kind() {
        assert_eq!(VarId(3).to_string(), "x3");
        assert_eq!(ConsId(0).to_string(), "c0");
    }

    #[test]
    fn ordering_follows_raw_index() {
        let mut ids = vec![VarId(2), VarId(0), VarId(1)];
        ids.sort();
        assert_eq!(ids, vec![VarId(0), VarId(1), VarId(2)]);
        assert_eq!(VarId::from(7), VarId(7));
    }
}
