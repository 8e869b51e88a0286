//! Token validity windows.
//!
//! A token carries an optional `nbf` (first second it is valid) and an
//! optional `exp` (first second it is no longer valid). [`TimeRange`] holds
//! both as [`Bound`]s, so a chain of tokens can be narrowed to the window in
//! which all of them hold.

use std::{
    fmt,
    ops::{Bound, RangeBounds},
};

use serde::{Deserialize, Serialize};

/// Whole seconds since the unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Wrap unix seconds.
    pub const fn from_unix(seconds: u64) -> Self {
        Self(seconds)
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        Self(cairn_common::time::unix_now())
    }

    /// Unix seconds.
    pub const fn to_unix(self) -> u64 {
        self.0
    }

    /// This time shifted `seconds` into the future, saturating.
    #[must_use]
    pub const fn after(self, seconds: u64) -> Self {
        Self(self.0.saturating_add(seconds))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a builder picks the expiration of the token it issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    /// The configured default lifetime from the moment of signing.
    #[default]
    Default,
    /// A fixed number of seconds from the moment of signing.
    Seconds(u64),
    /// A fixed expiration.
    Until(Timestamp),
    /// No expiration.
    Unbounded,
}

impl Lifetime {
    /// The expiration of a token signed at `now`.
    pub fn expiration(self, now: Timestamp, default_lifetime: u64) -> Option<Timestamp> {
        match self {
            Self::Default => Some(now.after(default_lifetime)),
            Self::Seconds(seconds) => Some(now.after(seconds)),
            Self::Until(expiration) => Some(expiration),
            Self::Unbounded => None,
        }
    }
}

/// Where a time falls relative to a [`TimeRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    /// Inside the range.
    Valid,
    /// Before the lower bound.
    NotYetValid(Timestamp),
    /// At or past the upper bound.
    Expired(Timestamp),
}

/// The window a token, or a chain of tokens, is valid in.
///
/// `not_before` is included and `expiration` is excluded: a token whose
/// `exp` equals the current second has already expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Earliest valid second.
    pub not_before: Bound<Timestamp>,

    /// First second past the window.
    pub expiration: Bound<Timestamp>,
}

impl TimeRange {
    /// No constraints.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            not_before: Bound::Unbounded,
            expiration: Bound::Unbounded,
        }
    }

    /// Window from a token's optional `nbf` and `exp`.
    #[must_use]
    pub const fn new(not_before: Option<Timestamp>, expiration: Option<Timestamp>) -> Self {
        Self {
            not_before: match not_before {
                Some(t) => Bound::Included(t),
                None => Bound::Unbounded,
            },
            expiration: match expiration {
                Some(t) => Bound::Excluded(t),
                None => Bound::Unbounded,
            },
        }
    }

    /// Classify `now` against the window. Expiry is reported first when a
    /// window is both.
    pub fn check(&self, now: Timestamp) -> Validity {
        match self.expiration {
            Bound::Excluded(exp) if now >= exp => return Validity::Expired(exp),
            Bound::Included(exp) if now > exp => return Validity::Expired(exp),
            _ => {}
        }
        match self.not_before {
            Bound::Included(nbf) if now < nbf => Validity::NotYetValid(nbf),
            Bound::Excluded(nbf) if now <= nbf => Validity::NotYetValid(nbf),
            _ => Validity::Valid,
        }
    }

    /// Returns `true` if some second lies in the window.
    #[must_use]
    pub fn is_satisfiable(&self) -> bool {
        match (self.not_before, self.expiration) {
            (Bound::Included(nbf), Bound::Excluded(exp)) => nbf < exp,
            (Bound::Included(nbf), Bound::Included(exp)) => nbf <= exp,
            (Bound::Excluded(nbf), Bound::Excluded(exp)) => nbf.after(1) < exp,
            (Bound::Excluded(nbf), Bound::Included(exp)) => nbf < exp,
            _ => true,
        }
    }

    /// The window in which both `self` and `other` hold: the later lower
    /// bound and the earlier upper bound.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        Self {
            not_before: later(self.not_before, other.not_before),
            expiration: earlier(self.expiration, other.expiration),
        }
    }
}

fn later(a: Bound<Timestamp>, b: Bound<Timestamp>) -> Bound<Timestamp> {
    match (a, b) {
        (Bound::Unbounded, other) | (other, Bound::Unbounded) => other,
        (Bound::Included(x), Bound::Included(y)) => Bound::Included(x.max(y)),
        (Bound::Excluded(x), Bound::Excluded(y)) => Bound::Excluded(x.max(y)),
        (Bound::Included(i), Bound::Excluded(e)) | (Bound::Excluded(e), Bound::Included(i)) => {
            if i > e {
                Bound::Included(i)
            } else {
                Bound::Excluded(e)
            }
        }
    }
}

fn earlier(a: Bound<Timestamp>, b: Bound<Timestamp>) -> Bound<Timestamp> {
    match (a, b) {
        (Bound::Unbounded, other) | (other, Bound::Unbounded) => other,
        (Bound::Included(x), Bound::Included(y)) => Bound::Included(x.min(y)),
        (Bound::Excluded(x), Bound::Excluded(y)) => Bound::Excluded(x.min(y)),
        (Bound::Included(i), Bound::Excluded(e)) | (Bound::Excluded(e), Bound::Included(i)) => {
            if i < e {
                Bound::Included(i)
            } else {
                Bound::Excluded(e)
            }
        }
    }
}

impl RangeBounds<Timestamp> for TimeRange {
    fn start_bound(&self) -> Bound<&Timestamp> {
        self.not_before.as_ref()
    }

    fn end_bound(&self) -> Bound<&Timestamp> {
        self.expiration.as_ref()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.not_before {
            Bound::Included(nbf) | Bound::Excluded(nbf) => write!(f, "{nbf}")?,
            Bound::Unbounded => {}
        }
        write!(f, "..")?;
        match self.expiration {
            Bound::Included(exp) => write!(f, "={exp}"),
            Bound::Excluded(exp) => write!(f, "{exp}"),
            Bound::Unbounded => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: Timestamp = Timestamp::from_unix(1_700_000_000);

    #[test]
    fn lifetimes_resolve_against_the_signing_time() {
        assert_eq!(Lifetime::Default.expiration(NOW, 30), Some(NOW.after(30)));
        assert_eq!(Lifetime::Seconds(60).expiration(NOW, 30), Some(NOW.after(60)));
        assert_eq!(
            Lifetime::Until(Timestamp::from_unix(5)).expiration(NOW, 30),
            Some(Timestamp::from_unix(5))
        );
        assert_eq!(Lifetime::Unbounded.expiration(NOW, 30), None);
    }

    #[test]
    fn expiration_is_exclusive() {
        let range = TimeRange::new(None, Some(NOW));
        assert_eq!(range.check(NOW), Validity::Expired(NOW));
        assert_eq!(
            range.check(Timestamp::from_unix(NOW.to_unix() - 1)),
            Validity::Valid
        );
        assert!(!range.contains(&NOW));
    }

    #[test]
    fn not_before_is_inclusive() {
        let range = TimeRange::new(Some(NOW), None);
        assert_eq!(range.check(NOW), Validity::Valid);
        assert_eq!(
            TimeRange::new(Some(NOW.after(1000)), None).check(NOW),
            Validity::NotYetValid(NOW.after(1000))
        );
    }

    #[test]
    fn unbounded_ranges_are_always_valid() {
        assert_eq!(TimeRange::unbounded().check(NOW), Validity::Valid);
        assert_eq!(
            TimeRange::unbounded().check(Timestamp::from_unix(0)),
            Validity::Valid
        );
    }

    #[test]
    fn intersection_narrows_both_ends() {
        let outer = TimeRange::new(Some(Timestamp::from_unix(10)), Some(Timestamp::from_unix(100)));
        let inner = TimeRange::new(Some(Timestamp::from_unix(20)), Some(Timestamp::from_unix(50)));
        let open = TimeRange::unbounded();

        assert_eq!(outer.intersect(inner), inner);
        assert_eq!(inner.intersect(outer), inner);
        assert_eq!(outer.intersect(open), outer);
        assert_eq!(outer.to_string(), "10..100");
    }

    #[test]
    fn disjoint_windows_are_unsatisfiable() {
        let early = TimeRange::new(None, Some(Timestamp::from_unix(10)));
        let late = TimeRange::new(Some(Timestamp::from_unix(10)), None);
        assert!(!early.intersect(late).is_satisfiable());
        assert!(early.is_satisfiable());
    }
}
