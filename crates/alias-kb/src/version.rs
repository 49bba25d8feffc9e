//! Provider release versions and version ranges
//!
//! [`ProviderVersion`] compares dotted numeric versions component-wise with
//! missing components treated as zero, so `12.2.1` equals `12.2.1.0`.
//! [`VersionRange`] uses interval notation: `[10.0,12.0)`, `[12.1.2,)`,
//! `(,12.2.1]`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Bound;
use std::str::FromStr;

static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([\[(])\s*([0-9.]*)\s*,\s*([0-9.]*)\s*([\])])\s*$")
        .unwrap_or_else(|e| unreachable!("version range pattern is valid: {e}"))
});

/// Dotted numeric provider release version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderVersion {
    parts: Vec<u32>,
}

impl ProviderVersion {
    /// Create from numeric components
    #[must_use]
    pub fn new(parts: impl Into<Vec<u32>>) -> Self {
        Self {
            parts: parts.into(),
        }
    }

    /// Numeric components as written
    #[inline]
    #[must_use]
    pub fn parts(&self) -> &[u32] {
        &self.parts
    }

    fn significant(&self) -> &[u32] {
        let len = self
            .parts
            .iter()
            .rposition(|p| *p != 0)
            .map_or(0, |i| i + 1);
        &self.parts[..len]
    }
}

impl PartialEq for ProviderVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ProviderVersion {}

impl Hash for ProviderVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl PartialOrd for ProviderVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProviderVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| {
                let a = self.parts.get(i).copied().unwrap_or(0);
                let b = other.parts.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl Display for ProviderVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl FromStr for ProviderVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(VersionError::InvalidVersion(s.to_string()));
        }
        text.split('.')
            .map(|p| {
                p.parse::<u32>()
                    .map_err(|_| VersionError::InvalidVersion(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl TryFrom<String> for ProviderVersion {
    type Error = VersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ProviderVersion> for String {
    fn from(v: ProviderVersion) -> Self {
        v.to_string()
    }
}

/// Interval of provider versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    lower: Bound<ProviderVersion>,
    upper: Bound<ProviderVersion>,
}

impl VersionRange {
    /// Range containing every version
    #[inline]
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// Half-open range `[lower, upper)`
    #[must_use]
    pub fn half_open(lower: ProviderVersion, upper: ProviderVersion) -> Self {
        Self {
            lower: Bound::Included(lower),
            upper: Bound::Excluded(upper),
        }
    }

    /// Range `[lower,)`
    #[must_use]
    pub fn at_least(lower: ProviderVersion) -> Self {
        Self {
            lower: Bound::Included(lower),
            upper: Bound::Unbounded,
        }
    }

    /// Lower bound
    #[inline]
    #[must_use]
    pub fn lower(&self) -> &Bound<ProviderVersion> {
        &self.lower
    }

    /// Upper bound
    #[inline]
    #[must_use]
    pub fn upper(&self) -> &Bound<ProviderVersion> {
        &self.upper
    }

    /// Check if `version` lies inside the range
    #[must_use]
    pub fn contains(&self, version: &ProviderVersion) -> bool {
        let above = match &self.lower {
            Bound::Included(v) => version >= v,
            Bound::Excluded(v) => version > v,
            Bound::Unbounded => true,
        };
        let below = match &self.upper {
            Bound::Included(v) => version <= v,
            Bound::Excluded(v) => version < v,
            Bound::Unbounded => true,
        };
        above && below
    }

    /// Smallest single range covering every range in `ranges`
    ///
    /// Returns `None` for an empty input.
    pub fn hull<'a>(ranges: impl IntoIterator<Item = &'a VersionRange>) -> Option<Self> {
        ranges.into_iter().fold(None, |acc: Option<Self>, r| {
            Some(match acc {
                None => r.clone(),
                Some(acc) => Self {
                    lower: min_lower(acc.lower, &r.lower),
                    upper: max_upper(acc.upper, &r.upper),
                },
            })
        })
    }
}

fn min_lower(a: Bound<ProviderVersion>, b: &Bound<ProviderVersion>) -> Bound<ProviderVersion> {
    let take_b = match (&a, b) {
        (Bound::Unbounded, _) => false,
        (_, Bound::Unbounded) => true,
        (Bound::Included(x) | Bound::Excluded(x), Bound::Included(y) | Bound::Excluded(y)) => {
            match x.cmp(y) {
                Ordering::Less => false,
                Ordering::Greater => true,
                Ordering::Equal => matches!(b, Bound::Included(_)),
            }
        }
    };
    if take_b {
        b.clone()
    } else {
        a
    }
}

fn max_upper(a: Bound<ProviderVersion>, b: &Bound<ProviderVersion>) -> Bound<ProviderVersion> {
    let take_b = match (&a, b) {
        (Bound::Unbounded, _) => false,
        (_, Bound::Unbounded) => true,
        (Bound::Included(x) | Bound::Excluded(x), Bound::Included(y) | Bound::Excluded(y)) => {
            match x.cmp(y) {
                Ordering::Greater => false,
                Ordering::Less => true,
                Ordering::Equal => matches!(b, Bound::Included(_)),
            }
        }
    };
    if take_b {
        b.clone()
    } else {
        a
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl Display for VersionRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.lower {
            Bound::Included(v) => write!(f, "[{v},")?,
            Bound::Excluded(v) => write!(f, "({v},")?,
            Bound::Unbounded => f.write_str("(,")?,
        }
        match &self.upper {
            Bound::Included(v) => write!(f, "{v}]"),
            Bound::Excluded(v) => write!(f, "{v})"),
            Bound::Unbounded => f.write_str(")"),
        }
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    /// Parse interval notation; a bare version `v` means `[v,)`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(caps) = RANGE_RE.captures(s) else {
            return s
                .parse::<ProviderVersion>()
                .map(Self::at_least)
                .map_err(|_| VersionError::InvalidRange(s.to_string()));
        };

        let parse = |text: &str| -> Result<Option<ProviderVersion>, VersionError> {
            if text.is_empty() {
                Ok(None)
            } else {
                text.parse().map(Some)
            }
        };

        let lower = match (&caps[1], parse(&caps[2])?) {
            (_, None) => Bound::Unbounded,
            ("[", Some(v)) => Bound::Included(v),
            (_, Some(v)) => Bound::Excluded(v),
        };
        let upper = match (&caps[4], parse(&caps[3])?) {
            (_, None) => Bound::Unbounded,
            ("]", Some(v)) => Bound::Included(v),
            (_, Some(v)) => Bound::Excluded(v),
        };

        Ok(Self { lower, upper })
    }
}

impl TryFrom<String> for VersionRange {
    type Error = VersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<VersionRange> for String {
    fn from(r: VersionRange) -> Self {
        r.to_string()
    }
}

/// Version parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// Not a dotted numeric version
    #[error("invalid provider version: '{0}'")]
    InvalidVersion(String),

    /// Not a valid interval
    #[error("invalid version range: '{0}'")]
    InvalidRange(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(s: &str) -> ProviderVersion {
        s.parse().unwrap()
    }

    #[test]
    fn zero_padded_equality() {
        assert_eq!(v("12.2.1"), v("12.2.1.0"));
        assert!(v("12.2.1.3") > v("12.2.1"));
        assert!(v("10.3.6") < v("12.1.2"));
    }

    #[test]
    fn rejects_non_numeric() {
        assert_eq!(
            "12.2.x".parse::<ProviderVersion>(),
            Err(VersionError::InvalidVersion("12.2.x".to_string()))
        );
        assert!("".parse::<ProviderVersion>().is_err());
    }

    #[test]
    fn half_open_membership() {
        let range: VersionRange = "[10.0,12.0)".parse().unwrap();
        assert!(range.contains(&v("10.0")));
        assert!(range.contains(&v("11.0")));
        assert!(!range.contains(&v("12.0")));
        assert!(!range.contains(&v("13.0")));
    }

    #[test]
    fn open_ended_ranges() {
        let from: VersionRange = "[12.1.2,)".parse().unwrap();
        assert!(from.contains(&v("14.1.1")));
        assert!(!from.contains(&v("12.1.1")));

        let until: VersionRange = "(,12.2.1]".parse().unwrap();
        assert!(until.contains(&v("12.2.1.0")));
        assert!(!until.contains(&v("12.2.1.1")));
    }

    #[test]
    fn bare_version_is_lower_bound() {
        let range: VersionRange = "12.2.1".parse().unwrap();
        assert_eq!(range, VersionRange::at_least(v("12.2.1")));
    }

    #[test]
    fn display_round_trips() {
        for text in ["[10.0,12.0)", "[12.1.2,)", "(,12.2.1]", "(,)"] {
            let range: VersionRange = text.parse().unwrap();
            assert_eq!(range.to_string(), text);
        }
    }

    #[test]
    fn hull_spans_all_ranges() {
        let a: VersionRange = "[10.0,11.0)".parse().unwrap();
        let b: VersionRange = "[11.0,12.0)".parse().unwrap();
        assert_eq!(VersionRange::hull([&a, &b]).unwrap().to_string(), "[10.0,12.0)");
        assert!(VersionRange::hull(std::iter::empty()).is_none());
    }

    proptest! {
        #[test]
        fn prop_trailing_zeros_do_not_change_order(
            parts in proptest::collection::vec(0u32..30, 1..5),
            zeros in 0usize..3,
        ) {
            let base = ProviderVersion::new(parts.clone());
            let mut padded_parts = parts;
            padded_parts.extend(std::iter::repeat(0).take(zeros));
            let padded = ProviderVersion::new(padded_parts);
            prop_assert_eq!(&base, &padded);
            prop_assert_eq!(base.cmp(&padded), Ordering::Equal);
        }
    }
}
