//! API versions and the inclusive ranges endpoint templates are valid for.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{SdiosError, SdiosResult};

/// Three-component API version, ordered component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl ApiVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    /// Parse a version, padding missing components with zeros.
    ///
    /// `"2"` becomes `2.0.0` and `"2.1"` becomes `2.1.0`. A suffix after the
    /// numeric core that starts with `-`, `+` or `.` is dropped.
    pub fn coerce(input: &str) -> SdiosResult<Self> {
        let s = input.trim();
        let invalid = || {
            SdiosError::invalid_version(format!(
                "API version must be entered as a string. e.g. \"2.1.0\" (got {input:?})"
            ))
        };

        let mut parts = [0u64; 3];
        let mut parsed = 0;
        let mut rest = s;
        for (idx, slot) in parts.iter_mut().enumerate() {
            if idx > 0 {
                match rest.strip_prefix('.') {
                    Some(after) if after.starts_with(|c: char| c.is_ascii_digit()) => rest = after,
                    _ => break,
                }
            }
            let end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            if end == 0 {
                return Err(invalid());
            }
            *slot = rest[..end].parse().map_err(|_| invalid())?;
            rest = &rest[end..];
            parsed += 1;
        }

        // extra dotted components are only tolerated after a full triple
        let suffix_ok = rest.is_empty()
            || rest.starts_with(['-', '+'])
            || (parsed == 3 && rest.starts_with('.'));
        if !suffix_ok {
            return Err(invalid());
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ApiVersion {
    type Err = SdiosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::coerce(s)
    }
}

impl Serialize for ApiVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::coerce(&raw).map_err(serde::de::Error::custom)
    }
}

/// Inclusive version range. `upper == None` means "from `lower` onward".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionRange {
    pub lower: ApiVersion,
    pub upper: Option<ApiVersion>,
}

impl VersionRange {
    /// `[lower, upper]`.
    pub const fn closed(lower: ApiVersion, upper: ApiVersion) -> Self {
        Self { lower, upper: Some(upper) }
    }

    /// `[version, version]`.
    pub const fn exact(version: ApiVersion) -> Self {
        Self::closed(version, version)
    }

    /// `[lower, ∞)`.
    pub const fn open(lower: ApiVersion) -> Self {
        Self { lower, upper: None }
    }

    pub fn contains(&self, version: &ApiVersion) -> bool {
        self.lower <= *version && self.upper.map_or(true, |upper| *version <= upper)
    }

    pub fn overlaps(&self, other: &VersionRange) -> bool {
        let below_other_upper = other.upper.map_or(true, |upper| self.lower <= upper);
        let other_below_upper = self.upper.map_or(true, |upper| other.lower <= upper);
        below_other_upper && other_below_upper
    }

    /// Order two ranges by upper bound; an open bound is the greatest.
    pub fn cmp_upper(&self, other: &VersionRange) -> Ordering {
        match (self.upper, other.upper) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(&b),
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upper {
            Some(upper) => write!(f, "[{}, {}]", self.lower, upper),
            None => write!(f, "[{}, ..)", self.lower),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdiosErrorKind;

    fn v(s: &str) -> ApiVersion {
        ApiVersion::coerce(s).unwrap()
    }

    #[test]
    fn coerce_pads_partial_versions() {
        assert_eq!(v("2"), ApiVersion::new(2, 0, 0));
        assert_eq!(v("2.1"), ApiVersion::new(2, 1, 0));
        assert_eq!(v(" 2.1.3 "), ApiVersion::new(2, 1, 3));
    }

    #[test]
    fn coerce_drops_suffixes() {
        assert_eq!(v("2.1.0-rc1"), ApiVersion::new(2, 1, 0));
        assert_eq!(v("2.1.0+build.7"), ApiVersion::new(2, 1, 0));
        assert_eq!(v("2.1.0.5"), ApiVersion::new(2, 1, 0));
        assert_eq!(v("2.1-beta"), ApiVersion::new(2, 1, 0));
    }

    #[test]
    fn coerce_rejects_garbage() {
        for bad in ["", "abc", "v2.1", "2.x", "2.1.0abc", "99999999999999999999"] {
            let err = ApiVersion::coerce(bad).unwrap_err();
            assert_eq!(err.kind, SdiosErrorKind::InvalidVersion, "input {bad:?}");
        }
    }

    #[test]
    fn ordering_is_numeric() {
        assert!(v("2.10.0") > v("2.9.0"));
        assert!(v("1.0.0") < v("1.0.1"));
        assert_eq!(v("2.1").to_string(), "2.1.0");
    }

    #[test]
    fn closed_range_is_inclusive() {
        let r = VersionRange::closed(v("1.0.0"), v("2.1.0"));
        assert!(r.contains(&v("1.0.0")));
        assert!(r.contains(&v("1.5.0")));
        assert!(r.contains(&v("2.1.0")));
        assert!(!r.contains(&v("2.1.1")));
        assert!(!r.contains(&v("0.9.9")));
    }

    #[test]
    fn exact_and_open_ranges() {
        let exact = VersionRange::exact(v("1.0.0"));
        assert!(exact.contains(&v("1.0.0")));
        assert!(!exact.contains(&v("1.0.1")));

        let open = VersionRange::open(v("2.0.0"));
        assert!(open.contains(&v("2.0.0")));
        assert!(open.contains(&v("9.0.0")));
        assert!(!open.contains(&v("1.9.9")));
    }

    #[test]
    fn overlap_detection() {
        let legacy = VersionRange::exact(v("1.0.0"));
        let modern = VersionRange::closed(v("2.0.0"), v("2.1.0"));
        assert!(!legacy.overlaps(&modern));
        assert!(!modern.overlaps(&legacy));

        let wide = VersionRange::closed(v("1.0.0"), v("2.0.0"));
        assert!(wide.overlaps(&modern));
        assert!(VersionRange::open(v("1.5.0")).overlaps(&modern));
        assert!(!VersionRange::open(v("2.1.1")).overlaps(&modern));
    }

    #[test]
    fn open_upper_sorts_last() {
        let open = VersionRange::open(v("1.0.0"));
        let closed = VersionRange::closed(v("1.0.0"), v("9.0.0"));
        assert_eq!(open.cmp_upper(&closed), Ordering::Greater);
        assert_eq!(closed.cmp_upper(&open), Ordering::Less);
    }

    #[test]
    fn serde_uses_string_form() {
        let parsed: ApiVersion = serde_json::from_str("\"2.1\"").unwrap();
        assert_eq!(parsed, ApiVersion::new(2, 1, 0));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"2.1.0\"");
    }
}
