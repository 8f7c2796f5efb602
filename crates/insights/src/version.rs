//! Bitbucket Server version parsing and ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Failure to parse a version string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version '{0}'")]
pub struct VersionParseError(String);

/// Dotted numeric version with an optional `-qualifier` suffix.
///
/// Missing trailing components count as zero, so `5.15` equals `5.15.0`.
/// A qualified version such as `7.0.0-rc1` sorts before `7.0.0`. Qualifiers
/// with the same text prefix compare by their trailing number, so `rc10`
/// follows `rc2`.
#[derive(Debug, Clone)]
pub struct ServerVersion {
    parts: Vec<u64>,
    qualifier: Option<String>,
}

impl ServerVersion {
    /// First release with the Code Insights REST API (5.15).
    #[must_use]
    pub fn minimum_code_insights() -> Self {
        Self {
            parts: vec![5, 15],
            qualifier: None,
        }
    }

    fn part(&self, index: usize) -> u64 {
        self.parts.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for ServerVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (numeric, qualifier) = match trimmed.split_once('-') {
            Some((numeric, qualifier)) if !qualifier.is_empty() => {
                (numeric, Some(qualifier.to_string()))
            }
            Some(_) => return Err(VersionParseError(s.to_string())),
            None => (trimmed, None),
        };

        let parts = numeric
            .split('.')
            .map(str::parse::<u64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| VersionParseError(s.to_string()))?;

        Ok(Self { parts, qualifier })
    }
}

impl Ord for ServerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        for i in 0..len {
            match self.part(i).cmp(&other.part(i)) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }

        match (&self.qualifier, &other.qualifier) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => compare_qualifiers(a, b),
        }
    }
}

/// Split `rc10` into (`rc`, Some(10)).
fn split_qualifier(qualifier: &str) -> (&str, Option<u64>) {
    let prefix = qualifier.trim_end_matches(|c: char| c.is_ascii_digit());
    let number = qualifier[prefix.len()..].parse().ok();
    (prefix, number)
}

fn compare_qualifiers(a: &str, b: &str) -> Ordering {
    let (a_prefix, a_number) = split_qualifier(a);
    let (b_prefix, b_number) = split_qualifier(b);
    a_prefix
        .cmp(b_prefix)
        .then(a_number.cmp(&b_number))
        .then_with(|| a.cmp(b))
}

impl PartialOrd for ServerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ServerVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ServerVersion {}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numeric = self
            .parts
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        match &self.qualifier {
            Some(q) => write!(f, "{numeric}-{q}"),
            None => write!(f, "{numeric}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CODE_INSIGHTS_VERSION;

    fn v(s: &str) -> ServerVersion {
        s.parse().unwrap()
    }

    #[test]
    fn test_minimum_matches_constant() {
        assert_eq!(ServerVersion::minimum_code_insights(), v(CODE_INSIGHTS_VERSION));
        assert_eq!(
            ServerVersion::minimum_code_insights().to_string(),
            CODE_INSIGHTS_VERSION
        );
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(v("5.16") > v("5.15"));
        assert!(v("5.9") < v("5.15"));
        assert!(v("10.0") > v("9.99.99"));
        assert!(v("6") > v("5.15.3"));
    }

    #[test]
    fn test_trailing_zeros_are_equal() {
        assert_eq!(v("5.15"), v("5.15.0"));
        assert_eq!(v("7"), v("7.0.0.0"));
    }

    #[test]
    fn test_qualifier_sorts_before_release() {
        assert!(v("7.0.0-rc1") < v("7.0.0"));
        assert!(v("7.0.0-rc1") > v("6.10.0"));
        assert!(v("7.0.0-rc2") > v("7.0.0-rc1"));
        assert_eq!(v("7.0.0-rc1").to_string(), "7.0.0-rc1");
    }

    #[test]
    fn test_qualifier_numbers_compare_numerically() {
        assert!(v("7.0.0-rc10") > v("7.0.0-rc2"));
        assert!(v("7.0.0-rc2") < v("7.0.0-rc10"));
        assert!(v("7.0.0-rc") < v("7.0.0-rc1"));
        assert!(v("7.0.0-beta9") < v("7.0.0-rc1"));
        assert_eq!(v("7.0.0-rc3"), v("7.0.0-rc3"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("".parse::<ServerVersion>().is_err());
        assert!("abc".parse::<ServerVersion>().is_err());
        assert!("5..1".parse::<ServerVersion>().is_err());
        assert!("5.15-".parse::<ServerVersion>().is_err());
        assert_eq!(
            "x.y".parse::<ServerVersion>(),
            Err(VersionParseError("x.y".to_string()))
        );
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert_eq!(v(" 8.1.0 "), v("8.1"));
    }
}
