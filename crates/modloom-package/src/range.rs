//! Version ranges in the npm dialect used by mod manifests
//!
//! `semver::VersionReq` speaks Cargo's dialect: comparators are comma-separated and a
//! bare `1.2.3` means `^1.2.3`. Mod manifests use npm ranges instead, where
//! comparators are space-separated, a bare version is exact, `a - b` is an inclusive
//! range and `||` separates alternatives. Each alternative is translated into a
//! `VersionReq`.

use semver::{Version, VersionReq};
use std::fmt;

/// Parsed version range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    raw: String,
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    /// Parse version range from string
    pub fn parse(s: &str) -> Result<Self, semver::Error> {
        let raw = s.trim();
        let alternatives = raw
            .split("||")
            .map(|alt| parse_comparator_set(alt.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            alternatives,
        })
    }

    /// Range matching every release
    pub fn any() -> Self {
        Self {
            raw: "*".to_string(),
            alternatives: vec![VersionReq::STAR],
        }
    }

    /// Check if version satisfies the range
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for VersionRange {
    type Err = semver::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_comparator_set(set: &str) -> Result<VersionReq, semver::Error> {
    if matches!(set, "" | "*" | "x" | "X") {
        return Ok(VersionReq::STAR);
    }

    // Hyphen range: 1.2.3 - 2.3.4 := >=1.2.3, <=2.3.4
    if let Some((low, high)) = set.split_once(" - ") {
        return VersionReq::parse(&format!(
            ">={}, <={}",
            strip_v(low.trim()),
            strip_v(high.trim())
        ));
    }

    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op = String::new();
    for token in set
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^')) {
            // operator separated from its version: ">= 1.0.0"
            pending_op.push_str(token);
            continue;
        }
        let comparator = if pending_op.is_empty() {
            normalize_comparator(token)
        } else {
            format!("{}{}", std::mem::take(&mut pending_op), strip_v(token))
        };
        comparators.push(comparator);
    }

    VersionReq::parse(&comparators.join(", "))
}

/// A bare version is exact in npm ranges; wildcard forms keep their meaning.
fn normalize_comparator(token: &str) -> String {
    let token = strip_v(token);
    let starts_with_digit = token.starts_with(|c: char| c.is_ascii_digit());
    if starts_with_digit && !token.contains(['x', 'X', '*']) {
        format!("={}", token)
    } else {
        token.to_string()
    }
}

fn strip_v(token: &str) -> &str {
    match token.strip_prefix('v') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_bare_version_is_exact() {
        let range = VersionRange::parse("1.2.3").unwrap();
        assert!(range.matches(&v("1.2.3")));
        assert!(!range.matches(&v("1.2.4")));
    }

    #[test]
    fn test_caret() {
        let range = VersionRange::parse("^1.2.3").unwrap();
        assert!(range.matches(&v("1.2.3")));
        assert!(range.matches(&v("1.9.9")));
        assert!(!range.matches(&v("2.0.0")));
    }

    #[test]
    fn test_tilde() {
        let range = VersionRange::parse("~1.2.3").unwrap();
        assert!(range.matches(&v("1.2.9")));
        assert!(!range.matches(&v("1.3.0")));
    }

    #[test]
    fn test_space_separated_comparators() {
        let range = VersionRange::parse(">=1.0.0 <1.4.0").unwrap();
        assert!(range.matches(&v("1.3.9")));
        assert!(!range.matches(&v("1.4.0")));

        let spaced = VersionRange::parse(">= 1.0.0 < 1.4.0").unwrap();
        assert!(spaced.matches(&v("1.0.0")));
    }

    #[test]
    fn test_hyphen_range() {
        let range = VersionRange::parse("1.0.0 - 2.0.0").unwrap();
        assert!(range.matches(&v("2.0.0")));
        assert!(!range.matches(&v("2.0.1")));
    }

    #[test]
    fn test_alternatives() {
        let range = VersionRange::parse("^1.0.0 || ^3.0.0").unwrap();
        assert!(range.matches(&v("1.5.0")));
        assert!(range.matches(&v("3.1.0")));
        assert!(!range.matches(&v("2.0.0")));
    }

    #[test]
    fn test_wildcards() {
        assert!(VersionRange::parse("*").unwrap().matches(&v("0.0.1")));
        assert!(VersionRange::parse("").unwrap().matches(&v("9.0.0")));
        assert!(VersionRange::parse("1.x").unwrap().matches(&v("1.7.0")));
        assert!(!VersionRange::parse("1.x").unwrap().matches(&v("2.0.0")));
    }

    #[test]
    fn test_invalid_range() {
        assert!(VersionRange::parse("not a version").is_err());
    }

    #[test]
    fn test_display_keeps_source_text() {
        assert_eq!(VersionRange::parse(" ^1.0.0 ").unwrap().to_string(), "^1.0.0");
    }
}
