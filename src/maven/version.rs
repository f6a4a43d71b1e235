//! Version classification, ordering and range handling.
//!
//! Classification is a raw string-suffix check; ordering is a Maven-style
//! segment comparison (numeric segments numerically, known qualifiers by
//! rank). The synthetic `RELEASE`/`LATEST` markers are plain list entries
//! here; they are resolved against repository metadata at resolve time, not
//! when a choice list is populated.

use std::cmp::Ordering;

use anyhow::{anyhow, bail};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";
pub const RELEASE_MARKER: &str = "RELEASE";
pub const LATEST_MARKER: &str = "LATEST";

lazy_static! {
    static ref TOKEN_REGEX: Regex = Regex::new(r"\d+|[A-Za-z]+").unwrap();
}

pub fn is_snapshot(version: &str) -> bool {
    version.ends_with(SNAPSHOT_SUFFIX)
}

/// Inclusion predicate over version strings. Anything not ending in the
/// snapshot suffix counts as a release, including non-standard suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionFilter {
    pub releases: bool,
    pub snapshots: bool,
}

impl VersionFilter {
    pub const ALL: VersionFilter = VersionFilter { releases: true, snapshots: true };

    pub fn new(releases: bool, snapshots: bool) -> VersionFilter {
        VersionFilter { releases, snapshots }
    }

    pub fn apply(&self, version: &str) -> bool {
        if is_snapshot(version) {
            self.snapshots
        } else {
            self.releases
        }
    }
}

impl Default for VersionFilter {
    fn default() -> Self {
        VersionFilter::ALL
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(u64),
    Qualifier(String),
}

fn tokenize(version: &str) -> Vec<Token> {
    TOKEN_REGEX
        .find_iter(version)
        .map(|m| {
            let text = m.as_str();
            match text.parse::<u64>() {
                Ok(number) => Token::Number(number),
                Err(_) => Token::Qualifier(text.to_ascii_lowercase()),
            }
        })
        .collect()
}

/// Rank of a qualifier relative to an unqualified version (rank of the
/// empty padding token). Unknown qualifiers sort last and among themselves
/// lexically.
fn qualifier_rank(qualifier: &str) -> u8 {
    match qualifier {
        "alpha" | "a" => 1,
        "beta" | "b" => 2,
        "milestone" | "m" => 3,
        "rc" | "cr" => 4,
        "snapshot" => 5,
        "" | "final" | "ga" | "release" => 6,
        "sp" => 7,
        _ => 8,
    }
}

fn compare_tokens(a: &Token, b: &Token) -> Ordering {
    match (a, b) {
        (Token::Number(x), Token::Number(y)) => x.cmp(y),
        // a number always outranks a qualifier in the same position
        (Token::Number(_), Token::Qualifier(_)) => Ordering::Greater,
        (Token::Qualifier(_), Token::Number(_)) => Ordering::Less,
        (Token::Qualifier(x), Token::Qualifier(y)) => {
            let rank = qualifier_rank(x).cmp(&qualifier_rank(y));
            if rank == Ordering::Equal && qualifier_rank(x) == 8 {
                x.cmp(y)
            } else {
                rank
            }
        }
    }
}

/// Comparison of a trailing token against the implicit padding of the
/// shorter version, so that `1.0 == 1.0.0` and `1.0-alpha < 1.0 < 1.0.1`.
fn compare_to_padding(token: &Token) -> Ordering {
    match token {
        Token::Number(0) => Ordering::Equal,
        Token::Number(_) => Ordering::Greater,
        Token::Qualifier(q) => qualifier_rank(q).cmp(&qualifier_rank("")),
    }
}

pub fn compare(a: &str, b: &str) -> Ordering {
    let left = tokenize(a);
    let right = tokenize(b);

    for i in 0..left.len().max(right.len()) {
        let ordering = match (left.get(i), right.get(i)) {
            (Some(l), Some(r)) => compare_tokens(l, r),
            (Some(l), None) => compare_to_padding(l),
            (None, Some(r)) => compare_to_padding(r).reverse(),
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Bound {
    version: String,
    inclusive: bool,
}

/// A version-range expression such as `[0,)`, `[1.2,2.0)` or `[1.5]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl VersionRange {
    pub fn is_range(expression: &str) -> bool {
        expression.starts_with('[') || expression.starts_with('(')
    }

    pub fn parse(expression: &str) -> anyhow::Result<VersionRange> {
        let lower_inclusive = match expression.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => bail!("not a version range: {}", expression),
        };
        let upper_inclusive = match expression.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => bail!("not a version range: {}", expression),
        };

        let inner = &expression[1..expression.len() - 1];

        let (raw_lower, raw_upper) = match inner.split_once(',') {
            Some((lower, upper)) => (lower.trim(), upper.trim()),
            // a pinned version, e.g. [1.5]
            None => {
                let pinned = inner.trim();
                if pinned.is_empty() || !lower_inclusive || !upper_inclusive {
                    bail!("invalid pinned version range: {}", expression);
                }
                (pinned, pinned)
            }
        };

        let bound = |raw: &str, inclusive: bool| {
            if raw.is_empty() {
                None
            } else {
                Some(Bound { version: raw.to_string(), inclusive })
            }
        };

        Ok(VersionRange {
            lower: bound(raw_lower, lower_inclusive),
            upper: bound(raw_upper, upper_inclusive),
        })
    }

    pub fn contains(&self, version: &str) -> bool {
        if let Some(lower) = &self.lower {
            match compare(version, &lower.version) {
                Ordering::Less => return false,
                Ordering::Equal if !lower.inclusive => return false,
                _ => {}
            }
        }
        if let Some(upper) = &self.upper {
            match compare(version, &upper.version) {
                Ordering::Greater => return false,
                Ordering::Equal if !upper.inclusive => return false,
                _ => {}
            }
        }
        true
    }

    /// The highest contained version of a candidate set, if any.
    pub fn highest_match<'a, I: IntoIterator<Item = &'a str>>(&self, candidates: I) -> Option<String> {
        candidates
            .into_iter()
            .filter(|v| self.contains(v))
            .max_by(|a, b| compare(a, b))
            .map(str::to_string)
    }
}

/// Orders a resolved version set and applies the inclusion filter to the
/// string forms, after ordering. Ascending iff `oldest_first`.
pub fn sort_and_filter(
    mut versions: Vec<String>,
    oldest_first: bool,
    filter: &VersionFilter,
) -> Vec<String> {
    versions.sort_by(|a, b| compare(a, b));
    if !oldest_first {
        versions.reverse();
    }
    versions.retain(|v| filter.apply(v));
    versions
}

/// Adds the optional result-count limit and the synthetic markers to an
/// already ordered list. Newest-first: the limit truncates first, then
/// markers are prepended. Oldest-first: no limit, markers are appended — so
/// the markers always sit adjacent to the newest end. Markers are exempt
/// from both the limit and the filter.
pub fn decorate(
    mut versions: Vec<String>,
    oldest_first: bool,
    limit: Option<usize>,
    include_release_marker: bool,
    include_latest_marker: bool,
) -> Vec<String> {
    if !oldest_first {
        if let Some(limit) = limit {
            versions.truncate(limit);
        }
        if include_latest_marker {
            versions.insert(0, LATEST_MARKER.to_string());
        }
        if include_release_marker {
            versions.insert(0, RELEASE_MARKER.to_string());
        }
    } else {
        if include_latest_marker {
            versions.push(LATEST_MARKER.to_string());
        }
        if include_release_marker {
            versions.push(RELEASE_MARKER.to_string());
        }
    }
    versions
}

/// Resolves a synthetic marker or range expression against a candidate set,
/// leaving concrete literals untouched.
pub fn resolve_alias(
    version: &str,
    all_versions: &[String],
    latest: Option<&str>,
    release: Option<&str>,
) -> anyhow::Result<String> {
    match version {
        RELEASE_MARKER => release
            .map(str::to_string)
            .or_else(|| {
                all_versions
                    .iter()
                    .filter(|v| !is_snapshot(v))
                    .max_by(|a, b| compare(a, b))
                    .cloned()
            })
            .ok_or_else(|| anyhow!("no released version available")),
        LATEST_MARKER => latest
            .map(str::to_string)
            .or_else(|| all_versions.iter().max_by(|a, b| compare(a, b)).cloned())
            .ok_or_else(|| anyhow!("no versions available")),
        expression if VersionRange::is_range(expression) => {
            let range = VersionRange::parse(expression)?;
            range
                .highest_match(all_versions.iter().map(String::as_str))
                .ok_or_else(|| anyhow!("no version matches range {}", expression))
        }
        literal => Ok(literal.to_string()),
    }
}
