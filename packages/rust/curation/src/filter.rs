//! Learning-value filter: ordered keep/skip path-prefix rules.
//!
//! Skip rules are evaluated first and always win over keep rules. An empty
//! keep list means "keep everything not explicitly skipped".

use std::fmt;

use serde::{Serialize, Serializer};

/// Why a path was kept or skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterReason {
    /// Matched this skip prefix.
    Skipped(String),
    /// Matched this keep prefix.
    Kept(String),
    /// No keep prefixes configured.
    KeepAll,
    /// Keep prefixes configured but none matched.
    OutsideKeepPrefix,
}

impl FilterReason {
    /// Whether the reason corresponds to a keep decision.
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Kept(_) | Self::KeepAll)
    }
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped(prefix) => write!(f, "skip:{prefix}"),
            Self::Kept(prefix) => write!(f, "keep:{prefix}"),
            Self::KeepAll => f.write_str("keep:all"),
            Self::OutsideKeepPrefix => f.write_str("skip:outside-keep-prefix"),
        }
    }
}

impl Serialize for FilterReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDecision {
    pub keep: bool,
    pub reason: FilterReason,
}

impl From<FilterReason> for FilterDecision {
    fn from(reason: FilterReason) -> Self {
        Self {
            keep: reason.is_keep(),
            reason,
        }
    }
}

/// Classify a locale-stripped path.
///
/// Prefixes must already be normalized (see [`parse_prefixes`]).
pub fn decide(tail: &str, keep_prefixes: &[String], skip_prefixes: &[String]) -> FilterDecision {
    if let Some(prefix) = first_match(tail, skip_prefixes) {
        return FilterReason::Skipped(prefix.to_string()).into();
    }

    if keep_prefixes.is_empty() {
        return FilterReason::KeepAll.into();
    }

    match first_match(tail, keep_prefixes) {
        Some(prefix) => FilterReason::Kept(prefix.to_string()).into(),
        None => FilterReason::OutsideKeepPrefix.into(),
    }
}

fn first_match<'a>(tail: &str, prefixes: &'a [String]) -> Option<&'a str> {
    prefixes
        .iter()
        .map(String::as_str)
        .find(|prefix| matches_prefix(tail, prefix))
}

/// `tail` equals `prefix` or sits below it as a whole path segment.
///
/// `/cli` matches `/cli` and `/cli/setup` but not `/client`.
pub fn matches_prefix(tail: &str, prefix: &str) -> bool {
    match tail.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

/// Parse comma-separated prefix text into normalized, sorted prefixes.
///
/// Each entry is trimmed, given a leading slash and stripped of trailing
/// slashes (`/` stays `/`). Empty entries and duplicates are dropped and the
/// result is sorted by (length, text) so broader prefixes come first.
pub fn parse_prefixes(raw: &str) -> Vec<String> {
    let mut prefixes: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let rooted = if p.starts_with('/') {
                p.to_string()
            } else {
                format!("/{p}")
            };
            let stripped = rooted.trim_end_matches('/');
            if stripped.is_empty() {
                "/".to_string()
            } else {
                stripped.to_string()
            }
        })
        .collect();

    prefixes.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    prefixes.dedup();
    prefixes
}
