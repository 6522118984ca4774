//! The curation transform: dedup → filter → order → cap.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::dedup::deduplicate;
use crate::filter::{FilterReason, decide};

/// Inputs to [`curate`] besides the raw URL list.
#[derive(Debug, Clone)]
pub struct CurationOptions {
    /// Preferred locale tag (`en`, `zh-CN`).
    pub prefer_lang: String,
    /// Normalized keep prefixes; empty means keep all.
    pub keep_prefixes: Vec<String>,
    /// Normalized skip prefixes.
    pub skip_prefixes: Vec<String>,
    /// Hard cap on the curated list length.
    pub max_import: usize,
}

/// Counters describing one curation run.
///
/// Serialized flat: the fixed counters plus one key per skip reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurationStats {
    pub total_raw_urls: usize,
    pub invalid_url: usize,
    pub deduped_unique_canonical: usize,
    pub dedup_removed: usize,
    /// Kept before the cap was applied.
    pub kept: usize,
    /// Dropped by the cap; zero when no truncation happened.
    pub trimmed_for_cap: usize,
    #[serde(flatten)]
    pub skipped: BTreeMap<String, usize>,
}

/// Output of [`curate`].
#[derive(Debug, Clone, Default)]
pub struct Curation {
    /// Canonical URLs to import, shallow pages first.
    pub curated: Vec<String>,
    pub stats: CurationStats,
    /// Filter reason for every deduplicated canonical URL, kept or not.
    pub reasons: BTreeMap<String, FilterReason>,
}

/// Reduce a raw sitemap URL list to a bounded, ordered, deduplicated,
/// filtered list of canonical URLs.
///
/// Pure and deterministic: identical inputs give identical outputs
/// regardless of input order.
#[instrument(skip_all, fields(raw = raw_urls.len(), max_import = opts.max_import))]
pub fn curate<S: AsRef<str>>(raw_urls: &[S], opts: &CurationOptions) -> Curation {
    let dedup = deduplicate(raw_urls, &opts.prefer_lang);
    let valid = raw_urls.len() - dedup.invalid;

    let mut stats = CurationStats {
        total_raw_urls: raw_urls.len(),
        invalid_url: dedup.invalid,
        deduped_unique_canonical: dedup.by_canonical.len(),
        dedup_removed: valid - dedup.by_canonical.len(),
        ..CurationStats::default()
    };
    let mut reasons = BTreeMap::new();
    let mut kept: Vec<(usize, String, String)> = Vec::new();

    for (canonical, rep) in dedup.by_canonical {
        let decision = decide(&rep.tail, &opts.keep_prefixes, &opts.skip_prefixes);
        if decision.keep {
            stats.kept += 1;
            kept.push((path_depth(&rep.tail), rep.tail, canonical.clone()));
        } else {
            *stats.skipped.entry(decision.reason.to_string()).or_default() += 1;
        }
        reasons.insert(canonical, decision.reason);
    }

    // Broad pages before deep ones; canonical URL makes the order total.
    kept.sort();

    if kept.len() > opts.max_import {
        stats.trimmed_for_cap = kept.len() - opts.max_import;
        debug!(trimmed = stats.trimmed_for_cap, "applying import cap");
        kept.truncate(opts.max_import);
    }

    let curated: Vec<String> = kept.into_iter().map(|(_, _, canonical)| canonical).collect();

    info!(
        unique = stats.deduped_unique_canonical,
        kept = stats.kept,
        curated = curated.len(),
        trimmed = stats.trimmed_for_cap,
        "curation complete"
    );

    Curation {
        curated,
        stats,
        reasons,
    }
}

/// Number of `/` separators in a path.
fn path_depth(path: &str) -> usize {
    path.matches('/').count()
}
