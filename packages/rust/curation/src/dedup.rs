//! Language-variant deduplication.
//!
//! Single pass over the raw URLs with a running best candidate per canonical
//! key. The winner depends only on the multiset of inputs: higher
//! [`PreferenceScore`] wins, ties go to the lexicographically smaller raw URL.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::locale::{self, PreferenceScore};
use crate::normalize::normalize;

/// The raw URL chosen to represent one canonical page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representative {
    /// Raw URL as it appeared in the sitemap.
    pub raw: String,
    /// Score of the raw URL's locale.
    pub score: PreferenceScore,
    /// Locale-stripped path of the raw URL.
    pub tail: String,
}

impl Representative {
    fn beats(&self, other: &Representative) -> bool {
        self.score > other.score || (self.score == other.score && self.raw < other.raw)
    }
}

/// Result of [`deduplicate`].
#[derive(Debug, Default)]
pub struct Dedup {
    /// Canonical URL → chosen representative.
    pub by_canonical: HashMap<String, Representative>,
    /// Inputs that could not be canonicalized.
    pub invalid: usize,
}

/// Pick one representative per canonical URL.
pub fn deduplicate<I, S>(raw_urls: I, prefer_lang: &str) -> Dedup
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut dedup = Dedup::default();

    for raw in raw_urls {
        let raw = raw.as_ref();
        let normalized = match normalize(raw) {
            Ok(n) => n,
            Err(e) => {
                debug!(url = raw, error = %e, "dropping unparseable URL");
                dedup.invalid += 1;
                continue;
            }
        };

        let candidate = Representative {
            raw: raw.to_string(),
            score: locale::score(normalized.locale.as_deref(), prefer_lang),
            tail: normalized.tail,
        };

        match dedup.by_canonical.entry(normalized.canonical) {
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
            Entry::Occupied(mut slot) => {
                if candidate.beats(slot.get()) {
                    slot.insert(candidate);
                }
            }
        }
    }

    dedup
}
