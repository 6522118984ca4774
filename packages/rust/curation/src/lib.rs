//! Sitemap URL curation for docimport.
//!
//! This crate turns a raw, multilingual sitemap URL list into the bounded set
//! of pages worth importing:
//! - [`normalize`]: canonical URL + locale tag + path tail
//! - [`locale`]: preference scoring of a detected locale
//! - [`dedup`]: one representative per canonical page
//! - [`filter`]: keep/skip path-prefix rules
//! - [`curate()`]: the composed, deterministic transform

pub mod curate;
pub mod dedup;
pub mod filter;
pub mod locale;
pub mod normalize;

pub use curate::{Curation, CurationOptions, CurationStats, curate};
pub use dedup::{Dedup, Representative, deduplicate};
pub use filter::{FilterDecision, FilterReason, decide, matches_prefix, parse_prefixes};
pub use locale::{PreferenceScore, score};
pub use normalize::{NormalizedUrl, normalize, split_locale};
