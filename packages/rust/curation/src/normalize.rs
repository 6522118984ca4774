//! URL canonicalization and locale-segment detection.
//!
//! Documentation sites usually publish the same page under several locale
//! prefixes (`/en/cli/setup`, `/zh-CN/cli/setup`). The canonical form drops
//! that prefix, the query and the fragment so every variant maps to one key.

use std::sync::LazyLock;

use docimport_shared::{DocImportError, Result};
use regex::Regex;
use url::Url;

/// Matches a locale path segment: `en`, `fr`, `zh-CN`, `pt-BR`.
static LOCALE_SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]{2}(?:-[A-Z]{2})?$").expect("locale segment regex")
});

/// A raw URL reduced to its canonical identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    /// `scheme://host[:port]` + tail.
    pub canonical: String,
    /// Locale tag taken from the first path segment, if it had locale shape.
    pub locale: Option<String>,
    /// Path left after the locale segment is removed; always slash-rooted.
    pub tail: String,
}

/// Canonicalize an absolute URL.
///
/// Fails for strings that are not absolute URLs or have no host.
pub fn normalize(raw: &str) -> Result<NormalizedUrl> {
    let url = Url::parse(raw)
        .map_err(|e| DocImportError::validation(format!("invalid URL '{raw}': {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| DocImportError::validation(format!("URL has no host: {raw}")))?;

    let (locale, tail) = split_locale(url.path());
    let canonical = match url.port() {
        Some(port) => format!("{}://{host}:{port}{tail}", url.scheme()),
        None => format!("{}://{host}{tail}", url.scheme()),
    };

    Ok(NormalizedUrl {
        canonical,
        locale,
        tail,
    })
}

/// Split `/zh-CN/cli/setup` into `(Some("zh-CN"), "/cli/setup")`.
///
/// Trailing slashes are removed; an empty path becomes `/`.
pub fn split_locale(path: &str) -> (Option<String>, String) {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return (None, "/".to_string());
    }

    let mut segments = trimmed.splitn(3, '/');
    // Leading empty segment before the first slash.
    segments.next();
    let first = segments.next().unwrap_or("");

    if LOCALE_SEGMENT_RE.is_match(first) {
        let rest = segments.next().unwrap_or("");
        (Some(first.to_string()), format!("/{rest}"))
    } else {
        (None, trimmed.to_string())
    }
}
