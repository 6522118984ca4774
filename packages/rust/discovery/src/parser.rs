//! Sitemap XML and robots.txt parsing.
//!
//! Handles the two sitemap document kinds defined by <https://www.sitemaps.org/>:
//! - `<urlset>` with `<url><loc>` page entries
//! - `<sitemapindex>` with `<sitemap><loc>` nested sitemap entries
//!
//! Only unprefixed `<loc>` elements are read, so extension tags such as
//! `<image:loc>` never leak into the page list.

use std::sync::LazyLock;

use docimport_shared::{DocImportError, Result};
use regex::Regex;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Root element of a sitemap document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapKind {
    /// `<urlset>`: entries are pages.
    UrlSet,
    /// `<sitemapindex>`: entries are nested sitemaps.
    Index,
}

/// A parsed sitemap document.
#[derive(Debug, Clone)]
pub struct ParsedSitemap {
    pub kind: SitemapKind,
    /// `<loc>` values in document order.
    pub locs: Vec<String>,
}

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Matches the opening tag of either root element.
static ROOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(sitemapindex|urlset)[\s>]").expect("root regex")
});

/// Matches `<loc>...</loc>`, spanning lines.
static LOC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<loc\s*>(.*?)</loc\s*>").expect("loc regex")
});

/// Matches a CDATA wrapper.
static CDATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^<!\[CDATA\[(.*)\]\]>$").expect("cdata regex")
});

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse sitemap XML into its kind and `<loc>` values.
pub fn parse_sitemap(xml: &str) -> Result<ParsedSitemap> {
    let kind = match ROOT_RE.captures(xml) {
        Some(caps) if caps[1].eq_ignore_ascii_case("sitemapindex") => SitemapKind::Index,
        Some(_) => SitemapKind::UrlSet,
        None => {
            return Err(DocImportError::parse(
                "document is neither a <urlset> nor a <sitemapindex>",
            ));
        }
    };

    let locs = LOC_RE
        .captures_iter(xml)
        .filter_map(|caps| {
            let value = caps[1].trim();
            let value = match CDATA_RE.captures(value) {
                Some(inner) => inner[1].trim().to_string(),
                None => decode_entities(value),
            };
            (!value.is_empty()).then_some(value)
        })
        .collect();

    Ok(ParsedSitemap { kind, locs })
}

/// Decode the five predefined XML entities.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Extract `Sitemap:` directive values from robots.txt, in file order.
pub fn parse_robots_sitemaps(robots: &str) -> Vec<String> {
    robots
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let (directive, value) = line.split_once(':')?;
            if !directive.trim().eq_ignore_ascii_case("sitemap") {
                return None;
            }
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        let path = format!("../../../fixtures/sitemaps/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    #[test]
    fn parse_urlset_fixture() {
        let parsed = parse_sitemap(&fixture("urlset.xml")).unwrap();
        assert_eq!(parsed.kind, SitemapKind::UrlSet);
        assert_eq!(
            parsed.locs,
            vec![
                "https://docs.example.com/",
                "https://docs.example.com/en/start/quickstart",
                "https://docs.example.com/zh-CN/start/quickstart",
                "https://docs.example.com/cli/setup?tab=linux&os=debian",
                "https://docs.example.com/search?q=a&page=2",
            ]
        );
    }

    #[test]
    fn image_locs_are_ignored() {
        let parsed = parse_sitemap(&fixture("urlset.xml")).unwrap();
        assert!(!parsed.locs.iter().any(|l| l.ends_with(".png")));
    }

    #[test]
    fn parse_index_fixture() {
        let parsed = parse_sitemap(&fixture("index.xml")).unwrap();
        assert_eq!(parsed.kind, SitemapKind::Index);
        assert_eq!(parsed.locs.len(), 2);
        assert_eq!(parsed.locs[1], "https://docs.example.com/sitemap-blog.xml");
    }

    #[test]
    fn non_sitemap_document_fails() {
        assert!(parse_sitemap("<html><body>Not found</body></html>").is_err());
        assert!(parse_sitemap("").is_err());
    }

    #[test]
    fn empty_urlset_is_valid() {
        let parsed = parse_sitemap(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"></urlset>"#)
            .unwrap();
        assert_eq!(parsed.kind, SitemapKind::UrlSet);
        assert!(parsed.locs.is_empty());
    }

    #[test]
    fn robots_directives_in_order() {
        let sitemaps = parse_robots_sitemaps(&fixture("robots.txt"));
        assert_eq!(
            sitemaps,
            vec![
                "https://docs.example.com/sitemap_index.xml",
                "https://docs.example.com/sitemap-fallback.xml",
            ]
        );
    }

    #[test]
    fn robots_without_sitemap() {
        assert!(parse_robots_sitemaps("User-agent: *\nDisallow:\n").is_empty());
    }
}
