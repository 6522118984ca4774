//! Sitemap discovery and loading.
//!
//! Given either an explicit sitemap URL or any page URL on a documentation
//! site, this crate produces the flat list of page URLs the site publishes.
//! Sitemap indexes are expanded recursively; a nested sitemap that fails to
//! load is logged and skipped so one bad feed never sinks the whole run.

mod parser;

use std::collections::HashSet;
use std::pin::Pin;
use std::time::Duration;

use docimport_shared::{DiscoveryConfig, DocImportError, Result};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::{debug, info, instrument, warn};
use url::Url;

pub use parser::{ParsedSitemap, SitemapKind, parse_robots_sitemaps, parse_sitemap};

/// Maximum number of redirects to follow per request.
const MAX_REDIRECTS: usize = 5;

/// Maximum nesting of sitemap indexes we are willing to follow.
const MAX_INDEX_DEPTH: usize = 5;

/// Some documentation hosts reject non-browser agents outright.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/123.0 Safari/537.36";

const ACCEPT_XML: &str = "application/xml,text/xml,text/html;q=0.9,*/*;q=0.8";

// ---------------------------------------------------------------------------
// Discovery options
// ---------------------------------------------------------------------------

/// Configuration for sitemap fetching and discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Timeout for HTTP requests in seconds.
    pub timeout_secs: u64,
    /// Origin-relative paths probed when robots.txt gives no usable hint.
    pub sitemap_candidates: Vec<String>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        DiscoveryOptions::from(&DiscoveryConfig::default())
    }
}

impl From<&DiscoveryConfig> for DiscoveryOptions {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            timeout_secs: config.timeout_secs,
            sitemap_candidates: config.sitemap_candidates.clone(),
        }
    }
}

/// Build a reqwest client with appropriate settings.
pub fn build_client(opts: &DiscoveryOptions) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_XML));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| DocImportError::Network(format!("failed to build HTTP client: {e}")))
}

// ---------------------------------------------------------------------------
// Sitemap loading
// ---------------------------------------------------------------------------

/// Load every page URL reachable from `sitemap_url`.
///
/// A failure fetching or parsing `sitemap_url` itself is an error. Failures in
/// nested sitemaps of an index are tolerated. The result keeps first-seen
/// order with duplicates removed.
#[instrument(skip_all, fields(sitemap = %sitemap_url))]
pub async fn load_sitemap_urls(client: &Client, sitemap_url: &str) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let urls: Vec<String> = load_nested(client, sitemap_url, 0)
        .await?
        .into_iter()
        .filter(|u| seen.insert(u.clone()))
        .collect();

    info!(count = urls.len(), "sitemap loaded");
    Ok(urls)
}

type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<String>>> + Send + 'a>>;

fn load_nested<'a>(client: &'a Client, sitemap_url: &'a str, depth: usize) -> LoadFuture<'a> {
    Box::pin(async move {
        let xml = fetch_text(client, sitemap_url).await?;
        let parsed = parse_sitemap(&xml)
            .map_err(|e| DocImportError::parse(format!("{sitemap_url}: {e}")))?;

        match parsed.kind {
            SitemapKind::UrlSet => {
                debug!(sitemap = sitemap_url, count = parsed.locs.len(), "urlset parsed");
                Ok(parsed.locs)
            }
            SitemapKind::Index if depth >= MAX_INDEX_DEPTH => {
                warn!(sitemap = sitemap_url, depth, "sitemap index nested too deeply, skipping");
                Ok(Vec::new())
            }
            SitemapKind::Index => {
                debug!(sitemap = sitemap_url, nested = parsed.locs.len(), "expanding sitemap index");
                let mut out = Vec::new();
                for nested in &parsed.locs {
                    match load_nested(client, nested, depth + 1).await {
                        Ok(urls) => out.extend(urls),
                        Err(e) => {
                            warn!(sitemap = %nested, error = %e, "nested sitemap failed, skipping");
                        }
                    }
                }
                Ok(out)
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Discovery from a seed URL
// ---------------------------------------------------------------------------

/// Locate a sitemap for the site hosting `seed_url`.
///
/// 1. `Sitemap:` directives in `<origin>/robots.txt`, first one that loads
/// 2. `opts.sitemap_candidates` under the origin, first one with any URLs
#[instrument(skip_all, fields(seed = %seed_url))]
pub async fn discover_sitemap(
    client: &Client,
    seed_url: &str,
    opts: &DiscoveryOptions,
) -> Result<String> {
    let origin = origin_url(seed_url)?;

    let robots_url = format!("{origin}/robots.txt");
    match fetch_text(client, &robots_url).await {
        Ok(robots) => {
            for candidate in parse_robots_sitemaps(&robots) {
                match load_sitemap_urls(client, &candidate).await {
                    Ok(_) => {
                        info!(sitemap = %candidate, "sitemap found via robots.txt");
                        return Ok(candidate);
                    }
                    Err(e) => debug!(sitemap = %candidate, error = %e, "robots.txt sitemap unusable"),
                }
            }
        }
        Err(e) => debug!(error = %e, "robots.txt unavailable"),
    }

    for path in &opts.sitemap_candidates {
        let candidate = format!("{origin}{path}");
        match load_sitemap_urls(client, &candidate).await {
            Ok(urls) if !urls.is_empty() => {
                info!(sitemap = %candidate, "sitemap found at conventional location");
                return Ok(candidate);
            }
            Ok(_) => debug!(sitemap = %candidate, "sitemap is empty"),
            Err(e) => debug!(sitemap = %candidate, error = %e, "no sitemap here"),
        }
    }

    Err(DocImportError::Discovery(format!(
        "no sitemap found from seed URL {seed_url}; pass --sitemap explicitly or use a different seed URL"
    )))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Extract the origin (scheme + host + port) from an http(s) URL.
fn origin_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw)
        .map_err(|e| DocImportError::validation(format!("invalid seed URL '{raw}': {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(DocImportError::validation(format!(
            "invalid seed URL '{raw}': expected http or https"
        )));
    }
    let host = url
        .host_str()
        .ok_or_else(|| DocImportError::validation(format!("invalid seed URL '{raw}': no host")))?;

    match url.port() {
        Some(port) => Ok(format!("{}://{host}:{port}", url.scheme())),
        None => Ok(format!("{}://{host}", url.scheme())),
    }
}

/// GET a URL and return its body, failing on non-2xx responses.
async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DocImportError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DocImportError::Network(format!("{url}: HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| DocImportError::Network(format!("{url}: failed to read body: {e}")))
}
