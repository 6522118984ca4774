//! Remote knowledge-base collaborator.
//!
//! [`KnowledgeBase`] is the seam between the import pipeline and the service
//! that hosts notebooks. [`HttpKnowledgeBase`] talks to a JSON HTTP API; tests
//! substitute in-memory implementations.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use docimport_shared::{AppConfig, Artifact, DocImportError, Notebook, RemoteSource, Result};

/// User-Agent string for remote API requests.
const USER_AGENT: &str = concat!("docimport/", env!("CARGO_PKG_VERSION"));

/// Longest response body excerpt carried in an error message.
const ERROR_BODY_LIMIT: usize = 300;

/// Operations the import pipeline needs from the knowledge-base service.
///
/// `add_url_source` may be called for a URL the service already holds; the
/// pipeline does not rely on the service deduplicating for it.
pub trait KnowledgeBase: Send + Sync {
    fn list_notebooks(&self) -> impl Future<Output = Result<Vec<Notebook>>> + Send;

    fn create_notebook(&self, title: &str) -> impl Future<Output = Result<Notebook>> + Send;

    fn list_sources(
        &self,
        notebook_id: &str,
    ) -> impl Future<Output = Result<Vec<RemoteSource>>> + Send;

    fn add_url_source(&self, notebook_id: &str, url: &str)
    -> impl Future<Output = Result<()>> + Send;

    fn list_artifacts(&self, notebook_id: &str)
    -> impl Future<Output = Result<Vec<Artifact>>> + Send;
}

/// Find a notebook by exact title, creating it when missing and `create` is set.
#[instrument(skip_all, fields(title = %title))]
pub async fn find_or_create_notebook<K: KnowledgeBase>(
    kb: &K,
    title: &str,
    create: bool,
) -> Result<Option<Notebook>> {
    let notebooks = kb.list_notebooks().await?;
    if let Some(existing) = notebooks.into_iter().find(|n| n.title == title) {
        info!(id = %existing.id, "using existing notebook");
        return Ok(Some(existing));
    }

    if !create {
        debug!("notebook not found and creation disabled");
        return Ok(None);
    }

    let created = kb.create_notebook(title).await?;
    info!(id = %created.id, "created notebook");
    Ok(Some(created))
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// [`KnowledgeBase`] backed by a JSON HTTP API.
///
/// | Operation | Request |
/// |---|---|
/// | list notebooks | `GET {base}/notebooks` |
/// | create notebook | `POST {base}/notebooks` `{"title"}` |
/// | list sources | `GET {base}/notebooks/{id}/sources` |
/// | add URL source | `POST {base}/notebooks/{id}/sources` `{"url"}` |
/// | list artifacts | `GET {base}/notebooks/{id}/artifacts` |
#[derive(Debug, Clone)]
pub struct HttpKnowledgeBase {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct CreateNotebook<'a> {
    title: &'a str,
}

#[derive(Serialize)]
struct AddSource<'a> {
    url: &'a str,
}

impl HttpKnowledgeBase {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            DocImportError::config(format!("invalid remote base_url '{base_url}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DocImportError::config(format!(
                "remote base_url '{base_url}' cannot be used as a base"
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| DocImportError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Build from the `[remote]` config section and its token env var.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            &config.remote.base_url,
            docimport_shared::resolve_api_key(config),
            Duration::from_secs(config.remote.timeout_secs),
        )
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base URL always has path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(segments));
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| DocImportError::Remote(format!("request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        let excerpt: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        Err(DocImportError::Remote(format!("{url}: HTTP {status}: {excerpt}")))
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = Self::send(request).await?;
        let url = response.url().clone();
        response
            .json::<T>()
            .await
            .map_err(|e| DocImportError::parse(format!("{url}: invalid response body: {e}")))
    }
}

impl KnowledgeBase for HttpKnowledgeBase {
    async fn list_notebooks(&self) -> Result<Vec<Notebook>> {
        Self::send_json(self.request(Method::GET, &["notebooks"])).await
    }

    async fn create_notebook(&self, title: &str) -> Result<Notebook> {
        let request = self
            .request(Method::POST, &["notebooks"])
            .json(&CreateNotebook { title });
        Self::send_json(request).await
    }

    async fn list_sources(&self, notebook_id: &str) -> Result<Vec<RemoteSource>> {
        Self::send_json(self.request(Method::GET, &["notebooks", notebook_id, "sources"])).await
    }

    async fn add_url_source(&self, notebook_id: &str, url: &str) -> Result<()> {
        let request = self
            .request(Method::POST, &["notebooks", notebook_id, "sources"])
            .json(&AddSource { url });
        Self::send(request).await.map(|_| ())
    }

    async fn list_artifacts(&self, notebook_id: &str) -> Result<Vec<Artifact>> {
        Self::send_json(self.request(Method::GET, &["notebooks", notebook_id, "artifacts"])).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn kb_for(server: &MockServer, api_key: Option<&str>) -> HttpKnowledgeBase {
        HttpKnowledgeBase::new(
            &format!("{}/api", server.uri()),
            api_key.map(String::from),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn endpoint_joins_and_escapes_segments() {
        let kb = HttpKnowledgeBase::new("https://kb.example.com/api/", None, Duration::from_secs(1))
            .unwrap();
        assert_eq!(
            kb.endpoint(&["notebooks", "nb 1/x", "sources"]).as_str(),
            "https://kb.example.com/api/notebooks/nb%201%2Fx/sources"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(HttpKnowledgeBase::new("not a url", None, Duration::from_secs(1)).is_err());
        assert!(HttpKnowledgeBase::new("mailto:x@example.com", None, Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn list_and_create_notebooks() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/notebooks"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "nb-1", "title": "Other"}
            ])))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/notebooks"))
            .and(body_json(serde_json::json!({"title": "Docs"})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "nb-2", "title": "Docs"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let kb = kb_for(&server, Some("secret"));
        let nb = find_or_create_notebook(&kb, "Docs", true).await.unwrap().unwrap();
        assert_eq!(nb.id, "nb-2");
    }

    #[tokio::test]
    async fn find_without_create_returns_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notebooks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let kb = kb_for(&server, None);
        assert!(find_or_create_notebook(&kb, "Docs", false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_source_posts_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/notebooks/nb-1/sources"))
            .and(body_json(serde_json::json!({"url": "https://docs.example.com/start"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let kb = kb_for(&server, None);
        kb.add_url_source("nb-1", "https://docs.example.com/start")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_success_maps_to_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/notebooks/nb-1/sources"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let kb = kb_for(&server, None);
        let err = kb.add_url_source("nb-1", "https://x").await.unwrap_err();
        match err {
            DocImportError::Remote(msg) => {
                assert!(msg.contains("429"));
                assert!(msg.contains("quota exceeded"));
            }
            other => panic!("expected Remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lists_sources_and_artifacts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notebooks/nb-1/sources"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "s1", "url": "https://docs.example.com/en/start"},
                {"id": "s2", "title": "Uploaded PDF"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/notebooks/nb-1/artifacts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "a1", "title": "Audio Overview", "created_at": 1700000000}
            ])))
            .mount(&server)
            .await;

        let kb = kb_for(&server, None);
        let sources = kb.list_sources("nb-1").await.unwrap();
        assert_eq!(sources.len(), 2);
        assert!(sources[1].url.is_none());

        let artifacts = kb.list_artifacts("nb-1").await.unwrap();
        assert_eq!(artifacts[0].title, "Audio Overview");
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notebooks"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let kb = kb_for(&server, None);
        assert!(matches!(
            kb.list_notebooks().await,
            Err(DocImportError::Parse { .. })
        ));
    }
}
