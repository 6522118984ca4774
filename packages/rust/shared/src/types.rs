//! Domain types exchanged with the remote knowledge-base service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Notebook
// ---------------------------------------------------------------------------

/// A notebook on the remote knowledge-base service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    /// Remote identifier.
    pub id: String,
    /// Display title; used to find an existing notebook by exact match.
    pub title: String,
}

// ---------------------------------------------------------------------------
// RemoteSource
// ---------------------------------------------------------------------------

/// A source already attached to a notebook.
///
/// Not every source is URL-backed (uploads, pasted text), so `url` is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSource {
    /// Remote identifier.
    pub id: String,
    /// Display title, if the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Origin URL for URL-backed sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------
// Artifact
// ---------------------------------------------------------------------------

/// A generated artifact (audio overview, report, slide deck, ...) in a notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Remote identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Creation time, transported as Unix seconds.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_without_url_deserializes() {
        let json = r#"[{"id":"s1","title":"Pasted notes"},{"id":"s2","url":"https://docs.example.com/a"}]"#;
        let parsed: Vec<RemoteSource> = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed.len(), 2);
        assert!(parsed[0].url.is_none());
        assert_eq!(parsed[1].url.as_deref(), Some("https://docs.example.com/a"));
        assert!(parsed[1].title.is_none());
    }

    #[test]
    fn artifact_timestamp_is_unix_seconds() {
        let json = r#"{"id":"a1","title":"Audio Overview","created_at":1700000000}"#;
        let artifact: Artifact = serde_json::from_str(json).expect("deserialize");
        assert_eq!(artifact.created_at.timestamp(), 1_700_000_000);

        let back = serde_json::to_value(&artifact).expect("serialize");
        assert_eq!(back["created_at"], 1_700_000_000);
    }
}
