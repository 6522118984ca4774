//! Error types for docimport.
//!
//! Library crates use [`DocImportError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docimport operations.
#[derive(Debug, thiserror::Error)]
pub enum DocImportError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching sitemaps or robots.txt.
    #[error("network error: {0}")]
    Network(String),

    /// Sitemap XML or remote payload could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The remote knowledge-base service rejected or failed a request.
    #[error("remote error: {0}")]
    Remote(String),

    /// No sitemap could be located from a seed URL.
    #[error("discovery error: {0}")]
    Discovery(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid input (malformed URL, bad flag combination, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocImportError>;

impl DocImportError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocImportError::config("missing base_url");
        assert_eq!(err.to_string(), "config error: missing base_url");

        let err = DocImportError::validation("invalid --seed-url: ftp://x");
        assert!(err.to_string().contains("invalid --seed-url"));

        let err = DocImportError::Remote("HTTP 429".into());
        assert_eq!(err.to_string(), "remote error: HTTP 429");
    }
}
