//! Shared types, error model, and configuration for docimport.
//!
//! This crate is the foundation depended on by all other docimport crates.
//! It provides:
//! - [`DocImportError`]: the unified error type
//! - Remote domain types ([`Notebook`], [`RemoteSource`], [`Artifact`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, DiscoveryConfig, RemoteConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{DocImportError, Result};
pub use types::{Artifact, Notebook, RemoteSource};
