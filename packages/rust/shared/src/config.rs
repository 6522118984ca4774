//! Application configuration for docimport.
//!
//! User config lives at `~/.docimport/docimport.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocImportError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docimport.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docimport";

// ---------------------------------------------------------------------------
// Config structs (matching docimport.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Import defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Remote knowledge-base service settings.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Sitemap discovery settings.
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Preferred language tag used during deduplication.
    #[serde(default = "default_prefer_lang")]
    pub prefer_lang: String,

    /// Maximum number of curated URLs per run.
    #[serde(default = "default_max_import")]
    pub max_import: usize,

    /// Parallel add-source workers.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Attempts per URL.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Report output path.
    #[serde(default = "default_report")]
    pub report: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            prefer_lang: default_prefer_lang(),
            max_import: default_max_import(),
            concurrency: default_concurrency(),
            retries: default_retries(),
            report: default_report(),
        }
    }
}

fn default_prefer_lang() -> String {
    "en".into()
}
fn default_max_import() -> usize {
    200
}
fn default_concurrency() -> usize {
    4
}
fn default_retries() -> u32 {
    5
}
fn default_report() -> String {
    "import_learning_report.json".into()
}

/// `[remote]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the knowledge-base HTTP API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API token (never store the token itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_remote_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8787/api".into()
}
fn default_api_key_env() -> String {
    "DOCIMPORT_API_KEY".into()
}
fn default_remote_timeout() -> u64 {
    60
}

/// `[discovery]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Timeout for sitemap and robots.txt requests in seconds.
    #[serde(default = "default_discovery_timeout")]
    pub timeout_secs: u64,

    /// Conventional sitemap paths probed when robots.txt has no hint.
    #[serde(default = "default_sitemap_candidates")]
    pub sitemap_candidates: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_discovery_timeout(),
            sitemap_candidates: default_sitemap_candidates(),
        }
    }
}

fn default_discovery_timeout() -> u64 {
    60
}
fn default_sitemap_candidates() -> Vec<String> {
    ["/sitemap.xml", "/sitemap_index.xml", "/sitemap-index.xml", "/wp-sitemap.xml"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docimport/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocImportError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docimport/docimport.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocImportError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        DocImportError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocImportError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocImportError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocImportError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the remote API token from the configured env var.
///
/// An unset or empty variable yields `None`; the remote may not require auth.
pub fn resolve_api_key(config: &AppConfig) -> Option<String> {
    match std::env::var(&config.remote.api_key_env) {
        Ok(val) if !val.is_empty() => Some(val),
        _ => None,
    }
}
