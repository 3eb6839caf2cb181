//! Application configuration for BookAdvisor.
//!
//! User config lives at `~/.bookadvisor/bookadvisor.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BookAdvisorError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "bookadvisor.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".bookadvisor";

/// Most hits one search may return, whatever the catalog reports.
pub const MAX_RESULT_LIMIT: usize = 10;

/// Longest description kept before the ellipsis is appended.
pub const MAX_DESCRIPTION_CHARS: usize = 150;

// ---------------------------------------------------------------------------
// Config structs (matching bookadvisor.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote catalog endpoints and limits.
    #[serde(default)]
    pub catalog: CatalogSection,

    /// Local library store.
    #[serde(default)]
    pub library: LibrarySection,
}

/// `[catalog]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSection {
    /// Search endpoint; the query is sent as the `q` parameter.
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Prefix of the per-key detail resource.
    #[serde(default = "default_detail_base_url")]
    pub detail_base_url: String,

    /// Suffix appended after the key for the detail resource.
    #[serde(default = "default_detail_suffix")]
    pub detail_suffix: String,

    /// Cover image URL template with an `{id}` placeholder.
    #[serde(default = "default_cover_url_template")]
    pub cover_url_template: String,

    /// Maximum number of hits kept from one search.
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,

    /// Descriptions longer than this many characters are truncated.
    #[serde(default = "default_description_max_chars")]
    pub description_max_chars: usize,

    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of detail lookups in flight at once (1 = sequential).
    #[serde(default = "default_enrich_concurrency")]
    pub enrich_concurrency: usize,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            detail_base_url: default_detail_base_url(),
            detail_suffix: default_detail_suffix(),
            cover_url_template: default_cover_url_template(),
            result_limit: default_result_limit(),
            description_max_chars: default_description_max_chars(),
            timeout_secs: default_timeout_secs(),
            enrich_concurrency: default_enrich_concurrency(),
        }
    }
}

fn default_search_url() -> String {
    "https://openlibrary.org/search.json".into()
}
fn default_detail_base_url() -> String {
    "https://openlibrary.org".into()
}
fn default_detail_suffix() -> String {
    ".json".into()
}
fn default_cover_url_template() -> String {
    "https://covers.openlibrary.org/b/id/{id}-M.jpg".into()
}
fn default_result_limit() -> usize {
    10
}
fn default_description_max_chars() -> usize {
    150
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_enrich_concurrency() -> usize {
    1
}

/// `[library]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibrarySection {
    /// Path of the line-delimited library file.
    #[serde(default = "default_library_path")]
    pub path: String,

    /// Where saved records go.
    #[serde(default)]
    pub save_mode: SaveMode,
}

impl Default for LibrarySection {
    fn default() -> Self {
        Self {
            path: default_library_path(),
            save_mode: SaveMode::default(),
        }
    }
}

fn default_library_path() -> String {
    "library.txt".into()
}

/// Destination for saved records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveMode {
    /// Persist to the library file.
    #[default]
    File,
    /// Print to stdout only.
    Console,
}

impl SaveMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::File => Self::Console,
            Self::Console => Self::File,
        }
    }
}

impl std::fmt::Display for SaveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Console => f.write_str("console"),
        }
    }
}

impl FromStr for SaveMode {
    type Err = BookAdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "console" => Ok(Self::Console),
            other => Err(BookAdvisorError::validation(format!(
                "unknown save mode '{other}': expected 'file' or 'console'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime catalog configuration consumed by the search pipeline.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub search_url: String,
    pub detail_base_url: String,
    pub detail_suffix: String,
    pub cover_url_template: String,
    pub result_limit: usize,
    pub description_max_chars: usize,
    pub timeout_secs: u64,
    pub enrich_concurrency: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for CatalogConfig {
    fn from(config: &AppConfig) -> Self {
        let catalog = &config.catalog;
        Self {
            search_url: catalog.search_url.clone(),
            detail_base_url: catalog.detail_base_url.clone(),
            detail_suffix: catalog.detail_suffix.clone(),
            cover_url_template: catalog.cover_url_template.clone(),
            result_limit: catalog.result_limit.clamp(1, MAX_RESULT_LIMIT),
            description_max_chars: catalog.description_max_chars.min(MAX_DESCRIPTION_CHARS),
            timeout_secs: catalog.timeout_secs,
            enrich_concurrency: catalog.enrich_concurrency.max(1),
        }
    }
}

impl CatalogConfig {
    /// Point every endpoint at `base` (e.g. a local mock server), keeping the
    /// default path layout.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            search_url: format!("{base}/search.json"),
            detail_base_url: base.to_string(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.bookadvisor/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BookAdvisorError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.bookadvisor/bookadvisor.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| BookAdvisorError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        BookAdvisorError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BookAdvisorError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BookAdvisorError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BookAdvisorError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject settings the pipeline cannot work with.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if !(1..=MAX_RESULT_LIMIT).contains(&config.catalog.result_limit) {
        return Err(BookAdvisorError::config(format!(
            "catalog.result_limit must be between 1 and {MAX_RESULT_LIMIT}"
        )));
    }
    if config.catalog.description_max_chars > MAX_DESCRIPTION_CHARS {
        return Err(BookAdvisorError::config(format!(
            "catalog.description_max_chars must be at most {MAX_DESCRIPTION_CHARS}"
        )));
    }
    if !config.catalog.cover_url_template.contains("{id}") {
        return Err(BookAdvisorError::config(
            "catalog.cover_url_template must contain an {id} placeholder",
        ));
    }
    if config.library.path.trim().is_empty() {
        return Err(BookAdvisorError::config("library.path must not be empty"));
    }
    Ok(())
}
