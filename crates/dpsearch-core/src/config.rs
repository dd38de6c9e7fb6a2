//! Search configuration.
//!
//! [`SearchConfig`] is loaded from a TOML file. Every field has a serde
//! default, so a partial file (or no file at all) yields a usable config.
//!
//! The file is located in this order:
//!
//! 1. An explicit path passed by the caller
//! 2. The `DPSEARCH_CONFIG` environment variable
//! 3. `<config_dir>/dpsearch/config.toml`
//!
//! An explicit or env-provided path must exist. A missing default file means
//! defaults.
//!
//! ```toml
//! [search]
//! results_per_page = 10
//! max_request_size = 250
//!
//! [conceptual]
//! enabled = true
//! label_k = 10
//!
//! [model]
//! vectors_path = "/opt/models/ons.vec"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::paginator::{
    DEFAULT_MAX_REQUEST_SIZE, DEFAULT_MAX_RESULT_WINDOW, DEFAULT_MAX_VISIBLE_PAGES,
    DEFAULT_RESULTS_PER_PAGE, PaginationPolicy,
};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "DPSEARCH_CONFIG";

const PROJECT_NAME: &str = "dpsearch";
const CONFIG_FILE_NAME: &str = "config.toml";

// ============================================================================
// SearchConfig
// ============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Pagination and highlighting.
    #[serde(default)]
    pub search: SearchSection,

    /// Semantic augmentation of the content query.
    #[serde(default)]
    pub conceptual: ConceptualSection,

    /// Release date decay.
    #[serde(default)]
    pub decay: DecaySection,

    /// Model files.
    #[serde(default)]
    pub model: ModelSection,
}

/// `[search]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSection {
    /// Page size used when the caller does not supply one.
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u64,

    /// Largest page size a caller may request.
    #[serde(default = "default_max_request_size")]
    pub max_request_size: u64,

    /// Largest `from + size` the backend serves.
    #[serde(default = "default_max_result_window")]
    pub max_result_window: u64,

    /// Tag wrapped around highlighted fragments.
    #[serde(default = "default_highlight_tag")]
    pub highlight_tag: String,

    /// Number of page links in a paginator window.
    #[serde(default = "default_max_visible_pages")]
    pub max_visible_pages: u64,
}

/// `[conceptual]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptualSection {
    /// Whether content queries are augmented with embeddings and labels.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Number of labels requested from the model.
    #[serde(default = "default_label_k")]
    pub label_k: usize,

    /// Minimum label probability.
    #[serde(default = "default_label_threshold")]
    pub label_threshold: f32,

    /// Weight of the vector similarity score function.
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f32,

    /// Multiplier applied to lexical scores.
    #[serde(default = "default_boost_factor")]
    pub boost_factor: f32,
}

/// `[decay]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecaySection {
    /// Decay function name (`exp`, `gauss` or `linear`).
    #[serde(default = "default_decay_function")]
    pub function: String,

    /// Distance from the origin at which the score equals `decay`.
    #[serde(default = "default_decay_scale")]
    pub scale: String,

    /// Distance from the origin before decay starts.
    #[serde(default = "default_decay_offset")]
    pub offset: String,

    /// Score at `scale` from the origin.
    #[serde(default = "default_decay")]
    pub decay: f32,
}

/// `[model]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSection {
    /// Word vectors in fastText `.vec` format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vectors_path: Option<PathBuf>,

    /// Label vectors in fastText `.vec` format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels_path: Option<PathBuf>,
}

fn default_results_per_page() -> u64 {
    DEFAULT_RESULTS_PER_PAGE
}

fn default_max_request_size() -> u64 {
    DEFAULT_MAX_REQUEST_SIZE
}

fn default_max_result_window() -> u64 {
    DEFAULT_MAX_RESULT_WINDOW
}

fn default_highlight_tag() -> String {
    "strong".to_string()
}

fn default_max_visible_pages() -> u64 {
    DEFAULT_MAX_VISIBLE_PAGES
}

fn default_true() -> bool {
    true
}

fn default_label_k() -> usize {
    10
}

fn default_label_threshold() -> f32 {
    0.1
}

fn default_vector_weight() -> f32 {
    1.0
}

fn default_boost_factor() -> f32 {
    100.0
}

fn default_decay_function() -> String {
    "exp".to_string()
}

fn default_decay_scale() -> String {
    "365d".to_string()
}

fn default_decay_offset() -> String {
    "30d".to_string()
}

fn default_decay() -> f32 {
    0.95
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            results_per_page: default_results_per_page(),
            max_request_size: default_max_request_size(),
            max_result_window: default_max_result_window(),
            highlight_tag: default_highlight_tag(),
            max_visible_pages: default_max_visible_pages(),
        }
    }
}

impl Default for ConceptualSection {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            label_k: default_label_k(),
            label_threshold: default_label_threshold(),
            vector_weight: default_vector_weight(),
            boost_factor: default_boost_factor(),
        }
    }
}

impl Default for DecaySection {
    fn default() -> Self {
        Self {
            function: default_decay_function(),
            scale: default_decay_scale(),
            offset: default_decay_offset(),
            decay: default_decay(),
        }
    }
}

impl SearchConfig {
    /// Project name used for the config directory and CLI hints.
    pub fn project_name() -> &'static str {
        PROJECT_NAME
    }

    /// `<config_dir>/dpsearch/config.toml`, if the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join(CONFIG_FILE_NAME))
    }

    /// Resolve the config file path from an explicit path, the environment,
    /// or the platform default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        resolve_with_env(explicit, std::env::var(CONFIG_ENV_VAR).ok())
    }

    /// Load configuration, falling back to defaults when no file exists at
    /// the default location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when an explicit or env-provided file can't be
    /// read, and [`Error::Config`] when the file doesn't parse or validate.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_ENV_VAR).ok();
        let required = explicit.is_some() || env_path.is_some();

        let Some(path) = resolve_with_env(explicit, env_path) else {
            log::debug!("No config directory on this platform, using defaults");
            return Ok(Self::default());
        };

        if !required && !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::from_file(&path)
    }

    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        let search = &self.search;
        if search.results_per_page == 0 {
            return Err(Error::config("search.results_per_page must be at least 1"));
        }
        if search.max_request_size == 0 {
            return Err(Error::config("search.max_request_size must be at least 1"));
        }
        if search.results_per_page > search.max_request_size {
            return Err(Error::config(format!(
                "search.results_per_page ({}) exceeds search.max_request_size ({})",
                search.results_per_page, search.max_request_size
            )));
        }
        if search.max_request_size > search.max_result_window {
            return Err(Error::config(format!(
                "search.max_request_size ({}) exceeds search.max_result_window ({})",
                search.max_request_size, search.max_result_window
            )));
        }
        if !(self.decay.decay > 0.0 && self.decay.decay < 1.0) {
            return Err(Error::config(format!(
                "decay.decay must be in (0, 1), got {}",
                self.decay.decay
            )));
        }
        if !matches!(self.decay.function.as_str(), "exp" | "gauss" | "linear") {
            return Err(Error::config(format!(
                "decay.function must be one of exp, gauss, linear; got '{}'",
                self.decay.function
            )));
        }
        Ok(())
    }

    /// Pagination ceilings derived from the `[search]` section.
    pub fn pagination_policy(&self) -> PaginationPolicy {
        PaginationPolicy {
            max_page_size: self.search.max_request_size,
            max_result_window: self.search.max_result_window,
            max_visible_pages: self.search.max_visible_pages,
        }
    }
}

fn resolve_with_env(explicit: Option<&str>, env_path: Option<String>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }
    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    SearchConfig::default_config_path()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.search.results_per_page, 10);
        assert_eq!(config.search.max_request_size, 250);
        assert_eq!(config.search.max_result_window, 10_000);
        assert_eq!(config.search.highlight_tag, "strong");
        assert!(config.conceptual.enabled);
        assert_eq!(config.conceptual.label_k, 10);
        assert_eq!(config.decay.scale, "365d");
        assert!(config.model.vectors_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = SearchConfig::from_toml_str("[search]\nresults_per_page = 25\n").unwrap();
        assert_eq!(config.search.results_per_page, 25);
        assert_eq!(config.search.max_request_size, 250);
        assert_eq!(config.conceptual, ConceptualSection::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(SearchConfig::from_toml_str("").unwrap(), SearchConfig::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = SearchConfig::default();
        config.model.vectors_path = Some(PathBuf::from("/opt/ons.vec"));
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("[conceptual]"));
        assert_eq!(SearchConfig::from_toml_str(&toml_str).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let err = SearchConfig::from_toml_str("[search]\nresults_per_page = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_validate_rejects_page_larger_than_max() {
        let err =
            SearchConfig::from_toml_str("[search]\nresults_per_page = 300\n").unwrap_err();
        assert!(err.to_string().contains("results_per_page (300)"));
    }

    #[test]
    fn test_validate_rejects_bad_decay() {
        assert!(SearchConfig::from_toml_str("[decay]\ndecay = 1.5\n").is_err());
        assert!(SearchConfig::from_toml_str("[decay]\ndecay = 0.0\n").is_err());
        assert!(SearchConfig::from_toml_str("[decay]\nfunction = \"cubic\"\n").is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = SearchConfig::from_toml_str("[search\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[conceptual]\nenabled = false\n").unwrap();

        let config = SearchConfig::from_file(&path).unwrap();
        assert!(!config.conceptual.enabled);
    }

    #[test]
    fn test_load_explicit_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = SearchConfig::load(path.to_str()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_resolve_prefers_explicit_then_env() {
        assert_eq!(
            resolve_with_env(Some("/a.toml"), Some("/b.toml".to_string())),
            Some(PathBuf::from("/a.toml"))
        );
        assert_eq!(
            resolve_with_env(None, Some("/b.toml".to_string())),
            Some(PathBuf::from("/b.toml"))
        );
        assert_eq!(
            resolve_with_env(None, Some(String::new())),
            SearchConfig::default_config_path()
        );
    }

    #[test]
    fn test_default_config_path_shape() {
        if let Some(path) = SearchConfig::default_config_path() {
            assert!(path.ends_with("dpsearch/config.toml"));
        }
    }

    #[test]
    fn test_pagination_policy() {
        let config = SearchConfig::from_toml_str("[search]\nmax_request_size = 50\n").unwrap();
        let policy = config.pagination_policy();
        assert_eq!(policy.max_page_size, 50);
        assert_eq!(policy.max_result_window, 10_000);
    }
}
