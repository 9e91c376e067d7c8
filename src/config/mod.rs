//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `BOOK_CATALOG_` (nested keys use a
//! double underscore, e.g. `BOOK_CATALOG_API__BASE_URL`).

mod file_config;

pub use file_config::{default_config_path, find_config_file, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::SortKey;
use crate::ui::{Theme, ViewMode};

/// Public books endpoint queried by default
pub const DEFAULT_API_URL: &str = "https://api.freeapi.app/api/v1/public/books";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Result accumulation settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Terminal presentation defaults
    #[serde(default)]
    pub ui: UiConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the paged books endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Override for the User-Agent header
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Result accumulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Skip records already merged from an earlier page
    #[serde(default)]
    pub skip_duplicates: bool,

    /// Sort key used when no preference has been saved
    #[serde(default)]
    pub default_sort: SortKey,
}

/// Terminal presentation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Theme used when no preference has been saved
    #[serde(default)]
    pub default_theme: Theme,

    /// Layout used when no preference has been saved
    #[serde(default)]
    pub default_view: ViewMode,

    /// Maximum number of cards per row in grid view
    #[serde(default = "default_grid_columns")]
    pub grid_columns: usize,

    /// Emit ANSI colors
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_theme: Theme::default(),
            default_view: ViewMode::default(),
            grid_columns: default_grid_columns(),
            color: true,
        }
    }
}

fn default_grid_columns() -> usize {
    3
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `text` (default) or `json`
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    build(Some(path))
}

/// Get the configuration from environment variables and defaults only
pub fn get_config() -> Result<Config, config::ConfigError> {
    build(None)
}

fn build(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    builder
        .add_source(
            config::Environment::with_prefix("BOOK_CATALOG")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.api.timeout_seconds, 30);
        assert!(!config.catalog.skip_duplicates);
        assert_eq!(config.catalog.default_sort, SortKey::None);
        assert_eq!(config.ui.grid_columns, 3);
        assert!(config.ui.color);
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[api]
base_url = "http://localhost:9000/books"
timeout_seconds = 5

[catalog]
skip_duplicates = true
default_sort = "title-desc"

[ui]
default_theme = "light"
default_view = "list"
grid_columns = 2
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9000/books");
        assert_eq!(config.api.timeout_seconds, 5);
        assert!(config.catalog.skip_duplicates);
        assert_eq!(config.catalog.default_sort, SortKey::TitleDesc);
        assert_eq!(config.ui.default_theme, Theme::Light);
        assert_eq!(config.ui.default_view, ViewMode::List);
        assert_eq!(config.ui.grid_columns, 2);
        assert!(config.ui.color);
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempdir().unwrap();
        assert!(load_config(&dir.path().join("absent.toml")).is_err());
    }
}
