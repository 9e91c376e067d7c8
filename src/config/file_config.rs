//! Configuration file support for book-catalog.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "https://api.freeapi.app/api/v1/public/books"
//! timeout_seconds = 30
//!
//! [catalog]
//! skip_duplicates = false
//! default_sort = "none"
//!
//! [ui]
//! default_theme = "dark"
//! default_view = "grid"
//! grid_columns = 3
//! color = true
//!
//! [logging]
//! level = "warn"
//! ```

use std::path::{Path, PathBuf};

use super::Config;

const APP_DIR: &str = "book-catalog";
const CONFIG_FILE: &str = "config.toml";

/// Location of the per-user configuration file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

/// Find an existing configuration file.
///
/// Checks `./book-catalog.toml` first, then the per-user location.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(format!("{}.toml", APP_DIR));
    if local.is_file() {
        return Some(local);
    }

    let user = default_config_path();
    user.is_file().then_some(user)
}

impl Config {
    /// Load configuration from a TOML file, without environment overrides
    pub fn load_toml(path: &Path) -> Result<Self, ConfigFileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigFileError::Parse(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save_toml(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortKey;
    use tempfile::tempdir;

    #[test]
    fn test_config_file_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.api.timeout_seconds = 12;
        config.catalog.default_sort = SortKey::DateAsc;

        config.save_toml(&path).unwrap();

        let loaded = Config::load_toml(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_file_nonexistent() {
        let result = Config::load_toml(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigFileError::Io(_))));
    }

    #[test]
    fn test_config_file_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");

        std::fs::write(&path, "invalid = toml = content").unwrap();

        let result = Config::load_toml(&path);
        assert!(matches!(result, Err(ConfigFileError::Parse(_))));
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("book-catalog/config.toml"));
    }
}
