//! Display settings backed by the preference store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::models::SortKey;
use crate::utils::{PreferenceError, PreferenceStore};

pub const THEME_KEY: &str = "theme";
pub const VIEW_KEY: &str = "view";
pub const SORT_KEY: &str = "sort";

/// Color theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

/// Result layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(format!("Unknown view mode: {}", other)),
        }
    }
}

/// Theme, layout and sort order currently in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySettings {
    pub theme: Theme,
    pub view: ViewMode,
    pub sort: SortKey,
}

impl DisplaySettings {
    /// Resolve settings from saved preferences, falling back to `config`.
    ///
    /// When no theme has been saved yet, the resolved default is written
    /// back so later runs start from the same theme.
    pub fn load(prefs: &dyn PreferenceStore, config: &Config) -> Self {
        let theme = match saved::<Theme>(prefs, THEME_KEY) {
            Some(theme) => theme,
            None => {
                let theme = config.ui.default_theme;
                if let Err(e) = prefs.set(THEME_KEY, theme.as_str()) {
                    tracing::warn!(error = %e, "could not save default theme");
                }
                theme
            }
        };

        Self {
            theme,
            view: saved(prefs, VIEW_KEY).unwrap_or(config.ui.default_view),
            sort: saved(prefs, SORT_KEY).unwrap_or(config.catalog.default_sort),
        }
    }

    /// Switch between light and dark and remember the choice
    pub fn toggle_theme(&mut self, prefs: &dyn PreferenceStore) -> Result<Theme, PreferenceError> {
        self.theme = self.theme.toggled();
        prefs.set(THEME_KEY, self.theme.as_str())?;
        Ok(self.theme)
    }

    pub fn set_view(
        &mut self,
        view: ViewMode,
        prefs: &dyn PreferenceStore,
    ) -> Result<(), PreferenceError> {
        self.view = view;
        prefs.set(VIEW_KEY, view.as_str())
    }

    pub fn set_sort(&mut self, sort: SortKey, prefs: &dyn PreferenceStore) -> Result<(), PreferenceError> {
        self.sort = sort;
        prefs.set(SORT_KEY, sort.as_str())
    }
}

fn saved<T: FromStr>(prefs: &dyn PreferenceStore, key: &str) -> Option<T> {
    let raw = prefs.get(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unrecognised preference");
            None
        }
    }
}
