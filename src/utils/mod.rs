//! Utility modules supporting the catalog.
//!
//! - [`HttpClient`]: shared HTTP client with the catalog's user agent and timeout
//! - [`PreferenceStore`]: persisted theme, view and sort choices
//!
//! # Preferences
//!
//! ```rust
//! use book_catalog::utils::{MemoryPreferences, PreferenceStore};
//!
//! let prefs = MemoryPreferences::new();
//! prefs.set("theme", "light").unwrap();
//! assert_eq!(prefs.get("theme").as_deref(), Some("light"));
//! ```

mod http;
mod preferences;

pub use http::{HttpClient, DEFAULT_USER_AGENT};
pub use preferences::{
    default_preferences_path, FilePreferences, MemoryPreferences, PreferenceError,
    PreferenceStore,
};
