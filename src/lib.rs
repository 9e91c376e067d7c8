//! # Book Catalog
//!
//! Browse a paginated public books API from the terminal. Pages are fetched
//! on demand, accumulated in arrival order and shown sorted by the active
//! sort key.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (BookRecord, QueryState, SortKey)
//! - [`sources`]: Page fetchers behind the [`PageFetcher`] trait
//! - [`catalog`]: Result store, sorting and the [`ViewController`] state machine
//! - [`ui`]: Render and error sinks, terminal renderer, display settings
//! - [`utils`]: HTTP client and preference storage
//! - [`config`]: Configuration management

pub mod catalog;
pub mod config;
pub mod models;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use catalog::{CatalogError, Transition, ViewController, ViewState};
pub use models::{BookRecord, QueryState, SortKey};
pub use sources::{FetchError, PageFetcher, PageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
