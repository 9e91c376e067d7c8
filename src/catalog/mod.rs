//! Result accumulation and presentation pipeline.
//!
//! - [`ResultStore`]: records fetched so far, in accumulation order
//! - [`sort_records`]: pure display ordering for a [`SortKey`](crate::models::SortKey)
//! - [`ViewController`]: drives fetches, merges pages and feeds the render sink

mod controller;
mod sort;
mod store;

pub use controller::{Resume, Transition, ViewController, ViewState};
pub use sort::{compare_titles, sort_records};
pub use store::ResultStore;

use crate::sources::FetchError;

/// Errors surfaced by catalog operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// A page could not be fetched; accumulated results are untouched
    #[error("Failed to fetch books: {0}")]
    Fetch(#[from] FetchError),

    /// The operation is not allowed in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}
