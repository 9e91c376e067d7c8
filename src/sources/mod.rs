//! Paged catalog sources.
//!
//! This module defines the [`PageFetcher`] trait that the view controller uses
//! to pull one page of results at a time. A fetcher issues exactly one request
//! per call, never retries, and never touches controller state: it is a pure
//! query from the caller's point of view.
//!
//! - [`FreeApiFetcher`]: HTTP implementation for the public books endpoint
//! - [`MockFetcher`]: scripted responses for tests and offline demos

mod freeapi;
pub mod mock;

pub use freeapi::{FetcherBuildError, FreeApiFetcher};
pub use mock::MockFetcher;

use async_trait::async_trait;

use crate::models::BookRecord;

/// Source of catalog pages.
///
/// # Implementing a New Fetcher
///
/// 1. Issue a single query for `term` and `page` (pages are 1-based, an empty
///    term means an unfiltered browse)
/// 2. Normalise each raw record into a [`BookRecord`], null-filling missing
///    fields and dropping records that cannot be read at all
/// 3. Map every transport, status or payload problem to a [`FetchError`]
#[async_trait]
pub trait PageFetcher: Send + Sync + std::fmt::Debug {
    /// Fetch one page of results
    async fn fetch_page(&self, term: &str, page: u32) -> Result<PageResult, FetchError>;
}

/// One page of normalised results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    /// Records in the order the API returned them
    pub records: Vec<BookRecord>,

    /// Whether the API reports a page after this one
    pub has_next_page: bool,

    /// Total number of pages for the query
    pub total_pages: u32,
}

impl PageResult {
    /// Create a final page holding `records`
    pub fn new(records: Vec<BookRecord>) -> Self {
        Self {
            records,
            has_next_page: false,
            total_pages: 1,
        }
    }

    /// Set has_next_page flag
    pub fn has_next_page(mut self, has_next: bool) -> Self {
        self.has_next_page = has_next;
        self
    }

    /// Set total pages
    pub fn total_pages(mut self, total: u32) -> Self {
        self.total_pages = total;
        self
    }
}

/// Category of a [`FetchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Network,
    Malformed,
    Http(u16),
}

/// Errors that can occur while fetching a page
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Transport failure or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response
    #[error("HTTP error! Status: {0}")]
    Http(u16),

    /// Missing or invalid payload shape, including `success: false`
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Network(_) => FetchErrorKind::Network,
            FetchError::Http(status) => FetchErrorKind::Http(*status),
            FetchError::Malformed(_) => FetchErrorKind::Malformed,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Http(status.as_u16()),
            None => FetchError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(format!("JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            FetchError::Network("timeout".into()).kind(),
            FetchErrorKind::Network
        );
        assert_eq!(FetchError::Http(503).kind(), FetchErrorKind::Http(503));
        assert_eq!(
            FetchError::Malformed("no data".into()).kind(),
            FetchErrorKind::Malformed
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(FetchError::Http(404).to_string(), "HTTP error! Status: 404");
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(FetchError::from(json_err), FetchError::Malformed(_)));
    }

    #[test]
    fn test_page_result_builder() {
        let page = PageResult::new(vec![BookRecord::default()])
            .has_next_page(true)
            .total_pages(4);
        assert_eq!(page.records.len(), 1);
        assert!(page.has_next_page);
        assert_eq!(page.total_pages, 4);
    }
}
