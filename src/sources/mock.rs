//! Mock fetcher for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

use crate::models::BookRecord;
use crate::sources::{FetchError, PageFetcher, PageResult};

type PageKey = (String, u32);

/// A fetcher that serves scripted pages.
///
/// Pages are keyed by search term and page number; unscripted requests return
/// an empty final page. Fetches for a held term wait until the returned
/// [`Notify`] is signalled, which lets tests interleave completions.
#[derive(Debug, Default)]
pub struct MockFetcher {
    pages: Mutex<HashMap<PageKey, Result<PageResult, FetchError>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<PageKey>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the page returned for `term` and `page`
    pub fn set_page(&self, term: &str, page: u32, result: PageResult) {
        let mut guard = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert((term.to_string(), page), Ok(result));
    }

    /// Script a failure for `term` and `page`
    pub fn fail_page(&self, term: &str, page: u32, error: FetchError) {
        let mut guard = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert((term.to_string(), page), Err(error));
    }

    /// Hold every fetch for `term` until the returned gate is notified
    pub fn hold(&self, term: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        let mut guard = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(term.to_string(), Arc::clone(&gate));
        gate
    }

    /// Requests received so far, in order
    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_page(&self, term: &str, page: u32) -> Result<PageResult, FetchError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((term.to_string(), page));

        let gate = self
            .gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(term)
            .cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let guard = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.get(&(term.to_string(), page)) {
            Some(result) => result.clone(),
            None => Ok(PageResult::new(Vec::new())),
        }
    }
}

/// Helper function to create a titled book for testing.
pub fn make_book(id: &str, title: &str) -> BookRecord {
    BookRecord {
        id: Some(id.to_string()),
        title: Some(title.to_string()),
        ..Default::default()
    }
}

/// Helper function to create a page of titled books for testing.
pub fn make_page(titles: &[&str], has_next_page: bool) -> PageResult {
    let records = titles
        .iter()
        .map(|title| make_book(&title.to_lowercase(), title))
        .collect();
    PageResult::new(records).has_next_page(has_next_page)
}
