//! View controller: the state machine behind search, load-more and sort.
//!
//! ```text
//! Idle ──search──▶ Loading ──ok──▶ Loaded(has_more) ──load_more──▶ Loading
//!                     │                  ▲
//!                     └──err──▶ Error ───┘ (resume state kept for retry)
//! ```
//!
//! Only one fetch is meaningful at a time. Every fetch captures the current
//! generation; `search` starts a new generation, so a completion that belongs
//! to an older one is dropped without touching the store or the sinks.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::catalog::{sort_records, CatalogError, ResultStore};
use crate::models::{BookRecord, QueryState, SortKey};
use crate::sources::{PageFetcher, PageResult};
use crate::ui::{ErrorSink, RenderSink};

/// Settled state restored after a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    Idle,
    Loaded { has_more: bool },
}

impl From<Resume> for ViewState {
    fn from(resume: Resume) -> Self {
        match resume {
            Resume::Idle => ViewState::Idle,
            Resume::Loaded { has_more } => ViewState::Loaded { has_more },
        }
    }
}

/// Top-level controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Loaded { has_more: bool },
    /// The last fetch failed; `resume` is the state that preceded it
    Error { resume: Resume },
}

impl ViewState {
    /// Whether `load_more` is currently allowed
    pub fn can_load_more(&self) -> bool {
        matches!(
            self,
            ViewState::Loaded { has_more: true }
                | ViewState::Error {
                    resume: Resume::Loaded { has_more: true }
                }
        )
    }
}

/// Outcome of a completed `search` or `load_more`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The page was merged and the view rendered
    Loaded { has_more: bool, appended: usize },
    /// A newer search started before this fetch finished; its result was dropped
    Superseded,
}

#[derive(Debug)]
struct Inner {
    query: QueryState,
    store: ResultStore,
    state: ViewState,
    settled: Resume,
    generation: u64,
}

enum FetchKind {
    Search { term: String },
    NextPage,
}

/// Orchestrates fetching, accumulation, sorting and rendering.
///
/// Methods take `&self` so a new `search` can be issued while an earlier one
/// is still awaiting its page. No lock is held across the fetch.
pub struct ViewController {
    fetcher: Arc<dyn PageFetcher>,
    render: Arc<dyn RenderSink>,
    errors: Arc<dyn ErrorSink>,
    skip_duplicates: bool,
    inner: Mutex<Inner>,
}

impl ViewController {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        render: Arc<dyn RenderSink>,
        errors: Arc<dyn ErrorSink>,
    ) -> Self {
        Self {
            fetcher,
            render,
            errors,
            skip_duplicates: false,
            inner: Mutex::new(Inner {
                query: QueryState::new(),
                store: ResultStore::new(),
                state: ViewState::Idle,
                settled: Resume::Idle,
                generation: 0,
            }),
        }
    }

    /// Skip records already merged from an earlier page
    pub fn skip_duplicates(mut self, skip: bool) -> Self {
        self.skip_duplicates = skip;
        self
    }

    /// Start with `key` as the active sort key
    pub fn with_sort_key(self, key: SortKey) -> Self {
        self.lock().query.set_sort_key(key);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ViewState {
        self.lock().state
    }

    /// Snapshot of the query state
    pub fn query(&self) -> QueryState {
        self.lock().query.clone()
    }

    /// Accumulated records in accumulation order
    pub fn records(&self) -> Vec<BookRecord> {
        self.lock().store.all().to_vec()
    }

    /// Accumulated records in the current display order
    pub fn view(&self) -> Vec<BookRecord> {
        let inner = self.lock();
        sort_records(inner.store.all(), inner.query.sort_key())
    }

    pub fn can_load_more(&self) -> bool {
        self.lock().state.can_load_more()
    }

    /// Start a new search, replacing everything accumulated so far.
    ///
    /// Supersedes any fetch still in flight. Accumulated records are only
    /// replaced once the first page of `term` has arrived.
    pub async fn search(&self, term: &str) -> Result<Transition, CatalogError> {
        let mut staged = QueryState::new();
        staged.set_search_term(term);
        let term = staged.search_term().to_string();

        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.state = ViewState::Loading;
            inner.generation
        };
        tracing::info!(term = %term, generation, "starting search");

        self.render.loading(true);
        let result = self.fetcher.fetch_page(&term, 1).await;
        self.complete(generation, FetchKind::Search { term }, result)
    }

    /// Fetch the next page and append it to the accumulated records.
    ///
    /// Fails with [`CatalogError::InvalidState`] while a fetch is in flight,
    /// before the first search, or when the last page has been reached.
    pub async fn load_more(&self) -> Result<Transition, CatalogError> {
        let (generation, term, next_page) = {
            let mut inner = self.lock();
            let state = inner.state;
            match state {
                ViewState::Loading => {
                    return Err(CatalogError::InvalidState(
                        "a page is already loading".to_string(),
                    ))
                }
                ViewState::Idle | ViewState::Error { resume: Resume::Idle } => {
                    return Err(CatalogError::InvalidState(
                        "nothing loaded yet, run a search first".to_string(),
                    ))
                }
                _ if !state.can_load_more() || !inner.query.has_more_pages() => {
                    return Err(CatalogError::InvalidState(format!(
                        "no more pages after page {}",
                        inner.query.page()
                    )))
                }
                _ => {}
            }

            inner.state = ViewState::Loading;
            (
                inner.generation,
                inner.query.search_term().to_string(),
                inner.query.page() + 1,
            )
        };
        tracing::info!(term = %term, page = next_page, generation, "loading next page");

        self.render.loading(true);
        let result = self.fetcher.fetch_page(&term, next_page).await;
        self.complete(generation, FetchKind::NextPage, result)
    }

    /// Re-sort the accumulated records and render them again.
    ///
    /// Never fetches and leaves the controller state as it is.
    pub fn change_sort(&self, key: SortKey) {
        let view = {
            let mut inner = self.lock();
            inner.query.set_sort_key(key);
            sort_records(inner.store.all(), key)
        };
        tracing::debug!(sort = %key, records = view.len(), "re-sorting accumulated records");
        self.render.render(&view);
    }

    /// Render the accumulated records again in the current order
    pub fn refresh(&self) {
        let view = self.view();
        self.render.render(&view);
    }

    fn complete(
        &self,
        generation: u64,
        kind: FetchKind,
        result: Result<PageResult, crate::sources::FetchError>,
    ) -> Result<Transition, CatalogError> {
        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!(
                generation,
                current = inner.generation,
                "discarding superseded fetch"
            );
            return Ok(Transition::Superseded);
        }

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                inner.state = ViewState::Error {
                    resume: inner.settled,
                };
                drop(inner);

                let err = CatalogError::from(err);
                tracing::warn!(error = %err, "fetch failed, keeping previous results");
                self.render.loading(false);
                self.errors.report_error(&err.to_string());
                return Err(err);
            }
        };

        match kind {
            FetchKind::Search { term } => {
                inner.query.set_search_term(&term);
                inner.store.reset();
            }
            FetchKind::NextPage => {
                if let Err(err) = inner.query.advance_page() {
                    inner.state = inner.settled.into();
                    return Err(err);
                }
            }
        }

        let has_more = page.has_next_page;
        inner.query.set_page_info(has_more, page.total_pages);

        let before = inner.store.len();
        if self.skip_duplicates {
            inner.store.merge_unseen(page.records);
        } else {
            inner.store.merge(page.records);
        }
        let appended = inner.store.len() - before;

        inner.state = ViewState::Loaded { has_more };
        inner.settled = Resume::Loaded { has_more };
        let view = sort_records(inner.store.all(), inner.query.sort_key());
        let page_number = inner.query.page();
        drop(inner);

        tracing::info!(
            page = page_number,
            appended,
            total = view.len(),
            has_more,
            "page merged"
        );
        self.render.loading(false);
        self.render.render(&view);

        Ok(Transition::Loaded { has_more, appended })
    }
}
