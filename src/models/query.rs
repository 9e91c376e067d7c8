//! Query state: search term, sort key and page cursor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::CatalogError;

/// Display order applied to the accumulated records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Accumulation order (page order, then order within each page)
    #[default]
    None,
    TitleAsc,
    TitleDesc,
    /// Newest first
    DateDesc,
    /// Oldest first
    DateAsc,
}

impl SortKey {
    /// All sort keys, in menu order
    pub const ALL: [SortKey; 5] = [
        SortKey::None,
        SortKey::TitleAsc,
        SortKey::TitleDesc,
        SortKey::DateDesc,
        SortKey::DateAsc,
    ];

    /// Canonical name used in preferences and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::None => "none",
            SortKey::TitleAsc => "title-asc",
            SortKey::TitleDesc => "title-desc",
            SortKey::DateDesc => "date-desc",
            SortKey::DateAsc => "date-asc",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::None => "Relevance",
            SortKey::TitleAsc => "Title (A-Z)",
            SortKey::TitleDesc => "Title (Z-A)",
            SortKey::DateDesc => "Newest first",
            SortKey::DateAsc => "Oldest first",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a sort key name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sort key: {0}")]
pub struct SortKeyParseError(pub String);

impl FromStr for SortKey {
    type Err = SortKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" | "relevance" => Ok(SortKey::None),
            "title-asc" | "title" => Ok(SortKey::TitleAsc),
            "title-desc" => Ok(SortKey::TitleDesc),
            "date-desc" | "date" | "newest" => Ok(SortKey::DateDesc),
            "date-asc" | "oldest" => Ok(SortKey::DateAsc),
            other => Err(SortKeyParseError(other.to_string())),
        }
    }
}

/// Current search parameters and pagination cursor.
///
/// `page` starts at 1, moves forward only through [`QueryState::advance_page`]
/// and returns to 1 whenever the search term changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    search_term: String,
    sort_key: SortKey,
    page: u32,
    has_more_pages: bool,
    total_pages: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            sort_key: SortKey::None,
            page: 1,
            has_more_pages: true,
            total_pages: 1,
        }
    }
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more_pages(&self) -> bool {
        self.has_more_pages
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Set a new search term and rewind to the first page.
    ///
    /// The term is trimmed and lower-cased the same way the search box does.
    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = normalize_term(term);
        self.page = 1;
        self.has_more_pages = true;
        self.total_pages = 1;
    }

    /// Change the display order. Never triggers a fetch.
    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
    }

    /// Move the cursor to the next page
    pub fn advance_page(&mut self) -> Result<u32, CatalogError> {
        if !self.has_more_pages {
            return Err(CatalogError::InvalidState(format!(
                "no page after {} for \"{}\"",
                self.page, self.search_term
            )));
        }
        self.page += 1;
        Ok(self.page)
    }

    /// Record the pagination flags reported with the page just fetched
    pub fn set_page_info(&mut self, has_more_pages: bool, total_pages: u32) {
        self.has_more_pages = has_more_pages;
        self.total_pages = total_pages.max(1);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Normalise a raw search box entry into the term sent to the API
fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}
