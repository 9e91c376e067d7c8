//! Book model representing a single record returned by the catalog API.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// Cover image shown when a record carries no thumbnail
pub const PLACEHOLDER_THUMBNAIL: &str = "https://via.placeholder.com/128x192?text=No+Cover";

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_AUTHOR: &str = "Unknown Author";
const UNKNOWN_PUBLISHER: &str = "Unknown Publisher";
const UNKNOWN_DATE: &str = "Unknown";
const EMPTY_LINK: &str = "#";
const COVER_ALT: &str = "Book cover";

/// A book as delivered by the remote catalog.
///
/// Every field is optional. Accumulation and sorting work on the raw options;
/// the `display_*` accessors resolve the fallbacks shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Identifier assigned by the remote API
    pub id: Option<String>,

    /// Book title
    pub title: Option<String>,

    /// Author names, in the order the API lists them
    pub authors: Option<Vec<String>>,

    /// Publisher name
    pub publisher: Option<String>,

    /// Publication date as received (ISO-ish, may be just a year)
    pub published_date: Option<String>,

    /// Link to the book's detail page
    pub info_link: Option<String>,

    /// Cover thumbnail URL
    pub thumbnail_url: Option<String>,
}

impl BookRecord {
    /// Key used to recognise the same record across re-fetches.
    ///
    /// Prefers the API id, then the info link, then title and date together.
    /// Returns `None` when the record carries nothing to identify it by.
    pub fn identity_key(&self) -> Option<String> {
        if let Some(id) = non_blank(&self.id) {
            return Some(format!("id:{}", id));
        }
        if let Some(link) = non_blank(&self.info_link) {
            return Some(format!("link:{}", link));
        }
        match (non_blank(&self.title), non_blank(&self.published_date)) {
            (None, None) => None,
            (title, date) => Some(format!(
                "title:{}|{}",
                title.unwrap_or_default(),
                date.unwrap_or_default()
            )),
        }
    }

    /// Title used for sorting; absent titles compare as the empty string
    pub fn sort_title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Parsed publication date, if present and understood
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.published_date.as_deref().and_then(parse_published_date)
    }

    pub fn display_title(&self) -> &str {
        non_blank(&self.title).unwrap_or(UNKNOWN_TITLE)
    }

    /// Authors joined with commas, or a fallback when none are listed
    pub fn display_authors(&self) -> String {
        let names: Vec<&str> = self
            .authors
            .iter()
            .flatten()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();

        if names.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            names.join(", ")
        }
    }

    pub fn display_publisher(&self) -> &str {
        non_blank(&self.publisher).unwrap_or(UNKNOWN_PUBLISHER)
    }

    /// Long-form publication date such as "March 12, 2005".
    ///
    /// A date that is present but cannot be parsed is shown as received.
    pub fn display_published_date(&self) -> String {
        match non_blank(&self.published_date) {
            None => UNKNOWN_DATE.to_string(),
            Some(raw) => match parse_published_date(raw) {
                Some(date) => date.format("%B %-d, %Y").to_string(),
                None => raw.to_string(),
            },
        }
    }

    pub fn display_info_link(&self) -> &str {
        non_blank(&self.info_link).unwrap_or(EMPTY_LINK)
    }

    pub fn display_thumbnail(&self) -> &str {
        non_blank(&self.thumbnail_url).unwrap_or(PLACEHOLDER_THUMBNAIL)
    }

    /// Alternative text for the cover image
    pub fn cover_alt(&self) -> &str {
        non_blank(&self.title).unwrap_or(COVER_ALT)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Parse the loosely formatted dates the catalog returns.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD`, `YYYY-MM` and `YYYY`.
pub fn parse_published_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d") {
        return Some(date);
    }
    if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        return raw
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1));
    }

    None
}

/// Builder for constructing BookRecord objects
#[derive(Debug, Clone, Default)]
pub struct BookBuilder {
    book: BookRecord,
}

impl BookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.book.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.book.title = Some(title.into());
        self
    }

    /// Append an author
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.book
            .authors
            .get_or_insert_with(Vec::new)
            .push(author.into());
        self
    }

    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.book.publisher = Some(publisher.into());
        self
    }

    pub fn published_date(mut self, date: impl Into<String>) -> Self {
        self.book.published_date = Some(date.into());
        self
    }

    pub fn info_link(mut self, link: impl Into<String>) -> Self {
        self.book.info_link = Some(link.into());
        self
    }

    pub fn thumbnail_url(mut self, url: impl Into<String>) -> Self {
        self.book.thumbnail_url = Some(url.into());
        self
    }

    pub fn build(self) -> BookRecord {
        self.book
    }
}
