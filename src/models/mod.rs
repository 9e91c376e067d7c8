//! Core data models for book records and query state.

mod book;
mod query;

pub use book::{parse_published_date, BookBuilder, BookRecord, PLACEHOLDER_THUMBNAIL};
pub use query::{QueryState, SortKey, SortKeyParseError};
