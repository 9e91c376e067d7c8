//! FreeAPI public books source.
//!
//! Queries `GET <base>?page=<n>&query=<term>` and expects:
//!
//! ```json
//! { "success": true,
//!   "data": { "data": [ { "id": 1, "volumeInfo": { "title": "..." } } ],
//!             "nextPage": true, "totalPages": 10 } }
//! ```
//!
//! No API key is required.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::config::ApiConfig;
use crate::models::BookRecord;
use crate::sources::{FetchError, PageFetcher, PageResult};
use crate::utils::{HttpClient, DEFAULT_USER_AGENT};

/// Errors raised while constructing a [`FreeApiFetcher`]
#[derive(Debug, thiserror::Error)]
pub enum FetcherBuildError {
    #[error("Invalid API base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP fetcher for the public books endpoint
#[derive(Debug, Clone)]
pub struct FreeApiFetcher {
    client: HttpClient,
    base_url: Url,
}

impl FreeApiFetcher {
    pub fn new(config: &ApiConfig) -> Result<Self, FetcherBuildError> {
        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let client =
            HttpClient::with_settings(user_agent, Duration::from_secs(config.timeout_seconds))?;
        Self::with_client(client, &config.base_url)
    }

    /// Build on top of an existing client
    pub fn with_client(client: HttpClient, base_url: &str) -> Result<Self, FetcherBuildError> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl PageFetcher for FreeApiFetcher {
    #[tracing::instrument(skip(self), fields(base = %self.base_url))]
    async fn fetch_page(&self, term: &str, page: u32) -> Result<PageResult, FetchError> {
        let page = page.max(1);

        let response = self
            .client
            .client()
            .get(self.base_url.clone())
            .query(&[("page", page.to_string()), ("query", term.to_string())])
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, "catalog returned error status");
            return Err(FetchError::Http(status.as_u16()));
        }

        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body)?;

        let page_result = parse_page(&payload)?;
        tracing::debug!(
            records = page_result.records.len(),
            has_next = page_result.has_next_page,
            total_pages = page_result.total_pages,
            "fetched catalog page"
        );
        Ok(page_result)
    }
}

/// Validate the response envelope and normalise its records
pub(crate) fn parse_page(payload: &Value) -> Result<PageResult, FetchError> {
    if payload.get("success").and_then(Value::as_bool) != Some(true) {
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("No data received from API");
        return Err(FetchError::Malformed(message.to_string()));
    }

    let data = payload
        .get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| FetchError::Malformed("No data received from API".to_string()))?;

    let raw_records = data
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::Malformed("Response data has no record list".to_string()))?;

    let records: Vec<BookRecord> = raw_records
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let record = normalize_record(raw);
            if record.is_none() {
                tracing::warn!(index, "dropping unreadable catalog record");
            }
            record
        })
        .collect();

    let has_next_page = data
        .get("nextPage")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let total_pages = data
        .get("totalPages")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(1);

    Ok(PageResult {
        records,
        has_next_page,
        total_pages,
    })
}

/// Map one raw record onto a [`BookRecord`].
///
/// Absent or mistyped fields become `None`. Returns `None` only when the
/// record is not a JSON object at all.
pub(crate) fn normalize_record(raw: &Value) -> Option<BookRecord> {
    let raw = raw.as_object()?;
    let info = raw.get("volumeInfo").filter(|v| v.is_object());
    let field = |name: &str| info.and_then(|i| string_field(i.get(name)));

    let id = match raw.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let authors = info.and_then(|i| match i.get("authors") {
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(|a| a.as_str().map(str::to_string))
                .collect(),
        ),
        Some(Value::String(single)) => Some(vec![single.clone()]),
        _ => None,
    });

    let thumbnail_url = info
        .and_then(|i| i.get("imageLinks"))
        .and_then(|links| string_field(links.get("thumbnail")));

    Some(BookRecord {
        id,
        title: field("title"),
        authors,
        publisher: field("publisher"),
        published_date: field("publishedDate"),
        info_link: field("infoLink"),
        thumbnail_url,
    })
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}
