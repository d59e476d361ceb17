//! Sequential multi-page fetching with fail-fast error reporting.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::http_client::{HttpClient, HttpErrorKind, HttpRequest};
use crate::transform::RawRecord;

/// Classified failure of a remote request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP error {status} for {url}")]
    Http { status: u16, url: String },

    #[error("request timed out: {message}")]
    Timeout { message: String },

    #[error("connection error: {message}")]
    Connection { message: String },

    #[error("request error: {message}")]
    Request { message: String },
}

/// Query parameters of one page, e.g. `[("start", "2020-01-01"), ("end", "2020-12-25")]`.
pub type PageParams = Vec<(String, String)>;

/// Issues one GET per page against a shared transport and concatenates the
/// parsed payloads.
#[derive(Clone)]
pub struct PagedFetcher {
    client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl PagedFetcher {
    pub fn new(client: Arc<dyn HttpClient>, timeout_ms: u64) -> Self {
        Self { client, timeout_ms }
    }

    /// Fetch every page in order.
    ///
    /// Returns the concatenation of all pages, or the first failure; records
    /// of pages fetched before a failure are discarded.
    pub async fn fetch_pages(
        &self,
        url: &str,
        pages: &[PageParams],
    ) -> Result<Vec<RawRecord>, FetchError> {
        let mut records = Vec::new();
        for (index, params) in pages.iter().enumerate() {
            let page = self.fetch_page(url, params).await.inspect_err(|error| {
                tracing::warn!(url, page = index + 1, total = pages.len(), %error, "page fetch failed");
            })?;
            tracing::debug!(url, page = index + 1, total = pages.len(), rows = page.len(), "fetched page");
            records.extend(page);
        }
        Ok(records)
    }

    /// Fetch a single page.
    pub async fn fetch_page(&self, url: &str, params: &[(String, String)]) -> Result<Vec<RawRecord>, FetchError> {
        let mut request = HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms);
        for (name, value) in params {
            request = request.with_query(name.clone(), value.clone());
        }

        let full_url = request.full_url();
        let response = self.client.execute(request).await.map_err(|error| {
            let message = error.message().to_owned();
            match error.kind() {
                HttpErrorKind::Timeout => FetchError::Timeout { message },
                HttpErrorKind::Connection => FetchError::Connection { message },
                HttpErrorKind::Request => FetchError::Request { message },
            }
        })?;

        if !response.is_success() {
            return Err(FetchError::Http {
                status: response.status,
                url: full_url,
            });
        }

        let payload: Value = serde_json::from_str(&response.body).map_err(|error| FetchError::Request {
            message: format!("invalid JSON from {full_url}: {error}"),
        })?;
        into_records(payload, &full_url)
    }
}

/// A lone object counts as a one-element page.
fn into_records(payload: Value, url: &str) -> Result<Vec<RawRecord>, FetchError> {
    let unexpected = || FetchError::Request {
        message: format!("unexpected payload shape from {url}"),
    };

    match payload {
        Value::Object(record) => Ok(vec![record]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record),
                _ => Err(unexpected()),
            })
            .collect(),
        _ => Err(unexpected()),
    }
}
