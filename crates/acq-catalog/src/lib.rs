//! acq-catalog
//!
//! Blocking HTTP adapter for the SciHub OpenSearch catalog.
//!
//! One request per [`CatalogSource::search_page`] call; no retries. Paging is
//! owned by `acq-reconcile`.

mod feed;

use std::fmt;
use std::time::Duration;

use acq_reconcile::{CatalogEntry, CatalogSource, Page, SourceError};
use tracing::debug;

use crate::feed::SearchResponse;

pub const DEFAULT_BASE_URL: &str = "https://scihub.copernicus.eu/apihub";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest response-body excerpt carried in a status error.
const ERROR_BODY_LIMIT: usize = 512;

/// Basic-auth credentials. Resolved by the caller (CLI) and passed in; do not log.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    /// Accept self-signed / mismatched certificates.
    pub accept_invalid_certs: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::blocking::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl CatalogClient {
    pub fn new(credentials: Option<Credentials>) -> Result<Self, SourceError> {
        Self::new_with_base_url(DEFAULT_BASE_URL, credentials, &ClientOptions::default())
    }

    pub fn new_with_base_url(
        base_url: impl Into<String>,
        credentials: Option<Credentials>,
        options: &ClientOptions,
    ) -> Result<Self, SourceError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()
            .map_err(|e| SourceError::Transport(format!("http client build failed: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            credentials,
        })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

impl CatalogSource for CatalogClient {
    fn name(&self) -> &str {
        "scihub"
    }

    fn search_page(
        &self,
        query: &str,
        offset: usize,
        size: usize,
    ) -> Result<Page<CatalogEntry>, SourceError> {
        let rows = size.to_string();
        let start = offset.to_string();
        debug!(offset, size, "catalog page request");

        let mut req = self.http.get(self.search_url()).query(&[
            ("q", query),
            ("rows", rows.as_str()),
            ("start", start.as_str()),
            ("format", "json"),
        ]);
        if let Some(c) = &self.credentials {
            req = req.basic_auth(&c.username, Some(&c.password));
        }

        let resp = req
            .send()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| SourceError::Transport(format!("reading response body: {e}")))?;

        if !status.is_success() {
            return Err(SourceError::Status {
                code: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| SourceError::Decode(format!("catalog feed: {e}")))?;

        let page = parsed.feed.into_page();
        debug!(
            offset,
            returned = page.items.len(),
            skipped = page.skipped,
            total = ?page.total,
            "catalog page received"
        );
        Ok(page)
    }
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
