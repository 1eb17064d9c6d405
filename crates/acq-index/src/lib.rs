//! acq-index
//!
//! Blocking HTTP adapter for the local search index (GRQ).
//!
//! Implements [`IndexSource`] for the reconciliation engine and adds the
//! write / lookup calls the operator commands need: partial document
//! updates, existence checks and id listing.

pub mod products;
mod response;

use std::time::Duration;

use acq_reconcile::query::id_term_query;
use acq_reconcile::{paginate, IndexHit, IndexSource, Page, SourceError};
use reqwest::Url;
use serde_json::{json, Value};
use tracing::debug;

use crate::response::SearchResponse;

pub use products::{count_by_tag, product_query, TagCounts};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Page size for the AOI precondition lookup.
const LOOKUP_SIZE: usize = 10;
const ERROR_BODY_LIMIT: usize = 512;

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    /// Accept self-signed / mismatched certificates (GRQ often runs with both).
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
pub struct IndexClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl IndexClient {
    pub fn new(base_url: impl Into<String>, options: &ClientOptions) -> Result<Self, SourceError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()
            .map_err(|e| SourceError::Transport(format!("http client build failed: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// `base_url` plus `segments`, each percent-encoded as one path segment.
    fn url(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SourceError::Transport(format!("invalid base url '{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Transport(format!("base url '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `<index>/<type>/<id>/_update` (pre-7 servers) or `<index>/_update/<id>`.
    fn update_url(&self, index: &str, doc_type: Option<&str>, id: &str) -> Result<Url, SourceError> {
        match doc_type {
            Some(t) => self.url(&[index, t, id, "_update"]),
            None => self.url(&[index, "_update", id]),
        }
    }

    fn post_json(&self, url: Url, body: &Value) -> Result<Value, SourceError> {
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        read_json(resp)
    }

    fn search(&self, index: &str, body: &Value) -> Result<Page<IndexHit>, SourceError> {
        let raw = self.post_json(self.url(&[index, "_search"])?, body)?;
        let parsed: SearchResponse = serde_json::from_value(raw)
            .map_err(|e| SourceError::Decode(format!("search response: {e}")))?;
        Ok(parsed.hits.into_page())
    }

    /// `true` when a document with `_id == id` exists in `index` (patterns allowed).
    pub fn exists(&self, index: &str, id: &str) -> Result<bool, SourceError> {
        let body = json!({ "query": { "ids": { "values": [id] } }, "size": 0 });
        let page = self.search(index, &body)?;
        Ok(page.total.unwrap_or(0) > 0)
    }

    /// Every document `_id` in `index`, paged at `page_size`.
    pub fn list_ids(&self, index: &str, page_size: usize) -> Result<Vec<String>, SourceError> {
        let query = json!({ "query": { "match_all": {} } });
        let hits = paginate(page_size, |from, size| self.search_page(index, &query, from, size))?;
        Ok(hits.into_iter().map(|h| h.id).collect())
    }

    /// Partial update: merge `doc` into the stored document `id`.
    pub fn update_doc(
        &self,
        index: &str,
        doc_type: Option<&str>,
        id: &str,
        doc: &Value,
    ) -> Result<(), SourceError> {
        let url = self.update_url(index, doc_type, id)?;
        debug!(%url, "partial document update");
        self.post_json(url, &json!({ "doc": doc }))?;
        Ok(())
    }
}

impl IndexSource for IndexClient {
    fn name(&self) -> &str {
        "grq"
    }

    fn search_page(
        &self,
        index: &str,
        query: &Value,
        from: usize,
        size: usize,
    ) -> Result<Page<IndexHit>, SourceError> {
        let mut body = match query {
            Value::Object(map) => map.clone(),
            other => {
                return Err(SourceError::Decode(format!(
                    "search body must be a JSON object, got {other}"
                )))
            }
        };
        body.insert("from".to_string(), json!(from));
        body.insert("size".to_string(), json!(size));

        debug!(index, from, size, "index page request");
        let page = self.search(index, &Value::Object(body))?;
        debug!(index, from, returned = page.items.len(), total = ?page.total, "index page received");
        Ok(page)
    }

    fn find_by_id_field(
        &self,
        index: &str,
        field: &str,
        id: &str,
    ) -> Result<Vec<IndexHit>, SourceError> {
        let page = self.search_page(index, &id_term_query(field, id), 0, LOOKUP_SIZE)?;
        Ok(page.items)
    }
}

fn read_json(resp: reqwest::blocking::Response) -> Result<Value, SourceError> {
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
    serde_json::from_str(&body).map_err(|e| SourceError::Decode(e.to_string()))
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let c = IndexClient::new("http://grq:9200/", &ClientOptions::default()).unwrap();
        assert_eq!(c.url(&["idx", "_search"]).unwrap().as_str(), "http://grq:9200/idx/_search");
    }

    #[test]
    fn update_url_encodes_id_and_type() {
        let c = IndexClient::new("http://grq:9200/es", &ClientOptions::default()).unwrap();
        assert_eq!(
            c.update_url("grq_acq", Some("acq type"), "a/b?c#d").unwrap().as_str(),
            "http://grq:9200/es/grq_acq/acq%20type/a%2Fb%3Fc%23d/_update"
        );
        assert_eq!(
            c.update_url("grq_acq", None, "plain-id").unwrap().as_str(),
            "http://grq:9200/es/grq_acq/_update/plain-id"
        );
    }

    #[test]
    fn unusable_base_url_is_an_error() {
        let c = IndexClient::new("not a url", &ClientOptions::default()).unwrap();
        assert!(matches!(c.url(&["idx"]), Err(SourceError::Transport(_))));
    }

    #[test]
    fn non_object_query_is_rejected_before_sending() {
        let c = IndexClient::new("http://127.0.0.1:1", &ClientOptions::default()).unwrap();
        let err = c.search_page("idx", &json!([1, 2]), 0, 10).unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }
}
