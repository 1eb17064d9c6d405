//! Source boundary: the two systems of record as seen by the engine.
//!
//! Implementations perform exactly one request per call and never retry;
//! the engine owns the paging loop.

use serde_json::Value;

use crate::{CatalogEntry, IndexHit, Page, SourceError};

/// External acquisition catalog (offset-paged free-text search).
pub trait CatalogSource {
    /// Short name used in logs and error messages (e.g. `"scihub"`).
    fn name(&self) -> &str;

    /// Fetch the page of entries starting at `offset` for `query`.
    fn search_page(
        &self,
        query: &str,
        offset: usize,
        size: usize,
    ) -> Result<Page<CatalogEntry>, SourceError>;
}

/// Local search index (offset-paged JSON query DSL).
pub trait IndexSource {
    /// Short name used in logs and error messages (e.g. `"grq"`).
    fn name(&self) -> &str;

    /// Fetch the page of hits starting at `from` for `query` against `index`.
    fn search_page(
        &self,
        index: &str,
        query: &Value,
        from: usize,
        size: usize,
    ) -> Result<Page<IndexHit>, SourceError>;

    /// Documents whose `field` term-matches `id` (AOI lookup).
    fn find_by_id_field(
        &self,
        index: &str,
        field: &str,
        id: &str,
    ) -> Result<Vec<IndexHit>, SourceError>;
}

impl<T: CatalogSource + ?Sized> CatalogSource for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn search_page(
        &self,
        query: &str,
        offset: usize,
        size: usize,
    ) -> Result<Page<CatalogEntry>, SourceError> {
        (**self).search_page(query, offset, size)
    }
}

impl<T: IndexSource + ?Sized> IndexSource for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn search_page(
        &self,
        index: &str,
        query: &Value,
        from: usize,
        size: usize,
    ) -> Result<Page<IndexHit>, SourceError> {
        (**self).search_page(index, query, from, size)
    }

    fn find_by_id_field(
        &self,
        index: &str,
        field: &str,
        id: &str,
    ) -> Result<Vec<IndexHit>, SourceError> {
        (**self).find_by_id_field(index, field, id)
    }
}
