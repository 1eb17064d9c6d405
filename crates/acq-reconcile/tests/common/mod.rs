//! In-process catalog / index doubles shared by the scenario tests.
#![allow(dead_code)]

use std::cell::RefCell;

use acq_reconcile::{
    AreaOfInterest, CatalogEntry, CatalogSource, IndexHit, IndexSource, NamedValue, Page,
    Polygon, QueryWindow, SourceError,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

pub fn catalog_entry(title: &str, ingestion: &str) -> CatalogEntry {
    CatalogEntry {
        title: Some(title.to_string()),
        date: vec![NamedValue {
            name: "ingestiondate".to_string(),
            content: json!(ingestion),
        }],
        ..CatalogEntry::default()
    }
}

pub fn acquisition_id(title: &str) -> String {
    format!("acquisition-{title}-esa_scihub")
}

pub fn acquisition_hit(title: &str, ingestion: &str) -> IndexHit {
    IndexHit::new(
        acquisition_id(title),
        json!({ "metadata": { "title": title, "ingestiondate": ingestion } }),
    )
}

pub fn aoi_hit(id: &str) -> IndexHit {
    IndexHit::new(
        id,
        json!({
            "id": id,
            "starttime": "2018-01-01T00:00:00",
            "endtime": "2018-03-01T00:00:00",
            "location": {
                "type": "polygon",
                "coordinates": [[[-118.0, 34.0], [-117.0, 34.0], [-117.0, 35.0], [-118.0, 35.0], [-118.0, 34.0]]]
            }
        }),
    )
}

pub fn window() -> QueryWindow {
    QueryWindow::new(
        AreaOfInterest {
            id: "AOI_test".to_string(),
            polygon: Polygon::from_location(&json!([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]))
                .unwrap(),
            start: Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2018, 3, 1, 0, 0, 0).unwrap(),
        },
        64,
    )
}

fn page_of<T: Clone>(all: &[T], offset: usize, size: usize) -> Page<T> {
    let items = all.iter().skip(offset).take(size).cloned().collect();
    Page::new(Some(all.len() as u64), items)
}

/// Catalog double: serves `entries` in fixed pages, optionally failing at one offset.
#[derive(Default)]
pub struct MockCatalog {
    pub entries: Vec<CatalogEntry>,
    pub fail_at_offset: Option<usize>,
    pub offsets: RefCell<Vec<usize>>,
}

impl MockCatalog {
    pub fn with(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.offsets.borrow().len()
    }
}

impl CatalogSource for MockCatalog {
    fn name(&self) -> &str {
        "mock-catalog"
    }

    fn search_page(
        &self,
        _query: &str,
        offset: usize,
        size: usize,
    ) -> Result<Page<CatalogEntry>, SourceError> {
        self.offsets.borrow_mut().push(offset);
        if self.fail_at_offset == Some(offset) {
            return Err(SourceError::Status {
                code: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(page_of(&self.entries, offset, size))
    }
}

/// Index double: acquisition hits plus an AOI table.
#[derive(Default)]
pub struct MockIndex {
    pub hits: Vec<IndexHit>,
    pub aois: Vec<IndexHit>,
    pub fail_at_offset: Option<usize>,
    pub offsets: RefCell<Vec<usize>>,
    pub queries: RefCell<Vec<Value>>,
}

impl MockIndex {
    pub fn with(hits: Vec<IndexHit>) -> Self {
        Self {
            hits,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.offsets.borrow().len()
    }
}

impl IndexSource for MockIndex {
    fn name(&self) -> &str {
        "mock-index"
    }

    fn search_page(
        &self,
        _index: &str,
        query: &Value,
        from: usize,
        size: usize,
    ) -> Result<Page<IndexHit>, SourceError> {
        self.offsets.borrow_mut().push(from);
        self.queries.borrow_mut().push(query.clone());
        if self.fail_at_offset == Some(from) {
            return Err(SourceError::Transport("connection reset".to_string()));
        }
        Ok(page_of(&self.hits, from, size))
    }

    fn find_by_id_field(
        &self,
        _index: &str,
        _field: &str,
        id: &str,
    ) -> Result<Vec<IndexHit>, SourceError> {
        Ok(self.aois.iter().filter(|h| h.id == id).cloned().collect())
    }
}
