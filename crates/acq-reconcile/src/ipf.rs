//! ipf-completeness: index acquisitions whose processing version (IPF) has
//! not been filled in yet.
//!
//! Same paging primitive as the reconciliation; the variant only swaps the
//! query, the predicate and the id extractor.

use serde_json::Value;
use tracing::info;

use crate::engine::load_window;
use crate::pagination::paginate_filtered;
use crate::query::ipf_query;
use crate::{IndexHit, IndexSource, QueryWindow, ReconcileError};

const DEPRECATED_TAG: &str = "deprecated";

/// `true` when the hit carries the `deprecated` tag (string or list form).
pub fn is_deprecated(hit: &IndexHit) -> bool {
    match hit.source.pointer("/metadata/tags") {
        Some(Value::String(tag)) => tag == DEPRECATED_TAG,
        Some(Value::Array(tags)) => tags.iter().any(|t| t.as_str() == Some(DEPRECATED_TAG)),
        _ => false,
    }
}

/// `true` when `metadata.processing_version` is absent, null or blank.
pub fn lacks_processing_version(hit: &IndexHit) -> bool {
    match hit.source.pointer("/metadata/processing_version") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Reports non-deprecated acquisitions in a window that still lack an IPF.
pub struct IpfChecker<I> {
    index: I,
    aoi_index: String,
    acquisition_index: String,
    page_size: usize,
}

impl<I: IndexSource> IpfChecker<I> {
    pub fn new(
        index: I,
        aoi_index: impl Into<String>,
        acquisition_index: impl Into<String>,
        page_size: usize,
    ) -> Self {
        Self {
            index,
            aoi_index: aoi_index.into(),
            acquisition_index: acquisition_index.into(),
            page_size,
        }
    }

    pub fn load_window(&self, aoi_id: &str, track_number: u32) -> Result<QueryWindow, ReconcileError> {
        load_window(&self.index, &self.aoi_index, aoi_id, track_number)
    }

    /// Sorted, de-duplicated ids of acquisitions missing their IPF.
    pub fn missing_ipf(&self, window: &QueryWindow) -> Result<Vec<String>, ReconcileError> {
        let query = ipf_query(window);
        info!(
            source = self.index.name(),
            index = %self.acquisition_index,
            "querying index for acquisitions without ipf"
        );

        let mut ids = paginate_filtered(
            self.page_size,
            |from, size| {
                self.index
                    .search_page(&self.acquisition_index, &query, from, size)
            },
            |hit| !is_deprecated(hit) && lacks_processing_version(hit),
            |hit| Some(hit.id),
        )
        .map_err(|e| ReconcileError::upstream(self.index.name(), e))?;

        ids.sort();
        ids.dedup();
        info!(missing = ids.len(), "ipf check complete");
        Ok(ids)
    }
}
