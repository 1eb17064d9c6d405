use tracing::info;

use crate::pagination::paginate_filtered;
use crate::query::{acquisition_query, CatalogQuery, AOI_ID_FIELD};
use crate::wire::{area_of_interest_from_hit, normalize_catalog_entry, normalize_index_hit};
use crate::{
    CatalogSource, IdentityScheme, IndexSource, QueryWindow, ReconcileError,
    ReconciliationResult, RecordSet,
};

/// Catalog page size the public search endpoint enforces.
pub const DEFAULT_CATALOG_PAGE_SIZE: usize = 100;
/// Index page size used for acquisition searches.
pub const DEFAULT_INDEX_PAGE_SIZE: usize = 1000;

/// Where to look and how to page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    pub aoi_index: String,
    pub acquisition_index: String,
    pub catalog_page_size: usize,
    pub index_page_size: usize,
    pub identity: IdentityScheme,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            aoi_index: "grq_*_area_of_interest".to_string(),
            acquisition_index: "grq_*_acquisition-s1-iw_slc".to_string(),
            catalog_page_size: DEFAULT_CATALOG_PAGE_SIZE,
            index_page_size: DEFAULT_INDEX_PAGE_SIZE,
            identity: IdentityScheme::default(),
        }
    }
}

/// Pure set comparison of already-collapsed catalog and index records.
///
/// - catalog id not in index => `missing`
/// - id in both, index copy older => `stale` (catalog copy reported)
/// - index-only ids are ignored
pub fn reconcile_sets(catalog: &RecordSet, index: &RecordSet) -> ReconciliationResult {
    let mut missing = Vec::new();
    let mut stale = Vec::new();

    for remote in catalog.iter() {
        match index.get(&remote.id) {
            None => missing.push(remote.clone()),
            Some(local) if local.is_older_than(remote) => stale.push(remote.clone()),
            Some(_) => {}
        }
    }

    // RecordSet iterates in id order; both lists are already sorted.
    ReconciliationResult {
        missing,
        stale,
        catalog_count: catalog.len(),
        index_count: index.len(),
    }
}

/// Resolve `aoi_id` in the AOI index and build the query window for `track_number`.
pub fn load_window<I: IndexSource>(
    index: &I,
    aoi_index: &str,
    aoi_id: &str,
    track_number: u32,
) -> Result<QueryWindow, ReconcileError> {
    let hits = index
        .find_by_id_field(aoi_index, AOI_ID_FIELD, aoi_id)
        .map_err(|e| ReconcileError::upstream(index.name(), e))?;

    let hit = hits.first().ok_or_else(|| ReconcileError::NotFound {
        index: aoi_index.to_string(),
        id: aoi_id.to_string(),
    })?;

    let aoi = area_of_interest_from_hit(hit)?;
    info!(
        aoi = %aoi.id,
        start = %aoi.start,
        end = %aoi.end,
        track = track_number,
        "loaded area of interest"
    );
    Ok(QueryWindow::new(aoi, track_number))
}

/// Catalog-vs-index reconciliation over one query window.
///
/// Both sources are queried sequentially and read-only. Any failed page
/// aborts the run with [`ReconcileError::UpstreamQueryFailure`].
pub struct ReconciliationEngine<C, I> {
    catalog: C,
    index: I,
    options: EngineOptions,
}

impl<C: CatalogSource, I: IndexSource> ReconciliationEngine<C, I> {
    pub fn new(catalog: C, index: I, options: EngineOptions) -> Self {
        Self {
            catalog,
            index,
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// AOI precondition fetch against the configured AOI index.
    pub fn load_window(&self, aoi_id: &str, track_number: u32) -> Result<QueryWindow, ReconcileError> {
        load_window(&self.index, &self.options.aoi_index, aoi_id, track_number)
    }

    /// Every catalog acquisition in `window`, duplicates collapsed.
    pub fn fetch_catalog(&self, window: &QueryWindow) -> Result<RecordSet, ReconcileError> {
        let query = CatalogQuery::new(window).to_query_string();
        info!(source = self.catalog.name(), query = %query, "querying catalog");

        let identity = &self.options.identity;
        let records = paginate_filtered(
            self.options.catalog_page_size,
            |offset, size| self.catalog.search_page(&query, offset, size),
            |_| true,
            |entry| normalize_catalog_entry(&entry, identity),
        )
        .map_err(|e| ReconcileError::upstream(self.catalog.name(), e))?;

        let fetched = records.len();
        let set: RecordSet = records.into_iter().collect();
        info!(fetched, distinct = set.len(), "catalog query complete");
        Ok(set)
    }

    /// Every index acquisition in `window`, duplicates collapsed.
    pub fn fetch_index(&self, window: &QueryWindow) -> Result<RecordSet, ReconcileError> {
        let query = acquisition_query(window);
        let index_name = &self.options.acquisition_index;
        info!(source = self.index.name(), index = %index_name, "querying index");

        let records = paginate_filtered(
            self.options.index_page_size,
            |from, size| self.index.search_page(index_name, &query, from, size),
            |_| true,
            |hit| normalize_index_hit(&hit),
        )
        .map_err(|e| ReconcileError::upstream(self.index.name(), e))?;

        let fetched = records.len();
        let set: RecordSet = records.into_iter().collect();
        info!(fetched, distinct = set.len(), "index query complete");
        Ok(set)
    }

    /// Fetch both sides for `window` and compare them.
    pub fn reconcile(&self, window: &QueryWindow) -> Result<ReconciliationResult, ReconcileError> {
        let catalog = self.fetch_catalog(window)?;
        let index = self.fetch_index(window)?;
        let result = reconcile_sets(&catalog, &index);
        info!(
            missing = result.missing.len(),
            stale = result.stale.len(),
            "reconciliation complete"
        );
        Ok(result)
    }

    /// [`load_window`](Self::load_window) followed by [`reconcile`](Self::reconcile).
    pub fn reconcile_aoi(
        &self,
        aoi_id: &str,
        track_number: u32,
    ) -> Result<ReconciliationResult, ReconcileError> {
        let window = self.load_window(aoi_id, track_number)?;
        self.reconcile(&window)
    }
}
