use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::geometry::Polygon;

/// Default catalog source tag appended to derived acquisition ids.
pub const DEFAULT_SOURCE_TAG: &str = "esa_scihub";

/// One acquisition as seen by either system of record.
///
/// `ingestion_time` is `None` when the origin omitted it or sent something
/// unparseable. `Option` ordering puts `None` below every `Some`, which is
/// exactly the "older than anything" rule the comparison needs.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct AcquisitionRecord {
    pub id: String,
    pub title: String,
    pub ingestion_time: Option<DateTime<Utc>>,
    pub track_number: Option<u32>,
}

impl AcquisitionRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        ingestion_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ingestion_time,
            track_number: None,
        }
    }

    pub fn with_track(mut self, track_number: u32) -> Self {
        self.track_number = Some(track_number);
        self
    }

    /// `true` when this copy was ingested strictly before `other`.
    pub fn is_older_than(&self, other: &AcquisitionRecord) -> bool {
        self.ingestion_time < other.ingestion_time
    }
}

/// Maps catalog titles onto the id scheme used by the index.
///
/// The index stores catalog-derived acquisitions as
/// `acquisition-<title>-<source_tag>`; index hits keep their native id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityScheme {
    pub source_tag: String,
}

impl IdentityScheme {
    pub fn new(source_tag: impl Into<String>) -> Self {
        Self {
            source_tag: source_tag.into(),
        }
    }

    pub fn catalog_id(&self, title: &str) -> String {
        format!("acquisition-{}-{}", title, self.source_tag)
    }
}

impl Default for IdentityScheme {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_TAG)
    }
}

/// Id-unique collection of records from one query.
///
/// Duplicates collapse to the freshest copy; on equal ingestion times the
/// first record seen is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: BTreeMap<String, AcquisitionRecord>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record`, keeping whichever copy of its id is freshest.
    /// Returns `true` if `record` was stored.
    pub fn insert_freshest(&mut self, record: AcquisitionRecord) -> bool {
        match self.records.entry(record.id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
            Entry::Occupied(mut slot) => {
                if slot.get().is_older_than(&record) {
                    slot.insert(record);
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&AcquisitionRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(|k| k.as_str())
    }

    /// Records in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &AcquisitionRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<AcquisitionRecord> for RecordSet {
    fn from_iter<T: IntoIterator<Item = AcquisitionRecord>>(iter: T) -> Self {
        let mut set = RecordSet::new();
        for r in iter {
            set.insert_freshest(r);
        }
        set
    }
}

/// A named geographic + temporal region loaded from the AOI index.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaOfInterest {
    pub id: String,
    pub polygon: Polygon,
    /// Inclusive start of the window.
    pub start: DateTime<Utc>,
    /// Exclusive end of the window.
    pub end: DateTime<Utc>,
}

/// Spatio-temporal bounds plus the exact-match track filter.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryWindow {
    pub aoi: AreaOfInterest,
    pub track_number: u32,
}

impl QueryWindow {
    pub fn new(aoi: AreaOfInterest, track_number: u32) -> Self {
        Self { aoi, track_number }
    }
}

/// Outcome of one reconciliation pass. Both lists are sorted by id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    /// In the catalog, absent from the index.
    pub missing: Vec<AcquisitionRecord>,
    /// In both; carries the catalog copy, which is newer than the index copy.
    pub stale: Vec<AcquisitionRecord>,
    /// Distinct catalog ids after duplicate collapse.
    pub catalog_count: usize,
    /// Distinct index ids after duplicate collapse.
    pub index_count: usize,
}

impl ReconciliationResult {
    pub fn is_fully_reconciled(&self) -> bool {
        self.missing.is_empty() && self.stale.is_empty()
    }

    /// Number of acquisitions that need (re)fetching.
    pub fn outstanding(&self) -> usize {
        self.missing.len() + self.stale.len()
    }

    pub fn missing_ids(&self) -> Vec<&str> {
        self.missing.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn stale_ids(&self) -> Vec<&str> {
        self.stale.iter().map(|r| r.id.as_str()).collect()
    }
}
