//! Product counts per AOI tag.
//!
//! Interferogram products are tagged with the AOI ids they were generated
//! for. A product carrying several tags is counted once under each.

use std::collections::BTreeMap;

use acq_reconcile::IndexHit;
use serde_json::{json, Value};

const TAGS_FIELD: &str = "metadata.tags.raw";

/// Products created after `start` (exclusive, up to now) tagged with any of
/// `aoi_ids`. `None` when `aoi_ids` is empty.
pub fn product_query(aoi_ids: &[String], start: &str) -> Option<Value> {
    if aoi_ids.is_empty() {
        return None;
    }
    Some(json!({
        "query": { "bool": { "must": [
            { "range": { "creation_timestamp": { "gt": start, "lt": "now" } } },
            { "query_string": { "default_field": TAGS_FIELD, "query": aoi_ids.join(" OR ") } }
        ] } }
    }))
}

/// Product ids grouped by tag, in tag order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCounts {
    pub by_tag: BTreeMap<String, Vec<String>>,
}

impl TagCounts {
    pub fn count(&self, tag: &str) -> usize {
        self.by_tag.get(tag).map_or(0, Vec::len)
    }

    /// Sum of the per-tag counts (multi-tagged products count once per tag).
    pub fn total(&self) -> usize {
        self.by_tag.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

pub fn count_by_tag<'a>(hits: impl IntoIterator<Item = &'a IndexHit>) -> TagCounts {
    let mut by_tag: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for hit in hits {
        for tag in tags_of(hit) {
            by_tag.entry(tag.to_string()).or_default().push(hit.id.clone());
        }
    }
    TagCounts { by_tag }
}

fn tags_of(hit: &IndexHit) -> Vec<&str> {
    match hit.source.pointer("/metadata/tags") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}
