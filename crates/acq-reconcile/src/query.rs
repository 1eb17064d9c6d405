//! Query builders for both sources.

use serde_json::{json, Value};

use crate::time::format_query_time;
use crate::QueryWindow;

/// Field holding the AOI id in the AOI index.
pub const AOI_ID_FIELD: &str = "id.raw";

/// Catalog free-text query for Sentinel-1 IW SLC acquisitions over a window.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery<'a> {
    window: &'a QueryWindow,
}

impl<'a> CatalogQuery<'a> {
    pub fn new(window: &'a QueryWindow) -> Self {
        Self { window }
    }

    pub fn to_query_string(&self) -> String {
        let aoi = &self.window.aoi;
        format!(
            "relativeorbitnumber:{} AND IW AND producttype:SLC AND platformname:Sentinel-1 \
             AND beginposition:[{} TO {}] ( footprint:\"Intersects({})\")",
            self.window.track_number,
            format_query_time(&aoi.start),
            format_query_time(&aoi.end),
            aoi.polygon.to_wkt(),
        )
    }
}

fn window_bool(window: &QueryWindow) -> serde_json::Map<String, Value> {
    let aoi = &window.aoi;
    let mut b = serde_json::Map::new();
    b.insert(
        "must".to_string(),
        json!([{ "geo_shape": { "location": { "shape": aoi.polygon.to_geo_shape() } } }]),
    );
    b.insert(
        "filter".to_string(),
        json!([
            { "term": { "metadata.track_number": window.track_number } },
            { "range": { "endtime": { "gte": format_query_time(&aoi.start) } } },
            { "range": { "starttime": { "lt": format_query_time(&aoi.end) } } }
        ]),
    );
    b
}

/// Index query: acquisitions intersecting the AOI, on the track, overlapping
/// `[start, end)`.
pub fn acquisition_query(window: &QueryWindow) -> Value {
    json!({ "query": { "bool": Value::Object(window_bool(window)) } })
}

/// Index query for the ipf check: [`acquisition_query`] minus deprecated
/// records and records whose processing version is already filled.
pub fn ipf_query(window: &QueryWindow) -> Value {
    let mut b = window_bool(window);
    b.insert(
        "must_not".to_string(),
        json!([
            { "term": { "metadata.tags": "deprecated" } },
            { "exists": { "field": "metadata.processing_version.raw" } }
        ]),
    );
    json!({ "query": { "bool": Value::Object(b) } })
}

/// Term lookup used for the AOI precondition fetch.
pub fn id_term_query(field: &str, id: &str) -> Value {
    let mut term = serde_json::Map::new();
    term.insert(field.to_string(), Value::String(id.to_string()));
    json!({ "query": { "bool": { "must": [{ "term": Value::Object(term) }] } } })
}
