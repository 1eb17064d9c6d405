//! OpenSearch JSON feed returned by the catalog search endpoint.

use acq_reconcile::wire::one_or_many;
use acq_reconcile::{decode_page, CatalogEntry, Page};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub feed: Feed,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Feed {
    #[serde(
        rename = "opensearch:totalResults",
        default,
        deserialize_with = "lenient_count"
    )]
    pub total_results: Option<u64>,
    /// Decoded per entry in [`Feed::into_page`] so one bad entry costs only itself.
    #[serde(default, deserialize_with = "one_or_many")]
    pub entry: Vec<Value>,
}

impl Feed {
    pub fn into_page(self) -> Page<CatalogEntry> {
        decode_page(self.total_results, self.entry, "catalog entry")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u64),
    Text(String),
}

/// The feed reports its total as a string; accept a number too.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Count>::deserialize(deserializer)? {
        None => None,
        Some(Count::Number(n)) => Some(n),
        Some(Count::Text(s)) => s.trim().parse().ok(),
    })
}
