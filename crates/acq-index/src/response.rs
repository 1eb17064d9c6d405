use acq_reconcile::{decode_page, IndexHit, Page};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub hits: Hits,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Hits {
    #[serde(default, deserialize_with = "hits_total")]
    pub total: Option<u64>,
    /// Decoded per hit in [`Hits::into_page`].
    #[serde(default)]
    pub hits: Vec<Value>,
}

impl Hits {
    pub fn into_page(self) -> Page<IndexHit> {
        decode_page(self.total, self.hits, "index hit")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Total {
    Number(u64),
    Object { value: u64 },
}

/// Older servers send a bare number, newer ones `{"value": n, "relation": ..}`.
fn hits_total<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Total>::deserialize(deserializer)?.map(|t| match t {
        Total::Number(n) => n,
        Total::Object { value } => value,
    }))
}
