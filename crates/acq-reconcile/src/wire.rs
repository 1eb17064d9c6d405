//! Wire adapter: raw catalog / index shapes and their normalization into
//! [`AcquisitionRecord`] / [`AreaOfInterest`].
//!
//! # Design constraints
//! - Pure conversion; the HTTP adapters deserialize into these structs and
//!   hand them over unchanged.
//! - Unknown fields are ignored so upstream schema additions do not break
//!   decoding.
//! - A record that lacks a usable identity is skipped with a warning; a
//!   record that lacks an ingestion time is kept with `None`.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::geometry::Polygon;
use crate::time::parse_timestamp;
use crate::{AcquisitionRecord, AreaOfInterest, IdentityScheme, Page, ReconcileError};

// ---------------------------------------------------------------------------
// Catalog (OpenSearch JSON feed)
// ---------------------------------------------------------------------------

/// `{"name": "...", "content": ...}` attribute as used in catalog entries.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NamedValue {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: Value,
}

impl NamedValue {
    fn content_str(&self) -> Option<&str> {
        self.content.as_str()
    }

    fn content_u32(&self) -> Option<u32> {
        match &self.content {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// One catalog feed entry.
///
/// The feed collapses single-element lists to a bare object, so every list
/// here accepts either form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub date: Vec<NamedValue>,
    #[serde(default, rename = "str", deserialize_with = "one_or_many")]
    pub strs: Vec<NamedValue>,
    #[serde(default, rename = "int", deserialize_with = "one_or_many")]
    pub ints: Vec<NamedValue>,
}

impl CatalogEntry {
    pub fn date(&self, name: &str) -> Option<&str> {
        find(&self.date, name).and_then(NamedValue::content_str)
    }

    pub fn str_attr(&self, name: &str) -> Option<&str> {
        find(&self.strs, name).and_then(NamedValue::content_str)
    }

    pub fn int_attr(&self, name: &str) -> Option<u32> {
        find(&self.ints, name).and_then(NamedValue::content_u32)
    }
}

fn find<'a>(values: &'a [NamedValue], name: &str) -> Option<&'a NamedValue> {
    values.iter().find(|v| v.name == name)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Deserialize `null`, a single value, or a list into a `Vec`.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(v)) => v,
        Some(OneOrMany::One(t)) => vec![t],
    })
}

/// Decode each raw record of one page on its own.
///
/// A record that does not fit `T` is logged and counted in
/// [`Page::skipped`]; the rest of the page survives.
pub fn decode_page<T: DeserializeOwned>(
    total: Option<u64>,
    raw: Vec<Value>,
    what: &str,
) -> Page<T> {
    let mut items = Vec::with_capacity(raw.len());
    let mut skipped = 0;
    for (pos, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(item) => items.push(item),
            Err(e) => {
                warn!(what, pos, error = %e, "skipping undecodable record");
                skipped += 1;
            }
        }
    }
    Page::new(total, items).with_skipped(skipped)
}

/// Normalize a catalog entry. `None` when the entry has no title.
pub fn normalize_catalog_entry(
    entry: &CatalogEntry,
    identity: &IdentityScheme,
) -> Option<AcquisitionRecord> {
    let title = match entry.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            warn!("skipping catalog entry without title");
            return None;
        }
    };

    let ingestion_time = entry.date("ingestiondate").and_then(parse_timestamp);
    if ingestion_time.is_none() {
        warn!(title = %title, "catalog entry has no usable ingestiondate");
    }

    Some(AcquisitionRecord {
        id: identity.catalog_id(&title),
        title,
        ingestion_time,
        track_number: entry.int_attr("relativeorbitnumber"),
    })
}

// ---------------------------------------------------------------------------
// Index (search hits)
// ---------------------------------------------------------------------------

/// One search hit: native document id plus its stored source.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IndexHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: Value,
}

impl IndexHit {
    pub fn new(id: impl Into<String>, source: Value) -> Self {
        Self {
            id: id.into(),
            source,
        }
    }

    /// String at a JSON pointer inside `_source`.
    pub fn source_str(&self, pointer: &str) -> Option<&str> {
        self.source.pointer(pointer).and_then(Value::as_str)
    }
}

/// Normalize an acquisition hit. `None` when the hit has an empty id.
pub fn normalize_index_hit(hit: &IndexHit) -> Option<AcquisitionRecord> {
    let id = hit.id.trim();
    if id.is_empty() {
        warn!("skipping index hit with empty _id");
        return None;
    }

    let title = hit
        .source_str("/metadata/title")
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string());
    let ingestion_time = hit
        .source_str("/metadata/ingestiondate")
        .and_then(parse_timestamp);
    let track_number = hit
        .source
        .pointer("/metadata/track_number")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok());

    Some(AcquisitionRecord {
        id: id.to_string(),
        title,
        ingestion_time,
        track_number,
    })
}

/// Build an [`AreaOfInterest`] from its index document.
pub fn area_of_interest_from_hit(hit: &IndexHit) -> Result<AreaOfInterest, ReconcileError> {
    let location = hit.source.get("location").ok_or_else(|| {
        ReconcileError::InvalidGeometry(format!("AOI '{}' has no location", hit.id))
    })?;
    let polygon = Polygon::from_location(location)?;

    let time_at = |field: &str| -> Result<DateTime<Utc>, ReconcileError> {
        let raw = hit.source_str(&format!("/{field}")).ok_or_else(|| {
            ReconcileError::InvalidWindow(format!("AOI '{}' has no {field}", hit.id))
        })?;
        parse_timestamp(raw).ok_or_else(|| {
            ReconcileError::InvalidWindow(format!("AOI '{}' has unparseable {field} '{raw}'", hit.id))
        })
    };
    let start = time_at("starttime")?;
    let end = time_at("endtime")?;
    if start >= end {
        return Err(ReconcileError::InvalidWindow(format!(
            "AOI '{}' window is empty: starttime {start} >= endtime {end}",
            hit.id
        )));
    }

    let id = hit
        .source_str("/id")
        .map(str::to_string)
        .unwrap_or_else(|| hit.id.clone());

    Ok(AreaOfInterest {
        id,
        polygon,
        start,
        end,
    })
}
