//! acq-reconcile
//!
//! Acquisition completeness engine.
//!
//! Compares the external acquisition catalog against the local search index
//! over one area of interest and track:
//! - catalog record absent from the index => MISSING
//! - record present in both, index copy ingested earlier => STALE
//! - index-only records are never reported
//!
//! Pure logic. The two systems of record are reached only through the
//! [`CatalogSource`] / [`IndexSource`] traits; concrete HTTP adapters live in
//! `acq-catalog` and `acq-index`.

mod engine;
mod error;
pub mod geometry;
mod ipf;
pub mod pagination;
pub mod query;
mod source;
pub mod time;
mod types;
pub mod wire;

pub use engine::{load_window, reconcile_sets, EngineOptions, ReconciliationEngine};
pub use error::{ReconcileError, SourceError};
pub use geometry::{GeometryInput, Polygon};
pub use ipf::{is_deprecated, lacks_processing_version, IpfChecker};
pub use pagination::{paginate, paginate_filtered, Page};
pub use source::{CatalogSource, IndexSource};
pub use types::*;
pub use wire::{decode_page, CatalogEntry, IndexHit, NamedValue};
