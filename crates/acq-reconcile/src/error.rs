use std::fmt;

/// Failure reported by a [`crate::CatalogSource`] or [`crate::IndexSource`]
/// adapter for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Network or transport failure (connect, TLS, timeout).
    Transport(String),
    /// The upstream answered with a non-success HTTP status.
    Status { code: u16, body: String },
    /// The response payload could not be decoded.
    Decode(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Transport(msg) => write!(f, "transport error: {msg}"),
            SourceError::Status { code, body } if body.is_empty() => {
                write!(f, "http status {code}")
            }
            SourceError::Status { code, body } => write!(f, "http status {code}: {body}"),
            SourceError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Errors that abort a reconciliation or ipf check.
///
/// Malformed individual records never surface here; they are tolerated
/// during normalization.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The AOI geometry is neither a polygon shape nor a ring / ring list.
    #[error("invalid AOI geometry: {0}")]
    InvalidGeometry(String),

    /// The AOI time bounds are absent, unparseable or empty.
    #[error("invalid query window: {0}")]
    InvalidWindow(String),

    /// The AOI id was not found in the AOI index.
    #[error("no results for AOI '{id}' in index '{index}'")]
    NotFound { index: String, id: String },

    /// A page request failed; nothing partial is returned.
    #[error("upstream query to {origin} failed: {detail}")]
    UpstreamQueryFailure {
        origin: String,
        #[source]
        detail: SourceError,
    },
}

impl ReconcileError {
    pub(crate) fn upstream(origin: impl Into<String>, detail: SourceError) -> Self {
        ReconcileError::UpstreamQueryFailure {
            origin: origin.into(),
            detail,
        }
    }
}
