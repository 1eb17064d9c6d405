//! Exhaustive offset pagination shared by every source query.
//!
//! # Contract
//! - Pages are fetched strictly one after another; the next offset is only
//!   known once the previous page has been counted.
//! - The first reported `total` bounds the loop. A page with no items ends it
//!   early. A source that never reports a total is read until an empty page.
//! - Any page error aborts the whole collection; nothing partial escapes.
//! - Records an adapter could not decode still count toward the offset, so a
//!   bad record never shifts or ends the walk.

/// One page as returned by a source.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Total matches reported by the source, when it reports one.
    pub total: Option<u64>,
    pub items: Vec<T>,
    /// Records on this page dropped by the adapter as undecodable.
    pub skipped: usize,
}

impl<T> Page<T> {
    pub fn new(total: Option<u64>, items: Vec<T>) -> Self {
        Self {
            total,
            items,
            skipped: 0,
        }
    }

    pub fn empty() -> Self {
        Self::new(Some(0), Vec::new())
    }

    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }

    /// Records the source actually sent, decodable or not.
    pub fn raw_len(&self) -> usize {
        self.items.len() + self.skipped
    }
}

/// Collect every item the source has for one query.
///
/// `fetch(offset, size)` must return the page starting at `offset`.
pub fn paginate<T, E, F>(page_size: usize, fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(usize, usize) -> Result<Page<T>, E>,
{
    paginate_filtered(page_size, fetch, |_| true, Some)
}

/// Pagination with a per-item predicate and extractor.
///
/// Items failing `keep` are dropped; items for which `extract` yields `None`
/// are dropped as malformed. Offsets always advance by the raw page length so
/// filtering never causes a page to be re-read.
pub fn paginate_filtered<T, R, E, F, P, X>(
    page_size: usize,
    mut fetch: F,
    keep: P,
    mut extract: X,
) -> Result<Vec<R>, E>
where
    F: FnMut(usize, usize) -> Result<Page<T>, E>,
    P: Fn(&T) -> bool,
    X: FnMut(T) -> Option<R>,
{
    let size = page_size.max(1);
    let mut out: Vec<R> = Vec::new();
    let mut offset: usize = 0;
    let mut expected: Option<u64> = None;

    loop {
        let page = fetch(offset, size)?;
        if expected.is_none() {
            expected = page.total;
        }
        let raw_len = page.raw_len();
        if raw_len == 0 {
            break;
        }

        offset += raw_len;
        out.extend(page.items.into_iter().filter(|t| keep(t)).filter_map(&mut extract));

        if let Some(total) = expected {
            if offset as u64 >= total {
                break;
            }
        }
    }

    Ok(out)
}
