//! Offset/limit paging over insertion-ordered sequences.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// One page of results plus the true size of the full sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Index range of the page starting at `offset` in a sequence of `len`
/// items. A `limit` of zero means "everything from `offset`". An offset past
/// the end yields an empty range.
pub fn page_range(len: usize, offset: usize, limit: usize) -> Range<usize> {
    let start = offset.min(len);
    let remaining = len - start;
    let take = if limit == 0 {
        remaining
    } else {
        limit.min(remaining)
    };
    start..start + take
}
