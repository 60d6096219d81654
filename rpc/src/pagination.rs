//! Offset pagination for list actions.

use serde::Serialize;

use vouch_ledger::{Page, VerificationRecord};

/// A page of records plus where the next page starts.
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse {
    pub items: Vec<VerificationRecord>,
    pub total: u64,
    /// Offset to request next, or `None` if this page reaches the end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<u64>,
}

impl PageResponse {
    pub fn new(page: Page<VerificationRecord>, offset: usize) -> Self {
        let next_offset = next_offset(offset as u64, page.items.len(), page.total);
        Self {
            items: page.items,
            total: page.total,
            next_offset,
        }
    }
}

/// Offset following a page of `returned` items starting at `offset`, or
/// `None` at the end of the sequence.
pub fn next_offset(offset: u64, returned: usize, total: u64) -> Option<u64> {
    let next = offset.saturating_add(returned as u64);
    (returned > 0 && next < total).then_some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_offset_returns_none_at_end() {
        assert_eq!(next_offset(0, 2, 2), None);
        assert_eq!(next_offset(5, 0, 2), None);
    }

    #[test]
    fn next_offset_points_past_the_page() {
        assert_eq!(next_offset(0, 10, 25), Some(10));
        assert_eq!(next_offset(10, 10, 25), Some(20));
    }
}
