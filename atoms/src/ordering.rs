//! Order assignment shared by task lists (per user) and tasks (per list).
//!
//! `order` is a plain integer used only for relative sequencing. New siblings
//! get one past the current maximum; deletions and moves leave gaps and
//! nothing ever compacts them.

use chrono::{DateTime, Utc};

/// Entities that carry a manual position within a sibling scope.
pub trait Ordered {
    fn order(&self) -> i64;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Order value for a new sibling: `max + 1`, or `0` when the scope is empty.
pub fn next_order<I>(existing: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    existing.into_iter().max().map_or(0, |max| max + 1)
}

/// Display sort: `order` ascending, creation time breaking ties.
pub fn sort_for_display<T: Ordered>(items: &mut [T]) {
    items.sort_by(|a, b| {
        a.order()
            .cmp(&b.order())
            .then_with(|| a.created_at().cmp(&b.created_at()))
    });
}

/// Result of a batch reorder. Entries that fail their `(id, user)` ownership
/// check are skipped rather than failing the batch; the skipped ids are kept
/// so the weak guarantee stays observable.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReorderOutcome {
    pub updated: usize,
    pub skipped: Vec<String>,
}
