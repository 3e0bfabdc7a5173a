//! Tag-priority classification and report ordering.
//!
//! The rank of an entry is the index of the first configured tag group it
//! fully satisfies. First wins, not most specific: the operator expresses
//! priority purely through group order.

use crate::types::EntryRecord;

/// Index of the first group in `order` whose every tag appears in `tags`,
/// or `order.len()` when no group is fully contained. Lower ranks sort
/// first; unmatched entries share the lowest-priority bucket.
pub fn tag_rank(tags: &[String], order: &[Vec<String>]) -> usize {
    order
        .iter()
        .position(|group| group.iter().all(|tag| tags.contains(tag)))
        .unwrap_or(order.len())
}

/// Sort records into report order: tag rank, then rating, then canonical id,
/// all ascending. Ascending rating puts sentinel states before any real
/// percentage and lower percentages before higher ones. The renderer emits
/// rows in exactly this order.
pub fn sort_records(records: &mut [EntryRecord]) {
    records.sort_by(|a, b| {
        (a.tag_rank, a.rating.sort_value(), &a.id).cmp(&(
            b.tag_rank,
            b.rating.sort_value(),
            &b.id,
        ))
    });
}
