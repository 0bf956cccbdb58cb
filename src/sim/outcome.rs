//! Slot-to-entry lookup
//!
//! Slot i maps to the i-th entry of the caller-shuffled display list.

use super::geometry::slot_count;

/// Truncate a shuffled entry list to the entries that own a slot
pub fn display_list<T: Clone>(entries: &[T]) -> Vec<T> {
    let n = slot_count(entries.len()).min(entries.len());
    entries[..n].to_vec()
}

/// Entry for a landed slot, or `None` if no entry sits at that slot
#[inline]
pub fn entry_for_slot<T>(display: &[T], slot: usize) -> Option<&T> {
    display.get(slot)
}
