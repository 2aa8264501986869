//! Half-open interval overlap shared by validation, generation and booking checks.
//!
//! Intervals are `[start, end)`. Adjacent intervals (one ends exactly when the
//! other starts) do NOT overlap.

use crate::slots::{BookedInterval, CandidateSlot};

/// Returns true when `[a_start, a_end)` and `[b_start, b_end)` intersect.
///
/// Works for anything ordered: minutes-of-day during schedule validation,
/// `DateTime<Utc>` instants during slot generation.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

/// A candidate slot that collides with an existing booking.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub slot: CandidateSlot,
    pub booking: BookedInterval,
    pub overlap_minutes: i64,
}

/// Find every (slot, booking) pair whose intervals overlap.
///
/// The overlap duration is `min(slot.end, booking.end) - max(slot.start, booking.start)`.
/// Results are ordered by slot, then by booking, in input order.
pub fn find_conflicts(slots: &[CandidateSlot], bookings: &[BookedInterval]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for slot in slots {
        let (slot_start, slot_end) = slot.utc_bounds();
        for booking in bookings {
            if overlaps(slot_start, slot_end, booking.start, booking.end) {
                let overlap_start = slot_start.max(booking.start);
                let overlap_end = slot_end.min(booking.end);

                conflicts.push(Conflict {
                    slot: slot.clone(),
                    booking: *booking,
                    overlap_minutes: (overlap_end - overlap_start).num_minutes(),
                });
            }
        }
    }

    conflicts
}
