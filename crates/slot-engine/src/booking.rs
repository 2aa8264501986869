//! Re-validation of a requested booking against the host's current schedule.
//!
//! The slot list shown to an invitee can be stale by the time they confirm.
//! [`validate_booking`] recomputes the offer at commit time. It does not make
//! the commit atomic: the persistence layer still has to serialize concurrent
//! confirmations for the same host.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityRuleSet;
use crate::error::{Result, SlotError};
use crate::interval::overlaps;
use crate::slots::{
    checked_duration, generate_slots_for_date_with, BookedInterval, CandidateSlot, SlotOptions,
};

/// Lifecycle state of a booking as reported by the booking API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    #[default]
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    /// Pending and confirmed bookings hold their time; cancelled ones do not.
    pub fn blocks_time(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Why a requested booking was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// The start time is not one of the slots currently offered.
    NotOffered { start: DateTime<Utc> },
    /// The requested interval overlaps an existing booking.
    Conflict { booking: BookedInterval },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOffered { start } => {
                write!(f, "{} is not an offered slot", start.to_rfc3339())
            }
            Self::Conflict { booking } => write!(
                f,
                "overlaps existing booking {} - {}",
                booking.start.to_rfc3339(),
                booking.end.to_rfc3339()
            ),
        }
    }
}

/// Check that a slot starting at `start` is still bookable.
///
/// A conflict with an existing booking is reported in preference to
/// "not offered", since it is the more specific reason.
///
/// # Errors
/// - [`SlotError::InvalidDuration`] for a non-positive duration.
/// - [`SlotError::BookingRejected`] when the slot overlaps a booking or is not
///   on the offered grid for its local date.
pub fn validate_booking(
    rules: &AvailabilityRuleSet,
    start: DateTime<Utc>,
    duration_minutes: i64,
    bookings: &[BookedInterval],
    options: &SlotOptions,
) -> Result<CandidateSlot> {
    let duration = checked_duration(duration_minutes)?;
    let end = start
        .checked_add_signed(duration)
        .ok_or(SlotError::InvalidDuration(duration_minutes))?;

    if let Some(booking) = bookings
        .iter()
        .find(|b| overlaps(start, end, b.start, b.end))
    {
        log::debug!("booking at {} rejected: overlaps an existing booking", start);
        return Err(SlotError::BookingRejected(Rejection::Conflict {
            booking: *booking,
        }));
    }

    let date = start.with_timezone(&rules.timezone()).date_naive();
    let offered = generate_slots_for_date_with(rules, date, duration_minutes, bookings, options)?;

    offered
        .into_iter()
        .find(|slot| slot.start.with_timezone(&Utc) == start)
        .ok_or_else(|| {
            log::debug!("booking at {} rejected: not an offered slot on {}", start, date);
            SlotError::BookingRejected(Rejection::NotOffered { start })
        })
}
