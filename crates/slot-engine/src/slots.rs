//! Compute the bookable slots for a calendar date.
//!
//! A window's time-of-day bounds are anchored onto the date in the host zone,
//! then sliced into back-to-back slots of the event duration. A slot that would
//! run past the window end is dropped, never truncated. Slots colliding with an
//! existing booking are left out.
//!
//! By default the cursor always advances by exactly one duration, even past an
//! excluded slot, so offered start times stay on a fixed grid anchored at the
//! window start. [`SteppingPolicy::PackAroundBookings`] is the opt-in
//! alternative that restarts the grid at the end of the blocking booking.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::availability::{AvailabilityRuleSet, WeeklyAvailabilityWindow};
use crate::dst::{self, DstPolicy};
use crate::error::{Result, SlotError};
use crate::interval::overlaps;

/// Longest inclusive range accepted by [`available_dates`].
pub const MAX_DATE_RANGE_DAYS: i64 = 366;

/// A committed meeting. Cancelled bookings must never be passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookedInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookedInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

/// One offerable slot, expressed in the host's zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSlot {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl CandidateSlot {
    pub fn utc_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start.with_timezone(&Utc), self.end.with_timezone(&Utc))
    }

    pub fn duration_minutes(&self) -> i64 {
        let (start, end) = self.utc_bounds();
        (end - start).num_minutes()
    }

    /// The local calendar date the slot starts on.
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }
}

/// How the cursor moves after a candidate collides with a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SteppingPolicy {
    /// Advance by one duration regardless of collisions.
    #[default]
    FixedGrid,
    /// Jump to the end of the latest colliding booking and continue from there.
    PackAroundBookings,
}

/// Knobs for slot generation. The defaults reproduce plain fixed-grid slicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotOptions {
    pub stepping: SteppingPolicy,
    /// Drop slots starting before this instant. The caller supplies "now".
    pub not_before: Option<DateTime<Utc>>,
    pub dst_policy: DstPolicy,
}

pub(crate) fn checked_duration(duration_minutes: i64) -> Result<Duration> {
    if duration_minutes <= 0 {
        return Err(SlotError::InvalidDuration(duration_minutes));
    }
    Duration::try_minutes(duration_minutes).ok_or(SlotError::InvalidDuration(duration_minutes))
}

/// Generate the slots one availability window offers on `date`.
///
/// Returns an empty list when there is no window, when the window belongs to
/// a different weekday, or when the anchored window is empty.
///
/// # Errors
/// Returns [`SlotError::InvalidDuration`] if `duration_minutes <= 0`, checked
/// before anything else.
pub fn generate_slots(
    window: Option<&WeeklyAvailabilityWindow>,
    date: NaiveDate,
    duration_minutes: i64,
    bookings: &[BookedInterval],
) -> Result<Vec<CandidateSlot>> {
    generate_slots_with(
        window,
        date,
        duration_minutes,
        bookings,
        &SlotOptions::default(),
    )
}

/// [`generate_slots`] with explicit [`SlotOptions`].
pub fn generate_slots_with(
    window: Option<&WeeklyAvailabilityWindow>,
    date: NaiveDate,
    duration_minutes: i64,
    bookings: &[BookedInterval],
    options: &SlotOptions,
) -> Result<Vec<CandidateSlot>> {
    let duration = checked_duration(duration_minutes)?;

    let Some(window) = window else {
        return Ok(Vec::new());
    };
    if window.weekday != date.weekday() {
        log::debug!("window {} does not apply to {}", window, date);
        return Ok(Vec::new());
    }

    let tz = window.timezone;
    let bounds = (
        dst::anchor(date, window.start, tz, options.dst_policy),
        dst::anchor(date, window.end, tz, options.dst_policy),
    );
    let (Some(window_start), Some(window_end)) = bounds else {
        log::debug!("window {} skipped on {}: boundary falls in a DST gap", window, date);
        return Ok(Vec::new());
    };

    let window_end = window_end.with_timezone(&Utc);
    let mut cursor = window_start.with_timezone(&Utc);
    let mut slots = Vec::new();

    while let Some(slot_end) = cursor
        .checked_add_signed(duration)
        .filter(|end| *end <= window_end)
    {
        let busy_until = bookings
            .iter()
            .filter(|b| overlaps(cursor, slot_end, b.start, b.end))
            .map(|b| b.end)
            .max();

        match busy_until {
            None => {
                if options.not_before.is_none_or(|not_before| cursor >= not_before) {
                    slots.push(CandidateSlot {
                        start: cursor.with_timezone(&tz),
                        end: slot_end.with_timezone(&tz),
                    });
                }
                cursor = slot_end;
            }
            Some(busy_until) => {
                log::trace!("slot {} - {} collides with a booking", cursor, slot_end);
                cursor = match options.stepping {
                    SteppingPolicy::FixedGrid => slot_end,
                    SteppingPolicy::PackAroundBookings => busy_until,
                };
            }
        }
    }

    log::debug!(
        "generated {} slot(s) from {} on {} ({} min, {} booking(s))",
        slots.len(),
        window,
        date,
        duration_minutes,
        bookings.len()
    );

    Ok(slots)
}

/// Generate the slots every window of `rules` offers on `date`.
///
/// Each window is sliced independently; the results are merged in start
/// order with duplicate start times removed.
pub fn generate_slots_for_date(
    rules: &AvailabilityRuleSet,
    date: NaiveDate,
    duration_minutes: i64,
    bookings: &[BookedInterval],
) -> Result<Vec<CandidateSlot>> {
    generate_slots_for_date_with(
        rules,
        date,
        duration_minutes,
        bookings,
        &SlotOptions::default(),
    )
}

/// [`generate_slots_for_date`] with explicit [`SlotOptions`].
pub fn generate_slots_for_date_with(
    rules: &AvailabilityRuleSet,
    date: NaiveDate,
    duration_minutes: i64,
    bookings: &[BookedInterval],
    options: &SlotOptions,
) -> Result<Vec<CandidateSlot>> {
    checked_duration(duration_minutes)?;

    let mut slots = Vec::new();
    for window in rules.windows_for(date.weekday()) {
        slots.extend(generate_slots_with(
            Some(window),
            date,
            duration_minutes,
            bookings,
            options,
        )?);
    }

    slots.sort_by_key(|s| s.start.with_timezone(&Utc));
    slots.dedup_by_key(|s| s.start.with_timezone(&Utc));
    Ok(slots)
}

/// Unique local dates the given slots start on, ascending.
pub fn slot_dates(slots: &[CandidateSlot]) -> Vec<NaiveDate> {
    slots
        .iter()
        .map(CandidateSlot::date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Every date in `[from, to]` (inclusive) that offers at least one slot.
///
/// # Errors
/// Returns [`SlotError::InvalidDuration`] for a non-positive duration and
/// [`SlotError::InvalidDateRange`] when the range spans more than
/// [`MAX_DATE_RANGE_DAYS`] days.
pub fn available_dates(
    rules: &AvailabilityRuleSet,
    from: NaiveDate,
    to: NaiveDate,
    duration_minutes: i64,
    bookings: &[BookedInterval],
    options: &SlotOptions,
) -> Result<Vec<NaiveDate>> {
    checked_duration(duration_minutes)?;

    if from > to {
        return Ok(Vec::new());
    }
    let span = (to - from).num_days() + 1;
    if span > MAX_DATE_RANGE_DAYS {
        return Err(SlotError::InvalidDateRange(format!(
            "{} to {} spans {} days (max {})",
            from, to, span, MAX_DATE_RANGE_DAYS
        )));
    }

    let mut dates = Vec::new();
    for date in from.iter_days().take(span as usize) {
        let slots =
            generate_slots_for_date_with(rules, date, duration_minutes, bookings, options)?;
        if !slots.is_empty() {
            dates.push(date);
        }
    }
    Ok(dates)
}
