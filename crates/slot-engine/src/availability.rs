//! Weekly availability windows and the validation a host's schedule must pass.
//!
//! A host submits a set of recurring windows (weekday + start/end time-of-day +
//! IANA zone). Before the schedule is accepted every window must have
//! `start < end`, and windows on the same weekday must be pairwise disjoint as
//! half-open intervals. Touching windows (`09:00-12:00` and `12:00-17:00`) are
//! legal and stay two independent windows.
//!
//! Validation never stops at the first problem: [`validate_schedule`] collects
//! every violation into a [`ValidationReport`] so the availability editor can
//! show them all at once.

use std::fmt;

use chrono::{NaiveTime, Timelike, Weekday};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{Result, SlotError};
use crate::interval::overlaps;

/// Weekdays in wire order: index 0 is Sunday.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Convert a 0-6 day index (0 = Sunday) into a [`Weekday`].
pub fn weekday_from_index(index: i64) -> Result<Weekday> {
    usize::try_from(index)
        .ok()
        .and_then(|i| WEEKDAYS.get(i).copied())
        .ok_or(SlotError::InvalidDayOfWeek(index))
}

/// The 0-6 day index (0 = Sunday) of a [`Weekday`].
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

/// Full English day name, as shown in the availability editor.
pub fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Parse a time of day in `HH:mm` or `HH:mm:ss` form.
///
/// Only whole minutes are accepted, since windows are compared in
/// minutes-since-midnight.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    let trimmed = s.trim();
    let time = NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|e| SlotError::InvalidTime(format!("'{}': {}", s, e)))?;

    if time.second() != 0 || time.nanosecond() != 0 {
        return Err(SlotError::InvalidTime(format!(
            "'{}': must be a whole minute",
            s
        )));
    }
    Ok(time)
}

/// Minutes since midnight.
pub fn minutes_of_day(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

fn hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// One recurring block of bookable time on a weekday, in the host's zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyAvailabilityWindow {
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub timezone: Tz,
}

impl WeeklyAvailabilityWindow {
    pub fn new(weekday: Weekday, start: NaiveTime, end: NaiveTime, timezone: Tz) -> Self {
        Self {
            weekday,
            start,
            end,
            timezone,
        }
    }

    /// Window length in minutes. Zero or negative for an invalid range.
    pub fn length_minutes(&self) -> i64 {
        minutes_of_day(self.end) as i64 - minutes_of_day(self.start) as i64
    }
}

impl fmt::Display for WeeklyAvailabilityWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{} ({})",
            day_name(self.weekday),
            hhmm(self.start),
            hhmm(self.end),
            self.timezone.name()
        )
    }
}

/// A single problem found in a submitted weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleViolation {
    /// A window whose start is not strictly before its end.
    InvalidRange {
        weekday: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    },
    /// Two windows on the same weekday intersect. Reported once per weekday.
    Overlap {
        weekday: Weekday,
        first_start: NaiveTime,
        first_end: NaiveTime,
        second_start: NaiveTime,
        second_end: NaiveTime,
    },
    /// A window declared in a zone other than the schedule's zone.
    TimezoneMismatch {
        weekday: Weekday,
        expected: String,
        found: String,
    },
}

impl ScheduleViolation {
    pub fn weekday(&self) -> Weekday {
        match self {
            Self::InvalidRange { weekday, .. }
            | Self::Overlap { weekday, .. }
            | Self::TimezoneMismatch { weekday, .. } => *weekday,
        }
    }
}

impl fmt::Display for ScheduleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { start, end, .. } => write!(
                f,
                "start time {} must be before end time {}",
                hhmm(*start),
                hhmm(*end)
            ),
            Self::Overlap {
                first_start,
                first_end,
                second_start,
                second_end,
                ..
            } => write!(
                f,
                "{}-{} overlaps {}-{}",
                hhmm(*first_start),
                hhmm(*first_end),
                hhmm(*second_start),
                hhmm(*second_end)
            ),
            Self::TimezoneMismatch {
                expected, found, ..
            } => write!(
                f,
                "window uses timezone {} but the schedule uses {}",
                found, expected
            ),
        }
    }
}

/// Every violation found in a schedule, ordered Sunday-first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<ScheduleViolation>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Weekdays that have at least one violation, Sunday-first.
    pub fn days(&self) -> Vec<Weekday> {
        WEEKDAYS
            .iter()
            .copied()
            .filter(|day| self.violations.iter().any(|v| v.weekday() == *day))
            .collect()
    }

    /// One human-readable line per violated weekday, Sunday-first.
    ///
    /// Several problems on the same day are joined into that day's line.
    pub fn messages_by_day(&self) -> Vec<String> {
        self.days()
            .into_iter()
            .map(|day| {
                let details: Vec<String> = self
                    .violations
                    .iter()
                    .filter(|v| v.weekday() == day)
                    .map(ToString::to_string)
                    .collect();
                format!("{}: {}", day_name(day), details.join("; "))
            })
            .collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages_by_day().join("; "))
    }
}

/// Check that a window's start is strictly before its end.
pub fn validate_time_order(
    window: &WeeklyAvailabilityWindow,
) -> std::result::Result<(), ScheduleViolation> {
    if minutes_of_day(window.start) >= minutes_of_day(window.end) {
        return Err(ScheduleViolation::InvalidRange {
            weekday: window.weekday,
            start: window.start,
            end: window.end,
        });
    }
    Ok(())
}

/// Check that no two windows on the same weekday overlap.
///
/// Pairs are tested in start order and the first overlapping pair is reported;
/// a day with several overlapping pairs still yields a single violation.
/// Windows on different weekdays are never compared.
pub fn validate_no_overlap(
    windows_for_day: &[WeeklyAvailabilityWindow],
) -> std::result::Result<(), ScheduleViolation> {
    let mut sorted: Vec<&WeeklyAvailabilityWindow> = windows_for_day.iter().collect();
    sorted.sort_by_key(|w| (weekday_index(w.weekday), w.start, w.end));

    for (i, a) in sorted.iter().enumerate() {
        for b in &sorted[i + 1..] {
            if a.weekday != b.weekday {
                continue;
            }
            if overlaps(
                minutes_of_day(a.start),
                minutes_of_day(a.end),
                minutes_of_day(b.start),
                minutes_of_day(b.end),
            ) {
                return Err(ScheduleViolation::Overlap {
                    weekday: a.weekday,
                    first_start: a.start,
                    first_end: a.end,
                    second_start: b.start,
                    second_end: b.end,
                });
            }
        }
    }
    Ok(())
}

/// Validate a whole weekly schedule, collecting every violation.
///
/// The schedule's zone is taken from the first window; see
/// [`AvailabilityRuleSet::new`] to validate against an explicit host zone.
pub fn validate_schedule(
    windows: &[WeeklyAvailabilityWindow],
) -> std::result::Result<(), ValidationReport> {
    let host_zone = windows.first().map(|w| w.timezone);
    let report = collect_violations(host_zone, windows);
    if report.is_empty() {
        Ok(())
    } else {
        Err(report)
    }
}

fn collect_violations(
    host_zone: Option<Tz>,
    windows: &[WeeklyAvailabilityWindow],
) -> ValidationReport {
    let mut violations = Vec::new();

    for day in WEEKDAYS {
        let mut comparable = Vec::new();

        for window in windows.iter().filter(|w| w.weekday == day) {
            let mut usable = true;

            if let Err(violation) = validate_time_order(window) {
                violations.push(violation);
                usable = false;
            }
            if let Some(zone) = host_zone {
                if window.timezone != zone {
                    violations.push(ScheduleViolation::TimezoneMismatch {
                        weekday: day,
                        expected: zone.name().to_string(),
                        found: window.timezone.name().to_string(),
                    });
                    usable = false;
                }
            }
            if usable {
                comparable.push(window.clone());
            }
        }

        if let Err(violation) = validate_no_overlap(&comparable) {
            violations.push(violation);
        }
    }

    log::debug!(
        "validated {} availability windows: {} violation(s)",
        windows.len(),
        violations.len()
    );

    ValidationReport { violations }
}

/// A host's validated weekly schedule.
///
/// Only constructible from windows that pass validation, so every window here
/// has `start < end`, shares the set's zone, and is disjoint from its
/// same-day neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityRuleSet {
    timezone: Tz,
    windows: Vec<WeeklyAvailabilityWindow>,
}

impl AvailabilityRuleSet {
    /// Validate `windows` against the host zone and build the rule set.
    ///
    /// # Errors
    /// Returns [`SlotError::Validation`] carrying every violation found.
    pub fn new(timezone: Tz, mut windows: Vec<WeeklyAvailabilityWindow>) -> Result<Self> {
        let report = collect_violations(Some(timezone), &windows);
        if !report.is_empty() {
            return Err(SlotError::Validation(report));
        }

        windows.sort_by_key(|w| (weekday_index(w.weekday), w.start));
        Ok(Self { timezone, windows })
    }

    /// A host with no availability at all.
    pub fn empty(timezone: Tz) -> Self {
        Self {
            timezone,
            windows: Vec::new(),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn windows(&self) -> &[WeeklyAvailabilityWindow] {
        &self.windows
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Windows configured for `weekday`, in start order.
    pub fn windows_for(&self, weekday: Weekday) -> impl Iterator<Item = &WeeklyAvailabilityWindow> + '_ {
        self.windows.iter().filter(move |w| w.weekday == weekday)
    }
}
