//! Serde records in the booking API's JSON shape, and their conversion into
//! engine types.
//!
//! These are what the CLI and the WASM bindings read and write. Field names
//! are camelCase, times of day are `HH:mm[:ss]`, instants are RFC 3339.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::availability::{
    parse_time_of_day, validate_schedule, weekday_from_index, AvailabilityRuleSet,
    ValidationReport, WeeklyAvailabilityWindow,
};
use crate::booking::BookingStatus;
use crate::config::EngineConfig;
use crate::error::{Result, SlotError};
use crate::slots::{
    available_dates, generate_slots_for_date_with, BookedInterval, CandidateSlot, SlotOptions,
    SteppingPolicy,
};

/// Parse an IANA timezone name.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| SlotError::InvalidTimezone(format!("'{}'", s)))
}

/// Parse an instant.
///
/// Accepts RFC 3339 (`2026-03-16T09:00:00Z`, `2026-03-16T09:00:00.000-04:00`)
/// and falls back to a naive `YYYY-MM-DDTHH:MM:SS`, read as UTC.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| SlotError::InvalidDatetime(format!("'{}': {}", s, e)))
}

/// One weekly availability row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRecord {
    /// 0-6, 0 = Sunday.
    pub day_of_week: i64,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl AvailabilityRecord {
    /// Convert into a window, using `default_timezone` when the record has none.
    ///
    /// Only structural problems fail here (bad day index, unparseable time or
    /// zone). Range and overlap problems are left to schedule validation.
    pub fn to_window(&self, default_timezone: Tz) -> Result<WeeklyAvailabilityWindow> {
        let timezone = match &self.timezone {
            Some(name) => parse_timezone(name)?,
            None => default_timezone,
        };
        Ok(WeeklyAvailabilityWindow::new(
            weekday_from_index(self.day_of_week)?,
            parse_time_of_day(&self.start_time)?,
            parse_time_of_day(&self.end_time)?,
            timezone,
        ))
    }
}

/// The host zone for a set of records: the first explicit zone, else the default.
fn host_timezone(records: &[AvailabilityRecord], default_timezone: Tz) -> Result<Tz> {
    match records.iter().find_map(|r| r.timezone.as_deref()) {
        Some(name) => parse_timezone(name),
        None => Ok(default_timezone),
    }
}

fn to_windows(records: &[AvailabilityRecord], timezone: Tz) -> Result<Vec<WeeklyAvailabilityWindow>> {
    records.iter().map(|r| r.to_window(timezone)).collect()
}

/// Validate a schedule submitted as records.
///
/// Returns the (possibly empty) report; `Err` only for records that cannot be
/// converted at all.
pub fn validate_records(
    records: &[AvailabilityRecord],
    default_timezone: Tz,
) -> Result<ValidationReport> {
    let timezone = host_timezone(records, default_timezone)?;
    let windows = to_windows(records, timezone)?;
    Ok(validate_schedule(&windows).err().unwrap_or_default())
}

/// One booking row. Records without a status count as confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub status: BookingStatus,
}

impl BookingRecord {
    /// The interval this booking blocks, or `None` if it was cancelled.
    pub fn to_interval(&self) -> Result<Option<BookedInterval>> {
        if !self.status.blocks_time() {
            return Ok(None);
        }
        Ok(Some(BookedInterval::new(
            parse_instant(&self.start_time)?,
            parse_instant(&self.end_time)?,
        )))
    }
}

/// Intervals of every non-cancelled booking.
pub fn active_intervals(records: &[BookingRecord]) -> Result<Vec<BookedInterval>> {
    let mut intervals = Vec::with_capacity(records.len());
    for record in records {
        if let Some(interval) = record.to_interval()? {
            intervals.push(interval);
        }
    }
    Ok(intervals)
}

/// A generated slot on the wire. Instants carry the host's UTC offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRecord {
    pub start_time: String,
    pub end_time: String,
}

impl From<&CandidateSlot> for SlotRecord {
    fn from(slot: &CandidateSlot) -> Self {
        Self {
            start_time: slot.start.to_rfc3339(),
            end_time: slot.end.to_rfc3339(),
        }
    }
}

/// Everything needed to compute the slots for one booking-page request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequest {
    #[serde(default)]
    pub availabilities: Vec<AvailabilityRecord>,
    #[serde(default)]
    pub bookings: Vec<BookingRecord>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub duration_minutes: i64,
    #[serde(default)]
    pub not_before: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub stepping: Option<SteppingPolicy>,
}

impl SlotRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SlotError::InvalidRequest(e.to_string()))
    }

    /// Build the host's validated rule set.
    ///
    /// The host zone is the request's `timezone`, else the first zone named by
    /// an availability record, else the configured default.
    pub fn rule_set(&self, config: &EngineConfig) -> Result<AvailabilityRuleSet> {
        let timezone = match &self.timezone {
            Some(name) => parse_timezone(name)?,
            None => host_timezone(&self.availabilities, config.timezone()?)?,
        };
        AvailabilityRuleSet::new(timezone, to_windows(&self.availabilities, timezone)?)
    }

    pub fn options(&self, config: &EngineConfig) -> Result<SlotOptions> {
        let not_before = self.not_before.as_deref().map(parse_instant).transpose()?;
        let mut options = config.slot_options(not_before);
        if let Some(stepping) = self.stepping {
            options.stepping = stepping;
        }
        Ok(options)
    }

    pub fn intervals(&self) -> Result<Vec<BookedInterval>> {
        active_intervals(&self.bookings)
    }

    /// Slots offered on the request's `date`.
    pub fn generate(&self, config: &EngineConfig) -> Result<Vec<CandidateSlot>> {
        let date = self
            .date
            .ok_or_else(|| SlotError::InvalidRequest("missing field `date`".to_string()))?;
        let rules = self.rule_set(config)?;
        generate_slots_for_date_with(
            &rules,
            date,
            self.duration_minutes,
            &self.intervals()?,
            &self.options(config)?,
        )
    }

    /// Dates in `[from, to]` with at least one slot. The request's `date` is ignored.
    pub fn available_dates(
        &self,
        config: &EngineConfig,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let rules = self.rule_set(config)?;
        available_dates(
            &rules,
            from,
            to,
            self.duration_minutes,
            &self.intervals()?,
            &self.options(config)?,
        )
    }
}
