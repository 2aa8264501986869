//! DST handling when anchoring a window's time-of-day onto a calendar date.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Longest spring-forward gap we walk across when shifting forward.
const MAX_GAP_MINUTES: i64 = 180;

/// Policy for window boundaries that fall in a DST gap (e.g. 02:30 during spring forward).
///
/// Ambiguous local times (fall back) always resolve to the earliest instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Move the boundary to the first valid local time after the gap.
    #[default]
    ShiftForward,
    /// Treat the whole window as unavailable on that date.
    Skip,
}

/// Anchor `time` on `date` in `tz`, producing a concrete zoned instant.
///
/// Returns `None` only when the local time does not exist and the policy is
/// [`DstPolicy::Skip`].
pub fn anchor(date: NaiveDate, time: NaiveTime, tz: Tz, policy: DstPolicy) -> Option<DateTime<Tz>> {
    let local = date.and_time(time);

    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => (1..=MAX_GAP_MINUTES)
                .find_map(|m| tz.from_local_datetime(&(local + Duration::minutes(m))).earliest()),
        },
    }
}
