//! # slot-engine
//!
//! Weekly availability validation and bookable slot generation for a
//! profile-based meeting booking service.
//!
//! A host publishes recurring weekly windows ("Mondays 09:00-17:00,
//! America/New_York"). An invitee picks a date. The engine anchors the windows
//! for that weekday onto the date in the host zone, slices them into slots of
//! the event duration, and drops every slot that collides with an existing
//! booking. Everything here is a pure function of its inputs: no clock, no I/O,
//! no shared state.
//!
//! ## Modules
//!
//! - [`availability`] — Weekly windows, schedule validation, the validated rule set
//! - [`slots`] — Slot generation for one date, multi-window merging, date helpers
//! - [`dst`] — Anchoring a time-of-day onto a date across DST transitions
//! - [`interval`] — The half-open overlap predicate and conflict reporting
//! - [`booking`] — Commit-time re-validation of a requested slot
//! - [`records`] — JSON records in the booking API's shape
//! - [`config`] — TOML engine configuration
//! - [`error`] — Error types

pub mod availability;
pub mod booking;
pub mod config;
pub mod dst;
pub mod error;
pub mod interval;
pub mod records;
pub mod slots;

pub use availability::{
    validate_no_overlap, validate_schedule, validate_time_order, AvailabilityRuleSet,
    ScheduleViolation, ValidationReport, WeeklyAvailabilityWindow,
};
pub use booking::{validate_booking, BookingStatus, Rejection};
pub use config::EngineConfig;
pub use dst::DstPolicy;
pub use error::SlotError;
pub use interval::{find_conflicts, overlaps, Conflict};
pub use records::{AvailabilityRecord, BookingRecord, SlotRecord, SlotRequest};
pub use slots::{
    available_dates, generate_slots, generate_slots_for_date, generate_slots_for_date_with,
    generate_slots_with, slot_dates, BookedInterval, CandidateSlot, SlotOptions, SteppingPolicy,
};
