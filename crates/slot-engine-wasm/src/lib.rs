//! WASM bindings for slot-engine.
//!
//! Exposes slot generation, schedule validation and available-date lookup to
//! the booking web UI via `wasm-bindgen`. All complex types are passed as JSON
//! strings in the booking API's camelCase shape.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir pkg/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use slot_engine::records::{parse_timezone, validate_records, AvailabilityRecord, SlotRecord, SlotRequest};
use slot_engine::{EngineConfig, ScheduleViolation};
use wasm_bindgen::prelude::*;

/// Validation result handed back to the availability editor.
#[derive(Serialize)]
struct ValidationDto {
    valid: bool,
    /// One line per violated day, Sunday-first.
    messages: Vec<String>,
    violations: Vec<ScheduleViolation>,
}

// ---------------------------------------------------------------------------
// JSON-in / JSON-out implementations (plain Rust, testable off-wasm)
// ---------------------------------------------------------------------------

fn generate_slots_json(request_json: &str) -> Result<String, String> {
    let request = SlotRequest::from_json(request_json).map_err(|e| e.to_string())?;
    let slots = request
        .generate(&EngineConfig::default())
        .map_err(|e| e.to_string())?;

    let dtos: Vec<SlotRecord> = slots.iter().map(SlotRecord::from).collect();
    serde_json::to_string(&dtos).map_err(|e| format!("Serialization error: {}", e))
}

fn validate_schedule_json(
    availabilities_json: &str,
    default_timezone: Option<&str>,
) -> Result<String, String> {
    let records: Vec<AvailabilityRecord> = serde_json::from_str(availabilities_json)
        .map_err(|e| format!("Invalid availabilities JSON: {}", e))?;
    let timezone = match default_timezone {
        Some(name) => parse_timezone(name),
        None => EngineConfig::default().timezone(),
    }
    .map_err(|e| e.to_string())?;

    let report = validate_records(&records, timezone).map_err(|e| e.to_string())?;
    let dto = ValidationDto {
        valid: report.is_empty(),
        messages: report.messages_by_day(),
        violations: report.violations,
    };
    serde_json::to_string(&dto).map_err(|e| format!("Serialization error: {}", e))
}

fn available_dates_json(request_json: &str, from: &str, to: &str) -> Result<String, String> {
    let request = SlotRequest::from_json(request_json).map_err(|e| e.to_string())?;
    let from = parse_date(from)?;
    let to = parse_date(to)?;

    let dates: Vec<String> = request
        .available_dates(&EngineConfig::default(), from, to)
        .map_err(|e| e.to_string())?
        .iter()
        .map(|d| d.to_string())
        .collect();
    serde_json::to_string(&dates).map_err(|e| format!("Serialization error: {}", e))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    s.parse::<NaiveDate>()
        .map_err(|e| format!("Invalid date '{}': {}", s, e))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Generate the bookable slots for a date.
///
/// `request_json` is a `SlotRequest`: `{ availabilities, bookings, date,
/// durationMinutes, notBefore?, timezone?, stepping? }`. Returns a JSON array
/// of `{startTime, endTime}` objects with RFC 3339 instants in the host zone.
#[wasm_bindgen(js_name = "generateSlots")]
pub fn generate_slots(request_json: &str) -> Result<String, JsValue> {
    generate_slots_json(request_json).map_err(|e| JsValue::from_str(&e))
}

/// Validate a weekly schedule before saving it.
///
/// `availabilities_json` is an array of `{dayOfWeek, startTime, endTime,
/// timezone?}`. Returns `{ valid, messages, violations }`.
#[wasm_bindgen(js_name = "validateSchedule")]
pub fn validate_schedule(
    availabilities_json: &str,
    default_timezone: Option<String>,
) -> Result<String, JsValue> {
    validate_schedule_json(availabilities_json, default_timezone.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

/// List the dates in `[from, to]` (`YYYY-MM-DD`, inclusive) with at least one slot.
///
/// The request's own `date` is ignored. Returns a JSON array of date strings.
#[wasm_bindgen(js_name = "availableDates")]
pub fn available_dates(request_json: &str, from: &str, to: &str) -> Result<String, JsValue> {
    available_dates_json(request_json, from, to).map_err(|e| JsValue::from_str(&e))
}
