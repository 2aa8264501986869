//! Error types for slot-engine operations.

use thiserror::Error;

use crate::availability::ValidationReport;
use crate::booking::Rejection;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotError {
    #[error("Invalid duration: {0} minutes (must be positive)")]
    InvalidDuration(i64),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid day of week: {0} (expected 0-6, 0 = Sunday)")]
    InvalidDayOfWeek(i64),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Invalid schedule: {0}")]
    Validation(ValidationReport),

    #[error("Booking rejected: {0}")]
    BookingRejected(Rejection),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SlotError>;
