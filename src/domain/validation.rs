//! Field rules shared by the services.
//!
//! Every function either returns the cleaned value or a
//! `DomainError::Validation` naming the offending field.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{DomainError, GuestFields};

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\s\-\.']+$").expect("valid name regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[\d\s\-()]{7,15}$").expect("valid phone regex"));
static ROOM_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-]+$").expect("valid room number regex"));
static ACTION_TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z_]+$").expect("valid action type regex"));
static TIMEZONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_]+/[A-Za-z_]+$").expect("valid timezone regex"));

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_ADDRESS_LEN: usize = 500;
pub const MAX_AMOUNT: f64 = 999_999.99;

fn invalid(field: &str, msg: &str) -> DomainError {
    DomainError::Validation(format!("{}: {}", field, msg))
}

/// Trim an optional text field; blank values become `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Non-empty after trimming, within `max` characters.
pub fn required_text(field: &str, value: &str, max: usize) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid(field, "is required"));
    }
    if value.chars().count() > max {
        return Err(invalid(field, &format!("must be at most {} characters", max)));
    }
    Ok(value.to_string())
}

pub fn optional_text(
    field: &str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, DomainError> {
    match normalize_optional(value) {
        Some(v) if v.chars().count() > max => Err(invalid(
            field,
            &format!("must be at most {} characters", max),
        )),
        other => Ok(other),
    }
}

pub fn email(value: &str) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid("email", "is required"));
    }
    if !EMAIL_RE.is_match(value) {
        return Err(invalid("email", "invalid email format"));
    }
    Ok(value.to_string())
}

pub fn person_name(value: &str) -> Result<String, DomainError> {
    let value = required_text("full_name", value, MAX_NAME_LEN)?;
    if !NAME_RE.is_match(&value) {
        return Err(invalid(
            "full_name",
            "can only contain letters, spaces, hyphens, periods, and apostrophes",
        ));
    }
    Ok(value)
}

pub fn phone_number(value: Option<String>) -> Result<Option<String>, DomainError> {
    match normalize_optional(value) {
        Some(phone) if !PHONE_RE.is_match(&phone) => {
            Err(invalid("phone_number", "invalid phone number format"))
        }
        other => Ok(other),
    }
}

/// Rules applied when a guest is created or edited directly.
pub fn guest_fields(fields: GuestFields) -> Result<GuestFields, DomainError> {
    Ok(GuestFields {
        full_name: person_name(&fields.full_name)?,
        email: email(&fields.email)?,
        phone_number: phone_number(fields.phone_number)?,
        address: optional_text("address", fields.address, MAX_ADDRESS_LEN)?,
    })
}

pub fn room_number(value: &str) -> Result<String, DomainError> {
    let value = required_text("room_number", value, 20)?;
    if !ROOM_NUMBER_RE.is_match(&value) {
        return Err(invalid(
            "room_number",
            "can only contain letters, numbers, and hyphens",
        ));
    }
    Ok(value)
}

/// Positive, at most two decimal places, capped at `MAX_AMOUNT`.
pub fn monetary_amount(field: &str, value: f64) -> Result<f64, DomainError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field, "must be positive"));
    }
    if value > MAX_AMOUNT {
        return Err(invalid(field, "is too large"));
    }
    let cents = value * 100.0;
    if (cents - cents.round()).abs() > 1e-6 {
        return Err(invalid(field, "must have at most 2 decimal places"));
    }
    Ok(value)
}

pub fn date(field: &str, value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| invalid(field, "must be in YYYY-MM-DD format"))
}

/// Both dates well-formed and `end` strictly after `start`.
pub fn stay_dates(start: &str, end: &str) -> Result<(String, String), DomainError> {
    let start_date = date("start_date", start)?;
    let end_date = date("end_date", end)?;
    if end_date <= start_date {
        return Err(invalid("end_date", "must be after start date"));
    }
    Ok((
        start_date.format("%Y-%m-%d").to_string(),
        end_date.format("%Y-%m-%d").to_string(),
    ))
}

pub fn timestamp(field: &str, value: &str) -> Result<String, DomainError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|ts| ts.to_rfc3339())
        .map_err(|_| invalid(field, "invalid timestamp format"))
}

pub fn action_type(value: &str) -> Result<String, DomainError> {
    let value = required_text("action_type", value, 50)?;
    if !ACTION_TYPE_RE.is_match(&value) {
        return Err(invalid(
            "action_type",
            "must be uppercase with underscores",
        ));
    }
    Ok(value)
}

pub fn timezone(value: &str) -> Result<String, DomainError> {
    let value = required_text("timezone", value, 64)?;
    if !TIMEZONE_RE.is_match(&value) {
        return Err(invalid(
            "timezone",
            "invalid timezone format (e.g., America/New_York)",
        ));
    }
    Ok(value)
}
