use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use validator::{Validate, ValidationError};
use crate::errors::AppError;

lazy_static! {
    static ref MEDIA_URL: Regex = Regex::new(r"^https?://[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}(:\d+)?(/[^\s]*)?$")
        .expect("media url pattern compiles");
}

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(AppError::from)
}

/// Rejects values that are present but only whitespace.
pub fn require_text(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

// Used by `#[validate(custom = ...)]` on exercise inputs.
pub fn validate_media_url(uri: &str) -> Result<(), ValidationError> {
    if uri.is_empty() || MEDIA_URL.is_match(uri) {
        return Ok(());
    }
    let mut err = ValidationError::new("media_url");
    err.message = Some("Media URL must be an http(s) link".into());
    Err(err)
}

/// Parses an ISO `YYYY-MM-DD` calendar day.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Invalid date format, expected YYYY-MM-DD".to_string()))
}
