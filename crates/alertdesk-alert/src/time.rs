//! Timestamp parsing for request parameters.
//!
//! Accepted forms, tried in order: `yyyy-MM-dd HH:mm:ss` (UTC),
//! RFC 3339, and a bare `yyyy-MM-dd` meaning midnight UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{AlertError, Result};

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses `raw` as a timestamp; `field` names the parameter in the error.
pub fn parse_time(field: &str, raw: &str) -> Result<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
        return Ok(naive.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(AlertError::validation(format!(
        "invalid {field}: '{raw}', expected yyyy-MM-dd HH:mm:ss"
    )))
}

/// Like [`parse_time`], but a missing or blank value yields `None`.
pub fn parse_optional_time(field: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_time(field, s).map(Some),
    }
}

/// Renders a timestamp in the `yyyy-MM-dd HH:mm:ss` display form.
pub fn format_time(t: &DateTime<Utc>) -> String {
    t.format(DATETIME_FORMAT).to_string()
}
