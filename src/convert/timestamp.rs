//! Timestamps are stored as text, e.g. `2022-06-29T12:34:56.789Z`.
//!
//! Formatting and parsing always happen in UTC and do not depend on the
//! host locale or time zone.

use crate::{
    convert::{FromColumn, ToParam},
    Result, Statement,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Value decoded from a `NULL` or unparsable timestamp column:
/// `0001-01-01T00:00:00Z`.
pub fn distant_past() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Formats a timestamp the way it is stored, with millisecond precision.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format(FORMAT).to_string()
}

/// Parses a stored timestamp. Explicit offsets other than `Z` are accepted
/// and converted to UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(value) = NaiveDateTime::parse_from_str(text, FORMAT) {
        return Some(value.and_utc());
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|value| value.with_timezone(&Utc))
}

/// Lossy: `NULL` and text that is not a timestamp decode as
/// [`distant_past`]. Use `Option<DateTime<Utc>>` to tell `NULL` apart.
impl FromColumn for DateTime<Utc> {
    fn from_column(statement: &Statement<'_>, index: usize) -> Result<Self> {
        if statement.is_null(index)? {
            return Ok(distant_past());
        }
        let value = std::str::from_utf8(statement.column_text(index)?)
            .ok()
            .and_then(parse_timestamp);
        Ok(value.unwrap_or_else(distant_past))
    }
}

impl ToParam for DateTime<Utc> {
    fn bind_param(&self, statement: &mut Statement<'_>, index: usize) -> Result<()> {
        statement.bind_text(index, &format_timestamp(self))
    }
}
