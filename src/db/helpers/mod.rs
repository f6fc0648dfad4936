use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, SecondsFormat, Utc};

/// Fixed-width UTC form used for the `datetime` column.
///
/// Nanosecond precision with a `Z` suffix keeps lexical order equal to
/// chronological order, which the page queries sort on.
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Column form of `value`, refusing instants outside years 0000-9999.
///
/// Beyond that range the RFC 3339 text gains a sign and extra digits, which
/// neither parses back nor sorts with the rest of the column.
pub fn storable_datetime(value: &DateTime<Utc>) -> Result<String> {
    if !(0..=9999).contains(&value.year()) {
        bail!("timestamp {value} is outside the storable range of years 0000-9999");
    }
    Ok(format_datetime(value))
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

/// Stored form of a label. Unset and empty are the same filter key.
pub fn label_key(label: Option<&str>) -> &str {
    label.unwrap_or("")
}

pub fn label_from_column(value: Option<String>) -> Option<String> {
    value.filter(|label| !label.is_empty())
}

pub fn to_i64(value: usize) -> Result<i64> {
    i64::try_from(value).with_context(|| format!("value {value} exceeds SQLite INTEGER range"))
}
