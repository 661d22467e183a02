//! Creation and update timestamps.
//!
//! Timestamps are UTC with millisecond precision and are written as
//! `2024-03-05T10:00:00.000Z`. The fixed width keeps text comparisons in
//! SQLite in chronological order.

use serde::{Deserialize, Deserializer, Serializer};
use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// The current time truncated to milliseconds.
pub fn now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();

    now.replace_millisecond(now.millisecond()).unwrap_or(now)
}

/// Format `timestamp` in UTC.
pub fn format(timestamp: OffsetDateTime) -> String {
    let utc = timestamp.to_offset(UtcOffset::UTC);

    PrimitiveDateTime::new(utc.date(), utc.time())
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| utc.to_string())
}

/// Parse a timestamp written by [format].
pub fn parse(text: &str) -> Result<OffsetDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(text, TIMESTAMP_FORMAT).map(PrimitiveDateTime::assume_utc)
}

pub fn serialize<S: Serializer>(timestamp: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(*timestamp))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
    let text = String::deserialize(deserializer)?;

    parse(&text).map_err(serde::de::Error::custom)
}
