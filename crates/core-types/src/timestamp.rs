use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer};

/// Naive layouts tried in order. `%.f` also accepts a missing fraction.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 date-time as found in `sale.json`.
///
/// Offsets (including `Z`) are normalized to UTC; a bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, CoreError> {
    let raw = raw.trim();

    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.naive_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(CoreError::InvalidTimestamp(raw.to_string()))
}

/// Serde adapter for optional timestamp fields.
///
/// Pair it with `#[serde(default)]`: a missing key gives `None`, while a key that
/// is present must hold a date string. An explicit `null` is rejected.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .map(Some)
        .map_err(serde::de::Error::custom)
}
