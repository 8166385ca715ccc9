use chrono::{DateTime, SecondsFormat, Utc};

/// Get current time in UTC
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Format a UTC time as ISO 8601 with millisecond precision (e.g. `2024-01-01T00:00:00.000Z`)
pub fn to_iso8601_millis(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
