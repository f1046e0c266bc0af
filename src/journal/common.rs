// Common helpers for journal operations

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};

/// Current local time, keeping its UTC offset
pub fn now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// ISO-8601 with milliseconds, e.g. 2024-01-15T09:30:00.000+09:00
pub fn isoTimestamp(at: &DateTime<FixedOffset>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, false)
}

pub fn isoNow() -> String {
    isoTimestamp(&now())
}
