/// Utility functions for timestamp handling and formatting
use time::{format_description, OffsetDateTime};

/// Format a timestamp for human-readable display
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    let format = format_description::parse("[day].[month].[year] - [hour]:[minute]:[second]")
        .expect("Failed to create format description");
    dt.format(&format).unwrap_or_else(|_| dt.to_string())
}

/// Convert an epoch-seconds value into a human-readable date-time string
///
/// This is the display transform for the `timestamp` field. Fractional
/// seconds are truncated; a value outside the representable range falls
/// back to the raw number.
pub fn format_epoch(secs: f64) -> String {
    match OffsetDateTime::from_unix_timestamp(secs as i64) {
        Ok(dt) => format_datetime(&dt),
        Err(_) => secs.to_string(),
    }
}

/// Current wall-clock time in epoch seconds, used to tag local-device records.
pub fn now_epoch() -> f64 {
    OffsetDateTime::now_utc().unix_timestamp() as f64
}
