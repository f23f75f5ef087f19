//! Date/time utilities for feedling.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{FeedlingError, Result};

/// Timestamp used for items whose publish date cannot be parsed.
///
/// Epoch zero sorts such items after every dated item.
pub const UNKNOWN_PUBLISHED_AT: i64 = 0;

/// Parse a feed date string into Unix seconds.
///
/// RFC 2822 (`Tue, 02 Jan 2024 10:00:00 +0000`) is the primary form; RFC 3339
/// is accepted as well since Atom feeds use it.
pub fn parse_feed_date(raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FeedlingError::Parse("empty date".to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Ok(dt.timestamp());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp());
    }

    Err(FeedlingError::Parse(format!("unrecognized date: {raw}")))
}

/// Parse a feed date, falling back to [`UNKNOWN_PUBLISHED_AT`].
pub fn parse_feed_date_or_default(raw: &str) -> i64 {
    parse_feed_date(raw).unwrap_or(UNKNOWN_PUBLISHED_AT)
}

/// Format Unix seconds in the given timezone.
///
/// # Arguments
///
/// * `timestamp` - Seconds since the Unix epoch
/// * `timezone` - Timezone name (e.g., "Asia/Tokyo", "UTC")
/// * `format` - Output format string (e.g., "%Y/%m/%d %H:%M")
///
/// # Returns
///
/// Formatted string; falls back to UTC for an unknown timezone and to `"-"`
/// for the unknown-date sentinel.
pub fn format_timestamp(timestamp: i64, timezone: &str, format: &str) -> String {
    if timestamp == UNKNOWN_PUBLISHED_AT {
        return "-".to_string();
    }

    let dt = match Utc.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt,
        None => return "-".to_string(),
    };

    match timezone.parse::<Tz>() {
        Ok(tz) => dt.with_timezone(&tz).format(format).to_string(),
        Err(_) => dt.format(format).to_string(),
    }
}

/// Format a timestamp with the default format.
pub fn format_timestamp_default(timestamp: i64, timezone: &str) -> String {
    format_timestamp(timestamp, timezone, "%Y/%m/%d %H:%M")
}

/// Current time as Unix seconds.
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_date_rfc2822() {
        let ts = parse_feed_date("Mon, 01 Jan 2024 00:00:00 +0000").unwrap();
        assert_eq!(ts, 1704067200);
    }

    #[test]
    fn test_parse_feed_date_rfc2822_offset() {
        let ts = parse_feed_date("Mon, 01 Jan 2024 09:00:00 +0900").unwrap();
        assert_eq!(ts, 1704067200);
    }

    #[test]
    fn test_parse_feed_date_rfc3339() {
        let ts = parse_feed_date("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(ts, 1704067200);
    }

    #[test]
    fn test_parse_feed_date_invalid() {
        assert!(matches!(
            parse_feed_date("yesterday"),
            Err(FeedlingError::Parse(_))
        ));
        assert!(parse_feed_date("   ").is_err());
    }

    #[test]
    fn test_parse_feed_date_or_default() {
        assert_eq!(parse_feed_date_or_default("garbage"), UNKNOWN_PUBLISHED_AT);
        assert_eq!(
            parse_feed_date_or_default("Mon, 01 Jan 2024 00:00:00 GMT"),
            1704067200
        );
    }

    #[test]
    fn test_format_timestamp_timezone() {
        let result = format_timestamp(1705314600, "Asia/Tokyo", "%Y/%m/%d %H:%M");
        assert_eq!(result, "2024/01/15 19:30"); // UTC+9
    }

    #[test]
    fn test_format_timestamp_invalid_timezone() {
        let result = format_timestamp(1705314600, "Invalid/Zone", "%Y/%m/%d %H:%M");
        assert_eq!(result, "2024/01/15 10:30"); // Falls back to UTC
    }

    #[test]
    fn test_format_timestamp_unknown() {
        assert_eq!(format_timestamp_default(UNKNOWN_PUBLISHED_AT, "UTC"), "-");
    }
}
