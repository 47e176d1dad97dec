//! Timestamp utilities

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time as an ISO-8601 string with millisecond precision
/// (`2025-01-31T18:04:05.123Z`), the shape recipe `createdAt` values are stored in.
pub fn now_iso() -> String {
    now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Milliseconds since the Unix epoch for the current time
pub fn now_millis() -> i64 {
    now().timestamp_millis()
}

/// Parse a stored timestamp into epoch milliseconds.
///
/// Accepts RFC 3339, a naive
/// `YYYY-MM-DD HH:MM:SS` form, and plain integer milliseconds. Anything else
/// yields `None`.
pub fn parse_timestamp_millis(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    value.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_now_iso_round_trips_through_parser() {
        let iso = now_iso();
        assert!(iso.ends_with('Z'));
        let millis = parse_timestamp_millis(&iso).unwrap();
        assert!((now_millis() - millis).abs() < 60_000);
    }

    #[test]
    fn test_parse_rfc3339_with_millis() {
        let millis = parse_timestamp_millis("2024-03-01T12:00:00.500Z").unwrap();
        assert_eq!(millis, 1_709_294_400_500);
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let utc = parse_timestamp_millis("2024-03-01T12:00:00Z").unwrap();
        let offset = parse_timestamp_millis("2024-03-01T14:00:00+02:00").unwrap();
        assert_eq!(utc, offset);
    }

    #[test]
    fn test_parse_naive_datetime() {
        let millis = parse_timestamp_millis("2024-03-01 12:00:00").unwrap();
        assert_eq!(millis, 1_709_294_400_000);
    }

    #[test]
    fn test_parse_epoch_millis_string() {
        assert_eq!(parse_timestamp_millis("1709294400000"), Some(1_709_294_400_000));
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert_eq!(parse_timestamp_millis(""), None);
        assert_eq!(parse_timestamp_millis("   "), None);
        assert_eq!(parse_timestamp_millis("last tuesday"), None);
    }
}
