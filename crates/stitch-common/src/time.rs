//! Time handling for catalog timestamps and user time requests.
//!
//! Upstream catalogs publish timestamps as integers in the compact
//! `YYYYMMDDHHMMSS` form. Anything that is not exactly 14 digits is read as
//! seconds since the Unix epoch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Integer timestamp as published in the upstream catalog.
pub type Timestamp = i64;

const COMPACT_FORMAT: &str = "%Y%m%d%H%M%S";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    COMPACT_FORMAT,
    "%Y%m%d%H%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Interpret a catalog timestamp as an instant.
///
/// Returns `None` when the value cannot be represented (out of range, or a
/// 14-digit value that is not a valid calendar date).
pub fn timestamp_to_datetime(ts: Timestamp) -> Option<DateTime<Utc>> {
    if (10_000_000_000_000..100_000_000_000_000).contains(&ts) {
        let ndt = NaiveDateTime::parse_from_str(&ts.to_string(), COMPACT_FORMAT).ok()?;
        return Some(Utc.from_utc_datetime(&ndt));
    }
    DateTime::from_timestamp(ts, 0)
}

/// Parse a free-form date/time string. Values without an offset are UTC.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // A trailing Z on an otherwise naive value
    let naive = s.strip_suffix('Z').unwrap_or(s);

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(naive, format) {
            let ndt = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    None
}

/// Human-readable rendering of a catalog timestamp for overlays.
pub fn format_timestamp(ts: Timestamp) -> String {
    match timestamp_to_datetime(ts) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => ts.to_string(),
    }
}

/// The `YYYYMMDD` directory component used in upstream imagery paths.
pub fn date_component(ts: Timestamp) -> String {
    ts.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_compact_timestamp() {
        let dt = timestamp_to_datetime(20240115123020).unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 12);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 20);
    }

    #[test]
    fn test_epoch_timestamp() {
        let dt = timestamp_to_datetime(5).unwrap();
        assert_eq!(dt.timestamp(), 5);
    }

    #[test]
    fn test_invalid_compact_timestamp() {
        // 14 digits, month 13
        assert!(timestamp_to_datetime(20241315000000).is_none());
    }

    #[test]
    fn test_parse_datetime_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        for s in [
            "2024-01-15T12:00:00Z",
            "2024-01-15T12:00:00+00:00",
            "2024-01-15T14:00:00+02:00",
            "2024-01-15T12:00:00",
            "2024-01-15 12:00",
            "20240115120000",
            "Mon, 15 Jan 2024 12:00:00 +0000",
        ] {
            assert_eq!(parse_datetime(s), Some(expected), "parsing {}", s);
        }
        assert_eq!(
            parse_datetime("2024-01-15"),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("200").is_none());
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(20240115123020), "2024-01-15 12:30:20 UTC");
        assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn test_date_component() {
        assert_eq!(date_component(20240115123020), "20240115");
    }
}
