//! Parsing and formatting of attribute value strings.
//!
//! Every attribute value is stored as a string. These helpers convert between
//! the stored text and the typed values the accessors hand out.

use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};

/// Stored form of `true`.
pub const TRUE: &str = "TRUE";
/// Stored form of `false`.
pub const FALSE: &str = "FALSE";

const GENERALIZED_TIME: &str = "%Y%m%d%H%M%SZ";
const GENERALIZED_TIME_MILLIS: &str = "%Y%m%d%H%M%S%.3fZ";

/// Parse a boolean sentinel. Only `TRUE` and `FALSE` (any case) are booleans.
pub fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case(TRUE) {
        Some(true)
    } else if value.eq_ignore_ascii_case(FALSE) {
        Some(false)
    } else {
        None
    }
}

pub fn format_bool(value: bool) -> &'static str {
    if value { TRUE } else { FALSE }
}

/// Parse a time interval into milliseconds.
///
/// Accepts `<n>d`, `<n>h`, `<n>m`, `<n>s`, `<n>ms` and a bare `<n>`, which is
/// read as seconds.
pub fn parse_time_interval(value: &str) -> Option<i64> {
    let value = value.trim();
    let (digits, multiplier) = if let Some(n) = value.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = value.strip_suffix('d') {
        (n, 24 * 60 * 60 * 1000)
    } else if let Some(n) = value.strip_suffix('h') {
        (n, 60 * 60 * 1000)
    } else if let Some(n) = value.strip_suffix('m') {
        (n, 60 * 1000)
    } else if let Some(n) = value.strip_suffix('s') {
        (n, 1000)
    } else {
        (value, 1000)
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok()?.checked_mul(multiplier)
}

/// Format milliseconds as the shortest exact time interval.
pub fn format_time_interval(millis: i64) -> String {
    const UNITS: [(i64, &str); 4] = [
        (24 * 60 * 60 * 1000, "d"),
        (60 * 60 * 1000, "h"),
        (60 * 1000, "m"),
        (1000, "s"),
    ];
    if millis == 0 {
        return "0".to_string();
    }
    for (size, suffix) in UNITS {
        if millis % size == 0 {
            return format!("{}{}", millis / size, suffix);
        }
    }
    format!("{}ms", millis)
}

/// Parse a long that may carry a `kb`, `mb` or `gb` suffix (1024 based).
pub fn parse_long(value: &str) -> Option<i64> {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();
    let (digits, multiplier): (&str, i64) = if let Some(n) = lower.strip_suffix("kb") {
        (n, 1024)
    } else if let Some(n) = lower.strip_suffix("mb") {
        (n, 1024 * 1024)
    } else if let Some(n) = lower.strip_suffix("gb") {
        (n, 1024 * 1024 * 1024)
    } else {
        (lower.as_str(), 1)
    };
    digits.trim().parse::<i64>().ok()?.checked_mul(multiplier)
}

/// Parse a generalized time, `yyyyMMddHHmmss[.SSS]Z`.
pub fn parse_generalized_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let format = if value.contains('.') {
        GENERALIZED_TIME_MILLIS
    } else {
        GENERALIZED_TIME
    };
    NaiveDateTime::parse_from_str(value, format)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Format a timestamp as generalized time, keeping milliseconds when present.
pub fn format_generalized_time(time: &DateTime<Utc>) -> String {
    if time.nanosecond() / 1_000_000 == 0 {
        time.format(GENERALIZED_TIME).to_string()
    } else {
        time.format(GENERALIZED_TIME_MILLIS).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_time_interval_units() {
        assert_eq!(parse_time_interval("100"), Some(100_000));
        assert_eq!(parse_time_interval("30s"), Some(30_000));
        assert_eq!(parse_time_interval("5m"), Some(300_000));
        assert_eq!(parse_time_interval("12h"), Some(43_200_000));
        assert_eq!(parse_time_interval("2d"), Some(172_800_000));
        assert_eq!(parse_time_interval("250ms"), Some(250));
        assert_eq!(parse_time_interval("h"), None);
        assert_eq!(parse_time_interval("-5m"), None);
        assert_eq!(parse_time_interval("ten"), None);
    }

    #[test]
    fn test_memory_units() {
        assert_eq!(parse_long("42"), Some(42));
        assert_eq!(parse_long("10kb"), Some(10 * 1024));
        assert_eq!(parse_long("3MB"), Some(3 * 1024 * 1024));
        assert_eq!(parse_long("1gb"), Some(1024 * 1024 * 1024));
        assert_eq!(parse_long("lots"), None);
    }

    #[test]
    fn test_booleans() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(format_bool(true), "TRUE");
    }

    #[test]
    fn test_generalized_time() {
        let time = parse_generalized_time("20240102030405Z").unwrap();
        assert_eq!(time.to_rfc3339(), "2024-01-02T03:04:05+00:00");
        assert_eq!(format_generalized_time(&time), "20240102030405Z");

        let millis = parse_generalized_time("20240102030405.123Z").unwrap();
        assert_eq!(millis.timestamp_subsec_millis(), 123);
        assert_eq!(format_generalized_time(&millis), "20240102030405.123Z");

        assert!(parse_generalized_time("2024-01-02").is_none());
    }

    proptest! {
        #[test]
        fn formatted_intervals_parse_back(millis in 0i64..10_000_000_000) {
            prop_assert_eq!(parse_time_interval(&format_time_interval(millis)), Some(millis));
        }

        #[test]
        fn generalized_time_round_trips(secs in 0i64..4_000_000_000, ms in 0u32..1000) {
            let time = Utc.timestamp_opt(secs, ms * 1_000_000).unwrap();
            prop_assert_eq!(parse_generalized_time(&format_generalized_time(&time)), Some(time));
        }
    }
}
