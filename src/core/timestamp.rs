// LogScope - core/timestamp.rs
//
// Timestamp normalisation across the layouts the registry can capture.
// Never fails: an unrecognised timestamp is simply unavailable.

use crate::core::model::Timestamp;
use chrono::{DateTime, NaiveDateTime};

/// A timestamp layout: chrono format string plus whether it carries an offset.
struct Layout {
    format: &'static str,
    has_offset: bool,
}

/// Layouts tried in order until one parses.
const LAYOUTS: &[Layout] = &[
    // Apache/nginx access log: 10/Oct/2024:13:55:36 -0700
    Layout {
        format: "%d/%b/%Y:%H:%M:%S %z",
        has_offset: true,
    },
    // Same without the offset: 10/Oct/2024:13:55:36
    Layout {
        format: "%d/%b/%Y:%H:%M:%S",
        has_offset: false,
    },
    // Application log: 2024-10-10 13:55:36
    Layout {
        format: "%Y-%m-%d %H:%M:%S",
        has_offset: false,
    },
    // With fractional seconds: 2024-10-10 13:55:36.123456
    Layout {
        format: "%Y-%m-%d %H:%M:%S%.f",
        has_offset: false,
    },
];

/// Parse a raw timestamp string.
///
/// Offset-less layouts are read as UTC. Returns `None` when no layout fits;
/// callers treat that as "timestamp unavailable", not as a parse failure.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    LAYOUTS.iter().find_map(|layout| parse_with(raw, layout))
}

fn parse_with(raw: &str, layout: &Layout) -> Option<Timestamp> {
    if layout.has_offset {
        DateTime::parse_from_str(raw, layout.format).ok()
    } else {
        NaiveDateTime::parse_from_str(raw, layout.format)
            .ok()
            .map(|ndt| ndt.and_utc().fixed_offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_apache_layout_keeps_offset() {
        let ts = parse_timestamp("10/Oct/2024:13:55:36 -0700").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), -7 * 3600);
        assert_eq!(ts.hour(), 13, "hour is the wall clock of the source");
        assert_eq!(ts.to_rfc3339(), "2024-10-10T13:55:36-07:00");
    }

    #[test]
    fn test_apache_layout_without_offset_is_utc() {
        let ts = parse_timestamp("10/Oct/2024:13:55:36").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-10-10T13:55:36+00:00");
    }

    #[test]
    fn test_iso_like_layout() {
        let ts = parse_timestamp("2024-10-10 13:55:36").unwrap();
        assert_eq!(
            ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-10-10 13:55:36"
        );
    }

    #[test]
    fn test_fractional_seconds() {
        let ts = parse_timestamp("2024-10-10 13:55:36.250000").unwrap();
        assert_eq!(ts.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_month_name_is_case_insensitive() {
        assert!(parse_timestamp("10/oct/2024:13:55:36 +0000").is_some());
    }

    #[test]
    fn test_unrecognised_returns_none() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday at noon").is_none());
        assert!(parse_timestamp("2024-13-45 99:99:99").is_none());
        assert!(parse_timestamp("10/Foo/2024:13:55:36 -0700").is_none());
    }
}
