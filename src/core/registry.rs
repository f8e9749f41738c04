// LogScope - core/registry.rs
//
// The fixed, ordered table of line patterns. Registry order is the
// auto-detection tie-break: the first pattern that matches a line wins,
// even when a later pattern would match as well.
//
// Patterns are anchored at line start only. Text after the recognised
// structure is tolerated, which is why a combined-shaped line auto-detects
// as `apache`. `common` and `combined` share their wire layout with
// `nginx`; they are distinct names, kept for forced-format parsing.

use crate::core::model::LogFormat;
use regex::Regex;

/// Pattern source for each format, in registry order.
///
/// Capture names are what `core::extract` reads: `ip`, `timestamp`,
/// `request`, `status`, `size`, `referer`, `user_agent`, `level`, `message`.
const BUILTIN_PATTERNS: &[(LogFormat, &str)] = &[
    (
        LogFormat::Apache,
        r#"^(?P<ip>\S+) \S+ \S+ \[(?P<timestamp>.*?)\] "(?P<request>.*?)" (?P<status>\d+) (?P<size>\d+)"#,
    ),
    (
        LogFormat::Nginx,
        r#"^(?P<ip>\S+) - - \[(?P<timestamp>.*?)\] "(?P<request>.*?)" (?P<status>\d+) (?P<size>\d+) "(?P<referer>.*?)" "(?P<user_agent>.*?)""#,
    ),
    (
        LogFormat::Common,
        r#"^(?P<ip>\S+) - - \[(?P<timestamp>.*?)\] "(?P<request>.*?)" (?P<status>\d+) (?P<size>\d+)"#,
    ),
    (
        LogFormat::Combined,
        r#"^(?P<ip>\S+) - - \[(?P<timestamp>.*?)\] "(?P<request>.*?)" (?P<status>\d+) (?P<size>\d+) "(?P<referer>.*?)" "(?P<user_agent>.*?)""#,
    ),
    (
        LogFormat::Custom,
        r"^(?P<timestamp>\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}) (?P<level>\w+): (?P<message>.+)",
    ),
];

/// A compiled line pattern for one format.
#[derive(Debug, Clone)]
pub struct LinePattern {
    pub format: LogFormat,
    pub regex: Regex,
}

/// Immutable ordered table of line patterns.
///
/// Built once and shared by reference; holds no mutable state, so one
/// registry can serve any number of parsing threads.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    patterns: Vec<LinePattern>,
}

impl FormatRegistry {
    /// Compile the built-in pattern table.
    pub fn builtin() -> Self {
        // The table is static; the unit tests below compile every entry,
        // so a typo surfaces as a failing test rather than at runtime.
        let patterns = BUILTIN_PATTERNS
            .iter()
            .map(|(format, source)| LinePattern {
                format: *format,
                regex: Regex::new(source).expect("built-in line pattern must compile"),
            })
            .collect::<Vec<_>>();

        tracing::debug!(patterns = patterns.len(), "Format registry compiled");

        Self { patterns }
    }

    /// Patterns in detection order.
    pub fn iter(&self) -> impl Iterator<Item = &LinePattern> {
        self.patterns.iter()
    }

    /// The pattern registered for `format`.
    pub fn get(&self, format: LogFormat) -> Option<&LinePattern> {
        self.patterns.iter().find(|p| p.format == format)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APACHE_LINE: &str =
        r#"10.0.0.1 - - [10/Oct/2024:13:55:36 -0700] "GET /index.html HTTP/1.1" 200 512"#;
    const COMBINED_LINE: &str = r#"10.0.0.1 - - [10/Oct/2024:13:55:36 -0700] "GET / HTTP/1.1" 200 512 "-" "curl/8.0""#;

    #[test]
    fn test_registry_order_is_fixed() {
        let registry = FormatRegistry::builtin();
        let order: Vec<LogFormat> = registry.iter().map(|p| p.format).collect();
        assert_eq!(order, LogFormat::all());
    }

    #[test]
    fn test_every_format_registered() {
        let registry = FormatRegistry::builtin();
        assert_eq!(registry.iter().count(), 5);
        for format in LogFormat::all() {
            assert!(registry.get(*format).is_some(), "{format} missing");
        }
    }

    #[test]
    fn test_apache_and_common_both_match_clf_line() {
        let registry = FormatRegistry::builtin();
        for format in [LogFormat::Apache, LogFormat::Common] {
            assert!(registry.get(format).unwrap().regex.is_match(APACHE_LINE));
        }
        assert!(!registry
            .get(LogFormat::Nginx)
            .unwrap()
            .regex
            .is_match(APACHE_LINE));
    }

    #[test]
    fn test_apache_accepts_named_ident_and_user() {
        let registry = FormatRegistry::builtin();
        let line = r#"127.0.0.1 ident frank [10/Oct/2000:13:55:36 -0700] "GET /a.gif HTTP/1.0" 200 2326"#;
        assert!(registry.get(LogFormat::Apache).unwrap().regex.is_match(line));
        assert!(!registry.get(LogFormat::Common).unwrap().regex.is_match(line));
    }

    #[test]
    fn test_combined_line_matches_every_web_pattern() {
        let registry = FormatRegistry::builtin();
        for format in [
            LogFormat::Apache,
            LogFormat::Nginx,
            LogFormat::Common,
            LogFormat::Combined,
        ] {
            assert!(
                registry.get(format).unwrap().regex.is_match(COMBINED_LINE),
                "{format} should match"
            );
        }
    }

    #[test]
    fn test_patterns_anchor_at_line_start() {
        let registry = FormatRegistry::builtin();
        let shifted = format!("junk {}", "2024-10-10 13:55:36 ERROR: disk full");
        assert!(!registry
            .get(LogFormat::Custom)
            .unwrap()
            .regex
            .is_match(&shifted));
    }
}
