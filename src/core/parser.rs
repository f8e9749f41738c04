// LogScope - core/parser.rs
//
// Line classification against the format registry, and batch parsing of
// an already-materialised sequence of lines.
// Core layer: accepts text, never touches the filesystem directly.

use crate::core::extract::extract;
use crate::core::model::{Entry, FormatSelector};
use crate::core::registry::{FormatRegistry, LinePattern};
use crate::util::constants;
use rayon::prelude::*;

/// Classifies single lines against a shared, immutable registry.
///
/// Holds no per-line state, so one parser can be used from many threads.
#[derive(Debug, Clone, Copy)]
pub struct LineParser<'r> {
    registry: &'r FormatRegistry,
}

impl<'r> LineParser<'r> {
    pub fn new(registry: &'r FormatRegistry) -> Self {
        Self { registry }
    }

    /// Parse one line.
    ///
    /// `Auto` tries every pattern in registry order and keeps the first
    /// match. `Only` tries a single pattern. `Unrecognised` tries none.
    /// A line no attempted pattern matches comes back unparsed; there are
    /// no partially populated entries.
    pub fn parse(&self, line: &str, selector: &FormatSelector) -> Entry {
        match selector {
            FormatSelector::Auto => self
                .registry
                .iter()
                .find_map(|pattern| try_pattern(pattern, line)),
            FormatSelector::Only(format) => self
                .registry
                .get(*format)
                .and_then(|pattern| try_pattern(pattern, line)),
            FormatSelector::Unrecognised(_) => None,
        }
        .unwrap_or_else(|| Entry::unparsed(line))
    }
}

fn try_pattern(pattern: &LinePattern, line: &str) -> Option<Entry> {
    pattern
        .regex
        .captures(line)
        .map(|caps| extract(&caps, pattern.format, line))
}

/// Configuration for batch parsing.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    pub selector: FormatSelector,
    /// Batches with more candidate lines than this are parsed in parallel.
    pub parallel_threshold: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            selector: FormatSelector::Auto,
            parallel_threshold: constants::DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// Result of parsing one batch of lines.
#[derive(Debug, Default)]
pub struct ParseResult {
    /// One entry per non-blank, non-comment line, in input order.
    pub entries: Vec<Entry>,
    /// Total lines seen, including skipped ones.
    pub lines_read: u64,
    /// Blank and `#` comment lines that produced no entry.
    pub lines_skipped: u64,
}

impl ParseResult {
    pub fn parsed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_parsed()).count()
    }
}

/// Parse a batch of raw lines.
///
/// Each line is trimmed; blank lines and lines starting with `#` are
/// skipped and not counted as entries. Every other line yields exactly one
/// entry whose `line_number` is its 1-based position in `lines`.
///
/// Large batches are parsed on the rayon pool. Lines are independent and
/// the indexed collect keeps input order, so the output is identical to a
/// sequential run.
pub fn parse_lines<S>(lines: &[S], parser: &LineParser<'_>, config: &ParseConfig) -> ParseResult
where
    S: AsRef<str> + Sync,
{
    if let FormatSelector::Unrecognised(name) = &config.selector {
        tracing::warn!(
            selector = %name,
            "Unrecognised format selector; every line will be reported as unparsed"
        );
    }

    let candidates: Vec<(u64, &str)> = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| ((idx as u64) + 1, line.as_ref().trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with(constants::COMMENT_PREFIX))
        .collect();

    let parse_one = |&(line_number, line): &(u64, &str)| {
        let mut entry = parser.parse(line, &config.selector);
        entry.line_number = Some(line_number);
        entry
    };

    let parallel = candidates.len() > config.parallel_threshold;
    let entries: Vec<Entry> = if parallel {
        candidates.par_iter().map(parse_one).collect()
    } else {
        candidates.iter().map(parse_one).collect()
    };

    let lines_read = lines.len() as u64;
    let result = ParseResult {
        lines_skipped: lines_read - entries.len() as u64,
        lines_read,
        entries,
    };

    tracing::debug!(
        selector = %config.selector,
        lines = result.lines_read,
        entries = result.entries.len(),
        parsed = result.parsed_count(),
        skipped = result.lines_skipped,
        parallel,
        "Batch parsing complete"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::LogFormat;

    const APACHE_LINE: &str =
        r#"10.0.0.1 - - [10/Oct/2024:13:55:36 -0700] "GET /index.html HTTP/1.1" 200 512"#;
    const COMBINED_LINE: &str = r#"10.0.0.2 - - [10/Oct/2024:13:55:37 -0700] "GET /a HTTP/1.1" 200 9 "-" "curl/8.0""#;
    const CUSTOM_LINE: &str = "2024-10-10 13:55:36 ERROR: disk full";

    #[test]
    fn test_auto_detects_apache_line() {
        let registry = FormatRegistry::builtin();
        let parser = LineParser::new(&registry);
        let entry = parser.parse(APACHE_LINE, &FormatSelector::Auto);

        assert_eq!(entry.format(), Some(LogFormat::Apache));
        assert_eq!(entry.ip(), Some("10.0.0.1"));
        assert_eq!(entry.status(), Some(200));
        assert_eq!(entry.size(), Some(512));
        assert_eq!(entry.method(), Some("GET"));
        assert_eq!(entry.path(), Some("/index.html"));
        assert_eq!(
            entry.access().unwrap().request_line.as_ref().unwrap().protocol,
            "HTTP/1.1"
        );
    }

    #[test]
    fn test_registry_order_breaks_ties() {
        let registry = FormatRegistry::builtin();
        let parser = LineParser::new(&registry);
        // Both lines also satisfy later patterns; the earliest pattern wins.
        assert_eq!(
            parser.parse(APACHE_LINE, &FormatSelector::Auto).format(),
            Some(LogFormat::Apache)
        );
        assert_eq!(
            parser.parse(COMBINED_LINE, &FormatSelector::Auto).format(),
            Some(LogFormat::Apache)
        );
    }

    #[test]
    fn test_auto_detects_custom_line() {
        let registry = FormatRegistry::builtin();
        let parser = LineParser::new(&registry);
        let entry = parser.parse(CUSTOM_LINE, &FormatSelector::Auto);
        assert_eq!(entry.format(), Some(LogFormat::Custom));
        assert_eq!(entry.custom().unwrap().level, "ERROR");
        assert_eq!(entry.custom().unwrap().message, "disk full");
        assert!(entry.timestamp().is_some());
    }

    #[test]
    fn test_forced_format() {
        let registry = FormatRegistry::builtin();
        let parser = LineParser::new(&registry);

        let entry = parser.parse(COMBINED_LINE, &FormatSelector::Only(LogFormat::Combined));
        assert_eq!(entry.format(), Some(LogFormat::Combined));
        assert_eq!(
            entry.combined().unwrap().user_agent.as_deref(),
            Some("curl/8.0")
        );

        // A forced format never falls back to another pattern.
        let entry = parser.parse(APACHE_LINE, &FormatSelector::Only(LogFormat::Nginx));
        assert!(!entry.is_parsed());
        assert_eq!(entry.raw_line, APACHE_LINE);
    }

    #[test]
    fn test_unrecognised_selector_parses_nothing() {
        let registry = FormatRegistry::builtin();
        let parser = LineParser::new(&registry);
        let entry = parser.parse(APACHE_LINE, &FormatSelector::parse("iis"));
        assert_eq!(entry, Entry::unparsed(APACHE_LINE));
    }

    #[test]
    fn test_unmatched_line_is_unparsed() {
        let registry = FormatRegistry::builtin();
        let parser = LineParser::new(&registry);
        let entry = parser.parse("just some text", &FormatSelector::Auto);
        assert!(!entry.is_parsed());
        assert_eq!(entry.format(), None);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let registry = FormatRegistry::builtin();
        let parser = LineParser::new(&registry);
        for line in [APACHE_LINE, COMBINED_LINE, CUSTOM_LINE, "noise"] {
            assert_eq!(
                parser.parse(line, &FormatSelector::Auto),
                parser.parse(line, &FormatSelector::Auto)
            );
        }
    }

    #[test]
    fn test_parse_lines_skips_blank_and_comment_lines() {
        let registry = FormatRegistry::builtin();
        let parser = LineParser::new(&registry);
        let lines = vec![
            "# header comment",
            "",
            "   ",
            APACHE_LINE,
            "garbage line",
            "   2024-10-10 13:55:36 INFO: started   ",
        ];

        let result = parse_lines(&lines, &parser, &ParseConfig::default());

        assert_eq!(result.lines_read, 6);
        assert_eq!(result.lines_skipped, 3);
        assert_eq!(result.entries.len(), 3);
        assert_eq!(result.parsed_count(), 2);
        assert_eq!(result.entries[0].line_number, Some(4));
        assert_eq!(result.entries[1].line_number, Some(5));
        assert_eq!(result.entries[2].line_number, Some(6));
        assert_eq!(
            result.entries[2].raw_line,
            "2024-10-10 13:55:36 INFO: started"
        );
    }

    #[test]
    fn test_parallel_parse_matches_sequential() {
        let registry = FormatRegistry::builtin();
        let parser = LineParser::new(&registry);
        let lines: Vec<String> = (0..500)
            .map(|i| match i % 4 {
                0 => APACHE_LINE.to_string(),
                1 => format!("2024-10-10 13:{:02}:00 WARN: tick {i}", i % 60),
                2 => format!("noise {i}"),
                _ => "# comment".to_string(),
            })
            .collect();

        let sequential = parse_lines(
            &lines,
            &parser,
            &ParseConfig {
                parallel_threshold: usize::MAX,
                ..ParseConfig::default()
            },
        );
        let parallel = parse_lines(
            &lines,
            &parser,
            &ParseConfig {
                parallel_threshold: 1,
                ..ParseConfig::default()
            },
        );

        assert_eq!(sequential.entries, parallel.entries);
        assert_eq!(sequential.entries.len(), 375);
    }

    #[test]
    fn test_parse_lines_empty_input() {
        let registry = FormatRegistry::builtin();
        let parser = LineParser::new(&registry);
        let lines: Vec<&str> = Vec::new();
        let result = parse_lines(&lines, &parser, &ParseConfig::default());
        assert!(result.entries.is_empty());
        assert_eq!(result.lines_read, 0);
    }
}
