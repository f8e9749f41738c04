// LogScope - core/report.rs
//
// Plain-text rendering of an analysis result and its anomalies.
// Pure formatting: no I/O. The caller decides where the text goes.

use crate::core::model::{AnalysisResult, Anomaly, AnomalyKind};
use crate::util::constants;
use chrono::Duration;
use std::fmt;

const RULE_WIDTH: usize = 50;

/// A renderable report. Formats through `Display`.
pub struct Report<'r, 'a> {
    pub analysis: &'r AnalysisResult,
    pub anomalies: &'r [Anomaly<'a>],
}

/// Render the report to a string.
pub fn render(analysis: &AnalysisResult, anomalies: &[Anomaly<'_>]) -> String {
    Report {
        analysis,
        anomalies,
    }
    .to_string()
}

impl fmt::Display for Report<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.analysis;

        writeln!(f, "LOG ANALYSIS REPORT")?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;

        writeln!(f)?;
        writeln!(f, "OVERVIEW")?;
        writeln!(f, "Total entries: {}", a.total_entries)?;
        writeln!(f, "Parsed: {}", a.parsed_entries)?;
        writeln!(f, "Parse rate: {:.1}%", a.parse_rate)?;
        if a.parsed_entries > 0 {
            writeln!(f, "Unique IPs: {}", a.unique_ips)?;
        }
        if let Some(range) = &a.time_range {
            writeln!(
                f,
                "Period: {} - {} ({})",
                range.start.format("%Y-%m-%d %H:%M:%S %:z"),
                range.end.format("%Y-%m-%d %H:%M:%S %:z"),
                format_duration(range.duration)
            )?;
        }
        if let Some(sizes) = &a.response_sizes {
            writeln!(
                f,
                "Bytes served: {} (avg {:.1}, min {}, max {})",
                sizes.total_bytes, sizes.avg_size, sizes.min_size, sizes.max_size
            )?;
        }

        if !a.top_ips.is_empty() {
            writeln!(f)?;
            writeln!(f, "TOP IP ADDRESSES")?;
            for row in a.top_ips.iter().take(constants::REPORT_TOP_ROWS) {
                writeln!(f, "  {}: {} requests", row.value, row.count)?;
            }
        }

        if !a.status_codes.is_empty() {
            writeln!(f)?;
            writeln!(f, "STATUS CODES")?;
            for row in &a.status_codes {
                writeln!(f, "  {} ({}): {}", row.value, status_reason(row.value), row.count)?;
            }
        }

        if !a.http_methods.is_empty() {
            writeln!(f)?;
            writeln!(f, "HTTP METHODS")?;
            for row in &a.http_methods {
                writeln!(f, "  {}: {}", row.value, row.count)?;
            }
        }

        if !a.top_paths.is_empty() {
            writeln!(f)?;
            writeln!(f, "TOP PATHS")?;
            for row in a.top_paths.iter().take(constants::REPORT_TOP_ROWS) {
                writeln!(f, "  {}: {}", row.value, row.count)?;
            }
        }

        if !self.anomalies.is_empty() {
            writeln!(f)?;
            writeln!(f, "ANOMALIES ({})", self.anomalies.len())?;
            for (kind, group) in group_by_kind(self.anomalies) {
                writeln!(f, "  {kind}: {} cases", group.len())?;
                for anomaly in group.iter().take(constants::REPORT_ANOMALY_EXAMPLES) {
                    writeln!(f, "    - {}", anomaly.message)?;
                }
                if group.len() > constants::REPORT_ANOMALY_EXAMPLES {
                    writeln!(
                        f,
                        "    ... and {} more",
                        group.len() - constants::REPORT_ANOMALY_EXAMPLES
                    )?;
                }
            }
        }

        Ok(())
    }
}

/// Anomalies grouped by kind, groups ordered by first appearance.
fn group_by_kind<'r, 'a>(
    anomalies: &'r [Anomaly<'a>],
) -> Vec<(AnomalyKind, Vec<&'r Anomaly<'a>>)> {
    let mut groups: Vec<(AnomalyKind, Vec<&Anomaly<'a>>)> = Vec::new();
    for anomaly in anomalies {
        match groups.iter_mut().find(|(kind, _)| *kind == anomaly.kind) {
            Some((_, group)) => group.push(anomaly),
            None => groups.push((anomaly.kind, vec![anomaly])),
        }
    }
    groups
}

/// Short reason phrase for the status codes worth naming.
pub fn status_reason(status: u64) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved",
        302 => "Redirect",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Server Error",
        _ => "Unknown",
    }
}

/// `H:MM:SS`, prefixed with a day count when the span exceeds a day.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    match days {
        0 => format!("{sign}{hours}:{minutes:02}:{seconds:02}"),
        1 => format!("{sign}1 day, {hours}:{minutes:02}:{seconds:02}"),
        n => format!("{sign}{n} days, {hours}:{minutes:02}:{seconds:02}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::analyze;
    use crate::core::anomaly::{detect, AnomalyRules};
    use crate::core::model::{Entry, FormatSelector};
    use crate::core::parser::LineParser;
    use crate::core::registry::FormatRegistry;

    fn entries(lines: &[&str]) -> Vec<Entry> {
        let registry = FormatRegistry::builtin();
        let parser = LineParser::new(&registry);
        lines
            .iter()
            .map(|l| parser.parse(l, &FormatSelector::Auto))
            .collect()
    }

    #[test]
    fn test_empty_report_has_overview_only() {
        let text = render(&analyze(&[]), &[]);
        assert!(text.starts_with("LOG ANALYSIS REPORT"));
        assert!(text.contains("Total entries: 0"));
        assert!(text.contains("Parse rate: 0.0%"));
        assert!(!text.contains("Unique IPs"));
        assert!(!text.contains("STATUS CODES"));
        assert!(!text.contains("ANOMALIES"));
    }

    #[test]
    fn test_report_sections() {
        let batch = entries(&[
            r#"10.0.0.1 - - [10/Oct/2024:13:55:36 +0000] "GET / HTTP/1.1" 200 512"#,
            r#"10.0.0.1 - - [10/Oct/2024:13:56:36 +0000] "GET /x HTTP/1.1" 404 12"#,
            r#"10.0.0.2 - - [10/Oct/2024:13:57:36 +0000] "POST /y HTTP/1.1" 418 12"#,
            "not a log line",
        ]);
        let analysis = analyze(&batch);
        let anomalies = detect(&batch, &AnomalyRules::builtin());
        let text = render(&analysis, &anomalies);

        assert!(text.contains("Parse rate: 75.0%"));
        assert!(text.contains("Unique IPs: 2"));
        assert!(text.contains("Period: 2024-10-10 13:55:36 +00:00 - 2024-10-10 13:57:36 +00:00 (0:02:00)"));
        assert!(text.contains("  10.0.0.1: 2 requests"));
        assert!(text.contains("  404 (Not Found): 1"));
        assert!(text.contains("  418 (Unknown): 1"));
        assert!(text.contains("  GET: 2"));
        assert!(text.contains("ANOMALIES (2)"));
        assert!(text.contains("  error_status: 2 cases"));
        assert!(text.contains("    - HTTP 404 from 10.0.0.1"));
    }

    #[test]
    fn test_anomaly_examples_are_capped() {
        let lines: Vec<String> = (0..5)
            .map(|i| format!(r#"10.0.0.{i} - - [10/Oct/2024:13:55:36 +0000] "GET / HTTP/1.1" 500 1"#))
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let batch = entries(&refs);
        let anomalies = detect(&batch, &AnomalyRules::builtin());
        let text = render(&analyze(&batch), &anomalies);

        assert_eq!(text.matches("    - HTTP 500").count(), 3);
        assert!(text.contains("    ... and 2 more"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(0)), "0:00:00");
        assert_eq!(format_duration(Duration::seconds(3_725)), "1:02:05");
        assert_eq!(format_duration(Duration::seconds(86_400 + 61)), "1 day, 0:01:01");
        assert_eq!(format_duration(Duration::seconds(3 * 86_400)), "3 days, 0:00:00");
    }
}
