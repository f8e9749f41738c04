// LogScope - app/session.rs
//
// One analysis session: a log file read, parsed, aggregated, and ready
// for anomaly detection, reporting and export.
//
// Anomalies borrow the entries they flag, so the session owns the entries
// and hands out anomaly lists on demand instead of storing them.

use crate::core::analysis;
use crate::core::anomaly::{self, AnomalyRules};
use crate::core::model::{AnalysisResult, Anomaly, Entry, FormatSelector};
use crate::core::parser::{self, LineParser, ParseConfig};
use crate::core::registry::FormatRegistry;
use crate::platform::config::AppConfig;
use crate::platform::fs;
use crate::util::error::InputError;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// A completed analysis of one log file.
#[derive(Debug)]
pub struct Session {
    /// File the entries were read from.
    pub source: PathBuf,
    /// One entry per non-blank, non-comment line, in file order.
    pub entries: Vec<Entry>,
    /// Total physical lines in the file.
    pub lines_read: u64,
    /// Blank and comment lines that produced no entry.
    pub lines_skipped: u64,
    pub analysis: AnalysisResult,
    rules: AnomalyRules,
}

impl Session {
    /// Build a session from lines already in memory.
    ///
    /// `selector` overrides the configured default format when given.
    pub fn from_lines<S>(
        source: PathBuf,
        lines: &[S],
        config: &AppConfig,
        selector: Option<FormatSelector>,
    ) -> Self
    where
        S: AsRef<str> + Sync,
    {
        let started = Instant::now();
        let registry = FormatRegistry::builtin();
        let line_parser = LineParser::new(&registry);
        let parse_config = ParseConfig {
            selector: selector.unwrap_or_else(|| config.default_format.clone()),
            parallel_threshold: config.parallel_threshold,
        };

        let parsed = parser::parse_lines(lines, &line_parser, &parse_config);
        let analysis = analysis::analyze(&parsed.entries);
        let rules = AnomalyRules::builtin().with_large_response_bytes(config.large_response_bytes);

        tracing::info!(
            source = %source.display(),
            selector = %parse_config.selector,
            entries = analysis.total_entries,
            parsed = analysis.parsed_entries,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis complete"
        );

        Self {
            source,
            entries: parsed.entries,
            lines_read: parsed.lines_read,
            lines_skipped: parsed.lines_skipped,
            analysis,
            rules,
        }
    }

    /// Run anomaly detection over the session's entries.
    pub fn anomalies(&self) -> Vec<Anomaly<'_>> {
        anomaly::detect(&self.entries, &self.rules)
    }
}

/// Read `path` and analyse its contents.
pub fn analyze_file(
    path: &Path,
    config: &AppConfig,
    selector: Option<FormatSelector>,
) -> Result<Session, InputError> {
    let lines = fs::read_lines_lossy(path)?;
    Ok(Session::from_lines(
        path.to_path_buf(),
        &lines,
        config,
        selector,
    ))
}
