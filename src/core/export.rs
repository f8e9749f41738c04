// LogScope - core/export.rs
//
// JSON, CSV and text export of analysis output.
// Core layer: writes to any Write trait object; the path is only used
// for error context.

use crate::core::model::{AnalysisResult, Anomaly, Entry};
use crate::core::report;
use crate::util::error::ExportError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Shape of the JSON export document.
#[derive(Debug, Serialize)]
pub struct JsonExport<'r, 'a> {
    pub analysis: &'r AnalysisResult,
    pub anomalies: &'r [Anomaly<'a>],
    /// Leading entries of the batch, for spot checks.
    pub entries_sample: &'r [Entry],
}

/// Export the analysis, all anomalies, and the first `sample_size` entries
/// as pretty-printed JSON.
pub fn export_json<W: Write>(
    analysis: &AnalysisResult,
    anomalies: &[Anomaly<'_>],
    entries: &[Entry],
    sample_size: usize,
    mut writer: W,
    export_path: &Path,
) -> Result<(), ExportError> {
    let document = JsonExport {
        analysis,
        anomalies,
        entries_sample: &entries[..sample_size.min(entries.len())],
    };

    serde_json::to_writer_pretty(&mut writer, &document).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(
        path = %export_path.display(),
        anomalies = anomalies.len(),
        sample = document.entries_sample.len(),
        "JSON export written"
    );
    Ok(())
}

/// Export every entry as one CSV row. Returns the number of rows written.
///
/// Columns: line, format, timestamp, ip, method, path, status, size, level,
/// message, raw_line. Fields a format does not have are left empty.
pub fn export_csv<W: Write>(
    entries: &[Entry],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };

    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "line", "format", "timestamp", "ip", "method", "path", "status", "size", "level",
            "message", "raw_line",
        ])
        .map_err(csv_err)?;

    let mut count = 0;
    for entry in entries {
        let custom = entry.custom();
        csv_writer
            .write_record([
                entry.line_number.map(|n| n.to_string()).unwrap_or_default(),
                entry.format().map(|f| f.name().to_string()).unwrap_or_default(),
                entry
                    .timestamp()
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
                entry.ip().unwrap_or_default().to_string(),
                entry.method().unwrap_or_default().to_string(),
                entry.path().unwrap_or_default().to_string(),
                entry.status().map(|s| s.to_string()).unwrap_or_default(),
                entry.size().map(|s| s.to_string()).unwrap_or_default(),
                custom.map(|c| c.level.clone()).unwrap_or_default(),
                custom.map(|c| c.message.clone()).unwrap_or_default(),
                entry.raw_line.clone(),
            ])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %export_path.display(), rows = count, "CSV export written");
    Ok(count)
}

/// Write the rendered text report.
pub fn export_report<W: Write>(
    analysis: &AnalysisResult,
    anomalies: &[Anomaly<'_>],
    mut writer: W,
    export_path: &Path,
) -> Result<(), ExportError> {
    let text = report::render(analysis, anomalies);
    writer
        .write_all(text.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|e| ExportError::Io {
            path: export_path.to_path_buf(),
            source: e,
        })?;

    tracing::info!(path = %export_path.display(), "Text report written");
    Ok(())
}
