// LogScope - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies. These types are the shared vocabulary between
// the parser, the analysis passes, and the report/export layers.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Serialize, Serializer};
use std::fmt;

/// Normalised timestamp. The source UTC offset is kept so hour-of-day
/// statistics reflect the wall clock the log was written in.
pub type Timestamp = DateTime<FixedOffset>;

// =============================================================================
// Log formats
// =============================================================================

/// The fixed set of line formats the registry knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Apache,
    Nginx,
    Common,
    Combined,
    Custom,
}

impl LogFormat {
    /// All formats in registry order.
    pub fn all() -> &'static [LogFormat] {
        &[
            LogFormat::Apache,
            LogFormat::Nginx,
            LogFormat::Common,
            LogFormat::Combined,
            LogFormat::Custom,
        ]
    }

    /// Selector name (as accepted on the command line and in config.toml).
    pub fn name(&self) -> &'static str {
        match self {
            LogFormat::Apache => "apache",
            LogFormat::Nginx => "nginx",
            LogFormat::Common => "common",
            LogFormat::Combined => "combined",
            LogFormat::Custom => "custom",
        }
    }

    /// One-line description for the `formats` listing.
    pub fn description(&self) -> &'static str {
        match self {
            LogFormat::Apache => "Apache access log",
            LogFormat::Nginx => "Nginx access log (with referer and user agent)",
            LogFormat::Common => "Common Log Format",
            LogFormat::Combined => "Combined Log Format",
            LogFormat::Custom => "Application log (YYYY-MM-DD HH:MM:SS LEVEL: message)",
        }
    }

    /// Look up a format by its selector name (exact, lowercase).
    pub fn from_name(name: &str) -> Option<LogFormat> {
        LogFormat::all().iter().copied().find(|f| f.name() == name)
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which registry patterns a parse attempt may use.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormatSelector {
    /// Try every pattern in registry order; first match wins.
    #[default]
    Auto,
    /// Try exactly one pattern.
    Only(LogFormat),
    /// A name that is neither "auto" nor a known format. No pattern is
    /// tried, so every line comes back unparsed.
    Unrecognised(String),
}

impl FormatSelector {
    /// Interpret a selector name. Never fails: unknown names are kept
    /// as `Unrecognised` so the caller can report them.
    pub fn parse(name: &str) -> FormatSelector {
        let name = name.trim();
        if name == "auto" {
            FormatSelector::Auto
        } else if let Some(format) = LogFormat::from_name(name) {
            FormatSelector::Only(format)
        } else {
            FormatSelector::Unrecognised(name.to_string())
        }
    }
}

impl fmt::Display for FormatSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatSelector::Auto => f.write_str("auto"),
            FormatSelector::Only(format) => f.write_str(format.name()),
            FormatSelector::Unrecognised(name) => f.write_str(name),
        }
    }
}

// =============================================================================
// Entry (normalised output of parsing)
// =============================================================================

/// Method, path and protocol split out of a request string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestLine {
    pub method: String,
    pub path: String,
    pub protocol: String,
}

/// Fields shared by every web access log format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessFields {
    pub ip: String,
    #[serde(serialize_with = "serialize_opt_rfc3339")]
    pub timestamp: Option<Timestamp>,
    /// The quoted request string, verbatim.
    pub request: String,
    /// HTTP status as logged, even outside the registered code range;
    /// 0 only when the captured digits do not fit a `u64`.
    pub status: u64,
    /// Response size in bytes; 0 when the captured text is not a valid number.
    pub size: u64,
    /// Present only when the request splits into at least two tokens.
    #[serde(flatten)]
    pub request_line: Option<RequestLine>,
}

/// Access fields plus the two trailing quoted fields of nginx/combined lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedFields {
    #[serde(flatten)]
    pub access: AccessFields,
    /// `None` when the log recorded a literal `-`.
    pub referer: Option<String>,
    pub user_agent: Option<String>,
}

/// Fields of the `custom` application log format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomFields {
    #[serde(serialize_with = "serialize_opt_rfc3339")]
    pub timestamp: Option<Timestamp>,
    pub level: String,
    pub message: String,
}

/// Format-tagged payload of an entry. Each variant carries exactly the
/// field set of its format, so fields from two formats can never mix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum Record {
    Unparsed,
    Apache(AccessFields),
    Nginx(CombinedFields),
    Common(AccessFields),
    Combined(CombinedFields),
    Custom(CustomFields),
}

impl Record {
    /// The format this record was parsed as, `None` when unparsed.
    pub fn format(&self) -> Option<LogFormat> {
        match self {
            Record::Unparsed => None,
            Record::Apache(_) => Some(LogFormat::Apache),
            Record::Nginx(_) => Some(LogFormat::Nginx),
            Record::Common(_) => Some(LogFormat::Common),
            Record::Combined(_) => Some(LogFormat::Combined),
            Record::Custom(_) => Some(LogFormat::Custom),
        }
    }
}

/// One input line and whatever could be parsed out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The trimmed source line.
    pub raw_line: String,
    /// 1-based position in the source; assigned by the batch reader, not the parser.
    pub line_number: Option<u64>,
    pub record: Record,
}

impl Entry {
    /// An entry for a line no pattern recognised.
    pub fn unparsed(raw_line: impl Into<String>) -> Self {
        Self {
            raw_line: raw_line.into(),
            line_number: None,
            record: Record::Unparsed,
        }
    }

    pub fn is_parsed(&self) -> bool {
        !matches!(self.record, Record::Unparsed)
    }

    pub fn format(&self) -> Option<LogFormat> {
        self.record.format()
    }

    /// Access-log fields, for any of the four web formats.
    pub fn access(&self) -> Option<&AccessFields> {
        match &self.record {
            Record::Apache(a) | Record::Common(a) => Some(a),
            Record::Nginx(c) | Record::Combined(c) => Some(&c.access),
            Record::Unparsed | Record::Custom(_) => None,
        }
    }

    /// Referer/user-agent fields, for nginx and combined entries only.
    pub fn combined(&self) -> Option<&CombinedFields> {
        match &self.record {
            Record::Nginx(c) | Record::Combined(c) => Some(c),
            _ => None,
        }
    }

    pub fn custom(&self) -> Option<&CustomFields> {
        match &self.record {
            Record::Custom(c) => Some(c),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> Option<Timestamp> {
        match &self.record {
            Record::Custom(c) => c.timestamp,
            _ => self.access().and_then(|a| a.timestamp),
        }
    }

    pub fn ip(&self) -> Option<&str> {
        self.access().map(|a| a.ip.as_str())
    }

    pub fn status(&self) -> Option<u64> {
        self.access().map(|a| a.status)
    }

    pub fn size(&self) -> Option<u64> {
        self.access().map(|a| a.size)
    }

    pub fn method(&self) -> Option<&str> {
        self.request_line().map(|r| r.method.as_str())
    }

    pub fn path(&self) -> Option<&str> {
        self.request_line().map(|r| r.path.as_str())
    }

    fn request_line(&self) -> Option<&RequestLine> {
        self.access().and_then(|a| a.request_line.as_ref())
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct EntryView<'a> {
            raw_line: &'a str,
            parsed: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            line_number: Option<u64>,
            #[serde(flatten)]
            record: Option<&'a Record>,
        }

        EntryView {
            raw_line: &self.raw_line,
            parsed: self.is_parsed(),
            line_number: self.line_number,
            record: match self.record {
                Record::Unparsed => None,
                ref record => Some(record),
            },
        }
        .serialize(serializer)
    }
}

// =============================================================================
// Analysis result
// =============================================================================

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally<K> {
    pub value: K,
    pub count: usize,
}

/// Byte statistics over entries with a non-zero response size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSizes {
    pub total_bytes: u64,
    pub avg_size: f64,
    pub max_size: u64,
    pub min_size: u64,
}

/// Earliest and latest timestamp seen in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    #[serde(serialize_with = "serialize_rfc3339")]
    pub start: Timestamp,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub end: Timestamp,
    #[serde(rename = "duration_secs", serialize_with = "serialize_seconds")]
    pub duration: Duration,
}

/// Timestamps are written with `to_rfc3339`, which always spells out the
/// offset (`+00:00`, never `Z`), so JSON and CSV exports agree.
fn serialize_rfc3339<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339())
}

fn serialize_opt_rfc3339<S: Serializer>(
    ts: &Option<Timestamp>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => serialize_rfc3339(ts, serializer),
        None => serializer.serialize_none(),
    }
}

fn serialize_seconds<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(duration.num_seconds())
}

/// Summary statistics for one batch of entries.
///
/// Frequency tables are ordered by descending count; ties keep the order
/// in which the value first appeared in the batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnalysisResult {
    pub total_entries: usize,
    pub parsed_entries: usize,
    /// Percentage in `[0, 100]`; 0 for an empty batch.
    pub parse_rate: f64,
    pub unique_ips: usize,
    pub top_ips: Vec<Tally<String>>,
    pub status_codes: Vec<Tally<u64>>,
    pub http_methods: Vec<Tally<String>>,
    pub top_paths: Vec<Tally<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_sizes: Option<ResponseSizes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    pub traffic_by_hour: Vec<Tally<u32>>,
}

// =============================================================================
// Anomalies
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    ErrorStatus,
    LargeResponse,
    SuspiciousPath,
}

impl AnomalyKind {
    pub fn label(&self) -> &'static str {
        match self {
            AnomalyKind::ErrorStatus => "error_status",
            AnomalyKind::LargeResponse => "large_response",
            AnomalyKind::SuspiciousPath => "suspicious_path",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse priority, used only for display ordering downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    Medium,
    High,
}

/// A flagged entry. Borrows the entry from the batch that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly<'a> {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub severity: AnomalySeverity,
    pub message: String,
    pub entry: &'a Entry,
}
