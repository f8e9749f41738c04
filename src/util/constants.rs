// LogScope - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogScope";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogScope";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Parsing
// =============================================================================

/// Format selector used when neither the CLI nor config.toml names one.
pub const DEFAULT_FORMAT_SELECTOR: &str = "auto";

/// Lines starting with this prefix are comments and are skipped entirely.
pub const COMMENT_PREFIX: char = '#';

/// Protocol assumed when a request line carries only method and path.
pub const DEFAULT_PROTOCOL: &str = "HTTP/1.1";

/// Batches with more lines than this are parsed on the rayon thread pool.
/// Smaller batches are parsed inline; thread hand-off costs more than it saves.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10_000;

/// Minimum user-configurable parallel threshold.
pub const MIN_PARALLEL_THRESHOLD: usize = 1;

/// Maximum user-configurable parallel threshold.
pub const MAX_PARALLEL_THRESHOLD: usize = 10_000_000;

// =============================================================================
// Analysis
// =============================================================================

/// Number of rows kept in the "top N" tables (IPs, paths).
pub const TOP_N: usize = 10;

/// Number of rows shown per "top" section in the rendered text report.
pub const REPORT_TOP_ROWS: usize = 5;

/// Number of example messages shown per anomaly type in the text report.
pub const REPORT_ANOMALY_EXAMPLES: usize = 3;

// =============================================================================
// Anomaly detection
// =============================================================================

/// Status codes at or above this value are reported as errors.
pub const ERROR_STATUS_THRESHOLD: u64 = 400;

/// Status codes at or above this value are server errors (high severity).
pub const SERVER_ERROR_STATUS_THRESHOLD: u64 = 500;

/// Responses strictly larger than this many bytes are flagged.
pub const DEFAULT_LARGE_RESPONSE_BYTES: u64 = 10 * 1024 * 1024; // 10 MiB

/// Smallest accepted `[anomaly] large_response_bytes`.
pub const MIN_LARGE_RESPONSE_BYTES: u64 = 1024; // 1 KiB

/// Largest accepted `[anomaly] large_response_bytes`.
pub const MAX_LARGE_RESPONSE_BYTES: u64 = 1024 * 1024 * 1024 * 1024; // 1 TiB

/// Case-insensitive path patterns associated with probing traffic.
/// Order matters: only the first match per entry is reported.
pub const SUSPICIOUS_PATH_PATTERNS: &[&str] = &[
    r"\.php$", "admin", "wp-admin", r"\.env", "backup", "config", r"\.git",
];

// =============================================================================
// Export
// =============================================================================

/// Number of leading entries embedded in the JSON export.
pub const DEFAULT_EXPORT_SAMPLE_ENTRIES: usize = 100;

/// Maximum user-configurable JSON export sample size.
pub const MAX_EXPORT_SAMPLE_ENTRIES: usize = 100_000;

// =============================================================================
// Logging and configuration
// =============================================================================

/// Default tracing filter when neither RUST_LOG, --debug nor config set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
