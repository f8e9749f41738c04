// LogScope - platform/config.rs
//
// Config directory resolution and config.toml loading with validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::FormatSelector;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogScope configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logscope/ or %APPDATA%\LogScope\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Location of config.toml inside the config directory.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub parsing: ParsingSection,
    pub anomaly: AnomalySection,
    pub export: ExportSection,
    pub logging: LoggingSection,
}

/// `[parsing]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ParsingSection {
    /// Format selector used when the CLI does not pass `--format`.
    pub default_format: Option<String>,
    /// Line count above which batches are parsed in parallel.
    pub parallel_threshold: Option<usize>,
}

/// `[anomaly]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct AnomalySection {
    /// Responses larger than this many bytes are flagged.
    pub large_response_bytes: Option<u64>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Number of entries embedded in the JSON export.
    pub sample_entries: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration.
///
/// Every value has been checked against the limits in `util::constants`;
/// invalid values were replaced by defaults with a warning.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_format: FormatSelector,
    pub parallel_threshold: usize,
    pub large_response_bytes: u64,
    pub export_sample_entries: usize,
    /// Logging level string (read before tracing is initialised).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_format: FormatSelector::Auto,
            parallel_threshold: constants::DEFAULT_PARALLEL_THRESHOLD,
            large_response_bytes: constants::DEFAULT_LARGE_RESPONSE_BYTES,
            export_sample_entries: constants::DEFAULT_EXPORT_SAMPLE_ENTRIES,
            log_level: None,
        }
    }
}

/// Load and validate a config file.
///
/// Returns the validated config and every non-fatal problem found. A
/// missing file is not a problem (first run). An unreadable or unparseable
/// file yields defaults plus one error describing why.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<ConfigError>) {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source: e,
            };
            return (AppConfig::default(), vec![err]);
        }
    };

    match parse_config(&content, config_path) {
        Ok(raw) => {
            let (config, warnings) = validate(raw);
            (config, warnings)
        }
        Err(err) => (AppConfig::default(), vec![err]),
    }
}

/// Parse config.toml content. `path` is used for error messages only.
pub fn parse_config(content: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Validate each field against named constants, accumulating all problems.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<ConfigError>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    // -- Parsing: default_format --
    if let Some(name) = raw.parsing.default_format {
        match FormatSelector::parse(&name) {
            FormatSelector::Unrecognised(_) => warnings.push(ConfigError::ValueOutOfRange {
                field: "[parsing] default_format".to_string(),
                value: name,
                expected: "auto, apache, nginx, common, combined or custom".to_string(),
            }),
            selector => config.default_format = selector,
        }
    }

    // -- Parsing: parallel_threshold --
    if let Some(threshold) = raw.parsing.parallel_threshold {
        if (constants::MIN_PARALLEL_THRESHOLD..=constants::MAX_PARALLEL_THRESHOLD)
            .contains(&threshold)
        {
            config.parallel_threshold = threshold;
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "[parsing] parallel_threshold".to_string(),
                value: threshold.to_string(),
                expected: format!(
                    "{}-{}",
                    constants::MIN_PARALLEL_THRESHOLD,
                    constants::MAX_PARALLEL_THRESHOLD
                ),
            });
        }
    }

    // -- Anomaly: large_response_bytes --
    if let Some(bytes) = raw.anomaly.large_response_bytes {
        if (constants::MIN_LARGE_RESPONSE_BYTES..=constants::MAX_LARGE_RESPONSE_BYTES)
            .contains(&bytes)
        {
            config.large_response_bytes = bytes;
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "[anomaly] large_response_bytes".to_string(),
                value: bytes.to_string(),
                expected: format!(
                    "{}-{}",
                    constants::MIN_LARGE_RESPONSE_BYTES,
                    constants::MAX_LARGE_RESPONSE_BYTES
                ),
            });
        }
    }

    // -- Export: sample_entries --
    if let Some(sample) = raw.export.sample_entries {
        if sample <= constants::MAX_EXPORT_SAMPLE_ENTRIES {
            config.export_sample_entries = sample;
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "[export] sample_entries".to_string(),
                value: sample.to_string(),
                expected: format!("0-{}", constants::MAX_EXPORT_SAMPLE_ENTRIES),
            });
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        match level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {
                config.log_level = Some(level.to_lowercase());
            }
            _ => warnings.push(ConfigError::ValueOutOfRange {
                field: "[logging] level".to_string(),
                value: level,
                expected: "error, warn, info, debug or trace".to_string(),
            }),
        }
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::LogFormat;
    use std::io::Write;

    fn load_str(content: &str) -> (AppConfig, Vec<ConfigError>) {
        let raw = parse_config(content, Path::new("config.toml")).unwrap();
        validate(raw)
    }

    #[test]
    fn test_empty_config_gives_defaults() {
        let (config, warnings) = load_str("");
        assert!(warnings.is_empty());
        assert_eq!(config.default_format, FormatSelector::Auto);
        assert_eq!(config.parallel_threshold, constants::DEFAULT_PARALLEL_THRESHOLD);
        assert_eq!(config.large_response_bytes, 10 * 1024 * 1024);
        assert_eq!(config.export_sample_entries, 100);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_valid_values_are_applied() {
        let (config, warnings) = load_str(
            r#"
[parsing]
default_format = "nginx"
parallel_threshold = 500

[anomaly]
large_response_bytes = 2048

[export]
sample_entries = 0

[logging]
level = "DEBUG"

[unknown_section]
anything = true
"#,
        );
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.default_format, FormatSelector::Only(LogFormat::Nginx));
        assert_eq!(config.parallel_threshold, 500);
        assert_eq!(config.large_response_bytes, 2048);
        assert_eq!(config.export_sample_entries, 0);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_fall_back_with_warnings() {
        let (config, warnings) = load_str(
            r#"
[parsing]
default_format = "w3c"
parallel_threshold = 0

[anomaly]
large_response_bytes = 10

[export]
sample_entries = 100001

[logging]
level = "verbose"
"#,
        );
        assert_eq!(warnings.len(), 5);
        assert!(warnings
            .iter()
            .all(|w| matches!(w, ConfigError::ValueOutOfRange { .. })));
        assert_eq!(config.default_format, FormatSelector::Auto);
        assert_eq!(config.parallel_threshold, constants::DEFAULT_PARALLEL_THRESHOLD);
        assert_eq!(config.large_response_bytes, constants::DEFAULT_LARGE_RESPONSE_BYTES);
        assert_eq!(config.export_sample_entries, constants::DEFAULT_EXPORT_SAMPLE_ENTRIES);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_sample_entries_upper_bound_is_inclusive() {
        let (config, warnings) = load_str("[export]\nsample_entries = 100000\n");
        assert!(warnings.is_empty());
        assert_eq!(config.export_sample_entries, constants::MAX_EXPORT_SAMPLE_ENTRIES);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[parsing\ndefault_format = ").unwrap();

        let (config, warnings) = load_config(file.path());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ConfigError::TomlParse { .. }));
        assert_eq!(config.default_format, FormatSelector::Auto);
    }

    #[test]
    fn test_missing_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let (_, warnings) = load_config(&dir.path().join("config.toml"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_config_file_location() {
        let paths = PlatformPaths {
            config_dir: PathBuf::from("/etc/logscope"),
        };
        assert_eq!(paths.config_file(), PathBuf::from("/etc/logscope/config.toml"));
    }
}
