// LogScope - core/anomaly.rs
//
// Rule-based anomaly detection. Each parsed entry is judged on its own,
// in input order, with no state carried between entries. An entry can
// raise several anomalies, but at most one of each kind.

use crate::core::model::{Anomaly, AnomalyKind, AnomalySeverity, Entry};
use crate::util::constants;
use regex::{Regex, RegexBuilder};

/// Immutable rule set, built once and passed to `detect`.
#[derive(Debug, Clone)]
pub struct AnomalyRules {
    /// Status at or above which an entry is an error.
    pub error_status: u64,
    /// Status at or above which an error is high severity.
    pub server_error_status: u64,
    /// Responses strictly larger than this are flagged.
    pub large_response_bytes: u64,
    /// Case-insensitive path patterns; the first match wins.
    suspicious_paths: Vec<Regex>,
}

impl AnomalyRules {
    /// The standard rule set.
    pub fn builtin() -> Self {
        let suspicious_paths = constants::SUSPICIOUS_PATH_PATTERNS
            .iter()
            .map(|source| {
                RegexBuilder::new(source)
                    .case_insensitive(true)
                    .build()
                    .expect("built-in suspicious path pattern must compile")
            })
            .collect();

        Self {
            error_status: constants::ERROR_STATUS_THRESHOLD,
            server_error_status: constants::SERVER_ERROR_STATUS_THRESHOLD,
            large_response_bytes: constants::DEFAULT_LARGE_RESPONSE_BYTES,
            suspicious_paths,
        }
    }

    /// Same rules with a different large-response threshold.
    pub fn with_large_response_bytes(mut self, bytes: u64) -> Self {
        self.large_response_bytes = bytes;
        self
    }

    fn is_suspicious(&self, path: &str) -> bool {
        self.suspicious_paths.iter().any(|re| re.is_match(path))
    }
}

impl Default for AnomalyRules {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Flag suspicious or erroneous entries. Unparsed entries are ignored.
pub fn detect<'a>(entries: &'a [Entry], rules: &AnomalyRules) -> Vec<Anomaly<'a>> {
    let mut anomalies = Vec::new();

    for entry in entries.iter().filter(|e| e.is_parsed()) {
        let Some(access) = entry.access() else {
            continue;
        };

        if access.status >= rules.error_status {
            let severity = if access.status >= rules.server_error_status {
                AnomalySeverity::High
            } else {
                AnomalySeverity::Medium
            };
            anomalies.push(Anomaly {
                kind: AnomalyKind::ErrorStatus,
                severity,
                message: format!("HTTP {} from {}", access.status, access.ip),
                entry,
            });
        }

        if access.size > rules.large_response_bytes {
            anomalies.push(Anomaly {
                kind: AnomalyKind::LargeResponse,
                severity: AnomalySeverity::Medium,
                message: format!("Large response {} bytes", access.size),
                entry,
            });
        }

        if let Some(path) = entry.path() {
            if rules.is_suspicious(path) {
                anomalies.push(Anomaly {
                    kind: AnomalyKind::SuspiciousPath,
                    severity: AnomalySeverity::High,
                    message: format!("Suspicious path access: {path}"),
                    entry,
                });
            }
        }
    }

    tracing::debug!(
        entries = entries.len(),
        anomalies = anomalies.len(),
        "Anomaly detection complete"
    );

    anomalies
}
