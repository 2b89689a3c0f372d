//! Single-pass analysis engine.
//!
//! The whole trace is read into memory once, decoded lossily (sandbox
//! captures routinely embed raw binary fragments), then processed line by
//! line with no interleaved I/O. Run time against pathological input is
//! bounded structurally: blank lines and lines past the length cap are
//! skipped before any rule or regex sees them.

use std::path::Path;

use crate::aggregate::Aggregator;
use crate::classify::RULES;
use crate::{TraceReport, TriageConfig, TriageError, TriageResult};

/// One analyzer per trace invocation. Holds only configuration; all mutable
/// state lives in the per-call [`Aggregator`], so a single analyzer can
/// serve independent traces from separate threads.
pub struct TraceAnalyzer {
    config: TriageConfig,
}

impl TraceAnalyzer {
    pub fn new(config: TriageConfig) -> Self {
        Self { config }
    }

    /// Read and classify a trace file.
    ///
    /// A missing file is the only fatal input condition and gets its own
    /// error variant for the CLI contract. Everything below file level
    /// (garbled bytes, oversized lines, undecodable fields) degrades to
    /// skips and parse warnings.
    pub fn analyze_file(&self, path: &Path) -> TriageResult<TraceReport> {
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TriageError::TraceNotFound(path.display().to_string())
            } else {
                TriageError::Io(e)
            }
        })?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(self.analyze_text(&text))
    }

    /// Classify an in-memory trace. Infallible: a trace with zero usable
    /// lines yields an empty zero-score report with a warning, not an error.
    pub fn analyze_text(&self, text: &str) -> TraceReport {
        let mut aggregator = Aggregator::new(self.config.clone());
        let mut lines_offered = 0usize;
        let mut usable_lines = 0usize;
        let mut oversized_lines = 0usize;

        for line in text.split('\n') {
            lines_offered += 1;

            if line.trim().is_empty() {
                continue;
            }
            if line.len() > self.config.max_line_length {
                oversized_lines += 1;
                continue;
            }
            usable_lines += 1;

            // Every rule sees every line; matches are additive and no rule
            // short-circuits another.
            for rule in RULES {
                for finding in (rule.run)(line) {
                    log::debug!(
                        "rule {} matched (+{}, tags {:?})",
                        rule.name,
                        finding.score,
                        finding.indicators
                    );
                    aggregator.absorb(finding);
                }
            }

            aggregator.track_counters(line);
        }

        if usable_lines == 0 {
            log::warn!("trace contained no usable lines ({lines_offered} offered)");
        } else {
            log::info!(
                "classified {usable_lines}/{lines_offered} trace lines ({oversized_lines} oversized)"
            );
        }

        aggregator.finalize(lines_offered, usable_lines, oversized_lines)
    }
}

impl Default for TraceAnalyzer {
    fn default() -> Self {
        Self::new(TriageConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_trace_is_not_an_error() {
        let report = TraceAnalyzer::default().analyze_text("");
        assert_eq!(report.severity_score, 0);
        assert!(report.threat_indicators.is_empty());
        assert!(report
            .parse_warnings
            .iter()
            .any(|w| w.contains("No usable trace lines")));
    }

    #[test]
    fn test_oversized_lines_skipped_wholesale() {
        // A credential hit buried in an oversized line must not register.
        let long = format!("openat(AT_FDCWD, \"/etc/shadow\", O_RDONLY) {}", "A".repeat(3000));
        let report = TraceAnalyzer::default().analyze_text(&long);
        assert!(report.syscalls.is_empty());
        assert_eq!(report.severity_score, 0);
        assert!(report.parse_warnings.iter().any(|w| w.contains("oversized")));
    }

    #[test]
    fn test_one_line_multiple_categories() {
        // An SSH-key read is credential access AND high-value access.
        let line = r#"openat(AT_FDCWD, "/home/user/.ssh/id_rsa", O_RDONLY) = 3"#;
        let report = TraceAnalyzer::default().analyze_text(line);
        assert_eq!(
            report.threat_indicators,
            vec!["credential_access", "high_value_credential_access"]
        );
        assert_eq!(report.severity_score, 40);
        assert_eq!(report.syscalls.len(), 1);
    }

    #[test]
    fn test_repeated_line_dedups_tag_but_not_score() {
        let line = r#"openat(AT_FDCWD, "/home/user/.ssh/id_rsa", O_RDONLY) = 3"#;
        let trace = format!("{line}\n{line}\n{line}");
        let report = TraceAnalyzer::default().analyze_text(&trace);
        assert_eq!(report.threat_indicators.len(), 2);
        assert_eq!(report.syscalls.len(), 1);
        // 3 * 40, clamped.
        assert_eq!(report.severity_score, 100);
    }

    #[test]
    fn test_loopback_connect_produces_nothing() {
        let line = r#"connect(3, {sa_family=AF_INET, sin_port=htons(8080), sin_addr=inet_addr("127.0.0.1")}, 16) = 0"#;
        let report = TraceAnalyzer::default().analyze_text(line);
        assert!(report.network_attempts.is_empty());
        assert_eq!(report.severity_score, 0);
    }

    #[test]
    fn test_parse_summary_counts_offered_lines() {
        let report = TraceAnalyzer::default().analyze_text("\n\nexecve(NULL)\n");
        // split('\n') yields 4 segments including the trailing empty one.
        assert_eq!(report.parse_warnings[0], "Parsed 4 strace lines");
    }
}
