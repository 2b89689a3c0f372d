//! # Trace Triage - Core Library
//!
//! Behavioral telemetry classifier for sandboxed malware analysis.
//!
//! Trace Triage ingests a line-oriented strace capture produced while a
//! suspect file executed inside an isolated sandbox, runs every line through
//! a fixed set of behavioral rules (credential access, persistence, network
//! exfiltration, injection, ransomware activity, ...), and folds the matches
//! into a single structured report with a bounded 0-100 severity score.
//!
//! ## Design Philosophy
//! - **Classify only.** No sandbox management, no code execution, no
//!   rendering. One trace in, one JSON report out.
//! - Lines are untrusted and partial: malformed, binary-garbled, or
//!   oversized lines are skipped or recorded as parse warnings, never fatal.
//! - Rules are additive. A single line may feed several categories at once;
//!   no rule short-circuits another.
//! - Evidence lists are deduplicated; the severity score is not. Seeing the
//!   same strong behavior repeatedly still raises the score.

pub mod aggregate;
pub mod catalog;
pub mod classify;
pub mod engine;
pub mod extract;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Unified error type for Trace Triage.
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Trace file not found: {0}")]
    TraceNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

impl TriageError {
    /// Short machine-readable tag identifying the failure class.
    /// Embedded in the CLI error document alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            TriageError::TraceNotFound(_) => "trace_not_found",
            TriageError::Config(_) => "config",
            TriageError::Io(_) => "io",
            TriageError::Json(_) => "json",
            TriageError::TomlDe(_) => "toml",
        }
    }
}

pub type TriageResult<T> = Result<T, TriageError>;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunable knobs for the classifier.
///
/// Loaded from a TOML file via `--config`, or defaulted. The defaults match
/// the values the rule set was calibrated against; the ransomware thresholds
/// in particular have no empirical derivation and are deliberately not
/// hard-coded into the heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Lines longer than this are skipped outright. Memory-dump noise is
    /// not worth regex-scanning.
    pub max_line_length: usize,

    /// A directory becomes "high-write" once it receives more than this
    /// many write syscalls.
    pub dir_write_threshold: u32,

    /// More than this many high-write directories triggers the
    /// mass-file-modification heuristic.
    pub high_write_dirs_threshold: usize,

    /// More than this many rename/renameat calls across the whole trace
    /// triggers the possible-ransomware heuristic.
    pub rename_threshold: u32,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            max_line_length: 2000,
            dir_write_threshold: 5,
            high_write_dirs_threshold: 10,
            rename_threshold: 20,
        }
    }
}

impl TriageConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> TriageResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TriageConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Report data model
// ---------------------------------------------------------------------------

/// Ceiling for the severity score. Raw contributions accumulate unbounded
/// in a `u64` and are clamped to this exactly once, when the report is
/// assembled.
pub const SEVERITY_CEILING: u64 = 100;

/// One suspicious syscall-level file access (credential reads and the like).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyscallAccess {
    /// Excerpt of the raw trace line, capped for report compactness.
    pub syscall: String,

    /// Filesystem path extracted from the line, when one was present.
    pub path: Option<String>,
}

/// One outbound network observation.
///
/// Two shapes share the `network_attempts` list: decoded `connect()` calls
/// and DNS resolution attempts. Serialized untagged so the JSON keeps the
/// report format consumed downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NetworkAttempt {
    /// A `connect()` to a resolvable public address. `blocked` records that
    /// the sandbox egress filter dropped it; the classifier only observes.
    Connection {
        ip: String,

        #[serde(skip_serializing_if = "Option::is_none")]
        port: Option<u16>,

        blocked: bool,

        #[serde(skip_serializing_if = "Option::is_none")]
        known_malicious_range: Option<bool>,

        #[serde(skip_serializing_if = "Option::is_none")]
        port_label: Option<String>,

        #[serde(skip_serializing_if = "Option::is_none")]
        unusual_port: Option<bool>,
    },

    /// A `getaddrinfo`/`gethostbyname` resolution of a non-allowlisted
    /// domain.
    DnsLookup {
        domain: String,

        #[serde(rename = "type")]
        kind: String,
    },
}

/// One file-mutation observation (persistence writes, hidden drops,
/// executable-bit grants).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileMutation {
    /// Raw line excerpt, or the marker `"chmod_executable"` for exec-bit
    /// grants.
    pub syscall: String,

    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// One process-level observation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ProcessActivity {
    /// ptrace attach or W+X mmap. `kind` is `ptrace_injection` or `mmap_rwx`.
    Injection {
        #[serde(rename = "type")]
        kind: String,

        detail: String,
    },

    /// An `execve()` of a suspicious binary or command line.
    Exec {
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,

        detail: String,
    },
}

/// One deletion aimed at logs, history, or audit records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TamperRecord {
    #[serde(rename = "type")]
    pub kind: String,

    pub path: String,
}

/// The final structured report for one trace.
///
/// All evidence lists are deduplicated by structural equality and preserve
/// first-seen order, so serialization is fully reproducible for a given
/// input. `threat_indicators` is a set: each tag appears at most once no
/// matter how often the behavior recurred.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TraceReport {
    /// Suspicious syscall-level accesses (credential reads).
    pub syscalls: Vec<SyscallAccess>,

    /// Outbound connection and DNS observations.
    pub network_attempts: Vec<NetworkAttempt>,

    /// Persistence writes, hidden drops, executable-bit grants.
    pub file_mutations: Vec<FileMutation>,

    /// Deduplicated behavior-class tags (`credential_access`, ...).
    pub threat_indicators: Vec<String>,

    /// Process execution and injection observations.
    pub process_activity: Vec<ProcessActivity>,

    /// Log/history/audit deletions.
    pub evidence_tampering: Vec<TamperRecord>,

    /// Bounded severity score, 0-100.
    pub severity_score: u32,

    /// Human-readable parse anomalies plus the parse summary line.
    pub parse_warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_calibration() {
        let config = TriageConfig::default();
        assert_eq!(config.max_line_length, 2000);
        assert_eq!(config.dir_write_threshold, 5);
        assert_eq!(config.high_write_dirs_threshold, 10);
        assert_eq!(config.rename_threshold, 20);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: TriageConfig = toml::from_str("rename_threshold = 3").unwrap();
        assert_eq!(config.rename_threshold, 3);
        assert_eq!(config.max_line_length, 2000);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(TriageError::TraceNotFound("x".into()).kind(), "trace_not_found");
        assert_eq!(TriageError::Config("bad".into()).kind(), "config");
    }

    #[test]
    fn test_network_attempt_untagged_roundtrip() {
        let conn = NetworkAttempt::Connection {
            ip: "185.220.1.1".into(),
            port: Some(4444),
            blocked: true,
            known_malicious_range: Some(true),
            port_label: Some("reverse_shell_metasploit".into()),
            unusual_port: None,
        };
        let json = serde_json::to_string(&conn).unwrap();
        let back: NetworkAttempt = serde_json::from_str(&json).unwrap();
        assert_eq!(conn, back);

        let dns = NetworkAttempt::DnsLookup {
            domain: "evil.example.net".into(),
            kind: "dns_lookup".into(),
        };
        let json = serde_json::to_string(&dns).unwrap();
        assert!(json.contains("\"type\":\"dns_lookup\""));
        let back: NetworkAttempt = serde_json::from_str(&json).unwrap();
        assert_eq!(dns, back);
    }

    #[test]
    fn test_process_activity_untagged_roundtrip() {
        let inj = ProcessActivity::Injection {
            kind: "ptrace_injection".into(),
            detail: "ptrace(PTRACE_ATTACH, 1234)".into(),
        };
        let back: ProcessActivity =
            serde_json::from_str(&serde_json::to_string(&inj).unwrap()).unwrap();
        assert_eq!(inj, back);

        let exec = ProcessActivity::Exec {
            path: None,
            detail: "execve(\"/bin/sh\", [\"sh\", \"-c\", \"id\"])".into(),
        };
        let back: ProcessActivity =
            serde_json::from_str(&serde_json::to_string(&exec).unwrap()).unwrap();
        assert_eq!(exec, back);
    }
}
