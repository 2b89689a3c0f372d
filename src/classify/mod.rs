//! Event classifiers: one rule per behavioral category.
//!
//! Every line that survives the length filter is offered to every rule in
//! [`RULES`] order. Rules are independent and additive; a single line can
//! feed several categories at once (an SSH-key read is both a credential
//! access and a high-value credential access), and no rule sees or alters
//! another rule's result. Each rule returns zero or more [`Finding`]s; the
//! aggregator owns dedup and score accounting.
//!
//! Copyright (c) 2026 CIPS Corps. All rights reserved.

pub mod filesystem;
pub mod network;
pub mod process;

use crate::{FileMutation, NetworkAttempt, ProcessActivity, SyscallAccess, TamperRecord};

/// A typed evidence record produced by one rule match. The variant decides
/// which report list the aggregator files it under.
#[derive(Debug, Clone, PartialEq)]
pub enum Evidence {
    Syscall(SyscallAccess),
    Network(NetworkAttempt),
    File(FileMutation),
    Process(ProcessActivity),
    Tamper(TamperRecord),
}

/// The output of one rule match on one line.
///
/// `evidence` is deduplicated into its category list by the aggregator;
/// `indicators` are deduplicated into the tag set; `score` is added
/// unconditionally every time, dedup or not.
#[derive(Debug, Clone)]
pub struct Finding {
    pub evidence: Option<Evidence>,
    pub indicators: Vec<&'static str>,
    pub score: u64,
}

impl Finding {
    pub fn new(evidence: Option<Evidence>) -> Self {
        Self {
            evidence,
            indicators: Vec::new(),
            score: 0,
        }
    }

    pub fn tag(mut self, indicator: &'static str, score: u64) -> Self {
        self.indicators.push(indicator);
        self.score += score;
        self
    }
}

/// One behavioral rule: a name (for logging) and the classification fn.
pub struct Rule {
    pub name: &'static str,
    pub run: fn(&str) -> Vec<Finding>,
}

/// The fixed rule order every line is offered to. The order matters only
/// for report list ordering, never for matching: rules cannot suppress
/// each other.
pub const RULES: &[Rule] = &[
    Rule { name: "network_connect", run: network::classify_connect },
    Rule { name: "dns_lookup", run: network::classify_dns },
    Rule { name: "credential_access", run: filesystem::classify_credential },
    Rule { name: "persistence", run: filesystem::classify_persistence },
    Rule { name: "hidden_file_drop", run: filesystem::classify_hidden_drop },
    Rule { name: "executable_grant", run: filesystem::classify_exec_grant },
    Rule { name: "suspicious_exec", run: process::classify_exec },
    Rule { name: "ptrace_injection", run: process::classify_ptrace },
    Rule { name: "mmap_wx", run: process::classify_mmap },
    Rule { name: "evidence_tampering", run: filesystem::classify_tamper },
    Rule { name: "ransomware_rename", run: filesystem::classify_ransomware_rename },
];

/// Trim and cap a raw line for embedding in an evidence record. Char-based
/// so a cap landing mid-codepoint (replacement chars from lossy decoding)
/// cannot panic.
pub(crate) fn excerpt(line: &str, max_chars: usize) -> String {
    line.trim().chars().take(max_chars).collect()
}
