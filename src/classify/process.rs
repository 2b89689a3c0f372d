//! Process rules: suspicious execution, ptrace attach, and W+X mappings.
//!
//! Copyright (c) 2026 CIPS Corps. All rights reserved.

use crate::catalog::{score, DOWNLOAD_TOKENS, REVERSE_SHELL_TOKENS, SUSPICIOUS_EXEC_TOKENS};
use crate::classify::{excerpt, Evidence, Finding};
use crate::extract::extract_path;
use crate::ProcessActivity;

/// `execve()` of a resolvable path or a line mentioning a shell/network
/// utility token.
///
/// Weight tiers are mutually exclusive and checked in priority order:
/// reverse-shell tokens first (+35), download tokens second (+20), anything
/// else is recorded as evidence with no extra weight.
pub fn classify_exec(line: &str) -> Vec<Finding> {
    if !line.contains("execve(") {
        return Vec::new();
    }

    let path = extract_path(line);
    let has_token = SUSPICIOUS_EXEC_TOKENS.iter().any(|t| line.contains(t));
    if path.is_none() && !has_token {
        return Vec::new();
    }

    let mut finding = Finding::new(Some(Evidence::Process(ProcessActivity::Exec {
        path,
        detail: excerpt(line, 300),
    })));

    if REVERSE_SHELL_TOKENS.iter().any(|t| line.contains(t)) {
        finding = finding.tag("reverse_shell_attempt", score::REVERSE_SHELL);
    } else if DOWNLOAD_TOKENS.iter().any(|t| line.contains(t)) {
        finding = finding.tag("download_execution", score::DOWNLOAD_EXECUTION);
    }

    vec![finding]
}

/// `ptrace()` with attach mode: classic process injection staging.
pub fn classify_ptrace(line: &str) -> Vec<Finding> {
    if !line.contains("ptrace(") || !line.contains("PTRACE_ATTACH") {
        return Vec::new();
    }

    let finding = Finding::new(Some(Evidence::Process(ProcessActivity::Injection {
        kind: "ptrace_injection".to_string(),
        detail: excerpt(line, 200),
    })))
    .tag("process_injection", score::PROCESS_INJECTION);
    vec![finding]
}

/// `mmap()` requesting write and execute protection simultaneously: a
/// writable-then-runnable region is the shellcode staging signature.
pub fn classify_mmap(line: &str) -> Vec<Finding> {
    if !line.contains("mmap(") || !line.contains("PROT_EXEC") || !line.contains("PROT_WRITE") {
        return Vec::new();
    }

    let finding = Finding::new(Some(Evidence::Process(ProcessActivity::Injection {
        kind: "mmap_rwx".to_string(),
        detail: excerpt(line, 200),
    })))
    .tag("shellcode_injection", score::SHELLCODE_INJECTION);
    vec![finding]
}
