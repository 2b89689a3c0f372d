//! Filesystem rules: credential reads, persistence writes, hidden drops,
//! executable-bit grants, log deletion, and ransomware renames.
//!
//! All of these are substring/regex rules over a single line plus the
//! syscall-name fragments present on it. String matching comes first;
//! regexes only where a fragment table cannot express the shape (hidden
//! paths, octal modes). A non-matching line costs almost nothing.
//!
//! Copyright (c) 2026 CIPS Corps. All rights reserved.

use crate::catalog::{
    score, CREDENTIAL_PATHS, EVIDENCE_DELETION_PATHS, HIDDEN_FILE_PATTERNS,
    HIGH_VALUE_CREDENTIAL_PATHS, OPEN_CREATE_SYSCALLS, OPEN_READ_SYSCALLS, OPEN_WRITE_SYSCALLS,
    PERSISTENCE_PATHS, RANSOMWARE_EXTENSIONS,
};
use crate::classify::{excerpt, Evidence, Finding};
use crate::extract::extract_path;
use crate::{FileMutation, SyscallAccess, TamperRecord};
use regex::Regex;
use std::sync::LazyLock;

/// Octal mode with any execute bit set (0755, 0777, 0100, ...).
static RE_EXEC_MODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"0[0-7]*[157][0-7]{2}").expect("regex"));

fn contains_any(line: &str, fragments: &[&str]) -> bool {
    fragments.iter().any(|f| line.contains(f))
}

/// Credential-store access: a catalogued credential path plus an open/read
/// syscall. `/dev/null` redirects are a common benign shape (installers
/// probing for files) and are filtered out.
pub fn classify_credential(line: &str) -> Vec<Finding> {
    if !contains_any(line, CREDENTIAL_PATHS)
        || !contains_any(line, OPEN_READ_SYSCALLS)
        || line.contains("/dev/null")
    {
        return Vec::new();
    }

    let mut finding = Finding::new(Some(Evidence::Syscall(SyscallAccess {
        syscall: excerpt(line, 300),
        path: extract_path(line),
    })));
    finding = finding.tag("credential_access", score::CREDENTIAL_ACCESS);

    // Private keys and wallets are a tier above browser stores.
    if contains_any(line, HIGH_VALUE_CREDENTIAL_PATHS) {
        finding = finding.tag("high_value_credential_access", score::HIGH_VALUE_CREDENTIAL);
    }

    vec![finding]
}

/// Persistence-location write: autostart dirs, shell rc files, cron,
/// systemd units, init scripts, static registry run-keys.
pub fn classify_persistence(line: &str) -> Vec<Finding> {
    if !contains_any(line, PERSISTENCE_PATHS) || !contains_any(line, OPEN_WRITE_SYSCALLS) {
        return Vec::new();
    }

    let finding = Finding::new(Some(Evidence::File(FileMutation {
        syscall: excerpt(line, 300),
        path: extract_path(line),
        detail: None,
    })))
    .tag("persistence", score::PERSISTENCE);
    vec![finding]
}

/// Hidden file drop: dotfiles in world-writable dirs or disguised process
/// names, created or written. First matching pattern per line wins.
pub fn classify_hidden_drop(line: &str) -> Vec<Finding> {
    let hit = HIDDEN_FILE_PATTERNS.iter().any(|p| p.is_match(line));
    if !hit || !contains_any(line, OPEN_CREATE_SYSCALLS) {
        return Vec::new();
    }

    let finding = Finding::new(Some(Evidence::File(FileMutation {
        syscall: excerpt(line, 300),
        path: extract_path(line),
        detail: None,
    })))
    .tag("hidden_file_drop", score::HIDDEN_FILE_DROP);
    vec![finding]
}

/// Executable-bit grant: `chmod`/`fchmod` with an exec-bit octal mode, or an
/// explicit `PROT_EXEC` flag on the line.
pub fn classify_exec_grant(line: &str) -> Vec<Finding> {
    if !line.contains("chmod(") && !line.contains("fchmod(") {
        return Vec::new();
    }
    if !RE_EXEC_MODE.is_match(line) && !line.contains("PROT_EXEC") {
        return Vec::new();
    }

    let finding = Finding::new(Some(Evidence::File(FileMutation {
        syscall: "chmod_executable".to_string(),
        path: extract_path(line),
        detail: Some(excerpt(line, 200)),
    })))
    .tag("executable_file_created", score::EXECUTABLE_GRANT);
    vec![finding]
}

/// Deletion aimed at logs, shell history, or login records.
pub fn classify_tamper(line: &str) -> Vec<Finding> {
    if !line.contains("unlink(") && !line.contains("unlinkat(") && !line.contains("rmdir(") {
        return Vec::new();
    }

    let path = match extract_path(line) {
        Some(p) => p,
        None => return Vec::new(),
    };
    if !EVIDENCE_DELETION_PATHS.iter().any(|f| path.contains(f)) {
        return Vec::new();
    }

    let finding = Finding::new(Some(Evidence::Tamper(TamperRecord {
        kind: "log_deletion".to_string(),
        path,
    })))
    .tag("evidence_tampering", score::EVIDENCE_TAMPERING);
    vec![finding]
}

/// Rename to a known ransomware extension. The rename *count* heuristic is
/// the aggregator's job; this rule only scores the extension signature.
pub fn classify_ransomware_rename(line: &str) -> Vec<Finding> {
    if !line.contains("rename(") && !line.contains("renameat(") {
        return Vec::new();
    }

    if RANSOMWARE_EXTENSIONS.iter().any(|ext| line.contains(ext)) {
        let finding =
            Finding::new(None).tag("ransomware_file_encryption", score::RANSOMWARE_RENAME);
        return vec![finding];
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssh_key_read_is_high_value() {
        let line = r#"openat(AT_FDCWD, "/home/user/.ssh/id_rsa", O_RDONLY) = 3"#;
        let findings = classify_credential(line);
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(
            f.indicators,
            vec!["credential_access", "high_value_credential_access"]
        );
        assert_eq!(f.score, 40);
        match f.evidence.as_ref().unwrap() {
            Evidence::Syscall(s) => {
                assert_eq!(s.path.as_deref(), Some("/home/user/.ssh/id_rsa"));
            }
            other => panic!("wrong evidence: {other:?}"),
        }
    }

    #[test]
    fn test_passwd_read_is_base_tier() {
        let line = r#"read(3, "/etc/passwd contents") read from "/etc/passwd""#;
        let findings = classify_credential(line);
        assert_eq!(findings[0].indicators, vec!["credential_access"]);
        assert_eq!(findings[0].score, 20);
    }

    #[test]
    fn test_dev_null_redirect_filtered() {
        let line = r#"openat(AT_FDCWD, "/etc/passwd", O_RDONLY) -> "/dev/null""#;
        assert!(classify_credential(line).is_empty());
    }

    #[test]
    fn test_credential_path_without_syscall_ignored() {
        // Path fragment mentioned, but no open/read on the line.
        let line = r#"stat(".ssh/id_rsa") = -1 ENOENT"#;
        assert!(classify_credential(line).is_empty());
    }

    #[test]
    fn test_bashrc_write_is_persistence() {
        let line = r#"openat(AT_FDCWD, "/home/user/.bashrc", O_WRONLY|O_APPEND) = 4"#;
        let findings = classify_persistence(line);
        assert_eq!(findings[0].indicators, vec!["persistence"]);
        assert_eq!(findings[0].score, 20);
    }

    #[test]
    fn test_systemd_unit_write_is_persistence() {
        let line = r#"openat(AT_FDCWD, "/etc/systemd/system/update.service", O_CREAT|O_WRONLY) = 5"#;
        assert_eq!(classify_persistence(line).len(), 1);
    }

    #[test]
    fn test_hidden_tmp_dotfile() {
        let line = r#"openat(AT_FDCWD, "/tmp/.payload", O_CREAT|O_WRONLY, 0644) = 3"#;
        let findings = classify_hidden_drop(line);
        assert_eq!(findings[0].indicators, vec!["hidden_file_drop"]);
        assert_eq!(findings[0].score, 15);
    }

    #[test]
    fn test_fake_svchost_name() {
        let line = r#"creat("/home/user/.svchost", 0755) = 3"#;
        assert_eq!(classify_hidden_drop(line).len(), 1);
    }

    #[test]
    fn test_visible_tmp_file_not_hidden() {
        let line = r#"openat(AT_FDCWD, "/tmp/build.log", O_CREAT|O_WRONLY) = 3"#;
        assert!(classify_hidden_drop(line).is_empty());
    }

    #[test]
    fn test_chmod_755_is_exec_grant() {
        let line = r#"chmod("/tmp/.payload", 0755) = 0"#;
        let findings = classify_exec_grant(line);
        assert_eq!(findings[0].indicators, vec!["executable_file_created"]);
        match findings[0].evidence.as_ref().unwrap() {
            Evidence::File(m) => {
                assert_eq!(m.syscall, "chmod_executable");
                assert_eq!(m.path.as_deref(), Some("/tmp/.payload"));
                assert!(m.detail.is_some());
            }
            other => panic!("wrong evidence: {other:?}"),
        }
    }

    #[test]
    fn test_chmod_600_not_exec_grant() {
        let line = r#"chmod("/home/user/notes.txt", 0600) = 0"#;
        assert!(classify_exec_grant(line).is_empty());
    }

    #[test]
    fn test_unlink_var_log_is_tampering() {
        let line = r#"unlink("/var/log/auth.log") = 0"#;
        let findings = classify_tamper(line);
        assert_eq!(findings[0].indicators, vec!["evidence_tampering"]);
        assert_eq!(findings[0].score, 25);
        match findings[0].evidence.as_ref().unwrap() {
            Evidence::Tamper(t) => {
                assert_eq!(t.kind, "log_deletion");
                assert_eq!(t.path, "/var/log/auth.log");
            }
            other => panic!("wrong evidence: {other:?}"),
        }
    }

    #[test]
    fn test_unlink_ordinary_file_ignored() {
        let line = r#"unlink("/home/user/scratch.txt") = 0"#;
        assert!(classify_tamper(line).is_empty());
    }

    #[test]
    fn test_rename_to_locked_extension() {
        let line = r#"rename("/data/report.docx", "/data/report.docx.locked") = 0"#;
        let findings = classify_ransomware_rename(line);
        assert_eq!(findings[0].indicators, vec!["ransomware_file_encryption"]);
        assert_eq!(findings[0].score, 40);
        assert!(findings[0].evidence.is_none());
    }

    #[test]
    fn test_ordinary_rename_ignored() {
        let line = r#"rename("/data/a.txt", "/data/b.txt") = 0"#;
        assert!(classify_ransomware_rename(line).is_empty());
    }
}
