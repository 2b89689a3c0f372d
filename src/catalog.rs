//! Pattern catalog: the static tables that define what counts as suspicious.
//!
//! Everything here is declarative data, kept out of the classification loop
//! so the tables can be audited and extended without touching rule logic.
//! The intel-flavored tables (`KNOWN_MALICIOUS_PREFIXES`, `SUSPICIOUS_PORTS`)
//! are coarse, static heuristics, not a reputation feed: they will go stale
//! and false negatives are expected. Their values are preserved verbatim for
//! compatibility with existing golden-output fixtures.
//!
//! Copyright (c) 2026 CIPS Corps. All rights reserved.

use regex::Regex;
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Path fragment tables
// ---------------------------------------------------------------------------

/// Credential stores and key material. A line touching one of these with an
/// open/read syscall is credential access.
pub const CREDENTIAL_PATHS: &[&str] = &[
    "/etc/passwd",
    "/etc/shadow",
    "/etc/sudoers",
    "Login Data",   // Chrome credentials
    "Cookies",      // Browser cookies
    "key4.db",      // Firefox passwords
    "logins.json",  // Firefox logins
    ".bash_history",
    ".ssh/id_rsa",
    ".ssh/authorized_keys",
    ".gnupg",
    "id_rsa",
    "id_ed25519",
    "wallet.dat",   // Crypto wallets
    ".config/google-chrome",
    ".mozilla/firefox",
];

/// High-value tier within `CREDENTIAL_PATHS`: private keys and wallets
/// score an extra weight on top of the base credential hit.
pub const HIGH_VALUE_CREDENTIAL_PATHS: &[&str] = &[".ssh/id_rsa", "wallet.dat", "key4.db"];

/// Autostart locations, shell rc files, cron, init, and (statically
/// observable) registry run-keys.
pub const PERSISTENCE_PATHS: &[&str] = &[
    "autostart",
    ".bashrc",
    ".bash_profile",
    ".profile",
    "init.d",
    "systemd/system",
    "crontab",
    "/etc/rc.local",
    "/etc/cron",
    "HKCU/Run",
    "HKLM/Run",
    "StartupItems",
    ".config/autostart",
];

/// Log, history, and audit-record locations. Deleting these is evidence
/// tampering.
pub const EVIDENCE_DELETION_PATHS: &[&str] = &[
    "/var/log/",
    "/tmp/tmp",
    ".bash_history",
    "/proc/",
    "wtmp",
    "utmp",
    "lastlog",
];

/// Extensions ransomware families append while encrypting.
pub const RANSOMWARE_EXTENSIONS: &[&str] = &[
    ".locked", ".encrypted", ".enc", ".crypto",
    ".crypt", ".crypted", ".cerber", ".locky",
];

// ---------------------------------------------------------------------------
// Hidden-path patterns (compiled once, used forever)
// ---------------------------------------------------------------------------

/// Dotfile drops in world-writable dirs plus disguised process names.
/// Checked in order; the first match per line wins.
pub static HIDDEN_FILE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"/tmp/\.",       // hidden files in /tmp
        r"/var/tmp/\.",   // hidden files in /var/tmp
        r"/dev/shm/\.",   // hidden in shared memory
        r"\./\.",         // hidden in current dir
        r"\.svchost",     // fake Windows process name
        r"\.update_helper",
        r"\.cache/\.[a-z]",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("regex"))
    .collect()
});

// ---------------------------------------------------------------------------
// Network tables
// ---------------------------------------------------------------------------

/// Ports with a well-known offensive association, mapped to the indicator
/// tag they raise.
pub const SUSPICIOUS_PORTS: &[(u16, &str)] = &[
    (4444, "reverse_shell_metasploit"),
    (1337, "reverse_shell"),
    (31337, "reverse_shell_elite"),
    (8080, "http_proxy_c2"),
    (9999, "common_c2"),
    (6667, "irc_botnet"),
    (6666, "irc_botnet"),
];

/// Ports common enough in benign traffic that connecting to them carries no
/// extra weight on its own.
pub const SAFE_PORTS: &[u16] = &[80, 443, 53, 22, 21, 25, 587];

/// IP prefixes of ranges repeatedly seen hosting C2 infrastructure.
pub const KNOWN_MALICIOUS_PREFIXES: &[&str] = &["185.220.", "45.142.", "91.108.", "193.32."];

/// Domains resolved by ordinary sandbox plumbing; lookups of these are noise.
pub const SAFE_DOMAINS: &[&str] = &["localhost", "example.com", "ubuntu.com", "debian.org"];

// ---------------------------------------------------------------------------
// Execution token tables
// ---------------------------------------------------------------------------

/// Shell and network-utility tokens that make an `execve()` worth recording.
pub const SUSPICIOUS_EXEC_TOKENS: &[&str] = &[
    "curl", "wget", "nc", "ncat", "bash -c", "sh -c", "python", "perl",
];

/// Reverse-shell-style tokens. Highest execution tier; note the trailing
/// space on `"nc "` so plain `nc` does not match inside other words.
pub const REVERSE_SHELL_TOKENS: &[&str] = &["nc ", "ncat", "bash -i"];

/// Download-and-execute tokens. Second execution tier.
pub const DOWNLOAD_TOKENS: &[&str] = &["curl", "wget"];

/// Syscall name fragments that count as "opens or reads a file".
pub const OPEN_READ_SYSCALLS: &[&str] = &["openat", "open(", "read("];

/// Syscall name fragments that count as "opens, writes, creates, or chmods".
pub const OPEN_WRITE_SYSCALLS: &[&str] = &["openat", "open(", "write(", "creat(", "chmod"];

/// Syscall name fragments that count as "opens, creates, or writes".
pub const OPEN_CREATE_SYSCALLS: &[&str] = &["openat", "open(", "creat(", "write("];

// ---------------------------------------------------------------------------
// Rule weights
// ---------------------------------------------------------------------------

/// Fixed score contribution per matched rule. Summed across the whole trace
/// and clamped to [`crate::SEVERITY_CEILING`] once at report time.
pub mod score {
    pub const EXFILTRATION: u64 = 15;
    pub const KNOWN_C2_IP: u64 = 25;
    pub const SUSPICIOUS_PORT: u64 = 30;
    pub const UNUSUAL_PORT: u64 = 10;
    pub const DNS_LOOKUP: u64 = 5;
    pub const CREDENTIAL_ACCESS: u64 = 20;
    pub const HIGH_VALUE_CREDENTIAL: u64 = 20;
    pub const PERSISTENCE: u64 = 20;
    pub const HIDDEN_FILE_DROP: u64 = 15;
    pub const EXECUTABLE_GRANT: u64 = 15;
    pub const REVERSE_SHELL: u64 = 35;
    pub const DOWNLOAD_EXECUTION: u64 = 20;
    pub const PROCESS_INJECTION: u64 = 30;
    pub const SHELLCODE_INJECTION: u64 = 30;
    pub const EVIDENCE_TAMPERING: u64 = 25;
    pub const RANSOMWARE_RENAME: u64 = 40;
    pub const MASS_MODIFICATION: u64 = 35;
}

/// Look up the indicator tag for a suspicious port, if any.
pub fn suspicious_port_label(port: u16) -> Option<&'static str> {
    SUSPICIOUS_PORTS
        .iter()
        .find(|(p, _)| *p == port)
        .map(|(_, label)| *label)
}

/// True if the port is in the benign-traffic allowlist.
pub fn is_safe_port(port: u16) -> bool {
    SAFE_PORTS.contains(&port)
}
