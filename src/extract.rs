//! Stateless field extractors for single trace lines.
//!
//! Trace formats drift: argument ordering varies between strace versions,
//! and `connect()` buffers are sometimes rendered as decoded structs and
//! sometimes as escaped byte strings. Extraction here is permissive by
//! design; a failed extraction is an expected outcome, not an error.
//!
//! Copyright (c) 2026 CIPS Corps. All rights reserved.

use crate::catalog::KNOWN_MALICIOUS_PREFIXES;
use regex::Regex;
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Compiled regexes (compiled once, used forever)
// ---------------------------------------------------------------------------

/// First double-quoted absolute path anywhere on the line. No positional
/// assumption: the path is not always the second syscall argument.
static RE_QUOTED_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(/[^"]*)""#).expect("regex"));

/// `inet_addr("a.b.c.d")` as rendered for decoded sockaddr structs.
static RE_INET_ADDR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"inet_addr\("(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})"\)"#).expect("regex")
});

/// `sin_port=htons(N)`, paired with either IPv4 rendering.
static RE_SIN_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sin_port=htons\((\d+)\)").expect("regex"));

/// IPv6-mapped IPv4 literal: `::ffff:a.b.c.d`.
static RE_V6_MAPPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"::ffff:(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})").expect("regex")
});

/// Raw escaped-hex sockaddr fragment: `\x02\x00` is AF_INET little-endian,
/// the next two bytes are the port big-endian. Seen when strace prints the
/// `connect()` buffer as a byte string instead of a decoded struct.
static RE_HEX_SOCKADDR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\x02\\x00\\x([0-9a-f]{2})\\x([0-9a-f]{2})").expect("regex")
});

/// A quoted domain name argument, as passed to `getaddrinfo` and friends.
static RE_QUOTED_DOMAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([a-zA-Z0-9.\-]+\.[a-zA-Z]{2,})""#).expect("regex"));

// ---------------------------------------------------------------------------
// Path and domain extraction
// ---------------------------------------------------------------------------

/// Extract the first double-quoted string beginning with `/` from a line.
pub fn extract_path(line: &str) -> Option<String> {
    RE_QUOTED_PATH
        .captures(line)
        .map(|caps| caps[1].to_string())
}

/// Extract a quoted domain name (something with a dot and a TLD) from a line.
pub fn extract_domain(line: &str) -> Option<String> {
    RE_QUOTED_DOMAIN
        .captures(line)
        .map(|caps| caps[1].to_string())
}

// ---------------------------------------------------------------------------
// Address extraction
// ---------------------------------------------------------------------------

/// One attempt at decoding the address on a connect() line. Returns None if
/// this rendering is absent; the next strategy gets a try.
type AddrStrategy = fn(&str) -> Option<(Option<String>, Option<u16>)>;

/// Ordered fallback chain. The order is itself documented behavior: decoded
/// struct first, IPv6-mapped second, raw hex last (port only).
const ADDR_STRATEGIES: &[AddrStrategy] = &[
    decoded_struct_address,
    v6_mapped_address,
    raw_hex_address,
];

/// Extract the IP and port from a `connect()` trace line, trying each
/// rendering strategy in order and returning on the first that matches.
///
/// `(None, None)` means "connection syscall recognized but the address was
/// undecodable" and is a valid result; callers skip such lines for network
/// evidence rather than treating them as errors.
pub fn extract_ip_and_port(line: &str) -> (Option<String>, Option<u16>) {
    for strategy in ADDR_STRATEGIES {
        if let Some(result) = strategy(line) {
            return result;
        }
    }
    (None, None)
}

/// Strategy 1: `inet_addr("a.b.c.d")` plus optional `sin_port=htons(N)`.
fn decoded_struct_address(line: &str) -> Option<(Option<String>, Option<u16>)> {
    let caps = RE_INET_ADDR.captures(line)?;
    Some((Some(caps[1].to_string()), extract_htons_port(line)))
}

/// Strategy 2: IPv6-mapped IPv4 literal plus the same optional port.
fn v6_mapped_address(line: &str) -> Option<(Option<String>, Option<u16>)> {
    let caps = RE_V6_MAPPED.captures(line)?;
    Some((Some(caps[1].to_string()), extract_htons_port(line)))
}

/// Strategy 3: escaped-hex sockaddr. Only the port is recoverable.
fn raw_hex_address(line: &str) -> Option<(Option<String>, Option<u16>)> {
    let caps = RE_HEX_SOCKADDR.captures(line)?;
    let high = u16::from_str_radix(&caps[1], 16).ok()?;
    let low = u16::from_str_radix(&caps[2], 16).ok()?;
    Some((None, Some((high << 8) | low)))
}

fn extract_htons_port(line: &str) -> Option<u16> {
    RE_SIN_PORT
        .captures(line)
        .and_then(|caps| caps[1].parse::<u16>().ok())
}

// ---------------------------------------------------------------------------
// Address classification
// ---------------------------------------------------------------------------

/// True for loopback, RFC1918, and unspecified prefixes. These are sandbox
/// plumbing, not exfiltration targets, and produce no network evidence.
pub fn is_private_ip(ip: &str) -> bool {
    ["127.", "10.", "192.168.", "172.16.", "0.0.0.0"]
        .iter()
        .any(|prefix| ip.starts_with(prefix))
}

/// Prefix match against the known C2 ranges in the catalog. A coarse static
/// heuristic: absence of a match means nothing about an IP's reputation.
pub fn looks_like_known_malicious(ip: &str) -> bool {
    KNOWN_MALICIOUS_PREFIXES
        .iter()
        .any(|prefix| ip.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_path_first_quoted_absolute() {
        let line = r#"openat(AT_FDCWD, "/home/user/.ssh/id_rsa", O_RDONLY) = 3"#;
        assert_eq!(extract_path(line).as_deref(), Some("/home/user/.ssh/id_rsa"));
    }

    #[test]
    fn test_extract_path_ignores_relative_strings() {
        let line = r#"execve("./payload", ["./payload"], 0x7ffc) = 0"#;
        assert_eq!(extract_path(line), None);
    }

    #[test]
    fn test_extract_path_not_positional() {
        // Path appears as the third argument; extraction must still find it.
        let line = r#"renameat(AT_FDCWD, AT_FDCWD, "/data/report.docx.locked") = 0"#;
        assert_eq!(extract_path(line).as_deref(), Some("/data/report.docx.locked"));
    }

    #[test]
    fn test_decoded_struct_with_port() {
        let line = r#"connect(3, {sa_family=AF_INET, sin_port=htons(4444), sin_addr=inet_addr("185.220.1.5")}, 16) = 0"#;
        assert_eq!(
            extract_ip_and_port(line),
            (Some("185.220.1.5".to_string()), Some(4444))
        );
    }

    #[test]
    fn test_decoded_struct_without_port() {
        let line = r#"connect(3, {sa_family=AF_INET, sin_addr=inet_addr("8.8.4.4")}, 16) = 0"#;
        assert_eq!(extract_ip_and_port(line), (Some("8.8.4.4".to_string()), None));
    }

    #[test]
    fn test_v6_mapped_fallback() {
        let line = r#"connect(5, {sa_family=AF_INET6, sin_port=htons(9999), sin6_addr=::ffff:203.0.113.7}, 28) = 0"#;
        assert_eq!(
            extract_ip_and_port(line),
            (Some("203.0.113.7".to_string()), Some(9999))
        );
    }

    #[test]
    fn test_raw_hex_port_only() {
        // \x01\xbb big-endian = 443. No IP is recoverable from this rendering.
        let line = r#"connect(3, "\x02\x00\x01\xbb\xc0\xa8\x00\x01", 16) = 0"#;
        assert_eq!(extract_ip_and_port(line), (None, Some(443)));
    }

    #[test]
    fn test_strategy_order_prefers_decoded_struct() {
        // Both renderings present; the decoded struct wins.
        let line = r#"connect(3, inet_addr("1.2.3.4") "\x02\x00\x11\x5c", sin_port=htons(80)) = 0"#;
        assert_eq!(extract_ip_and_port(line), (Some("1.2.3.4".to_string()), Some(80)));
    }

    #[test]
    fn test_undecodable_is_none_none() {
        let line = "connect(3, AF_INET, <garbled>) = -1 ECONNREFUSED";
        assert_eq!(extract_ip_and_port(line), (None, None));
    }

    #[test]
    fn test_private_ip_prefixes() {
        assert!(is_private_ip("127.0.0.1"));
        assert!(is_private_ip("10.5.6.7"));
        assert!(is_private_ip("192.168.1.100"));
        assert!(is_private_ip("172.16.0.9"));
        assert!(is_private_ip("0.0.0.0"));
        assert!(!is_private_ip("8.8.8.8"));
        assert!(!is_private_ip("185.220.1.1"));
    }

    #[test]
    fn test_known_malicious_prefixes() {
        assert!(looks_like_known_malicious("185.220.101.5"));
        assert!(looks_like_known_malicious("45.142.0.1"));
        assert!(!looks_like_known_malicious("8.8.8.8"));
    }

    #[test]
    fn test_extract_domain() {
        let line = r#"getaddrinfo("malware-c2.example.net", NULL, ...) = 0"#;
        assert_eq!(
            extract_domain(line).as_deref(),
            Some("malware-c2.example.net")
        );
        assert_eq!(extract_domain(r#"getaddrinfo("localhost-only")"#), None);
    }
}
