//! Network rules: outbound connections and DNS resolution.
//!
//! Copyright (c) 2026 CIPS Corps. All rights reserved.

use crate::catalog::{score, suspicious_port_label, is_safe_port, SAFE_DOMAINS};
use crate::classify::{Evidence, Finding};
use crate::extract::{extract_domain, extract_ip_and_port, is_private_ip, looks_like_known_malicious};
use crate::NetworkAttempt;

/// `connect()` with a resolvable public IPv4 address.
///
/// Private, loopback, and unspecified addresses are sandbox-internal noise
/// and produce nothing. Undecodable addresses (all three extraction
/// strategies missed, or only a port was recovered) are skipped the same
/// way, never errored.
///
/// Weighting is layered on a +15 exfiltration base: +25 for a known-C2
/// prefix, then +30 for a catalogued suspicious port, or +10 for a present
/// port that is merely outside the safe-port allowlist. The port tiers are
/// mutually exclusive; the C2-prefix bonus is independent of both.
pub fn classify_connect(line: &str) -> Vec<Finding> {
    if !line.contains("connect(") || !line.contains("AF_INET") {
        return Vec::new();
    }

    let (ip, port) = extract_ip_and_port(line);
    let ip = match ip {
        Some(ip) if !is_private_ip(&ip) => ip,
        _ => return Vec::new(),
    };

    let mut known_malicious_range = None;
    let mut port_label = None;
    let mut unusual_port = None;
    let mut finding = Finding::new(None);

    if looks_like_known_malicious(&ip) {
        known_malicious_range = Some(true);
        finding = finding.tag("known_c2_ip", score::KNOWN_C2_IP);
    }

    if let Some(p) = port {
        if let Some(label) = suspicious_port_label(p) {
            port_label = Some(label.to_string());
            finding = finding.tag(label, score::SUSPICIOUS_PORT);
        } else if !is_safe_port(p) {
            unusual_port = Some(true);
            finding = finding.tag("unusual_port_connection", score::UNUSUAL_PORT);
        }
    }

    finding = finding.tag("exfiltration_attempt", score::EXFILTRATION);
    finding.evidence = Some(Evidence::Network(NetworkAttempt::Connection {
        ip,
        port,
        blocked: true,
        known_malicious_range,
        port_label,
        unusual_port,
    }));

    vec![finding]
}

/// `getaddrinfo`/`gethostbyname` of a domain outside the safe-domain list.
/// Domain dedup falls out of structural evidence dedup downstream.
pub fn classify_dns(line: &str) -> Vec<Finding> {
    if !line.contains("getaddrinfo") && !line.contains("gethostbyname") {
        return Vec::new();
    }

    let domain = match extract_domain(line) {
        Some(d) => d,
        None => return Vec::new(),
    };

    if SAFE_DOMAINS.iter().any(|safe| domain.contains(safe)) {
        return Vec::new();
    }

    let mut finding = Finding::new(Some(Evidence::Network(NetworkAttempt::DnsLookup {
        domain,
        kind: "dns_lookup".to_string(),
    })));
    finding = finding.tag("external_dns_lookup", score::DNS_LOOKUP);
    vec![finding]
}
