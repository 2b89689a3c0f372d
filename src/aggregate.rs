//! Aggregator/scorer: evidence buckets, the indicator set, the running
//! score, and the cross-line counters behind the whole-trace heuristics.
//!
//! One `Aggregator` per trace. All state is owned by the instance, so
//! analyzing many traces concurrently is safe by construction; nothing here
//! is shared or global.
//!
//! Dedup semantics are deliberately asymmetric:
//! - evidence entries dedup by structural equality within their category,
//! - indicator tags dedup by string,
//! - score contributions never dedup. A trace that reads the same SSH key
//!   fifty times lists the evidence once but scores all fifty hits.

use std::collections::HashMap;

use crate::classify::{Evidence, Finding};
use crate::{
    FileMutation, NetworkAttempt, ProcessActivity, SyscallAccess, TamperRecord, TraceReport,
    TriageConfig, SEVERITY_CEILING,
};

/// Per-trace accumulator. Create fresh, feed every finding and every usable
/// line, then call [`Aggregator::finalize`] exactly once.
pub struct Aggregator {
    config: TriageConfig,

    syscalls: Vec<SyscallAccess>,
    network_attempts: Vec<NetworkAttempt>,
    file_mutations: Vec<FileMutation>,
    process_activity: Vec<ProcessActivity>,
    evidence_tampering: Vec<TamperRecord>,

    /// Insertion-ordered tag set.
    indicators: Vec<String>,

    /// Raw score. Unclamped until finalize so an early flood of hits cannot
    /// mask later contributions through premature saturation arithmetic.
    raw_score: u64,

    /// Directory path -> write-syscall count, for the mass-write heuristic.
    write_counter: HashMap<String, u32>,

    /// Total rename/renameat calls across the trace.
    rename_count: u32,
}

impl Aggregator {
    pub fn new(config: TriageConfig) -> Self {
        Self {
            config,
            syscalls: Vec::new(),
            network_attempts: Vec::new(),
            file_mutations: Vec::new(),
            process_activity: Vec::new(),
            evidence_tampering: Vec::new(),
            indicators: Vec::new(),
            raw_score: 0,
            write_counter: HashMap::new(),
            rename_count: 0,
        }
    }

    /// Fold one rule finding into the report state. Evidence and tags are
    /// deduplicated; the score delta is always applied.
    pub fn absorb(&mut self, finding: Finding) {
        if let Some(evidence) = finding.evidence {
            match evidence {
                Evidence::Syscall(e) => push_unique(&mut self.syscalls, e),
                Evidence::Network(e) => push_unique(&mut self.network_attempts, e),
                Evidence::File(e) => push_unique(&mut self.file_mutations, e),
                Evidence::Process(e) => push_unique(&mut self.process_activity, e),
                Evidence::Tamper(e) => push_unique(&mut self.evidence_tampering, e),
            }
        }

        for tag in finding.indicators {
            self.add_indicator(tag);
        }

        self.raw_score += finding.score;
    }

    /// Update the cross-line counters from one usable line. Runs regardless
    /// of whether any rule matched: benign-looking writes still feed the
    /// mass-write heuristic.
    pub fn track_counters(&mut self, line: &str) {
        if line.contains("write(") || line.contains("pwrite") {
            if let Some(path) = crate::extract::extract_path(line) {
                // Scratch and pseudo filesystems churn constantly; counting
                // them would drown the signal.
                if !path.contains("/tmp") && !path.contains("/proc") {
                    let dir = parent_dir(&path);
                    *self.write_counter.entry(dir).or_insert(0) += 1;
                }
            }
        }

        if line.contains("rename(") || line.contains("renameat(") {
            self.rename_count += 1;
        }
    }

    fn add_indicator(&mut self, tag: &str) {
        if !self.indicators.iter().any(|t| t == tag) {
            self.indicators.push(tag.to_string());
        }
    }

    /// Run the whole-trace heuristics, clamp the score, and assemble the
    /// final report.
    ///
    /// Mass-write: more than `high_write_dirs_threshold` directories each
    /// past `dir_write_threshold` writes approximates "encrypting files
    /// across many folders" without byte-level entropy analysis. The rename
    /// count is an alternative trigger for the same signal and additionally
    /// tags `possible_ransomware`.
    pub fn finalize(
        mut self,
        lines_offered: usize,
        usable_lines: usize,
        oversized_lines: usize,
    ) -> TraceReport {
        let high_write_dirs = self
            .write_counter
            .values()
            .filter(|count| **count > self.config.dir_write_threshold)
            .count();

        let mass_writes = high_write_dirs > self.config.high_write_dirs_threshold;
        let mass_renames = self.rename_count > self.config.rename_threshold;
        if mass_writes || mass_renames {
            self.add_indicator("mass_file_modification");
            self.raw_score += crate::catalog::score::MASS_MODIFICATION;
            if mass_renames {
                self.add_indicator("possible_ransomware");
            }
        }

        let mut parse_warnings = vec![format!("Parsed {lines_offered} strace lines")];
        if oversized_lines > 0 {
            parse_warnings.push(format!(
                "Skipped {oversized_lines} oversized lines (> {} chars)",
                self.config.max_line_length
            ));
        }
        if usable_lines == 0 {
            parse_warnings.push(format!(
                "No usable trace lines found ({lines_offered} lines were empty or oversized)"
            ));
        }

        TraceReport {
            syscalls: self.syscalls,
            network_attempts: self.network_attempts,
            file_mutations: self.file_mutations,
            threat_indicators: self.indicators,
            process_activity: self.process_activity,
            evidence_tampering: self.evidence_tampering,
            severity_score: self.raw_score.min(SEVERITY_CEILING) as u32,
            parse_warnings,
        }
    }
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}

/// Everything before the final `/`. Top-level paths map to the empty string,
/// which still works as a counter key.
fn parent_dir(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => String::new(),
    }
}
