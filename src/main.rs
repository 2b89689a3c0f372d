//! # Trace Triage - CLI Entry Point
//!
//! One-shot classifier invocation: read a sandbox strace capture, classify
//! it, print the JSON report to stdout.
//!
//! Contract with the calling pipeline: the report (or an error document)
//! always goes to stdout as JSON; logs go to stderr; exit code 0 means a
//! report was produced, 1 means any failure. Error documents carry an
//! `error` message and, for failures other than a missing trace, a `kind`
//! tag so the caller can branch without string matching.

use clap::Parser;
use log::error;
use serde_json::json;
use std::path::PathBuf;

use trace_triage::engine::TraceAnalyzer;
use trace_triage::{TriageConfig, TriageError};

/// Trace Triage - behavioral syscall-trace classifier.
///
/// Reads a line-oriented strace capture produced in an isolated sandbox and
/// emits a structured, scored threat report as JSON on stdout.
#[derive(Parser, Debug)]
#[command(name = "trace-triage")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the strace capture to classify.
    ///
    /// Optional at the parser level so a missing argument can still honor
    /// the error-document contract instead of clap's usage output.
    trace: Option<PathBuf>,

    /// TOML file overriding classifier tunables (thresholds, line cap).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit compact JSON instead of pretty-printed.
    #[arg(long)]
    compact: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let trace_path = match cli.trace {
        Some(path) => path,
        None => {
            emit(&json!({"error": "Usage: trace-triage <trace_path>"}), cli.compact);
            return 1;
        }
    };

    let config = match cli.config {
        Some(ref path) => match TriageConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("failed to load config {}: {}", path.display(), e);
                emit(&json!({"error": e.to_string(), "kind": e.kind()}), cli.compact);
                return 1;
            }
        },
        None => TriageConfig::default(),
    };

    match TraceAnalyzer::new(config).analyze_file(&trace_path) {
        Ok(report) => {
            let doc = match serde_json::to_value(&report) {
                Ok(doc) => doc,
                Err(e) => {
                    error!("report serialization failed: {e}");
                    emit(&json!({"error": e.to_string(), "kind": "json"}), cli.compact);
                    return 1;
                }
            };
            emit(&doc, cli.compact);
            0
        }
        Err(e @ TriageError::TraceNotFound(_)) => {
            // The calling pipeline distinguishes this case by message alone.
            emit(&json!({"error": e.to_string()}), cli.compact);
            1
        }
        Err(e) => {
            error!("analysis failed: {e}");
            emit(&json!({"error": e.to_string(), "kind": e.kind()}), cli.compact);
            1
        }
    }
}

/// Print a JSON document to stdout. Serialization of already-built values
/// cannot produce invalid JSON, but a write failure still must not panic.
fn emit(doc: &serde_json::Value, compact: bool) {
    let rendered = if compact {
        doc.to_string()
    } else {
        serde_json::to_string_pretty(doc).unwrap_or_else(|_| doc.to_string())
    };
    println!("{rendered}");
}
