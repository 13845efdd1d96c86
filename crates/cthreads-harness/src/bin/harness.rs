//! CLI entrypoint for the cthreads conformance harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cthreads_harness::config::{HarnessConfig, PROFILE_ENV, profile};
use cthreads_harness::structured_log::validate_log_file;
use cthreads_harness::{ConformanceSuite, LogEmitter, Property};

/// Conformance tooling for cthreads.
#[derive(Debug, Parser)]
#[command(name = "cthreads-harness")]
#[command(about = "Checks the threading primitives against their documented guarantees")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the conformance properties and emit JSONL results.
    Run {
        /// Competing threads in contention properties.
        #[arg(long)]
        threads: Option<usize>,
        /// Rounds per thread (default comes from the profile).
        #[arg(long)]
        iterations: Option<u32>,
        /// Timed-wait timeout in milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Allowed lateness of a timed wait in milliseconds.
        #[arg(long)]
        slack_ms: Option<u64>,
        /// Only run properties whose name contains this text.
        #[arg(long)]
        property: Option<String>,
        /// JSONL log path (if omitted, logs go to stdout).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Write the JSON summary here.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Prefix for trace ids.
        #[arg(long, default_value = "cthreads")]
        run_id: String,
    },
    /// List the properties and what each checks.
    List,
    /// Validate a JSONL log produced by `run`.
    ValidateLog {
        #[arg(long)]
        log: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            threads,
            iterations,
            timeout_ms,
            slack_ms,
            property,
            log,
            report,
            run_id,
        } => {
            let defaults = HarnessConfig::default();
            if let Some(name) = property.as_deref()
                && !Property::ALL.iter().any(|p| p.name().contains(name))
            {
                return Err(format!("no property matches '{name}'").into());
            }
            let config = HarnessConfig {
                threads: threads.unwrap_or(defaults.threads),
                iterations: iterations.unwrap_or(defaults.iterations),
                timeout_ms: timeout_ms.unwrap_or(defaults.timeout_ms),
                slack_ms: slack_ms.unwrap_or(defaults.slack_ms),
                filter: property,
            };
            let suite = ConformanceSuite::new(config)?;
            eprintln!(
                "Running {} properties ({PROFILE_ENV}={:?})",
                suite.selected().len(),
                profile()
            );

            let mut emitter = match &log {
                Some(path) => LogEmitter::to_file(path, &run_id)?,
                None => LogEmitter::to_stdout(&run_id),
            };
            let summary = suite.run(&mut emitter)?;
            for result in &summary.results {
                eprintln!(
                    "[{:?}] {} ({} ms){}",
                    result.outcome,
                    result.property.name(),
                    result.duration_ms,
                    result
                        .detail
                        .as_deref()
                        .map(|d| format!(": {d}"))
                        .unwrap_or_default()
                );
            }
            if let Some(path) = report {
                std::fs::write(&path, summary.to_json()?)?;
                eprintln!("Wrote summary to {}", path.display());
            }
            eprintln!(
                "passed={} failed={} errored={} skipped={}",
                summary.passed, summary.failed, summary.errored, summary.skipped
            );
            if !summary.is_clean() {
                return Err("conformance run had failures".into());
            }
        }
        Command::List => {
            for property in Property::ALL {
                println!(
                    "{:<24} {:<10} {}",
                    property.name(),
                    format!("{:?}", property.primitive()).to_ascii_lowercase(),
                    property.description()
                );
            }
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for error in &errors {
                eprintln!("{error}");
            }
            if !errors.is_empty() {
                return Err(format!("{} errors in {lines} lines", errors.len()).into());
            }
            eprintln!("{lines} lines valid");
        }
    }

    Ok(())
}
