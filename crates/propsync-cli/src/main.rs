//! propsync CLI (`propsync`)
//!
//! Replays a bootstrap snapshot and a JSON-lines event log through a
//! property session and prints the resulting tree.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use propsync_core::config::CliOverrides;
use propsync_core::logging::init_tracing;
use propsync_core::{ApplyOutcome, PropsyncConfig, RawPropertyEvent};
use propsync_store::PropertySession;

#[derive(Parser, Debug)]
#[command(name = "propsync", version, about = "Property reconciliation replay tool")]
struct Cli {
    /// Directory holding `propsync.toml`
    #[arg(long, global = true, default_value = ".")]
    config: PathBuf,

    /// Log level or filter directive (overrides config and env)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bulk-load a snapshot, apply an event log, print the final tree
    Replay {
        /// JSON object with the server-side property tree
        #[arg(long)]
        snapshot: PathBuf,
        /// One wire event per line
        #[arg(long)]
        events: PathBuf,
    },
    /// Print the effective property schema as JSON
    Schema,
}

/// A rejected line of the event log.
#[derive(Debug)]
struct LineFailure {
    line: usize,
    message: String,
}

#[derive(Debug, Default)]
struct ReplaySummary {
    applied: usize,
    noop: usize,
    failures: Vec<LineFailure>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        log_level: cli.log_level.clone(),
        log_format: cli.json_logs.then(|| "json".to_string()),
        ..CliOverrides::default()
    };
    let config = PropsyncConfig::load(&cli.config, Some(&overrides))
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    init_tracing(&config.logging);

    match cli.command {
        Command::Replay { snapshot, events } => {
            let mut session = PropertySession::from_config(&config)?;
            let summary = replay(&mut session, &snapshot, &events)?;

            println!("{}", serde_json::to_string_pretty(&session.get_all())?);
            for failure in &summary.failures {
                eprintln!("{}:{}: {}", events.display(), failure.line, failure.message);
            }
            tracing::info!(
                applied = summary.applied,
                noop = summary.noop,
                failed = summary.failures.len(),
                "replay finished"
            );

            Ok(if summary.failures.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Schema => {
            let schema = config.build_schema()?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn replay(
    session: &mut PropertySession,
    snapshot: &Path,
    events: &Path,
) -> anyhow::Result<ReplaySummary> {
    let snapshot_json = std::fs::read_to_string(snapshot)
        .with_context(|| format!("reading snapshot {}", snapshot.display()))?;
    session
        .bulk_load_json(&snapshot_json)
        .with_context(|| format!("loading snapshot {}", snapshot.display()))?;

    let log = std::fs::read_to_string(events)
        .with_context(|| format!("reading event log {}", events.display()))?;
    Ok(replay_lines(session, &log))
}

fn replay_lines(session: &mut PropertySession, log: &str) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for (n, line) in log.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = n + 1;
        let raw: RawPropertyEvent = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "undecodable event");
                summary.failures.push(LineFailure {
                    line: line_no,
                    message: format!("invalid event: {e}"),
                });
                continue;
            }
        };
        let key = raw.key().to_string();
        let report = match session.apply_document(raw) {
            Ok(report) => report,
            Err(e) => {
                summary.failures.push(LineFailure {
                    line: line_no,
                    message: e.to_string(),
                });
                continue;
            }
        };
        for (_, outcome) in &report.outcomes {
            match outcome {
                ApplyOutcome::Applied(change) => {
                    tracing::info!(line = line_no, path = %change.path, "applied");
                    summary.applied += 1;
                }
                ApplyOutcome::NoOp(reason) => {
                    tracing::info!(line = line_no, key = %key, ?reason, "no-op");
                    summary.noop += 1;
                }
            }
        }
        summary
            .failures
            .extend(report.failures.into_iter().map(|failure| LineFailure {
                line: line_no,
                message: failure.error.to_string(),
            }));
    }
    summary
}
