//! CLI entry point for the data cleaning tool.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use lex_cleaning::{
    CleaningError, CleaningOperation, LogEntry, QualityReport, SessionConfig, SessionState,
};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Interactive data cleaning for CSV files",
    long_about = "Load a CSV file, report its data quality, apply cleaning operations \
                  in order and write the result as <name>_cleaned.csv.\n\n\
                  OPERATIONS:\n  \
                  remove-duplicates          Keep the first of each identical row\n  \
                  trim-whitespace            Strip leading/trailing spaces in text columns\n  \
                  drop-missing:COL           Delete rows where COL is missing\n  \
                  fill-mean:COL              Fill COL with its mean (numeric only)\n  \
                  fill-median:COL            Fill COL with its median (numeric only)\n  \
                  fill-mode:COL              Fill COL with its most frequent value\n  \
                  fill-custom:COL=VALUE      Fill COL with VALUE\n\n\
                  EXAMPLES:\n  \
                  # Show the quality report only\n  \
                  lex-cleaning -i data.csv --dry-run\n\n  \
                  # Apply a sequence of operations\n  \
                  lex-cleaning -i data.csv --op remove-duplicates --op fill-median:age\n\n  \
                  # Apply the safe suggestions and print JSON\n  \
                  lex-cleaning -i data.csv --suggest --json"
)]
struct Args {
    /// Path to the CSV file to clean
    #[arg(short, long)]
    input: String,

    /// Output directory for the cleaned file
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Operation to apply, in order (repeatable)
    #[arg(long = "op", value_name = "OPERATION")]
    ops: Vec<String>,

    /// Apply duplicate removal and whitespace trimming when the report
    /// shows they are needed, before any --op
    #[arg(long)]
    suggest: bool,

    /// Run the operations in memory but do not write the cleaned file
    #[arg(long)]
    dry_run: bool,

    /// Treat this value as missing (repeatable, replaces the default list)
    #[arg(long = "missing-token", value_name = "TOKEN")]
    missing_tokens: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs; only the final JSON document is written.
    #[arg(long)]
    json: bool,
}

/// An operation the session refused, with the reason.
#[derive(Debug, Serialize)]
struct FailedOperation {
    operation: String,
    error: CleaningError,
}

/// Everything a run produced, as printed by `--json`.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    input: &'a str,
    before: QualityReport,
    after: QualityReport,
    log: &'a [LogEntry],
    failed: &'a [FailedOperation],
    output_file: Option<String>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let input = Path::new(&args.input);
    if !input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    // Reject malformed operations before doing any work
    let ops = args
        .ops
        .iter()
        .map(|s| s.parse::<CleaningOperation>())
        .collect::<Result<Vec<_>, _>>()?;

    let config = build_config(&args)?;
    let bytes = std::fs::read(input).with_context(|| format!("Failed to read {}", args.input))?;
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| args.input.clone());

    let mut session = SessionState::load(&bytes, &file_name, config)?;
    let before = session.report()?;

    let mut planned = Vec::new();
    if args.suggest {
        planned.extend(before.suggested_operations().into_iter().filter(|op| {
            matches!(
                op,
                CleaningOperation::RemoveDuplicates | CleaningOperation::TrimWhitespace
            )
        }));
    }
    planned.extend(ops);

    let mut failed = Vec::new();
    for op in planned {
        let label = op.to_string();
        match session.apply(op) {
            Ok(_) => {}
            Err(e) if e.is_recoverable() => {
                warn!("Skipped '{}': {}", label, e);
                failed.push(FailedOperation {
                    operation: label,
                    error: e,
                });
            }
            Err(e) => return Err(e.into()),
        }
    }

    let output_file = if args.dry_run {
        None
    } else {
        let path = session.export()?.write_to_dir(&args.output)?;
        Some(path.display().to_string())
    };

    let summary = RunSummary {
        input: &args.input,
        after: session.report()?,
        before,
        log: session.log(),
        failed: &failed,
        output_file,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_human_readable_summary(&summary, args.dry_run);
    }

    info!("Done");
    Ok(())
}

fn build_config(args: &Args) -> Result<SessionConfig> {
    let mut builder = SessionConfig::builder();
    if !args.missing_tokens.is_empty() {
        builder = builder.missing_tokens(&args.missing_tokens);
    }
    Ok(builder.build()?)
}

/// Print the run summary for a terminal.
///
/// Uses `println!` on purpose: this is the command's output, not a log, and
/// must show regardless of the log level.
fn print_human_readable_summary(summary: &RunSummary<'_>, dry_run: bool) {
    println!();
    println!("{}", "=".repeat(80));
    println!("DATA CLEANING {}", if dry_run { "PREVIEW" } else { "COMPLETE" });
    println!("{}", "=".repeat(80));
    println!();

    println!("File: {}", summary.input);
    println!();
    print_report("Before", &summary.before);
    if !summary.log.is_empty() {
        print_report("After", &summary.after);
    }

    println!("Operations:");
    if summary.log.is_empty() {
        println!("  (none applied)");
    }
    for entry in summary.log {
        println!(
            "  {}. {} [{} -> {} rows]",
            entry.sequence, entry.message, entry.rows_before, entry.rows_after
        );
    }
    for failure in summary.failed {
        println!("  ! {}: {}", failure.operation, failure.error);
    }
    println!();

    match &summary.output_file {
        Some(path) => println!("Cleaned file: {path}"),
        None => println!("Dry run: nothing written"),
    }
    println!("{}", "=".repeat(80));
}

fn print_report(title: &str, report: &QualityReport) {
    println!(
        "{title}: {} rows x {} columns, {} missing, {} duplicate rows, {} whitespace issues",
        report.row_count,
        report.column_count,
        report.total_missing,
        report.duplicate_rows,
        report.whitespace_issues
    );

    println!(
        "  {:<24} {:<10} {:>8} {:>11}",
        "Column", "Type", "Missing", "Whitespace"
    );
    println!("  {}", "-".repeat(56));
    for col in &report.columns {
        let whitespace = col
            .whitespace
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<24} {:<10} {:>8} {:>11}",
            truncate_str(&col.name, 23),
            col.kind,
            col.missing,
            whitespace
        );
    }
    println!();
}

/// Truncate a string to a maximum length, adding "..." if truncated.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
