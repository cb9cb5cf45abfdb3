//! Tinted - colored console reporter for test runs
//!
//! CLI entry point: reads runner events from stdin, a file, or a spawned
//! runner, and prints the colored report to stdout.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tokio::io::BufReader;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use tinted::config::ReporterOptions;
use tinted::report::{ReporterSet, RunInfo, Tally};
use tinted::runner::session::{run_command, Session};

/// Colored console reporter for test runs
///
/// Reads newline-delimited JSON events from a test runner and prints a
/// colored progress line per test, then a summary with a command to re-run
/// each failing test.
#[derive(Parser, Debug)]
#[command(name = "tinted", version, about)]
struct Cli {
    /// Path to the options file (tinted.toml in the current directory by default)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read runner events from a file instead of stdin
    #[arg(long, conflicts_with = "command")]
    input: Option<PathBuf>,

    /// Test framework version shown in the banner
    #[arg(long)]
    framework_version: Option<String>,

    /// Program used in reproduction commands (e.g. "bundle exec ruby")
    #[arg(long)]
    command_prefix: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Test runner to spawn; its stdout is read instead of stdin
    #[arg(last = true)]
    command: Vec<String>,
}

impl Cli {
    /// Log level selected by the verbose/quiet flags
    const fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Load the options file and apply command-line overrides.
fn resolve_options(cli: &Cli) -> Result<ReporterOptions> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let mut options = ReporterOptions::load(cli.config.as_deref(), &cwd)?;
    if let Some(version) = &cli.framework_version {
        options.framework_version.clone_from(version);
    }
    if let Some(prefix) = &cli.command_prefix {
        options.command_prefix.clone_from(prefix);
    }
    options.validate()?;
    Ok(options)
}

/// Process exit code for a finished run.
///
/// Failures and errors exit 1. Otherwise a runner's own non-zero exit code
/// is forwarded, so crashes outside of tests are not hidden. `None` means no
/// runner was spawned.
fn exit_code(tally: &Tally, runner_exit: Option<i32>) -> i32 {
    if !tally.passed() {
        return 1;
    }
    match runner_exit {
        Some(0) | None => 0,
        Some(code) => code,
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let options = resolve_options(&cli)?;
    debug!(?options, "resolved reporter options");

    let reporters = ReporterSet::with_defaults(std::io::stdout(), &options);
    let mut session = Session::new(reporters, RunInfo::from(&options));

    let (tally, runner_exit) = if let Some((program, args)) = cli.command.split_first() {
        let (tally, code) = run_command(&mut session, program, args).await?;
        (tally, Some(code))
    } else if let Some(path) = &cli.input {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Failed to open input file: {}", path.display()))?;
        (session.consume(BufReader::new(file)).await?, None)
    } else {
        (session.consume(BufReader::new(tokio::io::stdin())).await?, None)
    };

    if let Some(code) = runner_exit.filter(|code| *code != 0) {
        if tally.passed() {
            warn!(code, "test runner exited with a non-zero code");
        }
    }
    Ok(exit_code(&tally, runner_exit))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::default().add_directive(cli.log_level().into())),
        )
        .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}
