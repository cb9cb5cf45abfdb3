//! Run banner and end-of-run summary
//!
//! Prints the header when the run starts, then the counts, timing
//! statistics and failure details once every test has completed. Each
//! non-passing test is listed with a command that re-runs it alone.

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};

use super::colors;
use super::{Reporter, RunInfo};
use crate::config::ReporterOptions;
use crate::outcome::{FailureKind, Outcome};

/// Monotonic time source
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin
    fn now(&self) -> Duration;
}

/// [`Clock`] backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Outcome counts for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Number of tests run
    pub runs: u64,
    /// Assertions performed across all tests
    pub assertions: u64,
    /// Tests with a failed assertion
    pub failures: u64,
    /// Tests that raised an unexpected error
    pub errors: u64,
    /// Skipped tests
    pub skips: u64,
}

impl Tally {
    /// Count outcomes. Unrecognized failure kinds add to no counter, and the
    /// assertion total stops at `u64::MAX`.
    #[must_use]
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut tally, outcome| {
            tally.runs += 1;
            tally.assertions = tally.assertions.saturating_add(outcome.assertions);
            match outcome.failure {
                Some(FailureKind::Assertion) => tally.failures += 1,
                Some(FailureKind::UnexpectedError) => tally.errors += 1,
                Some(FailureKind::Skip) => tally.skips += 1,
                Some(FailureKind::Unrecognized(_)) | None => {}
            }
            tally
        })
    }

    /// No failures and no errors. Skips do not fail a run.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.failures == 0 && self.errors == 0
    }

    /// `"3 runs, 2 assertions, 1 failures, 0 errors, 1 skips"`
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{} runs, {} assertions, {} failures, {} errors, {} skips",
            self.runs, self.assertions, self.failures, self.errors, self.skips
        )
    }
}

/// Final statistics of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStatistics {
    /// Counts by outcome
    pub tally: Tally,
    /// Wall time between start and report
    pub total_time: Duration,
}

impl RunStatistics {
    /// Tests per second, or zero when no measurable time elapsed
    #[must_use]
    pub fn runs_per_second(&self) -> f64 {
        self.rate(self.tally.runs)
    }

    /// Assertions per second, or zero when no measurable time elapsed
    #[must_use]
    pub fn assertions_per_second(&self) -> f64 {
        self.rate(self.tally.assertions)
    }

    #[allow(clippy::cast_precision_loss)]
    fn rate(&self, count: u64) -> f64 {
        let secs = self.total_time.as_secs_f64();
        if secs > 0.0 {
            count as f64 / secs
        } else {
            0.0
        }
    }

    /// `"in 0.012345s (243.0000 runs/s, 162.0000 assertions/s)"`
    #[must_use]
    pub fn statistics_line(&self) -> String {
        format!(
            "in {:.6}s ({:.4} runs/s, {:.4} assertions/s)",
            self.total_time.as_secs_f64(),
            self.runs_per_second(),
            self.assertions_per_second()
        )
    }
}

enum Phase {
    Idle,
    Started { at: Duration },
    Reported(RunStatistics),
}

/// Prints the header, the summary and the failure details of a run
pub struct SummaryReporter<C: Clock = MonotonicClock> {
    command_prefix: String,
    clock: C,
    phase: Phase,
}

impl SummaryReporter<MonotonicClock> {
    /// Create a summary reporter timed by the system's monotonic clock
    #[must_use]
    pub fn new(options: &ReporterOptions) -> Self {
        Self::with_clock(options, MonotonicClock::default())
    }
}

impl<C: Clock> SummaryReporter<C> {
    /// Create a summary reporter timed by `clock`
    #[must_use]
    pub fn with_clock(options: &ReporterOptions, clock: C) -> Self {
        Self {
            command_prefix: options.command_prefix.clone(),
            clock,
            phase: Phase::Idle,
        }
    }

    /// Statistics of the run, once it has been reported
    #[must_use]
    pub const fn statistics(&self) -> Option<&RunStatistics> {
        match &self.phase {
            Phase::Reported(stats) => Some(stats),
            Phase::Idle | Phase::Started { .. } => None,
        }
    }

    /// Command line that re-runs a single test
    #[must_use]
    pub fn reproduction_command(&self, outcome: &Outcome) -> String {
        format!(
            "{} {} --name {}",
            self.command_prefix, outcome.location.source_path, outcome.location.test_name
        )
    }

    fn write_failure_details(&self, out: &mut dyn Write, outcomes: &[Outcome]) -> Result<()> {
        let failing = outcomes.iter().filter(|o| !o.is_pass());
        for (index, outcome) in failing.enumerate() {
            let color = if outcome.failure == Some(FailureKind::Skip) {
                colors::YELLOW_CHAR
            } else {
                colors::RED_CHAR
            };
            let newline = if outcome.display.ends_with('\n') { "" } else { "\n" };
            write!(
                out,
                "{color}{:>3}) {}{}{newline}",
                index + 1,
                outcome.display,
                colors::RESET
            )?;
            writeln!(out, "Run this single test with:")?;
            writeln!(out, "{}", self.reproduction_command(outcome))?;
            writeln!(out)?;
        }
        Ok(())
    }
}

impl<C: Clock> Reporter for SummaryReporter<C> {
    fn start(&mut self, out: &mut dyn Write, info: &RunInfo) -> Result<()> {
        if !matches!(self.phase, Phase::Idle) {
            bail!("Summary reporter was already started");
        }
        self.phase = Phase::Started {
            at: self.clock.now(),
        };

        writeln!(
            out,
            "{}{} version {}{}",
            colors::BLUE,
            info.framework,
            info.version,
            colors::RESET
        )
        .context("Failed to write run banner")?;
        writeln!(out, "Running...").context("Failed to write run banner")?;
        writeln!(out).context("Failed to write run banner")?;
        Ok(())
    }

    fn report(&mut self, out: &mut dyn Write, outcomes: &[Outcome]) -> Result<()> {
        let started_at = match self.phase {
            Phase::Started { at } => at,
            Phase::Idle => bail!("Cannot report a run that was never started"),
            Phase::Reported(_) => bail!("Run was already reported"),
        };

        let stats = RunStatistics {
            tally: Tally::from_outcomes(outcomes),
            total_time: self.clock.now().saturating_sub(started_at),
        };
        self.phase = Phase::Reported(stats);

        writeln!(out).context("Failed to write run summary")?;
        writeln!(out, "{}", stats.tally.summary_line()).context("Failed to write run summary")?;
        writeln!(out, "{}", stats.statistics_line()).context("Failed to write run summary")?;
        writeln!(out).context("Failed to write run summary")?;
        self.write_failure_details(out, outcomes)
            .context("Failed to write failure details")?;
        Ok(())
    }
}
