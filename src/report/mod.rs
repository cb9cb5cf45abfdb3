//! Console reporting
//!
//! Reporters receive lifecycle calls from the runner: `start` once, `record`
//! after every test, `report` once with every outcome. The runner owns the
//! output stream and the ordered list of reporters; see [`ReporterSet`].

pub mod colors;
pub mod progress;
pub mod summary;

pub use progress::ProgressReporter;
pub use summary::{Clock, MonotonicClock, RunStatistics, SummaryReporter, Tally};

use std::io::Write;

use anyhow::{Context, Result};

use crate::config::ReporterOptions;
use crate::outcome::Outcome;

/// What the runner knows about itself when a run begins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInfo {
    /// Test framework name
    pub framework: String,
    /// Test framework version
    pub version: String,
}

impl From<&ReporterOptions> for RunInfo {
    fn from(options: &ReporterOptions) -> Self {
        Self {
            framework: options.framework.clone(),
            version: options.framework_version.clone(),
        }
    }
}

/// Receives the lifecycle of a test run.
///
/// Every method writes to the stream it is given and returns write errors to
/// the caller. The default implementations do nothing.
pub trait Reporter {
    /// Called once, before any test has completed
    fn start(&mut self, _out: &mut dyn Write, _info: &RunInfo) -> Result<()> {
        Ok(())
    }

    /// Called after each test, in execution order
    fn record(&mut self, _out: &mut dyn Write, _outcome: &Outcome) -> Result<()> {
        Ok(())
    }

    /// Called once, with every outcome in execution order
    fn report(&mut self, _out: &mut dyn Write, _outcomes: &[Outcome]) -> Result<()> {
        Ok(())
    }
}

/// Ordered reporters sharing one output stream.
///
/// Accumulates outcomes as they are recorded and hands the whole collection
/// to each reporter at the end of the run.
pub struct ReporterSet<W: Write> {
    out: W,
    reporters: Vec<Box<dyn Reporter>>,
    outcomes: Vec<Outcome>,
    started: bool,
}

impl<W: Write> ReporterSet<W> {
    /// Create a set that calls `reporters` in the given order
    #[must_use]
    pub fn new(out: W, reporters: Vec<Box<dyn Reporter>>) -> Self {
        Self {
            out,
            reporters,
            outcomes: Vec::new(),
            started: false,
        }
    }

    /// The standard pair: per-test progress lines, then the run summary
    #[must_use]
    pub fn with_defaults(out: W, options: &ReporterOptions) -> Self {
        Self::new(
            out,
            vec![
                Box::new(ProgressReporter::new()) as Box<dyn Reporter>,
                Box::new(SummaryReporter::new(options)),
            ],
        )
    }

    /// Start every reporter
    pub fn start(&mut self, info: &RunInfo) -> Result<()> {
        for reporter in &mut self.reporters {
            reporter.start(&mut self.out, info)?;
        }
        self.started = true;
        Ok(())
    }

    /// Whether [`ReporterSet::start`] has been called
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Hand one outcome to every reporter, then keep it for the summary
    pub fn record(&mut self, outcome: Outcome) -> Result<()> {
        for reporter in &mut self.reporters {
            reporter.record(&mut self.out, &outcome)?;
        }
        self.outcomes.push(outcome);
        Ok(())
    }

    /// Write a line that did not come from a reporter (e.g. test output)
    pub fn passthrough(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{line}").context("Failed to write to output")?;
        self.out.flush().context("Failed to flush output")?;
        Ok(())
    }

    /// Give every reporter the full outcome list and return the counts
    pub fn finish(&mut self) -> Result<Tally> {
        for reporter in &mut self.reporters {
            reporter.report(&mut self.out, &self.outcomes)?;
        }
        self.out.flush().context("Failed to flush output")?;
        Ok(Tally::from_outcomes(&self.outcomes))
    }

    /// Outcomes recorded so far
    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Consume the set and return the output stream
    pub fn into_inner(self) -> W {
        self.out
    }
}
