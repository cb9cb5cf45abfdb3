//! Per-test progress lines
//!
//! Prints one colored, fixed-width status tag followed by the test name as
//! soon as each test completes.

use std::io::Write;

use anyhow::{Context, Result};

use super::colors;
use super::Reporter;
use crate::outcome::{Outcome, StatusCode};

/// Tag and block color for a status. Every tag is seven characters wide.
#[must_use]
pub const fn status_tag(status: StatusCode) -> (&'static str, &'static str) {
    match status {
        StatusCode::Pass => ("SUCCESS", colors::GREEN),
        StatusCode::Error => ("ERROR  ", colors::RED),
        StatusCode::Failure => ("FAILURE", colors::RED),
        StatusCode::Skip => ("SKIPPED", colors::YELLOW),
        StatusCode::Other => ("-------", colors::BLUE),
    }
}

/// Prints the status and the name of each test during the run
#[derive(Debug, Default)]
pub struct ProgressReporter;

impl ProgressReporter {
    /// Create a progress reporter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reporter for ProgressReporter {
    fn record(&mut self, out: &mut dyn Write, outcome: &Outcome) -> Result<()> {
        let (tag, color) = status_tag(outcome.status());
        writeln!(out, "{color}{tag}{} {}", colors::RESET, outcome.name)
            .context("Failed to write progress line")?;
        // Lines must show up while the run is still going
        out.flush().context("Failed to flush progress line")?;
        Ok(())
    }
}
