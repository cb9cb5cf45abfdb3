//! Tinted - colored console reporter for test runs
//!
//! Prints one colored status line per test as results arrive, then a
//! summary with counts, timing, and a command to re-run each failing test.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod outcome;
pub mod report;
pub mod runner;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types
pub use config::ReporterOptions;
pub use outcome::{FailureKind, Location, Outcome, StatusCode};
pub use report::{
    ProgressReporter, Reporter, ReporterSet, RunInfo, RunStatistics, SummaryReporter, Tally,
};
pub use runner::event::{parse_event, RunnerEvent};
pub use runner::session::Session;
