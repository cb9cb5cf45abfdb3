//! Test outcome records
//!
//! One [`Outcome`] exists per executed test. The runner produces them; the
//! reporters only read them.

pub mod location;

pub use location::Location;

use serde::{Deserialize, Serialize};

/// Why a test did not pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// An assertion did not hold
    Assertion,
    /// The test raised an error it did not expect
    UnexpectedError,
    /// The test skipped itself
    Skip,
    /// A classification the reporter does not know about
    Unrecognized(String),
}

impl FailureKind {
    /// Map a runner-supplied label onto a failure kind.
    ///
    /// Unknown labels are kept as [`FailureKind::Unrecognized`] rather than
    /// rejected.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "assertion" | "failure" | "fail" => Self::Assertion,
            "error" | "unexpected_error" => Self::UnexpectedError,
            "skip" | "skipped" => Self::Skip,
            _ => Self::Unrecognized(label.to_string()),
        }
    }

    /// Heading used when rendering the failure for humans
    #[must_use]
    pub fn heading(&self) -> &str {
        match self {
            Self::Assertion => "Failure",
            Self::UnexpectedError => "Error",
            Self::Skip => "Skipped",
            Self::Unrecognized(label) => label,
        }
    }
}

/// Status of a single test, derived from its failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    /// The test passed
    Pass,
    /// The test raised an unexpected error
    Error,
    /// An assertion failed
    Failure,
    /// The test was skipped
    Skip,
    /// Anything else
    Other,
}

impl From<Option<&FailureKind>> for StatusCode {
    fn from(failure: Option<&FailureKind>) -> Self {
        match failure {
            None => Self::Pass,
            Some(FailureKind::Assertion) => Self::Failure,
            Some(FailureKind::UnexpectedError) => Self::Error,
            Some(FailureKind::Skip) => Self::Skip,
            Some(FailureKind::Unrecognized(_)) => Self::Other,
        }
    }
}

/// The result of running one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Name shown next to the progress tag
    pub name: String,
    /// Failure classification; `None` means the test passed
    pub failure: Option<FailureKind>,
    /// Where the test lives
    pub location: Location,
    /// Number of assertions the test performed
    pub assertions: u64,
    /// Human-readable rendering used in the failure listing
    pub display: String,
}

impl Outcome {
    /// A passing outcome. Its display string is empty.
    #[must_use]
    pub fn passed(name: &str, location: Location, assertions: u64) -> Self {
        Self {
            name: name.to_string(),
            failure: None,
            location,
            assertions,
            display: String::new(),
        }
    }

    /// A non-passing outcome with a display string built from `message`.
    #[must_use]
    pub fn failed(
        name: &str,
        location: Location,
        kind: FailureKind,
        message: &str,
        assertions: u64,
    ) -> Self {
        let display = render_display(&kind, &location, message);
        Self {
            name: name.to_string(),
            failure: Some(kind),
            location,
            assertions,
            display,
        }
    }

    /// Replace the display string with one supplied by the runner
    #[must_use]
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    /// Status derived from the failure kind
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from(self.failure.as_ref())
    }

    /// Whether the test passed
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        self.failure.is_none()
    }
}

/// Render a failure the way test runners conventionally print it:
/// heading, location, then the message.
#[must_use]
pub fn render_display(kind: &FailureKind, location: &Location, message: &str) -> String {
    let mut display = format!("{}:\n{location}:\n{message}", kind.heading());
    if !display.ends_with('\n') {
        display.push('\n');
    }
    display
}
