//! Shared test utilities
//!
//! Common helpers used across test modules. Only compiled in test builds.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::outcome::{FailureKind, Location, Outcome};
use crate::report::Clock;

/// Location `SampleTest#<name> [test/sample_test.rb:10]`
#[must_use]
pub fn make_test_location(name: &str) -> Location {
    Location {
        test_name: format!("SampleTest#{name}"),
        source_path: "test/sample_test.rb".to_string(),
        line: Some(10),
    }
}

/// Create a passing `Outcome` with one assertion.
#[must_use]
pub fn make_passed_outcome(name: &str) -> Outcome {
    Outcome::passed(name, make_test_location(name), 1)
}

/// Create a non-passing `Outcome` with one assertion and a generic message.
#[must_use]
pub fn make_failed_outcome(name: &str, kind: FailureKind) -> Outcome {
    Outcome::failed(name, make_test_location(name), kind, "Expected true", 1)
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<Duration>>);

impl ManualClock {
    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.0.get()
    }
}
