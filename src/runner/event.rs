//! Runner event parser
//!
//! The test runner reports progress as newline-delimited JSON objects tagged
//! by a `type` field. Lines that are not JSON objects with a `type` are plain
//! test output and are left to the caller.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::outcome::{render_display, FailureKind, Location, Outcome};

/// A parsed event from the runner's output
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerEvent {
    /// The run is about to begin
    Start {
        /// Test framework name, if the runner sent one
        framework: Option<String>,
        /// Test framework version, if the runner sent one
        version: Option<String>,
    },
    /// One test completed
    Result(ResultEvent),
    /// Every test has completed
    Finish,
    /// Unrecognized event type
    Unknown {
        /// The raw event type string
        event_type: String,
    },
}

/// Payload of a `result` event
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultEvent {
    /// Test name shown in progress output
    pub name: String,
    /// Where the test lives
    pub location: RawLocation,
    /// Why the test did not pass; absent or `null` for a pass
    #[serde(default)]
    pub failure: Option<RawFailure>,
    /// Assertions the test performed
    #[serde(default)]
    pub assertions: u64,
    /// Pre-rendered failure text, used verbatim when present
    #[serde(default)]
    pub display: Option<String>,
}

/// A location as sent by the runner
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawLocation {
    /// `"FooTest#test_bar [./test/foo_test.rb:42]"`
    Combined(String),
    /// `{"name": "...", "path": "...", "line": 42}`
    Structured {
        /// Test identifier
        name: String,
        /// Source file
        path: String,
        /// Line number
        #[serde(default)]
        line: Option<u32>,
    },
}

/// A failure as sent by the runner
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawFailure {
    /// `assertion`, `error`, `skip`, or anything else
    pub kind: String,
    /// Failure message
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
struct StartEvent {
    #[serde(default)]
    framework: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

/// Parse a single line of runner output.
///
/// Returns `Ok(None)` for lines that are not events. A line that claims to
/// be a known event but is malformed is an error.
pub fn parse_event(line: &str) -> Result<Option<RunnerEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Ok(value) = serde_json::from_str::<Value>(line) else {
        return Ok(None);
    };
    let Some(event_type) = value.get("type").and_then(Value::as_str) else {
        return Ok(None);
    };

    let event = match event_type {
        "start" => {
            let start: StartEvent =
                serde_json::from_value(value.clone()).context("Malformed start event")?;
            RunnerEvent::Start {
                framework: start.framework,
                version: start.version,
            }
        }
        "result" => RunnerEvent::Result(
            serde_json::from_value(value.clone()).context("Malformed result event")?,
        ),
        "finish" => RunnerEvent::Finish,
        other => RunnerEvent::Unknown {
            event_type: other.to_string(),
        },
    };
    Ok(Some(event))
}

impl TryFrom<RawLocation> for Location {
    type Error = anyhow::Error;

    fn try_from(raw: RawLocation) -> Result<Self> {
        match raw {
            RawLocation::Combined(text) => text.parse(),
            RawLocation::Structured { name, path, line } => Self::new(&name, &path, line),
        }
    }
}

impl TryFrom<ResultEvent> for Outcome {
    type Error = anyhow::Error;

    fn try_from(event: ResultEvent) -> Result<Self> {
        let location = Location::try_from(event.location)
            .with_context(|| format!("Invalid location for test '{}'", event.name))?;

        let Some(failure) = event.failure else {
            let outcome = Self::passed(&event.name, location, event.assertions);
            return Ok(match event.display {
                Some(display) => outcome.with_display(display),
                None => outcome,
            });
        };

        let kind = FailureKind::from_label(&failure.kind);
        let display = event
            .display
            .unwrap_or_else(|| render_display(&kind, &location, &failure.message));
        Ok(Self {
            name: event.name,
            failure: Some(kind),
            location,
            assertions: event.assertions,
            display,
        })
    }
}
