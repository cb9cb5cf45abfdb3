//! Structured test locations
//!
//! Runners usually report where a test lives as a single token such as
//! `FooTest#test_bar [./test/foo_test.rb:42]`. This module parses that token
//! once, at ingestion, so the reporters never slice strings by index.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Brackets a runner may wrap around the `path:line` part of a location
const OPEN_MARKERS: [char; 4] = ['[', '(', '<', '{'];

/// Opening and closing brackets, paired
const MARKER_PAIRS: [(char, char); 4] = [('[', ']'), ('(', ')'), ('<', '>'), ('{', '}')];

/// Where a test is defined and how to address it on the command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Identifier passed to the runner's `--name` flag
    pub test_name: String,
    /// Source file containing the test
    pub source_path: String,
    /// Line of the test (or of the failing assertion), when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Location {
    /// Build a location from already-separated parts.
    ///
    /// Fails if either the test name or the source path is blank.
    pub fn new(test_name: &str, source_path: &str, line: Option<u32>) -> Result<Self> {
        if test_name.trim().is_empty() {
            bail!("Test location has an empty test name");
        }
        if source_path.trim().is_empty() {
            bail!("Test location for '{test_name}' has an empty source path");
        }
        Ok(Self {
            test_name: test_name.to_string(),
            source_path: source_path.to_string(),
            line,
        })
    }
}

impl FromStr for Location {
    type Err = anyhow::Error;

    /// Parse `<name> <marker><path>:<line><marker>`.
    ///
    /// The surrounding markers are optional; the line number is not.
    fn from_str(s: &str) -> Result<Self> {
        let (test_name, rest) = split_name(s.trim())
            .with_context(|| format!("Malformed test location '{s}': expected '<name> [<path>:<line>]'"))?;

        let inner = rest.strip_prefix(OPEN_MARKERS).unwrap_or(rest);
        let inner = inner
            .strip_suffix(|c: char| !c.is_ascii_digit())
            .unwrap_or(inner);

        let (path, line) = inner
            .rsplit_once(':')
            .with_context(|| format!("Malformed test location '{s}': missing ':<line>' suffix"))?;
        let line: u32 = line
            .parse()
            .with_context(|| format!("Malformed test location '{s}': invalid line number '{line}'"))?;

        Self::new(test_name, path, Some(line))
            .with_context(|| format!("Malformed test location '{s}'"))
    }
}

/// Split off the test name. Names may contain spaces, so a bracketed
/// location is found from the right; unbracketed paths may not.
fn split_name(s: &str) -> Option<(&str, &str)> {
    let open = closing_bracket_start(s).or_else(|| {
        OPEN_MARKERS
            .iter()
            .filter_map(|marker| s.rfind(&format!(" {marker}")))
            .max()
            .map(|at| at + 1)
    });
    match open {
        Some(at) => Some((s[..at].trim_end(), &s[at..])),
        None => s.rsplit_once(' '),
    }
}

/// Offset of the marker that opens the bracket ending `s`, if that marker
/// follows a space. Brackets nested inside the path are skipped.
fn closing_bracket_start(s: &str) -> Option<usize> {
    let last = s.chars().last()?;
    let (open, close) = MARKER_PAIRS.into_iter().find(|&(_, close)| close == last)?;
    let mut depth = 0usize;
    for (at, c) in s.char_indices().rev() {
        if c == close {
            depth += 1;
        } else if c == open {
            depth -= 1;
            if depth == 0 {
                return s[..at].ends_with(' ').then_some(at);
            }
        }
    }
    None
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} [{}:{line}]", self.test_name, self.source_path),
            None => write!(f, "{} [{}]", self.test_name, self.source_path),
        }
    }
}
