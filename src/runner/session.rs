//! Runner session
//!
//! Feeds a runner's output, line by line, into a [`ReporterSet`]: events
//! become reporter calls, everything else is written through unchanged.
//! Lines are handled one at a time, in the order they arrive.

use std::io::Write;
use std::process::{ExitStatus, Stdio};

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tracing::{debug, info, trace};

use super::event::{parse_event, RunnerEvent};
use crate::outcome::Outcome;
use crate::report::{ReporterSet, RunInfo, Tally};

/// One test run driven by runner output
pub struct Session<W: Write> {
    reporters: ReporterSet<W>,
    info: RunInfo,
    tally: Option<Tally>,
}

impl<W: Write> Session<W> {
    /// Create a session. `info` is used for the banner unless the runner
    /// sends its own `start` event first.
    #[must_use]
    pub const fn new(reporters: ReporterSet<W>, info: RunInfo) -> Self {
        Self {
            reporters,
            info,
            tally: None,
        }
    }

    /// Handle one line of runner output
    pub fn handle_line(&mut self, line: &str) -> Result<()> {
        match parse_event(line)? {
            None => {
                trace!(line, "passing through runner output");
                self.reporters.passthrough(line)
            }
            Some(RunnerEvent::Start { framework, version }) => {
                if self.reporters.is_started() {
                    debug!("ignoring start event after the run began");
                    return Ok(());
                }
                if let Some(framework) = framework {
                    self.info.framework = framework;
                }
                if let Some(version) = version {
                    self.info.version = version;
                }
                self.reporters.start(&self.info)
            }
            Some(RunnerEvent::Result(event)) => {
                if self.tally.is_some() {
                    bail!("Result for '{}' arrived after the run finished", event.name);
                }
                let outcome = Outcome::try_from(event)?;
                self.ensure_started()?;
                self.reporters.record(outcome)
            }
            Some(RunnerEvent::Finish) => self.finish().map(|_| ()),
            Some(RunnerEvent::Unknown { event_type }) => {
                debug!(%event_type, "ignoring unknown runner event");
                Ok(())
            }
        }
    }

    fn ensure_started(&mut self) -> Result<()> {
        if !self.reporters.is_started() {
            self.reporters.start(&self.info)?;
        }
        Ok(())
    }

    /// End the run and print the summary. Later calls return the same counts.
    pub fn finish(&mut self) -> Result<Tally> {
        if let Some(tally) = self.tally {
            return Ok(tally);
        }
        self.ensure_started()?;
        let tally = self.reporters.finish()?;
        debug!(runs = tally.runs, failures = tally.failures, errors = tally.errors, "run finished");
        self.tally = Some(tally);
        Ok(tally)
    }

    /// Read runner output until it ends, then finish the run
    pub async fn consume<R: AsyncBufRead + Unpin>(&mut self, reader: R) -> Result<Tally> {
        let mut lines = reader.lines();
        while let Some(line) = lines
            .next_line()
            .await
            .context("Failed to read runner output")?
        {
            self.handle_line(&line)?;
        }
        self.finish()
    }

    /// Outcomes recorded so far
    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        self.reporters.outcomes()
    }

    /// Consume the session and return the output stream
    pub fn into_output(self) -> W {
        self.reporters.into_inner()
    }
}

/// Spawn a test runner and report its output.
///
/// The runner's stdout is parsed; its stderr goes straight to the terminal.
/// Returns the counts and the runner's exit code. A runner killed by a
/// signal reports `128 + signal`, the way shells do.
pub async fn run_command<W: Write>(
    session: &mut Session<W>,
    program: &str,
    args: &[String],
) -> Result<(Tally, i32)> {
    let mut child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("Failed to spawn test runner '{program}'"))?;
    info!(program, ?args, "spawned test runner");

    let child_stdout = child
        .stdout
        .take()
        .context("Failed to capture runner stdout")?;

    let tally = match session.consume(BufReader::new(child_stdout)).await {
        Ok(tally) => tally,
        Err(err) => {
            child.kill().await.ok();
            return Err(err);
        }
    };

    let status = child
        .wait()
        .await
        .context("Failed to wait for test runner")?;
    info!(%status, "test runner exited");
    Ok((tally, runner_exit_code(status)))
}

/// Exit code for a finished runner, including one that never exited normally
fn runner_exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReporterOptions;
    use crate::report::{Reporter, SummaryReporter};
    use crate::testutil::ManualClock;

    fn session() -> Session<Vec<u8>> {
        let options = ReporterOptions::default();
        let reporters = ReporterSet::new(
            Vec::new(),
            vec![
                Box::new(crate::report::ProgressReporter::new()) as Box<dyn Reporter>,
                Box::new(SummaryReporter::with_clock(&options, ManualClock::default())),
            ],
        );
        Session::new(reporters, RunInfo::from(&options))
    }

    const PASS: &str =
        r#"{"type":"result","name":"test_a","location":"T#test_a [t.rb:1]","assertions":1}"#;
    const FAIL: &str = r#"{"type":"result","name":"test_b","location":"T#test_b [t.rb:5]","assertions":1,"failure":{"kind":"assertion","message":"nope"}}"#;

    #[test]
    fn test_result_before_start_starts_with_defaults() {
        let mut session = session();
        session.handle_line(PASS).unwrap();
        let text = String::from_utf8(session.into_output()).unwrap();
        assert!(text.starts_with("\x1b[44m\x1b[37mMinitest version unknown\x1b[0m\n"));
        assert!(text.contains("SUCCESS\x1b[0m test_a\n"));
    }

    #[test]
    fn test_start_event_overrides_banner() {
        let mut session = session();
        session
            .handle_line(r#"{"type":"start","version":"5.25.1"}"#)
            .unwrap();
        session.handle_line(PASS).unwrap();
        let text = String::from_utf8(session.into_output()).unwrap();
        assert!(text.starts_with("\x1b[44m\x1b[37mMinitest version 5.25.1\x1b[0m\n"));
    }

    #[test]
    fn test_late_start_event_is_ignored() {
        let mut session = session();
        session.handle_line(PASS).unwrap();
        session
            .handle_line(r#"{"type":"start","version":"9.9"}"#)
            .unwrap();
        let text = String::from_utf8(session.into_output()).unwrap();
        assert!(!text.contains("9.9"));
        assert_eq!(text.matches("Running...").count(), 1);
    }

    #[test]
    fn test_plain_lines_pass_through_in_order() {
        let mut session = session();
        session.handle_line(PASS).unwrap();
        session.handle_line("debug output").unwrap();
        session.handle_line(FAIL).unwrap();
        let text = String::from_utf8(session.into_output()).unwrap();
        let a = text.find("test_a").unwrap();
        let debug = text.find("debug output\n").unwrap();
        let b = text.find("FAILURE\x1b[0m test_b").unwrap();
        assert!(a < debug && debug < b);
    }

    #[test]
    fn test_finish_event_reports_once() {
        let mut session = session();
        session.handle_line(FAIL).unwrap();
        session.handle_line(r#"{"type":"finish"}"#).unwrap();
        let tally = session.finish().unwrap();
        assert_eq!(tally.failures, 1);
        let text = String::from_utf8(session.into_output()).unwrap();
        assert_eq!(text.matches("Run this single test with:").count(), 1);
        assert_eq!(text.matches(" runs, ").count(), 1);
    }

    #[test]
    fn test_result_after_finish_is_error() {
        let mut session = session();
        session.handle_line(r#"{"type":"finish"}"#).unwrap();
        let err = session.handle_line(PASS).unwrap_err();
        assert!(err.to_string().contains("after the run finished"));
    }

    #[test]
    fn test_malformed_location_fails_fast() {
        let mut session = session();
        let err = session
            .handle_line(r#"{"type":"result","name":"t","location":"broken"}"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("Malformed test location"));
        assert!(session.outcomes().is_empty());
    }

    #[test]
    fn test_unknown_events_are_ignored() {
        let mut session = session();
        session.handle_line(r#"{"type":"heartbeat"}"#).unwrap();
        assert!(session.into_output().is_empty());
    }

    #[tokio::test]
    async fn test_consume_reads_until_end_of_input() {
        let mut session = session();
        let input = format!("{PASS}\nsome output\n{FAIL}\n");
        let tally = session.consume(input.as_bytes()).await.unwrap();
        assert_eq!(tally.runs, 2);
        assert_eq!(tally.failures, 1);
        assert_eq!(session.outcomes().len(), 2);
    }

    #[tokio::test]
    async fn test_consume_empty_input_still_reports() {
        let mut session = session();
        let tally = session.consume(&b""[..]).await.unwrap();
        assert_eq!(tally, Tally::default());
        let text = String::from_utf8(session.into_output()).unwrap();
        assert!(text.contains("Running..."));
        assert!(text.contains("0 runs, 0 assertions, 0 failures, 0 errors, 0 skips"));
    }

    #[cfg(unix)]
    #[test]
    fn test_runner_exit_code_for_signal() {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(runner_exit_code(ExitStatus::from_raw(3 << 8)), 3);
        assert_eq!(runner_exit_code(ExitStatus::from_raw(9)), 137);
    }
}
