//! Expected-vs-actual comparison
//!
//! Every check runs, so one verdict can carry a timeout, exit code, stdout
//! and stderr diagnostic at once, always in that order.

use std::time::Duration;

use crate::common::decode_lossy;

use super::diff::line_diff;
use super::executor::Execution;
use super::scenario::{Scenario, TestOutput};

/// Which check produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Timeout,
    ExitCode,
    Stdout,
    Stderr,
}

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Human-readable summary
    pub text: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    /// Present only when both texts are present and differ
    pub diff: Option<String>,
}

impl Diagnostic {
    fn summary(kind: DiagnosticKind, text: String) -> Self {
        Self {
            kind,
            text,
            expected: None,
            actual: None,
            diff: None,
        }
    }

    fn with_diff(kind: DiagnosticKind, text: &str, expected: &[u8], actual: &[u8]) -> Self {
        let expected = decode_lossy(expected);
        let actual = decode_lossy(actual);
        let diff = (expected != actual).then(|| line_diff(&expected, &actual));
        Self {
            kind,
            text: text.to_string(),
            expected: Some(expected),
            actual: Some(actual),
            diff,
        }
    }
}

/// Whole seconds print as integers, anything finer as a decimal
fn seconds(limit: Duration) -> String {
    if limit.subsec_nanos() == 0 {
        limit.as_secs().to_string()
    } else {
        limit.as_secs_f64().to_string()
    }
}

/// Outcome of one scenario
#[derive(Debug, Clone)]
pub struct Verdict {
    name: String,
    command: String,
    actual: TestOutput,
    duration: Duration,
    diagnostics: Vec<Diagnostic>,
}

impl Verdict {
    /// Compare a scenario's expectations against what its execution produced
    pub fn new(scenario: &Scenario, execution: Execution) -> Self {
        let Execution {
            command,
            output: actual,
            duration,
            timed_out,
        } = execution;
        let expected = scenario.expected();
        let mut diagnostics = Vec::new();

        if let Some(limit) = timed_out {
            diagnostics.push(Diagnostic::summary(
                DiagnosticKind::Timeout,
                format!("Timed out after {} seconds", seconds(limit)),
            ));
        }

        let actual_code = actual.exit_code.unwrap_or(0);
        match expected.exit_code {
            Some(code) if code != actual_code => {
                diagnostics.push(Diagnostic::summary(
                    DiagnosticKind::ExitCode,
                    format!("Expected exit code {} but was {}", code, actual_code),
                ));
            }
            None if actual_code != 0 => {
                diagnostics.push(Diagnostic::summary(
                    DiagnosticKind::ExitCode,
                    format!("Expected successful exit code but was {}", actual_code),
                ));
            }
            _ => {}
        }

        if expected.stdout != actual.stdout {
            diagnostics.push(Diagnostic::with_diff(
                DiagnosticKind::Stdout,
                "Output did not match expected output",
                &expected.stdout,
                &actual.stdout,
            ));
        }

        if expected.stderr != actual.stderr {
            diagnostics.push(Diagnostic::with_diff(
                DiagnosticKind::Stderr,
                "Error did not match expected error",
                &expected.stderr,
                &actual.stderr,
            ));
        }

        Self {
            name: scenario.name().to_string(),
            command,
            actual,
            duration,
            diagnostics,
        }
    }

    pub fn failed(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Command line, rendered for display
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn actual(&self) -> &TestOutput {
        &self.actual
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
