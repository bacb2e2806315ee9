//! JUnit XML report
//!
//! Test cases accumulate in memory and a single `<testsuites>` document is
//! written when the run finishes.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, FixedOffset, Local};
use quick_junit::{NonSuccessKind, Report, TestCase, TestCaseStatus, TestSuite};

use crate::common::paths::dir_label;
use crate::common::{decode_lossy, Error, Result};
use crate::testing::{Scenario, Verdict};

use super::Sink;

/// Collects a JUnit test case per reported scenario
pub struct JunitSink {
    path: PathBuf,
    report_name: String,
    suite_name: String,
    started: Option<(DateTime<FixedOffset>, Instant)>,
    total: usize,
    cases: Vec<TestCase>,
}

impl JunitSink {
    pub fn new(
        path: impl Into<PathBuf>,
        report_name: impl Into<String>,
        suite_name: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            report_name: report_name.into(),
            suite_name: suite_name.into(),
            started: None,
            total: 0,
            cases: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn add_case(&mut self, scenario: &Scenario, verdict: &Verdict, status: TestCaseStatus) {
        let actual = verdict.actual();
        let mut case = TestCase::new(verdict.name(), status);
        case.set_classname(dir_label(scenario.dir()))
            .set_time(verdict.duration())
            .set_system_out(decode_lossy(&actual.stdout))
            .set_system_err(decode_lossy(&actual.stderr));
        case.extra.insert("status".into(), "run".into());
        case.extra.insert(
            "duration".into(),
            format!("{:.3}", verdict.duration().as_secs_f64()).into(),
        );
        self.cases.push(case);
    }

    fn write_report(&mut self) -> Result<()> {
        let (timestamp, started) = self
            .started
            .unwrap_or_else(|| (Local::now().into(), Instant::now()));
        let elapsed = started.elapsed();
        // Scenarios left unrun after a failure stopped the suite
        let skipped = self.total.saturating_sub(self.cases.len());

        let mut suite = TestSuite::new(self.suite_name.as_str());
        suite.set_timestamp(timestamp).set_time(elapsed);
        if let Some(host) = hostname() {
            suite.extra.insert("hostname".into(), host.into());
        }
        suite
            .extra
            .insert("skipped".into(), skipped.to_string().into());
        for case in self.cases.drain(..) {
            suite.add_test_case(case);
        }

        let mut report = Report::new(self.report_name.as_str());
        report
            .set_timestamp(timestamp)
            .set_time(elapsed)
            .add_test_suite(suite);

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| Error::sink_io(dir, e))?;
        }
        let file = File::create(&self.path).map_err(|e| Error::sink_io(&self.path, e))?;
        report.serialize(file).map_err(|e| Error::ReportWrite {
            path: self.path.display().to_string(),
            error: e.to_string(),
        })?;

        tracing::debug!("Wrote JUnit report to {}", self.path.display());
        Ok(())
    }
}

/// Fold every diagnostic, with expected/actual/diff text, into one body
fn failure_description(verdict: &Verdict) -> String {
    let mut body = String::new();
    for diagnostic in verdict.diagnostics() {
        body.push_str(&diagnostic.text);
        body.push('\n');
        for (label, text) in [
            ("EXPECTED", &diagnostic.expected),
            ("ACTUAL", &diagnostic.actual),
            ("DIFF", &diagnostic.diff),
        ] {
            if let Some(text) = text {
                body.push_str(&format!("{}:\n{}\n", label, text));
            }
        }
    }
    body
}

impl Sink for JunitSink {
    fn on_run_start(&mut self, total: usize) -> Result<()> {
        self.started = Some((Local::now().into(), Instant::now()));
        self.total = total;
        self.cases.clear();
        Ok(())
    }

    fn on_test_ok(&mut self, scenario: &Scenario, verdict: &Verdict) -> Result<()> {
        self.add_case(scenario, verdict, TestCaseStatus::success());
        Ok(())
    }

    fn on_test_fail(&mut self, scenario: &Scenario, verdict: &Verdict) -> Result<()> {
        let message = verdict
            .diagnostics()
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        let mut status = TestCaseStatus::non_success(NonSuccessKind::Failure);
        status
            .set_message(message)
            .set_type("output mismatch")
            .set_description(failure_description(verdict));
        self.add_case(scenario, verdict, status);
        Ok(())
    }

    fn on_finish(&mut self) -> Result<()> {
        self.write_report()
    }
}

#[cfg(unix)]
fn hostname() -> Option<String> {
    let mut buf = [0u8; 256];
    // SAFETY: the buffer is valid for writes of its full length
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
    if rc != 0 {
        return None;
    }
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let name = String::from_utf8_lossy(&buf[..len]).into_owned();
    (!name.is_empty()).then_some(name)
}

#[cfg(not(unix))]
fn hostname() -> Option<String> {
    std::env::var("COMPUTERNAME").ok()
}
