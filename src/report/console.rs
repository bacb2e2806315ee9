//! Console progress and failure output

use std::io::{self, Write};

use colored::{Color, Colorize};

use crate::common::Result;
use crate::testing::{Scenario, Verdict};

use super::Sink;

/// Prints progress, failure details and a summary line
///
/// Color is decided by the caller; nothing here probes the terminal.
pub struct ConsoleSink<W = io::Stdout> {
    out: W,
    use_color: bool,
    total: usize,
    started: usize,
    ok: usize,
    failed: usize,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout(use_color: bool) -> Self {
        Self::new(io::stdout(), use_color)
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            total: 0,
            started: 0,
            ok: 0,
            failed: 0,
        }
    }

    pub fn test_count(&self) -> usize {
        self.started
    }

    pub fn ok_count(&self) -> usize {
        self.ok
    }

    pub fn fail_count(&self) -> usize {
        self.failed
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.use_color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }
}

impl<W: Write> Sink for ConsoleSink<W> {
    fn on_run_start(&mut self, total: usize) -> Result<()> {
        self.total = total;
        writeln!(self.out, "Running {} regression tests...", total)?;
        Ok(())
    }

    fn on_test_start(&mut self, scenario: &Scenario) -> Result<()> {
        self.started += 1;
        writeln!(self.out, "[{}/{}] {}", self.started, self.total, scenario.name())?;
        Ok(())
    }

    fn on_test_ok(&mut self, _scenario: &Scenario, _verdict: &Verdict) -> Result<()> {
        self.ok += 1;
        Ok(())
    }

    fn on_test_fail(&mut self, _scenario: &Scenario, verdict: &Verdict) -> Result<()> {
        self.failed += 1;

        let header = self.paint(&format!("FAILED: {}", verdict.command()), Color::Red);
        writeln!(self.out, "{}", header)?;

        for diagnostic in verdict.diagnostics() {
            let text = self.paint(&diagnostic.text, Color::Red);
            writeln!(self.out, "{}", text)?;

            if let Some(expected) = &diagnostic.expected {
                writeln!(self.out, "EXPECTED:\n{}", expected)?;
            }
            if let Some(actual) = &diagnostic.actual {
                writeln!(self.out, "ACTUAL:\n{}", actual)?;
            }
            if let Some(diff) = &diagnostic.diff {
                writeln!(self.out, "DIFF:\n{}", diff)?;
            }
        }
        Ok(())
    }

    fn on_finish(&mut self) -> Result<()> {
        let line = format!(
            "Ran {} tests. {} ok, {} failed, {} total",
            self.started, self.ok, self.failed, self.total
        );
        let color = if self.failed > 0 { Color::Red } else { Color::Green };
        let line = self.paint(&line, color);
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        Ok(())
    }
}
