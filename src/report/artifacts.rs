//! Failure artifacts for post-hoc debugging
//!
//! For each failing scenario the actual output is written next to where a
//! sidecar would live, so a failing case can be promoted to a new
//! expectation by copying files.

use std::path::{Path, PathBuf};

use crate::common::config::ExitCodeFormat;
use crate::common::{Error, Result};
use crate::testing::{Scenario, Verdict};

use super::Sink;

/// Writes the actual output of failing scenarios to a directory
pub struct ArtifactSink {
    dir: PathBuf,
    exit_code_format: ExitCodeFormat,
    written: usize,
}

impl ArtifactSink {
    /// The directory is created on the first failure, not before
    pub fn new(dir: impl Into<PathBuf>, exit_code_format: ExitCodeFormat) -> Self {
        Self {
            dir: dir.into(),
            exit_code_format,
            written: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of scenarios whose artifacts were written
    pub fn written(&self) -> usize {
        self.written
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            tracing::info!(
                "Output directory does not exist, creating: {}",
                self.dir.display()
            );
            std::fs::create_dir_all(&self.dir).map_err(|e| Error::sink_io(&self.dir, e))?;
        }
        Ok(())
    }

    fn write(&self, name: &str, extension: &str, contents: &[u8]) -> Result<()> {
        let path = self.dir.join(format!("{}.{}", name, extension));
        std::fs::write(&path, contents).map_err(|e| Error::sink_io(&path, e))
    }
}

/// Serialize an exit code the way `.exitcode` sidecars are read back
pub fn encode_exit_code(code: i32, format: ExitCodeFormat) -> Vec<u8> {
    match format {
        ExitCodeFormat::Binary => code.to_ne_bytes().to_vec(),
        ExitCodeFormat::Text => format!("{}\n", code).into_bytes(),
    }
}

impl Sink for ArtifactSink {
    fn on_test_fail(&mut self, _scenario: &Scenario, verdict: &Verdict) -> Result<()> {
        self.ensure_dir()?;

        let actual = verdict.actual();
        if !actual.stdout.is_empty() {
            self.write(verdict.name(), "stdout", &actual.stdout)?;
        }
        if !actual.stderr.is_empty() {
            self.write(verdict.name(), "stderr", &actual.stderr)?;
        }
        if let Some(code) = actual.exit_code {
            self.write(
                verdict.name(),
                "exitcode",
                &encode_exit_code(code, self.exit_code_format),
            )?;
        }

        self.written += 1;
        tracing::debug!("Wrote failure details to: {}", self.dir.display());
        Ok(())
    }

    fn on_finish(&mut self) -> Result<()> {
        if self.written > 0 {
            tracing::info!(
                "Output from {} failed test(s) written to: {}",
                self.written,
                self.dir.display()
            );
        }
        Ok(())
    }
}
