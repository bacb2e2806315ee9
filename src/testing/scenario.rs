//! Scenario model
//!
//! A scenario is a test script plus the sidecar files sharing its stem:
//!
//! | sidecar     | contents                                            |
//! |-------------|-----------------------------------------------------|
//! | `.args`     | extra arguments, split with shell-word rules        |
//! | `.stdin`    | bytes fed to the program's standard input           |
//! | `.stdout`   | expected standard output                            |
//! | `.stderr`   | expected standard error                             |
//! | `.exitcode` | expected exit code (text, or legacy 4-byte binary)  |
//! | `.result`   | legacy name for `.exitcode`                         |
//!
//! Missing sidecars are not errors: they load as empty bytes, or as "no
//! exit code expectation".

use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// Output of one program run, either expected or actual
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// For expectations, `None` means the program must exit successfully
    pub exit_code: Option<i32>,
}

impl TestOutput {
    pub fn new(
        stdout: impl Into<Vec<u8>>,
        stderr: impl Into<Vec<u8>>,
        exit_code: Option<i32>,
    ) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }
}

/// A single test case loaded from disk
#[derive(Debug, Clone)]
pub struct Scenario {
    name: String,
    path: PathBuf,
    args: Vec<String>,
    stdin: Vec<u8>,
    expected: TestOutput,
}

impl Scenario {
    /// Load a scenario from its script path, reading all sidecars once
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::scenario_load(path, "script file does not exist"));
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| Error::scenario_load(path, "script has no file name"))?;

        let args = match read_sidecar(path, "args")? {
            Some(bytes) => parse_args(path, &bytes)?,
            None => Vec::new(),
        };
        let stdin = read_sidecar(path, "stdin")?.unwrap_or_default();
        let stdout = read_sidecar(path, "stdout")?.unwrap_or_default();
        let stderr = read_sidecar(path, "stderr")?.unwrap_or_default();

        let exit_code = match read_sidecar(path, "exitcode")? {
            Some(bytes) => Some(decode_exit_code(path, &bytes)?),
            None => match read_sidecar(path, "result")? {
                Some(bytes) => Some(decode_exit_code(path, &bytes)?),
                None => None,
            },
        };

        Ok(Self {
            name,
            path: path.to_path_buf(),
            args,
            stdin,
            expected: TestOutput::new(stdout, stderr, exit_code),
        })
    }

    /// Build a scenario directly, without touching the filesystem
    pub fn from_parts(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        args: Vec<String>,
        stdin: impl Into<Vec<u8>>,
        expected: TestOutput,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            args,
            stdin: stdin.into(),
            expected,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn stdin(&self) -> &[u8] {
        &self.stdin
    }

    pub fn expected(&self) -> &TestOutput {
        &self.expected
    }

    /// Directory containing the script
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }
}

/// Path of a sidecar: the script path with its extension replaced
pub fn sidecar_path(script: &Path, extension: &str) -> PathBuf {
    script.with_extension(extension)
}

fn read_sidecar(script: &Path, extension: &str) -> Result<Option<Vec<u8>>> {
    let path = sidecar_path(script, extension);
    match std::fs::read(&path) {
        Ok(bytes) => {
            tracing::debug!("Found .{} for {}", extension, script.display());
            Ok(Some(bytes))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::scenario_load(&path, e)),
    }
}

fn parse_args(script: &Path, bytes: &[u8]) -> Result<Vec<String>> {
    let text = String::from_utf8_lossy(bytes);
    shell_words::split(text.trim_end())
        .map_err(|e| Error::scenario_load(&sidecar_path(script, "args"), e))
}

/// Decode an exit code sidecar
///
/// Text (an optionally signed decimal, whitespace allowed) takes precedence;
/// otherwise exactly four bytes are read as a native-endian `i32`.
pub fn decode_exit_code(script: &Path, bytes: &[u8]) -> Result<i32> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        let trimmed = text.trim();
        let digits = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return trimmed
                .parse()
                .map_err(|e| Error::scenario_load(script, format!("bad exit code: {}", e)));
        }
    }

    let raw: [u8; 4] = bytes.try_into().map_err(|_| {
        Error::scenario_load(
            script,
            format!(
                "exit code sidecar is neither text nor a 4-byte integer ({} bytes)",
                bytes.len()
            ),
        )
    })?;
    Ok(i32::from_ne_bytes(raw))
}
