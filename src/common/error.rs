//! Error types for the regression harness
//!
//! Messages are written for the person running the suite: they name the
//! offending path and, where it helps, how to fix the invocation.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Test directory not found: {}", .0.display())]
    TestDirNotFound(PathBuf),

    #[error("Could not find program under test '{}'. Pass a path or a name on PATH with --exe", .0.display())]
    ProgramNotFound(PathBuf),

    #[error("Program under test is not an executable file: {}", .0.display())]
    ProgramNotExecutable(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === Scenario Errors ===
    #[error("Failed to load scenario '{path}': {error}")]
    ScenarioLoad { path: String, error: String },

    // === Execution Errors ===
    #[error("Failed to start '{program}': {error}")]
    Spawn {
        program: String,
        #[source]
        error: io::Error,
    },

    #[error("Cannot {action} while runner is {state}")]
    InvalidState { action: String, state: String },

    // === Reporting Errors ===
    #[error("Failed to write '{path}': {error}")]
    SinkIo {
        path: String,
        #[source]
        error: io::Error,
    },

    #[error("Failed to write JUnit report '{path}': {error}")]
    ReportWrite { path: String, error: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a scenario load error for a path
    pub fn scenario_load(path: &Path, error: impl ToString) -> Self {
        Self::ScenarioLoad {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(action: &str, state: &str) -> Self {
        Self::InvalidState {
            action: action.to_string(),
            state: state.to_string(),
        }
    }

    /// Create a sink write error for a path
    pub fn sink_io(path: &Path, error: io::Error) -> Self {
        Self::SinkIo {
            path: path.display().to_string(),
            error,
        }
    }

    /// Whether this error comes from bad input rather than a broken run
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::TestDirNotFound(_)
                | Error::ProgramNotFound(_)
                | Error::ProgramNotExecutable(_)
                | Error::Config(_)
                | Error::ConfigParse(_)
                | Error::FileRead { .. }
        )
    }
}
