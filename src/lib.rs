//! regress - regression test runner for script interpreters
//!
//! This library discovers scenario scripts with their sidecar expectation
//! files, executes a program under test against each one and reports the
//! verdicts to console, JUnit and artifact sinks.

pub mod cli;
pub mod commands;
pub mod common;
pub mod report;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use testing::{RunSummary, Runner, Scenario, ScenarioFinder, SubprocessExecutor};
