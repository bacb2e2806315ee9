//! Regression test engine
//!
//! Finds scenario scripts on disk, runs the program under test against
//! each one and compares what it did with what the sidecar files expect.

mod diff;
mod executor;
mod finder;
mod runner;
mod scenario;
mod verdict;

pub use diff::line_diff;
pub use executor::{Execution, ScenarioExecutor, SubprocessExecutor};
pub use finder::ScenarioFinder;
pub use runner::{RunState, RunSummary, Runner};
pub use scenario::{decode_exit_code, sidecar_path, Scenario, TestOutput};
pub use verdict::{Diagnostic, DiagnosticKind, Verdict};
