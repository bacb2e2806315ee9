//! Test runner implementation
//!
//! Drives every scenario through the executor, turns each execution into a
//! verdict and reports it. Execution is strictly sequential.

use std::fmt;

use crate::common::{Error, Result};
use crate::report::Sink;

use super::executor::ScenarioExecutor;
use super::scenario::Scenario;
use super::verdict::Verdict;

/// Lifecycle of a runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Finished,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::NotStarted => write!(f, "not started"),
            RunState::Running => write!(f, "running"),
            RunState::Finished => write!(f, "finished"),
        }
    }
}

/// Counts for a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Scenarios discovered, including any never executed
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl RunSummary {
    /// True when no executed scenario failed
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    /// Scenarios that actually ran
    pub fn executed(&self) -> usize {
        self.passed + self.failed
    }
}

/// Runs a list of scenarios and reports each to a sink
pub struct Runner<E, S> {
    executor: E,
    scenarios: Vec<Scenario>,
    sink: S,
    ignore_failures: bool,
    state: RunState,
}

impl<E: ScenarioExecutor, S: Sink> Runner<E, S> {
    pub fn new(executor: E, scenarios: Vec<Scenario>, sink: S) -> Self {
        Self {
            executor,
            scenarios,
            sink,
            ignore_failures: false,
            state: RunState::NotStarted,
        }
    }

    /// Keep going after a failing scenario instead of stopping the suite
    pub fn ignore_failures(mut self, ignore: bool) -> Self {
        self.ignore_failures = ignore;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Hand back the sink, e.g. to inspect its counters
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run every scenario once, in order
    pub async fn run(&mut self) -> Result<RunSummary> {
        if self.state != RunState::NotStarted {
            return Err(Error::invalid_state("run", &self.state.to_string()));
        }
        self.state = RunState::Running;

        let mut summary = RunSummary {
            total: self.scenarios.len(),
            ..RunSummary::default()
        };

        self.sink.on_run_start(summary.total)?;

        for scenario in &self.scenarios {
            self.sink.on_test_start(scenario)?;

            let execution = self.executor.run(scenario).await?;
            let verdict = Verdict::new(scenario, execution);

            if verdict.failed() {
                summary.failed += 1;
                self.sink.on_test_fail(scenario, &verdict)?;

                if !self.ignore_failures {
                    tracing::debug!("Stopping after first failure: {}", scenario.name());
                    break;
                }
            } else {
                summary.passed += 1;
                self.sink.on_test_ok(scenario, &verdict)?;
            }
        }

        self.sink.on_finish()?;
        self.state = RunState::Finished;

        Ok(summary)
    }
}
