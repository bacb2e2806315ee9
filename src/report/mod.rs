//! Reporting sinks
//!
//! The runner emits lifecycle events to a single [`Sink`]; [`MultiSink`]
//! fans them out so console, JUnit and artifact output stay independent of
//! execution.

mod artifacts;
mod console;
mod junit;

pub use artifacts::ArtifactSink;
pub use console::ConsoleSink;
pub use junit::JunitSink;

use crate::common::Result;
use crate::testing::{Scenario, Verdict};

/// Observer of a test run
///
/// Every method defaults to doing nothing. An error aborts the run.
pub trait Sink {
    /// Called once, before any scenario runs
    fn on_run_start(&mut self, _total: usize) -> Result<()> {
        Ok(())
    }

    /// Called before a scenario is executed
    fn on_test_start(&mut self, _scenario: &Scenario) -> Result<()> {
        Ok(())
    }

    /// Called when a scenario passed
    fn on_test_ok(&mut self, _scenario: &Scenario, _verdict: &Verdict) -> Result<()> {
        Ok(())
    }

    /// Called when a scenario failed
    fn on_test_fail(&mut self, _scenario: &Scenario, _verdict: &Verdict) -> Result<()> {
        Ok(())
    }

    /// Called once, after the last reported scenario
    fn on_finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn on_run_start(&mut self, total: usize) -> Result<()> {
        (**self).on_run_start(total)
    }

    fn on_test_start(&mut self, scenario: &Scenario) -> Result<()> {
        (**self).on_test_start(scenario)
    }

    fn on_test_ok(&mut self, scenario: &Scenario, verdict: &Verdict) -> Result<()> {
        (**self).on_test_ok(scenario, verdict)
    }

    fn on_test_fail(&mut self, scenario: &Scenario, verdict: &Verdict) -> Result<()> {
        (**self).on_test_fail(scenario, verdict)
    }

    fn on_finish(&mut self) -> Result<()> {
        (**self).on_finish()
    }
}

/// Forwards every event to each registered sink, in registration order
#[derive(Default)]
pub struct MultiSink<'a> {
    sinks: Vec<Box<dyn Sink + 'a>>,
}

impl<'a> MultiSink<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Register a sink; must happen before the run starts
    pub fn add(&mut self, sink: impl Sink + 'a) -> &mut Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn each(&mut self, mut f: impl FnMut(&mut (dyn Sink + 'a)) -> Result<()>) -> Result<()> {
        for sink in &mut self.sinks {
            f(sink.as_mut())?;
        }
        Ok(())
    }
}

impl Sink for MultiSink<'_> {
    fn on_run_start(&mut self, total: usize) -> Result<()> {
        self.each(|s| s.on_run_start(total))
    }

    fn on_test_start(&mut self, scenario: &Scenario) -> Result<()> {
        self.each(|s| s.on_test_start(scenario))
    }

    fn on_test_ok(&mut self, scenario: &Scenario, verdict: &Verdict) -> Result<()> {
        self.each(|s| s.on_test_ok(scenario, verdict))
    }

    fn on_test_fail(&mut self, scenario: &Scenario, verdict: &Verdict) -> Result<()> {
        self.each(|s| s.on_test_fail(scenario, verdict))
    }

    fn on_finish(&mut self) -> Result<()> {
        self.each(|s| s.on_finish())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingSink;
    use super::*;
    use crate::common::Error;
    use crate::testing::{Execution, TestOutput};
    use std::time::Duration;

    fn scenario(name: &str) -> Scenario {
        Scenario::from_parts(
            name,
            format!("{}.bf", name),
            Vec::new(),
            Vec::<u8>::new(),
            TestOutput::default(),
        )
    }

    fn verdict(scenario: &Scenario, exit_code: i32) -> Verdict {
        Verdict::new(
            scenario,
            Execution {
                command: format!("bf {}.bf", scenario.name()),
                output: TestOutput::new("", "", Some(exit_code)),
                duration: Duration::ZERO,
                timed_out: None,
            },
        )
    }

    struct FailingSink;

    impl Sink for FailingSink {
        fn on_test_start(&mut self, _scenario: &Scenario) -> Result<()> {
            Err(Error::Internal("sink broke".to_string()))
        }
    }

    #[test]
    fn test_multiplexes_in_order() {
        let mut first = RecordingSink::default();
        let mut second = RecordingSink::default();
        let (a, b) = (scenario("a"), scenario("b"));

        {
            let mut multi = MultiSink::new();
            multi.add(&mut first).add(&mut second);
            assert_eq!(multi.len(), 2);

            multi.on_run_start(2).unwrap();
            multi.on_test_start(&a).unwrap();
            multi.on_test_ok(&a, &verdict(&a, 0)).unwrap();
            multi.on_test_start(&b).unwrap();
            multi.on_test_fail(&b, &verdict(&b, 1)).unwrap();
            multi.on_finish().unwrap();
        }

        assert_eq!(first.events, second.events);
        assert_eq!((first.ok, first.failed), (1, 1));
        assert_eq!((second.ok, second.failed), (1, 1));
        assert_eq!(first.events.last().map(String::as_str), Some("finish"));
    }

    #[test]
    fn test_default_methods_are_noops() {
        struct Silent;
        impl Sink for Silent {}

        let a = scenario("a");
        let mut silent = Silent;
        silent.on_run_start(1).unwrap();
        silent.on_test_start(&a).unwrap();
        silent.on_test_ok(&a, &verdict(&a, 0)).unwrap();
        silent.on_finish().unwrap();
    }

    #[test]
    fn test_error_stops_fan_out() {
        let mut after = RecordingSink::default();
        let a = scenario("a");
        {
            let mut multi = MultiSink::new();
            multi.add(FailingSink).add(&mut after);
            assert!(multi.on_test_start(&a).is_err());
        }
        assert!(after.events.is_empty());
    }
}
