//! CLI command handling
//!
//! Turns parsed arguments and the configuration file into a finder, an
//! executor and a set of sinks, then runs the suite.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use crate::commands::Args;
use crate::common::config::{Config, ExitCodeFormat};
use crate::common::Result;
use crate::report::{ArtifactSink, ConsoleSink, JunitSink, MultiSink};
use crate::testing::{sidecar_path, RunSummary, Runner, Scenario, ScenarioFinder, SubprocessExecutor};

/// Effective settings: config file values with CLI flags applied on top
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub extension: String,
    pub timeout: Option<Duration>,
    pub sort: bool,
    pub ignore_failures: bool,
    pub color: bool,
    pub exit_code_format: ExitCodeFormat,
    pub report_name: String,
    pub suite_name: String,
}

impl Settings {
    pub fn resolve(args: &Args, mut config: Config) -> Result<Self> {
        if let Some(ext) = &args.ext {
            config.runner.script_extension = ext.clone();
        }
        if let Some(secs) = args.timeout {
            config.runner.timeout_secs = secs;
        }
        config.validate()?;

        let runner = config.runner;
        Ok(Self {
            extension: runner.script_extension,
            timeout: (runner.timeout_secs > 0).then(|| Duration::from_secs(runner.timeout_secs)),
            sort: runner.sort && !args.no_sort,
            ignore_failures: runner.ignore_failures || args.ignore_failures,
            color: config.output.color && !args.no_color,
            exit_code_format: config.output.exit_code_format,
            report_name: config.junit.report_name,
            suite_name: config.junit.suite_name,
        })
    }
}

/// Run the command line; `Ok(true)` when every executed scenario passed
pub async fn run(args: Args) -> Result<bool> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let settings = Settings::resolve(&args, config)?;
    tracing::debug!("Effective settings: {:?}", settings);

    let scenarios = ScenarioFinder::new(args.test_dirs.clone(), settings.extension.as_str())
        .sorted(settings.sort)
        .find_all()?;

    if args.list {
        print_listing(&scenarios);
        return Ok(true);
    }

    let executor = SubprocessExecutor::new(&args.exe, settings.timeout)?;

    let use_color = settings.color && std::io::stdout().is_terminal();
    colored::control::set_override(use_color);

    let mut sinks = MultiSink::new();
    sinks.add(ConsoleSink::stdout(use_color));
    if let Some(dir) = &args.outdir {
        sinks.add(ArtifactSink::new(dir, settings.exit_code_format));
    }
    if let Some(path) = &args.junit {
        sinks.add(JunitSink::new(
            path,
            settings.report_name.as_str(),
            settings.suite_name.as_str(),
        ));
    }

    let summary: RunSummary = Runner::new(&executor, scenarios, sinks)
        .ignore_failures(settings.ignore_failures)
        .run()
        .await?;

    if summary.executed() < summary.total {
        tracing::info!(
            "{} scenario(s) not run after the first failure; use --ignore-failures to run all",
            summary.total - summary.executed()
        );
    }
    Ok(summary.success())
}

fn print_listing(scenarios: &[Scenario]) {
    println!("Found {} regression tests", scenarios.len());
    for scenario in scenarios {
        println!("  {}", describe(scenario));
    }
}

/// One-line summary of a scenario and the sidecars it has
fn describe(scenario: &Scenario) -> String {
    let script = scenario.path();
    let mut expects: Vec<&str> = ["stdout", "stderr"]
        .into_iter()
        .filter(|ext| has_sidecar(script, ext))
        .collect();
    if scenario.expected().exit_code.is_some() {
        expects.push("exit code");
    }

    let mut line = format!("{} (args: {}", scenario.name(), scenario.args().len());
    if has_sidecar(script, "stdin") {
        line.push_str(", stdin");
    }
    line.push(')');
    if !expects.is_empty() {
        line.push_str(&format!(" expects {}", expects.join(", ")));
    }
    line
}

fn has_sidecar(script: &Path, extension: &str) -> bool {
    sidecar_path(script, extension).is_file()
}
