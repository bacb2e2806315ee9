//! CLI argument definitions
//!
//! Defines the clap arguments for the regress CLI. Flags left unset fall
//! back to the configuration file.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "regress", about = "Regression test runner for script interpreters")]
#[command(version, long_about = None)]
pub struct Args {
    /// Program under test, invoked as `<PROGRAM> <script> <args...>`
    #[arg(short = 'e', long = "exe", value_name = "PROGRAM")]
    pub exe: PathBuf,

    /// Directories containing scenario scripts
    #[arg(value_name = "TEST_DIR", required = true)]
    pub test_dirs: Vec<PathBuf>,

    /// Log sidecar discovery and every invocation
    #[arg(short, long)]
    pub verbose: bool,

    /// Write the actual output of failing scenarios here
    #[arg(short, long, value_name = "DIR")]
    pub outdir: Option<PathBuf>,

    /// Write a JUnit XML report to this file
    #[arg(long, value_name = "FILE")]
    pub junit: Option<PathBuf>,

    /// Keep running after a scenario fails
    #[arg(long)]
    pub ignore_failures: bool,

    /// Disable colored console output
    #[arg(long)]
    pub no_color: bool,

    /// Per-scenario timeout in seconds (0 disables it)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Extension of scenario scripts, without the dot
    #[arg(long, value_name = "EXT")]
    pub ext: Option<String>,

    /// Run scenarios in directory order instead of sorting them
    #[arg(long)]
    pub no_sort: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// List discovered scenarios without running them
    #[arg(long)]
    pub list: bool,
}
