//! Configuration file handling

use serde::Deserialize;
use std::path::Path;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Scenario discovery and execution settings
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Console and artifact output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// JUnit report settings
    #[serde(default)]
    pub junit: JunitConfig,
}

/// Scenario discovery and execution settings
#[derive(Debug, Deserialize)]
pub struct RunnerConfig {
    /// Extension (without the dot) identifying scenario scripts
    #[serde(default = "default_script_extension")]
    pub script_extension: String,

    /// Per-scenario timeout; 0 disables it
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Discover scenarios in sorted order
    #[serde(default = "default_true")]
    pub sort: bool,

    /// Keep running after the first failing scenario
    #[serde(default)]
    pub ignore_failures: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            script_extension: default_script_extension(),
            timeout_secs: default_timeout(),
            sort: true,
            ignore_failures: false,
        }
    }
}

fn default_script_extension() -> String {
    "bf".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// How a failing scenario's exit code is written to the artifact directory
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExitCodeFormat {
    /// 4-byte native-endian integer, readable by older tooling
    #[default]
    Binary,
    /// Decimal text followed by a newline
    Text,
}

/// Console and artifact output settings
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Colorize console output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Encoding of `.exitcode` failure artifacts
    #[serde(default)]
    pub exit_code_format: ExitCodeFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            exit_code_format: ExitCodeFormat::default(),
        }
    }
}

/// JUnit report settings
#[derive(Debug, Deserialize)]
pub struct JunitConfig {
    /// Name of the `<testsuites>` element
    #[serde(default = "default_report_name")]
    pub report_name: String,

    /// Name of the single `<testsuite>` element
    #[serde(default = "default_suite_name")]
    pub suite_name: String,
}

impl Default for JunitConfig {
    fn default() -> Self {
        Self {
            report_name: default_report_name(),
            suite_name: default_suite_name(),
        }
    }
}

fn default_report_name() -> String {
    "regress".to_string()
}

fn default_suite_name() -> String {
    "regression".to_string()
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that TOML types alone cannot constrain
    pub fn validate(&self) -> Result<()> {
        let ext = &self.runner.script_extension;
        if ext.is_empty() || ext.contains(['.', '/', '\\']) {
            return Err(super::Error::Config(format!(
                "script_extension must be a bare extension such as \"bf\", got \"{}\"",
                ext
            )));
        }
        Ok(())
    }
}
