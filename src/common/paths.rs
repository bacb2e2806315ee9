//! Configuration paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/regress/`
//! - macOS: `~/Library/Application Support/regress/`
//! - Windows: `%APPDATA%\regress\`

use std::path::{Path, PathBuf};

/// Application name used for platform directories
const APP_NAME: &str = "regress";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Directory name used as the JUnit classname of scenarios found in `dir`
pub fn dir_label(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_toml() {
        if let Some(path) = config_path() {
            assert_eq!(path.file_name().unwrap(), "config.toml");
        }
    }

    #[test]
    fn test_dir_label() {
        assert_eq!(dir_label(Path::new("tests/regression")), "regression");
        assert_eq!(dir_label(Path::new("/")), "/");
    }
}
