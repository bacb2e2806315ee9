//! Scenario discovery

use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

use super::scenario::Scenario;

/// Locates scenario scripts in a set of directories
#[derive(Debug, Clone)]
pub struct ScenarioFinder {
    dirs: Vec<PathBuf>,
    extension: String,
    sorted: bool,
}

impl ScenarioFinder {
    /// Find scripts with `extension` (no leading dot) in each of `dirs`
    pub fn new(dirs: Vec<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dirs,
            extension: extension.into(),
            sorted: false,
        }
    }

    /// Visit directories, and the scripts in each, in sorted order
    ///
    /// Needed for reports that are byte-identical across runs.
    pub fn sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    /// Discover and load every scenario
    pub fn find_all(&self) -> Result<Vec<Scenario>> {
        if let Some(missing) = self.dirs.iter().find(|d| !d.is_dir()) {
            return Err(Error::TestDirNotFound(missing.clone()));
        }

        let mut dirs: Vec<&PathBuf> = self.dirs.iter().collect();
        if self.sorted {
            dirs.sort();
        }

        let mut scenarios = Vec::new();
        for dir in dirs {
            let scripts = self.scripts_in(dir)?;
            tracing::debug!("Found {} scenario(s) in {}", scripts.len(), dir.display());
            for script in scripts {
                scenarios.push(Scenario::load(&script)?);
            }
        }

        Ok(scenarios)
    }

    fn scripts_in(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut scripts = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let matches = path
                .extension()
                .is_some_and(|ext| ext == self.extension.as_str());
            if matches && path.is_file() {
                scripts.push(path);
            }
        }

        if self.sorted {
            scripts.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        }
        Ok(scripts)
    }
}
