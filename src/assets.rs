//! Scenario asset lookup
//!
//! A scenario is a directory under the assets root holding one solution
//! (or project) file that the build tool is pointed at.

use std::path::{Path, PathBuf};

use crate::common::config::AssetsConfig;
use crate::common::paths::is_plain_segment;
use crate::common::{Error, Result};

/// Name of the optional expectations file inside a scenario directory
pub const MANIFEST_FILE: &str = "scenario.yaml";

/// Locates scenarios and their solution files
#[derive(Debug, Clone)]
pub struct ScenarioAssets {
    root: PathBuf,
    solution_extensions: Vec<String>,
}

impl ScenarioAssets {
    /// Create a lookup over `root` with default solution extensions
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_config(&AssetsConfig {
            root: root.into(),
            ..AssetsConfig::default()
        })
    }

    pub fn from_config(config: &AssetsConfig) -> Self {
        Self {
            root: config.root.clone(),
            solution_extensions: config
                .solution_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
        }
    }

    /// The assets root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a scenario, validated to exist
    pub fn scenario_dir(&self, name: &str) -> Result<PathBuf> {
        if !is_plain_segment(name) {
            return Err(Error::InvalidScenario(name.to_string()));
        }

        let dir = self.root.join(name);
        if !dir.is_dir() {
            return Err(Error::scenario_not_found(
                name,
                format!("no directory at '{}'", dir.display()),
            ));
        }
        Ok(dir)
    }

    /// Absolute path of the scenario's solution file
    ///
    /// `<root>/<name>/<name>.<ext>` wins for the first extension that exists;
    /// otherwise the directory must hold exactly one solution candidate.
    pub fn solution_path(&self, name: &str) -> Result<PathBuf> {
        let dir = self.scenario_dir(name)?;

        let preferred = self
            .solution_extensions
            .iter()
            .map(|ext| dir.join(format!("{name}.{ext}")))
            .find(|path| path.is_file());

        let path = match preferred {
            Some(path) => path,
            None => {
                let mut candidates = self.solution_candidates(&dir)?;
                match candidates.len() {
                    1 => candidates.remove(0),
                    0 => {
                        return Err(Error::scenario_not_found(
                            name,
                            format!(
                                "no solution file ({}) in '{}'",
                                self.extension_list(),
                                dir.display()
                            ),
                        ))
                    }
                    n => {
                        return Err(Error::scenario_not_found(
                            name,
                            format!("{} solution files in '{}', expected one", n, dir.display()),
                        ))
                    }
                }
            }
        };

        let path = path.canonicalize()?;
        tracing::debug!("Scenario '{}' resolved to {}", name, path.display());
        Ok(path)
    }

    /// Path of the scenario's expectations manifest, if present
    pub fn manifest_path(&self, name: &str) -> Result<Option<PathBuf>> {
        let path = self.scenario_dir(name)?.join(MANIFEST_FILE);
        Ok(path.is_file().then_some(path))
    }

    /// Names of all scenario directories, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            Error::Config(format!(
                "Failed to read assets root '{}': {}",
                self.root.display(),
                e
            ))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn solution_candidates(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let matches = path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| {
                        self.solution_extensions
                            .iter()
                            .any(|want| want.eq_ignore_ascii_case(ext))
                    });
            if matches {
                found.push(path);
            }
        }
        found.sort();
        Ok(found)
    }

    fn extension_list(&self) -> String {
        self.solution_extensions
            .iter()
            .map(|ext| format!("*.{ext}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
