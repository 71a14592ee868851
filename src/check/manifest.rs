//! Scenario manifest types
//!
//! Defines the data structures for deserializing `scenario.yaml`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::common::{Error, Result};
use crate::runner::ScenarioRequest;

/// Expectations for one scenario
#[derive(Deserialize, Debug, Default)]
pub struct ScenarioManifest {
    /// Optional description of what the scenario covers
    pub description: Option<String>,
    /// Project of the solution to build; all projects when absent
    pub target: Option<String>,
    /// Build properties passed to the build tool
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// What the build should produce
    #[serde(default)]
    pub expect: Expectation,
}

/// Expected build result
#[derive(Deserialize, Debug)]
pub struct Expectation {
    /// Whether the build should succeed (default: true)
    #[serde(default = "default_success")]
    pub success: bool,
    /// Package ids the build should produce, compared ignoring case and order
    pub packages: Option<Vec<String>>,
}

impl Default for Expectation {
    fn default() -> Self {
        Self {
            success: default_success(),
            packages: None,
        }
    }
}

fn default_success() -> bool {
    true
}

impl ScenarioManifest {
    /// Load a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content).map_err(|reason| Error::Manifest {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let manifest: Self = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        if !manifest.expect.success && manifest.expect.packages.is_some() {
            return Err("'expect.packages' cannot be combined with 'success: false'".to_string());
        }
        Ok(manifest)
    }

    /// The request this manifest describes for scenario `name`
    pub fn request(&self, name: &str) -> ScenarioRequest {
        let request = ScenarioRequest::new(name).with_properties(self.properties.clone());
        match &self.target {
            Some(target) => request.with_target(target.clone()),
            None => request,
        }
    }
}
