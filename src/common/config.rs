//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::{config_path, DEFAULT_ASSETS_ROOT};
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Where scenarios live and how their solutions are named
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Dependency restore tool
    #[serde(default = "default_restore")]
    pub restore: ToolConfig,

    /// Build tool
    #[serde(default = "default_build")]
    pub build: ToolConfig,

    /// Artifact discovery settings
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assets: AssetsConfig::default(),
            restore: default_restore(),
            build: default_build(),
            artifacts: ArtifactsConfig::default(),
        }
    }
}

/// Scenario asset settings
#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    /// Directory holding one subdirectory per scenario
    #[serde(default = "default_assets_root")]
    pub root: PathBuf,

    /// Solution file extensions, in order of preference
    #[serde(default = "default_solution_extensions")]
    pub solution_extensions: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: default_assets_root(),
            solution_extensions: default_solution_extensions(),
        }
    }
}

fn default_assets_root() -> PathBuf {
    PathBuf::from(DEFAULT_ASSETS_ROOT)
}

fn default_solution_extensions() -> Vec<String> {
    vec!["sln".to_string(), "nuproj".to_string()]
}

/// Configuration for an external tool
#[derive(Debug, Deserialize, Clone)]
pub struct ToolConfig {
    /// Explicit path to the executable; searched on PATH when absent
    pub program: Option<PathBuf>,

    /// Program names to search on PATH, in order
    #[serde(default)]
    pub candidates: Vec<String>,

    /// Arguments passed before the per-invocation ones
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_restore() -> ToolConfig {
    ToolConfig {
        program: None,
        candidates: vec!["nuget".to_string()],
        args: vec!["restore".to_string(), "-NonInteractive".to_string()],
    }
}

fn default_build() -> ToolConfig {
    ToolConfig {
        program: None,
        candidates: vec!["msbuild".to_string(), "xbuild".to_string()],
        args: vec!["/nologo".to_string(), "/v:minimal".to_string()],
    }
}

/// Artifact discovery settings
#[derive(Debug, Deserialize, Clone)]
pub struct ArtifactsConfig {
    /// Package file extension
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Directory names skipped while scanning (restore output, for one)
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

fn default_extension() -> String {
    "nupkg".to_string()
}

fn default_exclude_dirs() -> Vec<String> {
    vec!["packages".to_string()]
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

    /// Load configuration from an explicit file
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

    fn validate(&self) -> Result<()> {
        if self.assets.solution_extensions.is_empty() {
            return Err(super::Error::Config(
                "assets.solution_extensions must not be empty".to_string(),
            ));
        }
        if self.artifacts.extension.trim_start_matches('.').is_empty() {
            return Err(super::Error::Config(
                "artifacts.extension must not be empty".to_string(),
            ));
        }
        for (name, tool) in [("restore", &self.restore), ("build", &self.build)] {
            if tool.program.is_none() && tool.candidates.is_empty() {
                return Err(super::Error::Config(format!(
                    "{name}: either 'program' or 'candidates' is required"
                )));
            }
        }
        Ok(())
    }
}
