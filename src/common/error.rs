//! Error types for the scenario harness
//!
//! Every workflow failure carries the diagnostics of the tool that produced
//! it, so a failing test shows the restore or build log directly.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scenario harness
#[derive(Error, Debug)]
pub enum Error {
    // === Resolution Errors ===
    #[error("Scenario '{name}' not found: {reason}")]
    ScenarioNotFound { name: String, reason: String },

    #[error("Invalid scenario name '{0}'")]
    InvalidScenario(String),

    // === Restore Errors ===
    #[error("Package restore failed in '{}':\n{diagnostics}", directory.display())]
    RestoreFailed {
        directory: PathBuf,
        diagnostics: String,
    },

    // === Build Errors ===
    #[error("Build of '{}' failed:\n{diagnostics}", project.display())]
    BuildFailed { project: PathBuf, diagnostics: String },

    #[error("Build of '{}' succeeded but was expected to fail", project.display())]
    UnexpectedBuildSuccess { project: PathBuf },

    #[error("Build succeeded but no packages were produced under '{}'", directory.display())]
    NoPackagesProduced { directory: PathBuf },

    // === Selection Errors ===
    #[error(transparent)]
    Selection(#[from] SelectionError),

    // === Tool Errors ===
    #[error("Build tool '{name}' not found. Searched: {searched}")]
    ToolNotFound { name: String, searched: String },

    #[error("Failed to run '{}': {error}", program.display())]
    ToolSpawn {
        program: PathBuf,
        #[source]
        error: io::Error,
    },

    // === Package Errors ===
    #[error("Invalid package '{}': {reason}", path.display())]
    Package { path: PathBuf, reason: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid scenario manifest '{}': {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    // === Check Errors ===
    #[error("{failed} of {total} scenario check(s) failed")]
    ChecksFailed { failed: usize, total: usize },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure to pick exactly one package out of a build's artifacts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Expected exactly one package, but the build produced none")]
    Empty,

    #[error("Expected exactly one package, but the build produced {count}: {}", ids.join(", "))]
    Ambiguous { count: usize, ids: Vec<String> },

    #[error("Package '{id}' not found. Available: {}", available.join(", "))]
    NotFound { id: String, available: Vec<String> },

    #[error("Package id '{id}' matched {count} packages")]
    AmbiguousId { id: String, count: usize },
}

/// Coarse error category, one per workflow step that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The scenario name does not map to a solution
    Resolution,
    /// Dependency restore failed
    Restore,
    /// The build outcome contradicted the expectation
    Build,
    /// Exactly-one package selection failed
    Selection,
    /// Tooling, configuration or IO problems outside the workflow contract
    Other,
}

impl Error {
    /// Create a scenario not found error
    pub fn scenario_not_found(name: &str, reason: impl Into<String>) -> Self {
        Self::ScenarioNotFound {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a tool not found error with the searched candidates
    pub fn tool_not_found<S: AsRef<str>>(name: &str, candidates: &[S]) -> Self {
        Self::ToolNotFound {
            name: name.to_string(),
            searched: candidates
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Create an invalid package error
    pub fn package(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Package {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Which workflow step this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ScenarioNotFound { .. } | Error::InvalidScenario(_) => ErrorKind::Resolution,
            Error::RestoreFailed { .. } => ErrorKind::Restore,
            Error::BuildFailed { .. }
            | Error::UnexpectedBuildSuccess { .. }
            | Error::NoPackagesProduced { .. } => ErrorKind::Build,
            Error::Selection(_) => ErrorKind::Selection,
            _ => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            Error::scenario_not_found("Missing", "no directory").kind(),
            ErrorKind::Resolution
        );
        assert_eq!(
            Error::UnexpectedBuildSuccess {
                project: PathBuf::from("a.sln")
            }
            .kind(),
            ErrorKind::Build
        );
        assert_eq!(Error::from(SelectionError::Empty).kind(), ErrorKind::Selection);
        assert_eq!(Error::Config("bad".into()).kind(), ErrorKind::Other);
    }

    #[test]
    fn test_selection_messages_list_candidates() {
        let err = SelectionError::NotFound {
            id: "C".to_string(),
            available: vec!["A".to_string(), "B".to_string()],
        };
        assert_eq!(err.to_string(), "Package 'C' not found. Available: A, B");
    }
}
