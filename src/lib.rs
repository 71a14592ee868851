//! Scenario harness - packaging build scenarios for integration tests
//!
//! Resolves a named scenario, restores its dependencies, rebuilds it with an
//! external build tool, asserts the outcome and returns the packages it
//! produced.

pub mod assets;
pub mod backend;
pub mod check;
pub mod cli;
pub mod commands;
pub mod common;
pub mod package;
pub mod runner;

// Re-export commonly used types for tests
pub use backend::{BuildBackend, BuildOutcome, Properties};
pub use common::{Error, ErrorKind, Result, SelectionError};
pub use package::{ArtifactSet, PackageDescriptor};
pub use runner::{ScenarioRequest, ScenarioRunner};
