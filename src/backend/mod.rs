//! Build backends
//!
//! The runner only sequences restore and rebuild; how those happen is behind
//! the [`BuildBackend`] trait so tests can substitute a fake.

mod outcome;
mod process;

pub use outcome::BuildOutcome;
pub use process::{rebuild_args, ProcessBackend, Tool};

use crate::common::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;

/// Build properties passed to the build tool, ordered by key
pub type Properties = BTreeMap<String, String>;

/// Trait for the external tooling a scenario run depends on
#[async_trait]
pub trait BuildBackend: Send + Sync {
    /// Restore dependencies for every project under `directory`
    ///
    /// Fails with `Error::RestoreFailed` carrying the tool output.
    async fn restore(&self, directory: &Path) -> Result<()>;

    /// Clean rebuild of `project`, optionally limited to one target
    ///
    /// A build that runs and fails is an `Ok` outcome with `success == false`;
    /// `Err` is reserved for not being able to run the build at all.
    async fn rebuild(
        &self,
        project: &Path,
        target: Option<&str>,
        properties: &Properties,
    ) -> Result<BuildOutcome>;
}

#[async_trait]
impl<B: BuildBackend + ?Sized> BuildBackend for std::sync::Arc<B> {
    async fn restore(&self, directory: &Path) -> Result<()> {
        (**self).restore(directory).await
    }

    async fn rebuild(
        &self,
        project: &Path,
        target: Option<&str>,
        properties: &Properties,
    ) -> Result<BuildOutcome> {
        (**self).rebuild(project, target, properties).await
    }
}
