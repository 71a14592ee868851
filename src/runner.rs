//! Scenario runner
//!
//! Drives one scenario through resolve → restore → rebuild → assert →
//! collect. Every step awaits the previous one and the first failure aborts
//! the run.
//!
//! Two runs against the same scenario directory at once are not supported;
//! the restore and build tools would race on the same output folders.

use std::path::{Path, PathBuf};

use crate::assets::ScenarioAssets;
use crate::backend::{BuildBackend, Properties, ProcessBackend};
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::package::{ArtifactSet, PackageDescriptor, PackageScanner};

/// Name of the function this macro is expanded in
///
/// Async test bodies show up as `{{closure}}`-style frames; those are
/// skipped, so inside `#[tokio::test] async fn single_project()` this yields
/// `"single_project"`. Use it as an explicit default scenario name:
///
/// ```
/// use scenario::{scenario_name, ScenarioRequest};
///
/// fn single_project() -> ScenarioRequest {
///     ScenarioRequest::new(scenario_name!())
/// }
///
/// assert_eq!(single_project().scenario(), "single_project");
/// ```
#[macro_export]
macro_rules! scenario_name {
    () => {{
        fn here() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::runner::enclosing_fn_name(type_name_of(here))
    }};
}

/// Strip the helper and closure frames from a `type_name` path
#[doc(hidden)]
pub fn enclosing_fn_name(path: &'static str) -> &'static str {
    let path = path.strip_suffix("::here").unwrap_or(path);
    path.rsplit("::")
        .find(|segment| !(segment.starts_with("{{") && segment.ends_with("}}")))
        .unwrap_or(path)
}

/// One scenario invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioRequest {
    scenario: String,
    target: Option<String>,
    properties: Properties,
}

impl ScenarioRequest {
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            target: None,
            properties: Properties::new(),
        }
    }

    /// Build only this project of the solution
    ///
    /// For [`ScenarioRunner::run_single`] the target also selects the
    /// package to return.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Pass a build property; a repeated key keeps the last value
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.properties
            .extend(properties.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// Restores, builds and inspects scenarios through a [`BuildBackend`]
#[derive(Debug, Clone)]
pub struct ScenarioRunner<B> {
    assets: ScenarioAssets,
    backend: B,
    scanner: PackageScanner,
}

impl ScenarioRunner<ProcessBackend> {
    /// Runner using the configured tools on this machine
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            ScenarioAssets::from_config(&config.assets),
            ProcessBackend::from_config(config)?,
            PackageScanner::from_config(&config.artifacts),
        ))
    }
}

impl<B: BuildBackend> ScenarioRunner<B> {
    pub fn new(assets: ScenarioAssets, backend: B, scanner: PackageScanner) -> Self {
        Self {
            assets,
            backend,
            scanner,
        }
    }

    pub fn assets(&self) -> &ScenarioAssets {
        &self.assets
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Build the scenario and return exactly one package
    ///
    /// With no target the build must produce a single package; with a target
    /// exactly one package must carry that id, ignoring case.
    pub async fn run_single(&self, request: &ScenarioRequest) -> Result<PackageDescriptor> {
        let packages = self.run_many(request).await?;
        let package = packages.select(request.target())?;
        tracing::info!(
            "Scenario '{}' produced {} {}",
            request.scenario(),
            package.id,
            package.version
        );
        Ok(package)
    }

    /// Build the scenario and return every package it produced
    pub async fn run_many(&self, request: &ScenarioRequest) -> Result<ArtifactSet> {
        let (project, directory) = self.restore_and_locate(request).await?;

        let outcome = self
            .backend
            .rebuild(&project, request.target(), request.properties())
            .await?;
        outcome.assert_successful_build(&project)?;

        let packages = self.scanner.scan(&directory)?;
        if packages.is_empty() {
            return Err(Error::NoPackagesProduced { directory });
        }

        tracing::info!(
            "Scenario '{}' built {} package(s): {}",
            request.scenario(),
            packages.len(),
            packages.ids().join(", ")
        );
        Ok(packages)
    }

    /// Build the scenario and require the build to fail
    pub async fn run_and_expect_failure(&self, request: &ScenarioRequest) -> Result<()> {
        let (project, _) = self.restore_and_locate(request).await?;

        let outcome = self
            .backend
            .rebuild(&project, request.target(), request.properties())
            .await?;
        outcome.assert_unsuccessful_build(&project)?;

        tracing::info!(
            "Scenario '{}' failed to build, as expected ({} error(s))",
            request.scenario(),
            outcome.errors().len()
        );
        Ok(())
    }

    /// Resolve the solution and restore its directory
    async fn restore_and_locate(&self, request: &ScenarioRequest) -> Result<(PathBuf, PathBuf)> {
        let project = self.assets.solution_path(request.scenario())?;
        let directory = project
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::Internal(format!("'{}' has no parent", project.display())))?;

        tracing::debug!("Restoring packages in {}", directory.display());
        self.backend.restore(&directory).await?;

        tracing::debug!(
            "Rebuilding {} (target: {})",
            project.display(),
            request.target().unwrap_or("all")
        );
        Ok((project, directory))
    }
}
