//! Shared fixtures for scenario integration tests

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scenario::assets::ScenarioAssets;
use scenario::common::logging;
use scenario::package::PackageScanner;
use scenario::{BuildBackend, BuildOutcome, Error, Properties, Result, ScenarioRunner};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// A recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Restore(PathBuf),
    Rebuild {
        project: PathBuf,
        target: Option<String>,
        properties: Properties,
    },
}

/// Backend standing in for restore and build tools
///
/// A successful rebuild writes one package archive per configured id into
/// `<project dir>/<id>/bin/Debug/`, or only the targeted one when a target
/// matches an id.
#[derive(Default)]
pub struct FakeBackend {
    restore_error: Option<String>,
    build_errors: Option<String>,
    packages: Vec<String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    pub fn producing(ids: &[&str]) -> Self {
        Self {
            packages: ids.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_build(log: &str) -> Self {
        Self {
            build_errors: Some(log.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_restore(log: &str) -> Self {
        Self {
            restore_error: Some(log.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BuildBackend for FakeBackend {
    async fn restore(&self, directory: &Path) -> Result<()> {
        self.record(Call::Restore(directory.to_path_buf()));
        match &self.restore_error {
            Some(log) => Err(Error::RestoreFailed {
                directory: directory.to_path_buf(),
                diagnostics: log.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn rebuild(
        &self,
        project: &Path,
        target: Option<&str>,
        properties: &Properties,
    ) -> Result<BuildOutcome> {
        self.record(Call::Rebuild {
            project: project.to_path_buf(),
            target: target.map(String::from),
            properties: properties.clone(),
        });

        if let Some(log) = &self.build_errors {
            return Ok(BuildOutcome::failed(Some(1), log.clone()));
        }

        let dir = project.parent().unwrap();
        let targeted: Vec<&String> = match target {
            Some(t) if self.packages.iter().any(|id| id.eq_ignore_ascii_case(t)) => self
                .packages
                .iter()
                .filter(|id| id.eq_ignore_ascii_case(t))
                .collect(),
            _ => self.packages.iter().collect(),
        };
        let version = properties
            .get("Version")
            .map(String::as_str)
            .unwrap_or("1.0.0");
        for id in targeted {
            let path = dir
                .join(id)
                .join("bin/Debug")
                .join(format!("{id}.{version}.nupkg"));
            write_package(&path, id, version, &[&format!("lib/net45/{id}.dll")]);
        }

        Ok(BuildOutcome::succeeded("Build succeeded."))
    }
}

/// Write a minimal package archive
pub fn write_package(path: &Path, id: &str, version: &str, files: &[&str]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();

    zip.start_file(format!("{id}.nuspec"), options).unwrap();
    write!(
        zip,
        r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd">
  <metadata>
    <id>{id}</id>
    <version>{version}</version>
    <authors>Contoso</authors>
    <description>Test package {id}</description>
  </metadata>
</package>"#
    )
    .unwrap();
    zip.start_file("[Content_Types].xml", options).unwrap();
    for file in files {
        zip.start_file(*file, options).unwrap();
        zip.write_all(b"payload").unwrap();
    }
    zip.finish().unwrap();
}

/// Temporary assets root with scenario directories
pub struct TestContext {
    temp: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        logging::init_test();
        Self {
            temp: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Create `<root>/<name>/<name>.sln` and return the scenario directory
    pub fn add_scenario(&self, name: &str) -> PathBuf {
        let dir = self.root().join(name);
        fs::create_dir_all(&dir).expect("Failed to create scenario dir");
        fs::write(dir.join(format!("{name}.sln")), "").expect("Failed to write solution");
        dir.canonicalize().unwrap()
    }

    pub fn runner(&self, backend: Arc<FakeBackend>) -> ScenarioRunner<Arc<FakeBackend>> {
        ScenarioRunner::new(
            ScenarioAssets::new(self.root()),
            backend,
            PackageScanner::default(),
        )
    }
}
