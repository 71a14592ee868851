//! Built package artifacts
//!
//! After a successful build the scenario directory is scanned for package
//! archives; each one is opened and described by its manifest.

mod nuspec;
mod scanner;

pub use nuspec::Manifest;
pub use scanner::{read_package, PackageScanner};

use serde::Serialize;
use std::path::PathBuf;

use crate::common::SelectionError;

/// A dependency declared in a package manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDependency {
    pub id: String,
    /// Version range as written in the manifest
    pub version: Option<String>,
    /// Framework group the dependency belongs to, if grouped
    pub target_framework: Option<String>,
}

/// Metadata describing one built package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    pub id: String,
    pub version: String,
    pub authors: Option<String>,
    pub description: Option<String>,
    pub dependencies: Vec<PackageDependency>,
    /// Payload entries, excluding packaging bookkeeping and the manifest
    pub files: Vec<String>,
    /// Location of the package archive
    pub path: PathBuf,
}

impl PackageDescriptor {
    /// Case-insensitive identifier comparison
    pub fn has_id(&self, id: &str) -> bool {
        self.id.to_lowercase() == id.to_lowercase()
    }

    /// Whether the package carries a payload entry at `file`
    pub fn contains_file(&self, file: &str) -> bool {
        let file = file.replace('\\', "/");
        self.files.iter().any(|f| f.eq_ignore_ascii_case(&file))
    }
}

/// Packages produced by one build, ordered by archive path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArtifactSet {
    packages: Vec<PackageDescriptor>,
}

impl ArtifactSet {
    pub fn new(mut packages: Vec<PackageDescriptor>) -> Self {
        packages.sort_by(|a, b| a.path.cmp(&b.path));
        Self { packages }
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PackageDescriptor> {
        self.packages.iter()
    }

    /// Package identifiers in set order
    pub fn ids(&self) -> Vec<&str> {
        self.packages.iter().map(|p| p.id.as_str()).collect()
    }

    /// First package whose identifier matches, ignoring case
    pub fn find(&self, id: &str) -> Option<&PackageDescriptor> {
        self.packages.iter().find(|p| p.has_id(id))
    }

    /// Pick exactly one package
    ///
    /// Without an id the set itself must hold exactly one package; with an id
    /// exactly one package must match it case-insensitively.
    pub fn select(self, id: Option<&str>) -> Result<PackageDescriptor, SelectionError> {
        let mut packages = self.packages;

        let Some(id) = id else {
            return match packages.len() {
                0 => Err(SelectionError::Empty),
                1 => Ok(packages.remove(0)),
                count => Err(SelectionError::Ambiguous {
                    count,
                    ids: ids_of(&packages),
                }),
            };
        };

        let available = ids_of(&packages);
        let mut matching: Vec<_> = packages.into_iter().filter(|p| p.has_id(id)).collect();
        match matching.len() {
            0 => Err(SelectionError::NotFound {
                id: id.to_string(),
                available,
            }),
            1 => Ok(matching.remove(0)),
            count => Err(SelectionError::AmbiguousId {
                id: id.to_string(),
                count,
            }),
        }
    }

    pub fn into_vec(self) -> Vec<PackageDescriptor> {
        self.packages
    }
}

fn ids_of(packages: &[PackageDescriptor]) -> Vec<String> {
    packages.iter().map(|p| p.id.clone()).collect()
}

impl IntoIterator for ArtifactSet {
    type Item = PackageDescriptor;
    type IntoIter = std::vec::IntoIter<PackageDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.into_iter()
    }
}

impl<'a> IntoIterator for &'a ArtifactSet {
    type Item = &'a PackageDescriptor;
    type IntoIter = std::slice::Iter<'a, PackageDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.iter()
    }
}
