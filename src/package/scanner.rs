//! Artifact discovery
//!
//! Finds package archives under a directory and reads their manifests.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{nuspec, ArtifactSet, PackageDescriptor};
use crate::common::config::ArtifactsConfig;
use crate::common::{Error, Result};

/// Archive entries that belong to the packaging format, not the payload
const BOOKKEEPING_PREFIXES: &[&str] = &["_rels/", "package/"];
const CONTENT_TYPES: &str = "[Content_Types].xml";

/// Scans build output for package archives
#[derive(Debug, Clone)]
pub struct PackageScanner {
    extension: String,
    exclude_dirs: Vec<String>,
}

impl Default for PackageScanner {
    fn default() -> Self {
        Self::from_config(&ArtifactsConfig::default())
    }
}

impl PackageScanner {
    pub fn from_config(config: &ArtifactsConfig) -> Self {
        Self {
            extension: config.extension.trim_start_matches('.').to_string(),
            exclude_dirs: config.exclude_dirs.clone(),
        }
    }

    /// Describe every package archive under `directory`
    pub fn scan(&self, directory: &Path) -> Result<ArtifactSet> {
        let files = self.find_packages(directory)?;
        tracing::debug!(
            "Found {} package(s) under {}",
            files.len(),
            directory.display()
        );

        let packages = files
            .iter()
            .map(PathBuf::as_path)
            .map(read_package)
            .collect::<Result<Vec<_>>>()?;
        Ok(ArtifactSet::new(packages))
    }

    /// Package archive paths under `directory`, sorted
    ///
    /// Excluded directory names are skipped at any depth, as are symbol
    /// packages. Symlinked output folders are followed; a link cycle is an
    /// error.
    pub fn find_packages(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();

        for entry in WalkDir::new(directory)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !self.is_excluded(&e.file_name().to_string_lossy())
            })
        {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file()
                && self.is_package_name(&entry.file_name().to_string_lossy())
            {
                found.push(entry.into_path());
            }
        }

        found.sort();
        Ok(found)
    }

    fn is_excluded(&self, dir_name: &str) -> bool {
        self.exclude_dirs
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(dir_name))
    }

    fn is_package_name(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        let suffix = format!(".{}", self.extension.to_lowercase());
        lower.ends_with(&suffix) && !lower.ends_with(&format!(".symbols{suffix}"))
    }
}

/// Open one package archive and describe it
pub fn read_package(path: &Path) -> Result<PackageDescriptor> {
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| Error::package(path, e.to_string()))?;

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();

    let manifests: Vec<&String> = names
        .iter()
        .filter(|name| !name.contains('/') && name.to_lowercase().ends_with(".nuspec"))
        .collect();
    let manifest_name = match manifests.as_slice() {
        [single] => (*single).clone(),
        [] => return Err(Error::package(path, "no .nuspec manifest at archive root")),
        _ => {
            return Err(Error::package(
                path,
                format!("{} .nuspec manifests at archive root", manifests.len()),
            ))
        }
    };

    let mut xml = String::new();
    archive
        .by_name(&manifest_name)
        .map_err(|e| Error::package(path, e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| Error::package(path, format!("{manifest_name}: {e}")))?;

    let manifest = nuspec::parse(&xml)
        .map_err(|reason| Error::package(path, format!("{manifest_name}: {reason}")))?;

    let mut files: Vec<String> = names
        .into_iter()
        .filter(|name| is_payload_entry(name, &manifest_name))
        .map(|name| percent_decode(&name))
        .collect();
    files.sort();

    Ok(PackageDescriptor {
        id: manifest.id,
        version: manifest.version,
        authors: manifest.authors,
        description: manifest.description,
        dependencies: manifest.dependencies,
        files,
        path: path.to_path_buf(),
    })
}

fn is_payload_entry(name: &str, manifest_name: &str) -> bool {
    !name.ends_with('/')
        && name != manifest_name
        && name != CONTENT_TYPES
        && !BOOKKEEPING_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix))
}

/// Package part names are URI-escaped (`%20` for a space)
fn percent_decode(name: &str) -> String {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_package(path: &Path, id: &str, extra: &[&str]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();

        zip.start_file(format!("{id}.nuspec"), options).unwrap();
        write!(
            zip,
            "<package><metadata><id>{id}</id><version>1.0.0</version></metadata></package>"
        )
        .unwrap();
        zip.start_file(CONTENT_TYPES, options).unwrap();
        zip.start_file("_rels/.rels", options).unwrap();
        zip.start_file("package/services/metadata/core-properties/x.psmdcp", options)
            .unwrap();
        for entry in extra {
            zip.start_file(*entry, options).unwrap();
            zip.write_all(b"payload").unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_read_package_lists_payload_only() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("A.1.0.0.nupkg");
        write_package(&path, "A", &["lib/net45/A.dll", "content/read%20me.txt"]);

        let package = read_package(&path).unwrap();
        assert_eq!(package.id, "A");
        assert_eq!(package.version, "1.0.0");
        assert_eq!(package.files, vec!["content/read me.txt", "lib/net45/A.dll"]);
        assert_eq!(package.path, path);
    }

    #[test]
    fn test_scan_skips_restore_folder_and_symbols() {
        let tmp = tempfile::tempdir().unwrap();
        write_package(&tmp.path().join("B/bin/Debug/B.1.0.0.nupkg"), "B", &[]);
        write_package(&tmp.path().join("A/bin/Debug/A.1.0.0.nupkg"), "A", &[]);
        write_package(&tmp.path().join("A/bin/Debug/A.1.0.0.symbols.nupkg"), "A", &[]);
        write_package(&tmp.path().join("packages/Dep.2.0.0/Dep.2.0.0.nupkg"), "Dep", &[]);

        let set = PackageScanner::default().scan(tmp.path()).unwrap();
        assert_eq!(set.ids(), vec!["A", "B"]);
    }

    #[test]
    fn test_scan_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let set = PackageScanner::default().scan(tmp.path()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_corrupt_archive_names_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Broken.nupkg");
        std::fs::write(&path, b"not a zip").unwrap();

        let err = PackageScanner::default().scan(tmp.path()).unwrap_err();
        assert!(matches!(err, Error::Package { .. }));
        assert!(err.to_string().contains("Broken.nupkg"));
    }

    #[test]
    fn test_archive_without_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Empty.nupkg");
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("lib/a.dll", SimpleFileOptions::default())
            .unwrap();
        zip.finish().unwrap();

        let err = read_package(&path).unwrap_err();
        assert!(err.to_string().contains("no .nuspec manifest"));
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("a%20b"), "a b");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("%+1"), "%+1");
        assert_eq!(percent_decode("a%2Bb"), "a+b");
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_follows_symlinked_output_folder() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("out");
        write_package(&output.join("A.1.0.0.nupkg"), "A", &[]);
        let scenario = tmp.path().join("Scenario");
        std::fs::create_dir_all(&scenario).unwrap();
        std::os::unix::fs::symlink(&output, scenario.join("bin")).unwrap();

        let found = PackageScanner::default().find_packages(&scenario).unwrap();
        assert_eq!(found, vec![scenario.join("bin/A.1.0.0.nupkg")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_excludes_symlinked_restore_folder() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = tmp.path().join("cache");
        write_package(&cache.join("Dep.2.0.0/Dep.2.0.0.nupkg"), "Dep", &[]);
        let scenario = tmp.path().join("Scenario");
        std::fs::create_dir_all(&scenario).unwrap();
        std::os::unix::fs::symlink(&cache, scenario.join("packages")).unwrap();

        let found = PackageScanner::default().find_packages(&scenario).unwrap();
        assert!(found.is_empty());
    }
}
