//! Package manifest (`.nuspec`) parsing

use serde::Deserialize;

use super::PackageDependency;

/// The parts of `<package><metadata>` the harness reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub authors: Option<String>,
    pub description: Option<String>,
    pub dependencies: Vec<PackageDependency>,
}

#[derive(Deserialize)]
struct Document {
    metadata: Metadata,
}

#[derive(Deserialize)]
struct Metadata {
    id: String,
    version: String,
    authors: Option<String>,
    description: Option<String>,
    dependencies: Option<DependencyList>,
}

/// `<dependencies>` holds either bare `<dependency>` entries or
/// `<group targetFramework="...">` blocks of them
#[derive(Deserialize, Default)]
struct DependencyList {
    #[serde(rename = "dependency", default)]
    direct: Vec<DependencyEntry>,
    #[serde(rename = "group", default)]
    groups: Vec<DependencyGroup>,
}

#[derive(Deserialize)]
struct DependencyGroup {
    #[serde(rename = "@targetFramework")]
    target_framework: Option<String>,
    #[serde(rename = "dependency", default)]
    dependencies: Vec<DependencyEntry>,
}

#[derive(Deserialize)]
struct DependencyEntry {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@version")]
    version: Option<String>,
}

/// Parse manifest XML
pub fn parse(xml: &str) -> Result<Manifest, String> {
    let xml = xml.trim_start_matches('\u{feff}');
    let document: Document = quick_xml::de::from_str(xml).map_err(|e| e.to_string())?;
    let metadata = document.metadata;

    let id = metadata.id.trim().to_string();
    if id.is_empty() {
        return Err("manifest has an empty <id>".to_string());
    }

    let mut dependencies = Vec::new();
    if let Some(list) = metadata.dependencies {
        dependencies.extend(list.direct.into_iter().map(|d| d.into_dependency(None)));
        for group in list.groups {
            let framework = group.target_framework.filter(|f| !f.is_empty());
            dependencies.extend(
                group
                    .dependencies
                    .into_iter()
                    .map(|d| d.into_dependency(framework.clone())),
            );
        }
    }

    Ok(Manifest {
        id,
        version: metadata.version.trim().to_string(),
        authors: non_empty(metadata.authors),
        description: non_empty(metadata.description),
        dependencies,
    })
}

impl DependencyEntry {
    fn into_dependency(self, target_framework: Option<String>) -> PackageDependency {
        PackageDependency {
            id: self.id,
            version: self.version.filter(|v| !v.is_empty()),
            target_framework,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
