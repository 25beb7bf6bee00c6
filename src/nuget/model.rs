//! Typed view of a package: manifest metadata, file tree and special files.

use serde::{Deserialize, Serialize};

/// How a manifest's `<license>` element should be read.
///
/// Values other than `expression` and `file` are passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseType {
    Expression,
    File,
    #[serde(untagged)]
    Other(String),
}

impl LicenseType {
    pub fn parse(value: &str) -> Self {
        match value {
            "expression" => LicenseType::Expression,
            "file" => LicenseType::File,
            other => LicenseType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LicenseType::Expression => "expression",
            LicenseType::File => "file",
            LicenseType::Other(value) => value,
        }
    }
}

/// A package dependency declared in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub id: String,
    /// NuGet version range, kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Set only for dependencies declared inside a `<group>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_framework: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
}

/// A `<packageType>` tag such as `Dependency`, `Template` or `McpServer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Metadata decoded from the `.nuspec` manifest.
///
/// `id` and `version` are always set (possibly empty). Other scalars are
/// `None` when the element is missing; lists default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    pub id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_type: Option<LicenseType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// Path of the embedded icon declared by `<icon>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Path of the embedded readme declared by `<readme>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_client_version: Option<String>,
    #[serde(default)]
    pub development_dependency: bool,
    #[serde(default)]
    pub serviceable: bool,
    #[serde(default)]
    pub require_license_acceptance: bool,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub package_types: Vec<PackageType>,
}

/// One node of the package file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Full archive path; directories end with `/`
    pub path: String,
    pub name: String,
    /// Uncompressed size, 0 for directories
    pub size: u64,
    pub is_directory: bool,
    /// Present on directories only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileEntry>>,
}

impl FileEntry {
    /// Leaf record for an archive entry, as seen during the scan.
    pub fn from_archive_path(path: &str, size: u64) -> Self {
        let is_directory = path.ends_with('/');
        let name = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .next_back()
            .unwrap_or_default()
            .to_string();

        Self {
            path: path.to_string(),
            name,
            size: if is_directory { 0 } else { size },
            is_directory,
            children: is_directory.then(Vec::new),
        }
    }

    /// Directory node materialized for a path no archive entry names.
    pub fn synthetic_directory(path: String, name: String) -> Self {
        Self {
            path,
            name,
            size: 0,
            is_directory: true,
            children: Some(Vec::new()),
        }
    }

    pub fn children(&self) -> &[FileEntry] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Depth-first list of every path in this subtree, this node first.
    pub fn flatten(&self) -> Vec<&str> {
        let mut paths = Vec::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(&self.path);
        for child in self.children() {
            child.collect_paths(out);
        }
    }

    fn find(&self, path: &str) -> Option<&FileEntry> {
        if self.path == path {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(path))
    }
}

/// Result of inspecting a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageContent {
    pub metadata: PackageMetadata,
    /// Top-level nodes of the file tree
    pub files: Vec<FileEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nuspec_content: Option<String>,
    #[serde(skip)]
    pub icon_data: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_server_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_server_path: Option<String>,
}

impl PackageContent {
    /// Whether the manifest declares a package type named `name` (case-insensitive).
    pub fn has_package_type(&self, name: &str) -> bool {
        self.metadata
            .package_types
            .iter()
            .any(|package_type| package_type.name.eq_ignore_ascii_case(name))
    }

    pub fn is_mcp_server(&self) -> bool {
        self.has_package_type("McpServer")
    }

    /// Number of non-directory nodes in the tree.
    pub fn file_count(&self) -> usize {
        fn count(entries: &[FileEntry]) -> usize {
            entries
                .iter()
                .map(|entry| {
                    if entry.is_directory {
                        count(entry.children())
                    } else {
                        1
                    }
                })
                .sum()
        }
        count(&self.files)
    }

    /// Look up a node anywhere in the tree by its full path.
    pub fn find(&self, path: &str) -> Option<&FileEntry> {
        self.files.iter().find_map(|entry| entry.find(path))
    }
}

/// Bytes of one archive entry fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    pub path: String,
    #[serde(skip)]
    pub content: Vec<u8>,
    pub mime_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_archive_path() {
        let file = FileEntry::from_archive_path("lib/net6.0/Foo.dll", 500);
        assert_eq!(file.name, "Foo.dll");
        assert_eq!(file.size, 500);
        assert!(!file.is_directory);
        assert!(file.children.is_none());

        let dir = FileEntry::from_archive_path("lib/net6.0/", 0);
        assert_eq!(dir.name, "net6.0");
        assert!(dir.is_directory);
        assert_eq!(dir.children, Some(Vec::new()));
    }

    #[test]
    fn test_license_type_passthrough() {
        assert_eq!(LicenseType::parse("expression"), LicenseType::Expression);
        assert_eq!(LicenseType::parse("file"), LicenseType::File);
        assert_eq!(LicenseType::parse("spdx").as_str(), "spdx");
    }

    #[test]
    fn test_metadata_serializes_camel_case_and_skips_absent() {
        let metadata = PackageMetadata {
            id: "Foo".into(),
            version: "1.0.0".into(),
            license_type: Some(LicenseType::Expression),
            ..Default::default()
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["id"], "Foo");
        assert_eq!(json["licenseType"], "expression");
        assert_eq!(json["requireLicenseAcceptance"], false);
        assert!(json.get("title").is_none());
        assert_eq!(json["authors"], serde_json::json!([]));
    }

    #[test]
    fn test_package_type_lookup() {
        let content = PackageContent {
            metadata: PackageMetadata {
                package_types: vec![PackageType {
                    name: "McpServer".into(),
                    version: None,
                }],
                ..Default::default()
            },
            files: Vec::new(),
            nuspec_content: None,
            icon_data: None,
            readme_content: None,
            readme_path: None,
            license_content: None,
            license_path: None,
            mcp_server_content: None,
            mcp_server_path: None,
        };
        assert!(content.is_mcp_server());
        assert!(content.has_package_type("mcpserver"));
        assert!(!content.has_package_type("Template"));
    }
}
