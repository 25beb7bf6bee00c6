//! `.nuspec` decoding.
//!
//! The manifest is first read into a small element tree keyed by local
//! names, so namespace prefixes and schema-version namespaces never matter.
//! [`parse_manifest`] then maps that tree onto [`PackageMetadata`], one
//! field at a time.

use quick_xml::Reader;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

use super::model::{Dependency, LicenseType, PackageMetadata, PackageType};

/// Reasons a manifest cannot be decoded.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("document has no root element")]
    MissingRoot,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("root element <{0}> has no <metadata> child")]
    MissingMetadata(String),

    #[error("element <{0}> is never closed")]
    UnclosedElement(String),
}

pub type Result<T> = std::result::Result<T, ManifestError>;

/// Decode manifest text into typed metadata.
///
/// Fails only when the XML is not well-formed or the
/// `<package><metadata>` skeleton is missing; any other absent piece
/// becomes `None` or an empty list.
pub fn parse_manifest(xml: &str) -> Result<PackageMetadata> {
    let root = Element::parse_document(xml)?;
    let metadata = root
        .child("metadata")
        .ok_or_else(|| ManifestError::MissingMetadata(root.name.clone()))?;

    let license = metadata.child("license");
    let repository = metadata.child("repository");

    Ok(PackageMetadata {
        id: metadata.child_text("id").unwrap_or_default(),
        version: metadata.child_text("version").unwrap_or_default(),
        title: metadata.child_text("title"),
        description: metadata.child_text("description"),
        summary: metadata.child_text("summary"),
        authors: metadata.child_list("authors"),
        owners: metadata.child_list("owners"),
        license_url: metadata.child_text("licenseUrl"),
        license: license.and_then(Element::text),
        license_type: license
            .and_then(|license| license.raw_attr("type"))
            .map(LicenseType::parse),
        project_url: metadata.child_text("projectUrl"),
        repository_url: repository.and_then(|repository| repository.attr("url")),
        repository_type: repository.and_then(|repository| repository.attr("type")),
        repository_branch: repository.and_then(|repository| repository.attr("branch")),
        repository_commit: repository.and_then(|repository| repository.attr("commit")),
        icon_url: metadata.child_text("iconUrl"),
        icon: metadata.child_text("icon"),
        readme: metadata.child_text("readme"),
        tags: metadata.child_list("tags"),
        release_notes: metadata.child_text("releaseNotes"),
        copyright: metadata.child_text("copyright"),
        language: metadata.child_text("language"),
        min_client_version: metadata.attr("minClientVersion"),
        development_dependency: metadata.child_flag("developmentDependency"),
        serviceable: metadata.child_flag("serviceable"),
        require_license_acceptance: metadata.child_flag("requireLicenseAcceptance"),
        dependencies: metadata
            .child("dependencies")
            .map(dependencies)
            .unwrap_or_default(),
        package_types: metadata
            .child("packageTypes")
            .map(package_types)
            .unwrap_or_default(),
    })
}

// Grouped form wins whenever at least one <group> is present
fn dependencies(element: &Element) -> Vec<Dependency> {
    let mut groups = element.children_named("group").peekable();
    if groups.peek().is_none() {
        return element
            .children_named("dependency")
            .map(|dependency| to_dependency(dependency, None))
            .collect();
    }

    groups
        .flat_map(|group| {
            let framework = group.attr("targetFramework");
            group
                .children_named("dependency")
                .map(move |dependency| to_dependency(dependency, framework.clone()))
        })
        .collect()
}

fn to_dependency(element: &Element, target_framework: Option<String>) -> Dependency {
    Dependency {
        id: element.attr("id").unwrap_or_default(),
        version: element.attr("version"),
        target_framework,
        exclude: element.attr("exclude"),
        include: element.attr("include"),
    }
}

fn package_types(element: &Element) -> Vec<PackageType> {
    element
        .children_named("packageType")
        .map(|package_type| PackageType {
            name: package_type.attr("name").unwrap_or_default(),
            version: package_type.attr("version"),
        })
        .collect()
}

/// Split a comma-separated manifest list, dropping blank items.
fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn parse_document(xml: &str) -> Result<Element> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Element::open(&start)?),
                Event::Empty(start) => {
                    let element = Element::open(&start)?;
                    Element::attach(element, &mut stack, &mut root)?;
                }
                Event::End(_) => {
                    // quick-xml already rejects mismatched end tags
                    if let Some(element) = stack.pop() {
                        Element::attach(element, &mut stack, &mut root)?;
                    }
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        let text = text.unescape().map_err(quick_xml::Error::from)?;
                        current.text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(ManifestError::UnclosedElement(open.name));
        }
        root.ok_or(ManifestError::MissingRoot)
    }

    fn open(start: &BytesStart<'_>) -> Result<Element> {
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(quick_xml::Error::from)?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Element {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            attributes,
            ..Default::default()
        })
    }

    fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) -> Result<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_some() => return Err(ManifestError::MultipleRoots),
            None => *root = Some(element),
        }
        Ok(())
    }

    fn child<'a>(&'a self, name: &'a str) -> Option<&'a Element> {
        self.children_named(name).next()
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Trimmed text, `None` when blank.
    fn text(&self) -> Option<String> {
        let text = self.text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).and_then(Element::text)
    }

    fn child_list(&self, name: &str) -> Vec<String> {
        self.child(name)
            .map(|child| split_list(&child.text))
            .unwrap_or_default()
    }

    /// Only the exact literal `true` counts; surrounding whitespace does not.
    fn child_flag(&self, name: &str) -> bool {
        self.child(name).is_some_and(|child| child.text == "true")
    }

    fn raw_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed attribute value, `None` when missing or blank.
    fn attr(&self, name: &str) -> Option<String> {
        self.raw_attr(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nuspec(metadata: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd">
  <metadata>
    {metadata}
  </metadata>
</package>"#
        )
    }

    #[test]
    fn test_minimal_manifest() {
        let metadata = parse_manifest(&nuspec("<id>Foo</id><version>1.2.3</version>")).unwrap();
        assert_eq!(metadata.id, "Foo");
        assert_eq!(metadata.version, "1.2.3");
        assert_eq!(metadata.title, None);
        assert_eq!(metadata.license_type, None);
        assert!(metadata.authors.is_empty());
        assert!(metadata.dependencies.is_empty());
        assert!(!metadata.serviceable);
    }

    #[test]
    fn test_missing_id_and_version_become_empty() {
        let metadata = parse_manifest(&nuspec("<title>Only a title</title>")).unwrap();
        assert_eq!(metadata.id, "");
        assert_eq!(metadata.version, "");
        assert_eq!(metadata.title.as_deref(), Some("Only a title"));
    }

    #[test]
    fn test_scalar_fields_are_trimmed() {
        let metadata = parse_manifest(&nuspec(
            r#"<id> Foo </id>
               <version>1.0.0</version>
               <description>
                 Fast &amp; small.
               </description>
               <releaseNotes><![CDATA[Fixed <bugs>.]]></releaseNotes>
               <copyright>   </copyright>
               <projectUrl>https://example.com/foo</projectUrl>
               <language>en-US</language>"#,
        ))
        .unwrap();
        assert_eq!(metadata.id, "Foo");
        assert_eq!(metadata.description.as_deref(), Some("Fast & small."));
        assert_eq!(metadata.release_notes.as_deref(), Some("Fixed <bugs>."));
        assert_eq!(metadata.copyright, None);
        assert_eq!(metadata.project_url.as_deref(), Some("https://example.com/foo"));
        assert_eq!(metadata.language.as_deref(), Some("en-US"));
    }

    #[test]
    fn test_lists_split_on_commas() {
        let metadata = parse_manifest(&nuspec(
            "<id>Foo</id><version>1.0.0</version>\
             <authors>Alice, Bob ,,Carol</authors>\
             <owners>Contoso</owners>\
             <tags>json, , serialization</tags>",
        ))
        .unwrap();
        assert_eq!(metadata.authors, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(metadata.owners, vec!["Contoso"]);
        assert_eq!(metadata.tags, vec!["json", "serialization"]);
    }

    #[test]
    fn test_boolean_flags() {
        let metadata = parse_manifest(&nuspec(
            "<id>Foo</id><version>1.0.0</version>\
             <serviceable>true</serviceable>\
             <developmentDependency>maybe</developmentDependency>\
             <requireLicenseAcceptance>TRUE</requireLicenseAcceptance>",
        ))
        .unwrap();
        assert!(metadata.serviceable);
        assert!(!metadata.development_dependency);
        assert!(!metadata.require_license_acceptance);

        let metadata = parse_manifest(&nuspec("<id>Foo</id><version>1.0.0</version>")).unwrap();
        assert!(!metadata.serviceable);

        let metadata = parse_manifest(&nuspec(
            "<id>Foo</id><version>1.0.0</version><serviceable> true </serviceable>",
        ))
        .unwrap();
        assert!(!metadata.serviceable);
    }

    #[test]
    fn test_mixed_text_and_cdata_keep_inner_whitespace() {
        let metadata = parse_manifest(&nuspec(
            "<id>Foo</id><version>1.0.0</version>\
             <releaseNotes>  foo <![CDATA[bar]]>  </releaseNotes>",
        ))
        .unwrap();
        assert_eq!(metadata.release_notes.as_deref(), Some("foo bar"));
    }

    #[test]
    fn test_flat_dependencies() {
        let metadata = parse_manifest(&nuspec(
            r#"<id>Foo</id><version>1.0.0</version>
               <dependencies>
                 <dependency id="Bar" version="[1.0.0,2.0.0)" />
                 <dependency id="Baz" exclude="Build,Analyzers" include="all" />
               </dependencies>"#,
        ))
        .unwrap();
        assert_eq!(
            metadata.dependencies,
            vec![
                Dependency {
                    id: "Bar".into(),
                    version: Some("[1.0.0,2.0.0)".into()),
                    ..Default::default()
                },
                Dependency {
                    id: "Baz".into(),
                    exclude: Some("Build,Analyzers".into()),
                    include: Some("all".into()),
                    ..Default::default()
                },
            ]
        );
    }

    #[test]
    fn test_grouped_dependencies() {
        let metadata = parse_manifest(&nuspec(
            r#"<id>Foo</id><version>1.0.0</version>
               <dependencies>
                 <group targetFramework="net6.0">
                   <dependency id="A" version="1.0.0" />
                 </group>
                 <group targetFramework="net472">
                   <dependency id="B" version="2.0.0" />
                   <dependency id="C" />
                 </group>
                 <group targetFramework="netstandard2.0" />
               </dependencies>"#,
        ))
        .unwrap();
        let deps = &metadata.dependencies;
        assert_eq!(deps.len(), 3);
        assert_eq!(deps[0].id, "A");
        assert_eq!(deps[0].target_framework.as_deref(), Some("net6.0"));
        assert_eq!(deps[1].id, "B");
        assert_eq!(deps[1].target_framework.as_deref(), Some("net472"));
        assert_eq!(deps[2].id, "C");
        assert_eq!(deps[2].version, None);
        assert_eq!(deps[2].target_framework.as_deref(), Some("net472"));
    }

    #[test]
    fn test_groups_take_precedence_over_bare_dependencies() {
        let metadata = parse_manifest(&nuspec(
            r#"<id>Foo</id><version>1.0.0</version>
               <dependencies>
                 <dependency id="Ignored" />
                 <group targetFramework="net8.0"><dependency id="Kept" /></group>
               </dependencies>"#,
        ))
        .unwrap();
        assert_eq!(metadata.dependencies.len(), 1);
        assert_eq!(metadata.dependencies[0].id, "Kept");
    }

    #[test]
    fn test_license_expression_and_file() {
        let metadata = parse_manifest(&nuspec(
            r#"<id>Foo</id><version>1.0.0</version>
               <license type="expression">MIT OR Apache-2.0</license>"#,
        ))
        .unwrap();
        assert_eq!(metadata.license.as_deref(), Some("MIT OR Apache-2.0"));
        assert_eq!(metadata.license_type, Some(LicenseType::Expression));

        let metadata = parse_manifest(&nuspec(
            r#"<id>Foo</id><version>1.0.0</version>
               <license type="file">docs/LICENSE.txt</license>"#,
        ))
        .unwrap();
        assert_eq!(metadata.license_type, Some(LicenseType::File));

        let metadata = parse_manifest(&nuspec(
            r#"<id>Foo</id><version>1.0.0</version><license>MIT</license>
               <licenseUrl>https://licenses.nuget.org/MIT</licenseUrl>"#,
        ))
        .unwrap();
        assert_eq!(metadata.license.as_deref(), Some("MIT"));
        assert_eq!(metadata.license_type, None);
        assert_eq!(metadata.license_url.as_deref(), Some("https://licenses.nuget.org/MIT"));
    }

    #[test]
    fn test_unknown_license_type_passes_through() {
        let metadata = parse_manifest(&nuspec(
            r#"<id>Foo</id><version>1.0.0</version><license type="url">x</license>"#,
        ))
        .unwrap();
        assert_eq!(metadata.license_type, Some(LicenseType::Other("url".into())));
    }

    #[test]
    fn test_repository_and_package_types() {
        let metadata = parse_manifest(&nuspec(
            r#"<id>Foo</id><version>1.0.0</version>
               <repository type="git" url="https://github.com/contoso/foo" branch="main" commit="abc123" />
               <packageTypes>
                 <packageType name="McpServer" />
                 <packageType name="Dependency" version="1.0.0" />
                 <packageType />
               </packageTypes>"#,
        ))
        .unwrap();
        assert_eq!(metadata.repository_type.as_deref(), Some("git"));
        assert_eq!(
            metadata.repository_url.as_deref(),
            Some("https://github.com/contoso/foo")
        );
        assert_eq!(metadata.repository_branch.as_deref(), Some("main"));
        assert_eq!(metadata.repository_commit.as_deref(), Some("abc123"));
        assert_eq!(
            metadata.package_types,
            vec![
                PackageType {
                    name: "McpServer".into(),
                    version: None
                },
                PackageType {
                    name: "Dependency".into(),
                    version: Some("1.0.0".into())
                },
                PackageType::default(),
            ]
        );
    }

    #[test]
    fn test_namespace_prefixes_are_ignored() {
        let xml = r#"<?xml version="1.0"?>
<ns:package xmlns:ns="http://schemas.microsoft.com/packaging/2010/07/nuspec.xsd">
  <ns:metadata minClientVersion="2.12">
    <ns:id>Prefixed</ns:id>
    <ns:version>0.1.0</ns:version>
    <ns:icon>images/icon.png</ns:icon>
  </ns:metadata>
</ns:package>"#;
        let metadata = parse_manifest(xml).unwrap();
        assert_eq!(metadata.id, "Prefixed");
        assert_eq!(metadata.min_client_version.as_deref(), Some("2.12"));
        assert_eq!(metadata.icon.as_deref(), Some("images/icon.png"));
    }

    #[test]
    fn test_byte_order_mark_is_tolerated() {
        let xml = format!("\u{feff}{}", nuspec("<id>Bom</id><version>1.0.0</version>"));
        assert_eq!(parse_manifest(&xml).unwrap().id, "Bom");
    }

    #[test]
    fn test_rejects_malformed_xml() {
        assert!(matches!(
            parse_manifest("<package><metadata><id>Foo</metadata></package>"),
            Err(ManifestError::Xml(_))
        ));
        assert!(matches!(
            parse_manifest("<package><metadata><id>Foo</id>"),
            Err(ManifestError::UnclosedElement(_) | ManifestError::Xml(_))
        ));
        assert!(matches!(parse_manifest(""), Err(ManifestError::MissingRoot)));
        assert!(matches!(
            parse_manifest("<a/><b/>"),
            Err(ManifestError::MultipleRoots)
        ));
    }

    #[test]
    fn test_rejects_missing_metadata() {
        assert!(matches!(
            parse_manifest("<package><files /></package>"),
            Err(ManifestError::MissingMetadata(root)) if root == "package"
        ));
    }
}
