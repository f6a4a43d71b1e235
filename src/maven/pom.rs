//! Generation of minimal deployment POMs and extraction of the direct
//! dependency list from a downloaded descriptor.

use std::io::Write;

use serde::Deserialize;
use tempfile::NamedTempFile;

use crate::maven::coordinates::Artifact;

/// Writes a minimal descriptor for an artifact that is deployed without
/// one of its own. The caller owns the temp file; it is removed when the
/// handle is dropped.
pub fn generate(artifact: &Artifact) -> anyhow::Result<NamedTempFile> {
    let version = artifact.version.as_deref().unwrap_or_default();
    let packaging = packaging_for(artifact);

    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>{}</groupId>
  <artifactId>{}</artifactId>
  <version>{}</version>
  <packaging>{}</packaging>
</project>
"#,
        escape(&artifact.group_id),
        escape(&artifact.artifact_id),
        escape(version),
        escape(packaging),
    )?;
    file.flush()?;
    Ok(file)
}

/// The packaging element value. Explicit extension wins; otherwise it is
/// taken from the target file name's extension, keeping a compound `tar.*`
/// extension intact.
fn packaging_for(artifact: &Artifact) -> &str {
    if artifact.extension.as_deref().map(|e| !e.is_empty()).unwrap_or(false) {
        return artifact.extension();
    }
    if let Some(target) = artifact.target_file_name.as_deref() {
        let name = target.rsplit(['/', '\\']).next().unwrap_or(target);
        if let Some(extension) = file_extension(name) {
            return extension;
        }
    }
    artifact.extension()
}

fn file_extension(name: &str) -> Option<&str> {
    let (stem, last) = name.rsplit_once('.')?;
    if last.is_empty() {
        return None;
    }
    if stem.ends_with(".tar") || stem == "tar" {
        return Some(&name[name.len() - last.len() - 4..]);
    }
    Some(last)
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub dependencies: Option<Dependencies>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dependencies {
    #[serde(default)]
    pub dependency: Vec<PomDependency>,
}

/// One `<dependency>` entry of a descriptor. Only the fields needed for
/// transitive resolution are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct PomDependency {
    #[serde(rename = "groupId")]
    pub group_id: String,
    #[serde(rename = "artifactId")]
    pub artifact_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(rename = "type", default)]
    pub dependency_type: Option<String>,
    #[serde(default)]
    pub optional: Option<bool>,
}

/// The direct dependency list of a descriptor, in declaration order.
pub fn parse_dependencies(xml: &str) -> anyhow::Result<Vec<PomDependency>> {
    let project: Project = serde_xml_rs::from_str(xml)?;
    Ok(project
        .dependencies
        .map(|d| d.dependency)
        .unwrap_or_default())
}

#[cfg(test)]
mod test {
    use std::io::Read;

    use rstest::*;

    use super::*;

    fn read_back(file: &NamedTempFile) -> String {
        let mut content = String::new();
        file.reopen().unwrap().read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_generate_contains_coordinates() {
        let artifact = Artifact::new("org.example", "demo", "1.2.3");
        let file = generate(&artifact).unwrap();
        let content = read_back(&file);

        assert!(content.contains("<modelVersion>4.0.0</modelVersion>"));
        assert!(content.contains("<groupId>org.example</groupId>"));
        assert!(content.contains("<artifactId>demo</artifactId>"));
        assert!(content.contains("<version>1.2.3</version>"));
        assert!(content.contains("<packaging>jar</packaging>"));
    }

    #[test]
    fn test_generate_escapes_special_characters() {
        let artifact = Artifact::new("org.example", "a<b>&c", "1.0");
        let file = generate(&artifact).unwrap();

        assert!(read_back(&file).contains("<artifactId>a&lt;b&gt;&amp;c</artifactId>"));
    }

    #[rstest]
    #[case::explicit_extension(Some("war"), None, "war")]
    #[case::from_target_file(None, Some("build/demo-1.0.tar.gz"), "tar.gz")]
    #[case::simple_target_file(None, Some("demo.zip"), "zip")]
    #[case::no_hints(None, None, "jar")]
    #[case::extensionless_target(None, Some("demo"), "jar")]
    fn test_packaging(
        #[case] extension: Option<&str>,
        #[case] target_file_name: Option<&str>,
        #[case] expected: &str,
    ) {
        let mut artifact = Artifact::new("g", "demo-1.0", "1.0");
        artifact.extension = extension.map(str::to_string);
        artifact.target_file_name = target_file_name.map(str::to_string);

        assert_eq!(packaging_for(&artifact), expected);
    }

    #[test]
    fn test_parse_dependencies() {
        let dependencies = parse_dependencies(
            r#"<project>
  <modelVersion>4.0.0</modelVersion>
  <groupId>org.example</groupId>
  <artifactId>demo</artifactId>
  <version>1.0</version>
  <dependencies>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>core</artifactId>
      <version>2.0</version>
    </dependency>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>testkit</artifactId>
      <version>2.0</version>
      <scope>test</scope>
      <type>test-jar</type>
      <optional>true</optional>
    </dependency>
  </dependencies>
</project>"#,
        )
        .unwrap();

        assert_eq!(dependencies.len(), 2);
        assert_eq!(dependencies[0].artifact_id, "core");
        assert_eq!(dependencies[0].scope, None);
        assert_eq!(dependencies[1].scope.as_deref(), Some("test"));
        assert_eq!(dependencies[1].dependency_type.as_deref(), Some("test-jar"));
        assert_eq!(dependencies[1].optional, Some(true));
    }

    #[test]
    fn test_parse_dependencies_absent_section() {
        let dependencies = parse_dependencies("<project><groupId>g</groupId></project>").unwrap();
        assert!(dependencies.is_empty());
    }
}
