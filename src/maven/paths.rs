//! Computation of relative paths within the standard maven2 repository
//! layout: `group/with/slashes/artifact/version/artifact-version[-classifier].extension`.

use crate::maven::coordinates::Artifact;

pub const METADATA_FILE_NAME: &str = "maven-metadata.xml";

pub fn file_name(artifact_id: &str, version: &str, classifier: &str, extension: &str) -> String {
    if classifier.is_empty() {
        format!("{}-{}.{}", artifact_id, version, extension)
    } else {
        format!("{}-{}-{}.{}", artifact_id, version, classifier, extension)
    }
}

/// Directory holding all files of one artifact version.
pub fn version_dir(group_id: &str, artifact_id: &str, version: &str) -> String {
    format!("{}/{}/{}", group_id.replace('.', "/"), artifact_id, version)
}

/// Relative path of the artifact's main file for the given concrete version.
pub fn artifact_path(artifact: &Artifact, version: &str) -> String {
    format!(
        "{}/{}",
        version_dir(&artifact.group_id, &artifact.artifact_id, version),
        file_name(&artifact.artifact_id, version, &artifact.classifier, artifact.extension()),
    )
}

/// Relative path of the artifact's descriptor (POM) for the given version.
pub fn pom_path(artifact: &Artifact, version: &str) -> String {
    format!(
        "{}/{}",
        version_dir(&artifact.group_id, &artifact.artifact_id, version),
        file_name(&artifact.artifact_id, version, "", "pom"),
    )
}

/// Relative path of the artifact-level version metadata document.
pub fn metadata_path(group_id: &str, artifact_id: &str) -> String {
    format!(
        "{}/{}/{}",
        group_id.replace('.', "/"),
        artifact_id,
        METADATA_FILE_NAME
    )
}

/// Joins a repository base URL and a relative layout path, tolerating a
/// missing or present trailing slash on the base.
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{}/{}", base, path)
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case::plain("demo", "1.0.0", "", "jar", "demo-1.0.0.jar")]
    #[case::classifier("demo", "1.0.0", "sources", "jar", "demo-1.0.0-sources.jar")]
    #[case::snapshot("demo", "1.0.0-SNAPSHOT", "", "jar", "demo-1.0.0-SNAPSHOT.jar")]
    #[case::multi_dot_extension("demo", "2.1", "", "tar.gz", "demo-2.1.tar.gz")]
    #[case::artifact_with_dash("x-y", "1.0.0", "", "pom", "x-y-1.0.0.pom")]
    fn test_file_name(
        #[case] artifact_id: &str,
        #[case] version: &str,
        #[case] classifier: &str,
        #[case] extension: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(file_name(artifact_id, version, classifier, extension), expected);
    }

    #[rstest]
    #[case::dotted_group("org.example.lib", "demo", "1.0.0", "org/example/lib/demo/1.0.0/demo-1.0.0.jar")]
    #[case::single_segment_group("demo", "demo", "1.0.0", "demo/demo/1.0.0/demo-1.0.0.jar")]
    fn test_artifact_path(
        #[case] group_id: &str,
        #[case] artifact_id: &str,
        #[case] version: &str,
        #[case] expected: &str,
    ) {
        let artifact = Artifact::new(group_id, artifact_id, version);
        assert_eq!(artifact_path(&artifact, version), expected);
    }

    #[test]
    fn test_pom_path_ignores_classifier() {
        let mut artifact = Artifact::new("org.example", "demo", "1.0.0");
        artifact.classifier = "sources".to_string();

        assert_eq!(pom_path(&artifact, "1.0.0"), "org/example/demo/1.0.0/demo-1.0.0.pom");
    }

    #[test]
    fn test_metadata_path() {
        assert_eq!(
            metadata_path("org.example", "demo"),
            "org/example/demo/maven-metadata.xml"
        );
    }

    #[rstest]
    #[case::no_trailing_slash("https://repo.example.com/maven2", "a/b.jar", "https://repo.example.com/maven2/a/b.jar")]
    #[case::trailing_slash("https://repo.example.com/maven2/", "a/b.jar", "https://repo.example.com/maven2/a/b.jar")]
    fn test_join_url(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        assert_eq!(join_url(base, path), expected);
    }
}
