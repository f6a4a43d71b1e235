use serde::{Deserialize, Serialize};

use crate::maven::version;

pub const DEFAULT_EXTENSION: &str = "jar";

/// An artifact to be resolved or deployed, as declared in job
/// configuration. All string values arrive already token-expanded by the
/// host orchestrator.
///
/// The version may be a literal, `"RELEASE"`, `"LATEST"`, a version-range
/// expression, or absent for an available-versions query. For deployments,
/// the per-execution copy of this value has `target_file_name` and
/// `pom_file` rewritten to point at local temporary copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub classifier: String,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub target_file_name: Option<String>,
    #[serde(default)]
    pub pom_file: Option<String>,
    #[serde(default = "default_true")]
    pub fail_on_error: bool,
    #[serde(default = "default_true")]
    pub deploy_to_local: bool,
    #[serde(default = "default_true")]
    pub deploy_to_remote: bool,
}

fn default_true() -> bool {
    true
}

impl Artifact {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Artifact {
        Artifact {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: Some(version.into()),
            classifier: String::new(),
            extension: None,
            target_file_name: None,
            pom_file: None,
            fail_on_error: true,
            deploy_to_local: true,
            deploy_to_remote: true,
        }
    }

    pub fn without_version(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
    ) -> Artifact {
        let mut artifact = Artifact::new(group_id, artifact_id, "");
        artifact.version = None;
        artifact
    }

    /// The effective extension; unset or empty means `jar`.
    pub fn extension(&self) -> &str {
        match self.extension.as_deref() {
            Some("") | None => DEFAULT_EXTENSION,
            Some(extension) => extension,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        self.version
            .as_deref()
            .map(version::is_snapshot)
            .unwrap_or(false)
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.group_id,
            self.artifact_id,
            self.extension(),
            self.classifier,
            self.version.as_deref().unwrap_or("")
        )
    }
}
