use serde::Deserialize;

use crate::engine::Engine;
use crate::maven::version::{self, VersionFilter};

/// Populates the choice list of a version build parameter: the known
/// versions of one artifact, ordered, optionally limited, and prefixed or
/// suffixed with the synthetic `RELEASE`/`LATEST` markers.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionParameter {
    #[serde(default)]
    pub repository_id: Option<String>,
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default)]
    pub oldest_first: bool,
    /// Maximum number of concrete versions shown, applied to
    /// newest-first lists only. Markers do not count against it.
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub include_release_marker: bool,
    #[serde(default)]
    pub include_latest_marker: bool,
    #[serde(default)]
    pub filter: VersionFilter,
}

impl VersionParameter {
    pub async fn list_choices(&self, engine: &Engine) -> crate::error::Result<Vec<String>> {
        let versions = engine
            .resolve_available_versions(
                &self.group_id,
                &self.artifact_id,
                self.repository_id.as_deref(),
                self.oldest_first,
                &self.filter,
            )
            .await?;

        Ok(version::decorate(
            versions,
            self.oldest_first,
            self.limit,
            self.include_release_marker,
            self.include_latest_marker,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_minimal_json_form() {
        let step: VersionParameter =
            serde_json::from_str(r#"{"group_id": "org.example", "artifact_id": "demo"}"#).unwrap();

        assert_eq!(step.group_id, "org.example");
        assert!(step.repository_id.is_none());
        assert!(!step.oldest_first);
        assert!(step.limit.is_none());
        assert_eq!(step.filter, VersionFilter::ALL);
    }

    #[test]
    fn test_full_json_form() {
        let step: VersionParameter = serde_json::from_str(
            r#"{
                "repository_id": "internal",
                "group_id": "org.example",
                "artifact_id": "demo",
                "oldest_first": true,
                "limit": 5,
                "include_release_marker": true,
                "include_latest_marker": true,
                "filter": {"releases": true, "snapshots": false}
            }"#,
        )
        .unwrap();

        assert_eq!(step.repository_id.as_deref(), Some("internal"));
        assert_eq!(step.limit, Some(5));
        assert!(!step.filter.snapshots);
    }
}
