use serde::Deserialize;
use tracing::{info, warn};

use crate::engine::dependency::{ClasspathScopeFilter, Scope};
use crate::engine::{Engine, ResolvedArtifact};
use crate::error::Error;
use crate::maven::coordinates::Artifact;
use crate::maven::paths;
use crate::steps::Workspace;

/// Resolves a batch of artifacts and copies them into a workspace
/// directory.
///
/// An artifact with `fail_on_error = false` that cannot be resolved is
/// logged and skipped; the batch continues. Configuration errors abort the
/// batch regardless.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactResolver {
    #[serde(default)]
    pub repository_id: Option<String>,
    #[serde(default)]
    pub target_directory: String,
    #[serde(default)]
    pub with_dependencies: bool,
    /// Classpath scope for dependency resolution, `compile` when absent.
    #[serde(default)]
    pub scope: Option<String>,
    pub artifacts: Vec<Artifact>,
}

/// What a batch step actually did: everything placed in the workspace, and
/// the coordinates that were skipped over.
#[derive(Debug, Default)]
pub struct StepOutcome {
    pub resolved: Vec<ResolvedArtifact>,
    pub skipped: Vec<String>,
}

impl ArtifactResolver {
    pub async fn run(
        &self,
        engine: &Engine,
        workspace: &dyn Workspace,
    ) -> crate::error::Result<StepOutcome> {
        let mut outcome = StepOutcome::default();

        for artifact in &self.artifacts {
            match self.resolve_one(engine, workspace, artifact).await {
                Ok(resolved) => outcome.resolved.extend(resolved),
                Err(e) if e.is_fatal() || artifact.fail_on_error => return Err(e),
                Err(e) => {
                    warn!("{:#}, continuing with the next artifact", e);
                    outcome.skipped.push(artifact.to_string());
                }
            }
        }

        info!(
            "resolved {} artifact(s), skipped {}",
            outcome.resolved.len(),
            outcome.skipped.len()
        );
        Ok(outcome)
    }

    async fn resolve_one(
        &self,
        engine: &Engine,
        workspace: &dyn Workspace,
        artifact: &Artifact,
    ) -> crate::error::Result<Vec<ResolvedArtifact>> {
        let repository_id = self.repository_id.as_deref();

        let resolved = if self.with_dependencies {
            let filter = ClasspathScopeFilter::new(Scope::parse(self.scope.as_deref()));
            engine
                .resolve_with_dependencies(artifact, repository_id, &filter)
                .await?
        } else {
            vec![engine.resolve(artifact, repository_id).await?]
        };

        for one in &resolved {
            let relative = self.workspace_path(one);
            workspace
                .copy_in(&one.path, &relative)
                .await
                .map_err(|e| Error::resolution(one.artifact.to_string(), e))?;
        }
        Ok(resolved)
    }

    /// Target path inside the workspace. An explicit target file name wins;
    /// dependencies pulled in alongside the root keep their layout name.
    fn workspace_path(&self, resolved: &ResolvedArtifact) -> String {
        let artifact = &resolved.artifact;
        let file_name = artifact.target_file_name.clone().unwrap_or_else(|| {
            paths::file_name(
                &artifact.artifact_id,
                artifact.version.as_deref().unwrap_or_default(),
                &artifact.classifier,
                artifact.extension(),
            )
        });

        let directory = self.target_directory.trim_end_matches('/');
        if directory.is_empty() {
            file_name
        } else {
            format!("{}/{}", directory, file_name)
        }
    }
}
