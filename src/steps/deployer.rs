use serde::Deserialize;
use tracing::{info, warn};

use crate::engine::events::DeployedArtifact;
use crate::engine::Engine;
use crate::error::Error;
use crate::maven::coordinates::Artifact;
use crate::steps::Workspace;

/// Deploys a batch of workspace files as artifacts: into the local
/// repository, a remote repository, or both, per artifact flags.
///
/// Sources are copied to temporary files before anything is uploaded, so a
/// workspace changing mid-build cannot corrupt an upload; the copies are
/// removed when each artifact is done, on success and on failure alike.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactDeployer {
    #[serde(default)]
    pub repository_id: Option<String>,
    /// Deployment target for snapshot versions, falling back to
    /// `repository_id` when absent.
    #[serde(default)]
    pub snapshot_repository_id: Option<String>,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Default)]
pub struct DeployOutcome {
    pub deployed: Vec<DeployedArtifact>,
    pub installed: Vec<String>,
    pub skipped: Vec<String>,
}

impl ArtifactDeployer {
    pub async fn run(
        &self,
        engine: &Engine,
        workspace: &dyn Workspace,
    ) -> crate::error::Result<DeployOutcome> {
        let mut outcome = DeployOutcome::default();

        for artifact in &self.artifacts {
            match self.deploy_one(engine, workspace, artifact, &mut outcome).await {
                Ok(()) => {}
                Err(e) if e.is_fatal() || artifact.fail_on_error => return Err(e),
                Err(e) => {
                    warn!("{:#}, continuing with the next artifact", e);
                    outcome.skipped.push(artifact.to_string());
                }
            }
        }

        info!(
            "deployed {} artifact(s) remotely, {} locally, skipped {}",
            outcome.deployed.len(),
            outcome.installed.len(),
            outcome.skipped.len()
        );
        Ok(outcome)
    }

    async fn deploy_one(
        &self,
        engine: &Engine,
        workspace: &dyn Workspace,
        artifact: &Artifact,
        outcome: &mut DeployOutcome,
    ) -> crate::error::Result<()> {
        let source = artifact.target_file_name.as_deref().ok_or_else(|| {
            Error::deployment(artifact.to_string(), anyhow::anyhow!("no file to deploy"))
        })?;

        // stable copies outside the workspace, removed when this scope ends
        let staged_file = workspace
            .copy_out(source)
            .await
            .map_err(|e| Error::deployment(artifact.to_string(), e))?;
        let staged_pom = match artifact.pom_file.as_deref() {
            Some(pom_file) => Some(
                workspace
                    .copy_out(pom_file)
                    .await
                    .map_err(|e| Error::deployment(artifact.to_string(), e))?,
            ),
            None => None,
        };

        let mut staged = artifact.clone();
        staged.target_file_name = Some(staged_file.path().display().to_string());
        staged.pom_file = staged_pom.as_ref().map(|t| t.path().display().to_string());

        if artifact.deploy_to_local {
            let installed = engine.install(&staged).await?;
            outcome
                .installed
                .extend(installed.iter().map(|p| p.display().to_string()));
        }

        if artifact.deploy_to_remote {
            let repository_id = self.deployment_target(staged.is_snapshot());
            let deployed = engine.deploy(&staged, repository_id).await?;
            outcome.deployed.push(deployed);
        }

        Ok(())
    }

    fn deployment_target(&self, snapshot: bool) -> Option<&str> {
        if snapshot {
            self.snapshot_repository_id
                .as_deref()
                .or(self.repository_id.as_deref())
        } else {
            self.repository_id.as_deref()
        }
    }
}
