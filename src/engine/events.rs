use std::sync::Mutex;

use serde::Serialize;
use tracing::info;

use crate::maven::coordinates::Artifact;

/// Record of one file pushed to a remote repository, kept for build
/// reporting. Records are only ever appended during a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployedArtifact {
    pub repository_id: String,
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: String,
    pub extension: String,
    pub snapshot: bool,
    /// Layout path relative to the repository root.
    pub path: String,
    pub url: String,
}

/// Observer of engine activity. All methods default to no-ops so listeners
/// implement only what they care about.
pub trait RepositoryListener: Send + Sync {
    fn artifact_resolved(&self, _artifact: &Artifact, _repository_id: &str, _local_path: &str) {}

    fn artifact_installed(&self, _artifact: &Artifact, _local_path: &str) {}

    fn artifact_deployed(&self, _deployed: &DeployedArtifact) {}
}

/// Forwards engine events to the log, mirroring what an interactive build
/// log would show.
pub struct ConsoleRepositoryListener;

impl RepositoryListener for ConsoleRepositoryListener {
    fn artifact_resolved(&self, artifact: &Artifact, repository_id: &str, local_path: &str) {
        info!("resolved {} from [{}] to {}", artifact, repository_id, local_path);
    }

    fn artifact_installed(&self, artifact: &Artifact, local_path: &str) {
        info!("installed {} to {}", artifact, local_path);
    }

    fn artifact_deployed(&self, deployed: &DeployedArtifact) {
        info!(
            "deployed {}:{}:{} to [{}] as {}",
            deployed.group_id,
            deployed.artifact_id,
            deployed.version,
            deployed.repository_id,
            deployed.url
        );
    }
}

/// Collects deployment records for the build report.
#[derive(Default)]
pub struct DeployRecorder {
    records: Mutex<Vec<DeployedArtifact>>,
}

impl DeployRecorder {
    pub fn new() -> DeployRecorder {
        DeployRecorder::default()
    }

    pub fn records(&self) -> Vec<DeployedArtifact> {
        self.records.lock().expect("poisoned deploy records").clone()
    }
}

impl RepositoryListener for DeployRecorder {
    fn artifact_deployed(&self, deployed: &DeployedArtifact) {
        self.records
            .lock()
            .expect("poisoned deploy records")
            .push(deployed.clone());
    }
}
