//! Build steps as executed by the host orchestrator: batch resolution into
//! a workspace, batch deployment out of one, and version choice lists for
//! build parameters.

pub mod deployer;
pub mod resolver;
pub mod versions;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;

pub use deployer::ArtifactDeployer;
pub use resolver::{ArtifactResolver, StepOutcome};
pub use versions::VersionParameter;

/// The build workspace files are resolved into and deployed from. Steps
/// never touch workspace paths directly; deployment sources are copied to
/// temporary files first so the upload reads a stable snapshot.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// Copies a file into the workspace at the given relative path,
    /// creating intermediate directories.
    async fn copy_in(&self, source: &Path, relative: &str) -> anyhow::Result<PathBuf>;

    /// Copies a workspace file to a temporary file outside the workspace.
    /// The copy disappears when the returned handle is dropped.
    async fn copy_out(&self, relative: &str) -> anyhow::Result<NamedTempFile>;
}

/// Workspace rooted at a local directory.
pub struct DirWorkspace {
    root: PathBuf,
}

impl DirWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> DirWorkspace {
        DirWorkspace { root: root.into() }
    }
}

#[async_trait]
impl Workspace for DirWorkspace {
    async fn copy_in(&self, source: &Path, relative: &str) -> anyhow::Result<PathBuf> {
        let destination = self.root.join(relative);
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(source, &destination).await?;
        Ok(destination)
    }

    async fn copy_out(&self, relative: &str) -> anyhow::Result<NamedTempFile> {
        let source = self.root.join(relative);
        let temp = NamedTempFile::new()?;
        tokio::fs::copy(&source, temp.path()).await?;
        Ok(temp)
    }
}
