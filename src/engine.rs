//! The resolution and deployment engine. [`Engine`] is the facade every
//! build step goes through; it owns the connected repositories, the local
//! repository cache and the registered listeners.

pub mod auth;
pub mod dependency;
pub mod events;
pub mod factory;
pub mod proxy;
pub mod remote_repo;
pub mod session;
#[cfg(test)]
pub mod testserver;
pub mod transport;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, warn};

use crate::engine::dependency::DependencyFilter;
use crate::engine::events::{DeployedArtifact, RepositoryListener};
use crate::engine::factory::RemoteRepositoryFactory;
use crate::engine::remote_repo::RemoteRepository;
use crate::engine::transport::RepositoryClient;
use crate::error::Error;
use crate::maven::coordinates::Artifact;
use crate::maven::metadata_xml::VersionCatalog;
use crate::maven::version::{self, VersionFilter, LATEST_MARKER, RELEASE_MARKER};
use crate::maven::{paths, pom};

pub use session::EngineBuilder;

/// An artifact materialized in the local repository, with the version
/// pinned to the concrete value that was resolved.
#[derive(Debug, Clone)]
pub struct ResolvedArtifact {
    pub artifact: Artifact,
    pub repository_id: String,
    pub path: PathBuf,
}

pub struct Engine {
    factory: RemoteRepositoryFactory,
    local_repository: PathBuf,
    listeners: Vec<Arc<dyn RepositoryListener>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("local_repository", &self.local_repository)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub(crate) fn new(
        factory: RemoteRepositoryFactory,
        local_repository: PathBuf,
        listeners: Vec<Arc<dyn RepositoryListener>>,
    ) -> Engine {
        Engine {
            factory,
            local_repository,
            listeners,
        }
    }

    pub fn local_repository(&self) -> &Path {
        &self.local_repository
    }

    /// Resolves one artifact into the local repository. The version may be
    /// a literal, `RELEASE`, `LATEST` or a range expression; the markers
    /// and ranges are pinned against the merged repository metadata first.
    /// Repositories are tried in configured order; the first hit wins.
    pub async fn resolve(
        &self,
        artifact: &Artifact,
        repository_id: Option<&str>,
    ) -> crate::error::Result<ResolvedArtifact> {
        let requested = artifact.version.as_deref().ok_or_else(|| {
            Error::resolution(artifact.to_string(), anyhow!("no version given"))
        })?;

        let concrete = if requires_version_lookup(requested) {
            let pinned = self.pin_version(artifact, requested, repository_id).await?;
            debug!("pinned {} [{}] to version {}", artifact, requested, pinned);
            pinned
        } else {
            requested.to_string()
        };

        let repositories = self.factory.resolution_repositories(repository_id)?;
        let path = paths::artifact_path(artifact, &concrete);
        let (repository_id, local_path) = self
            .fetch_path(&path, version::is_snapshot(&concrete), repositories)
            .await
            .map_err(|e| Error::resolution(artifact.to_string(), e))?;

        let mut pinned = artifact.clone();
        pinned.version = Some(concrete);

        let rendered_path = local_path.display().to_string();
        for listener in &self.listeners {
            listener.artifact_resolved(&pinned, &repository_id, &rendered_path);
        }

        Ok(ResolvedArtifact {
            artifact: pinned,
            repository_id,
            path: local_path,
        })
    }

    /// Resolves an artifact together with the direct dependencies of its
    /// descriptor that pass the filter. The root artifact comes first in
    /// the returned list.
    pub async fn resolve_with_dependencies(
        &self,
        artifact: &Artifact,
        repository_id: Option<&str>,
        filter: &dyn DependencyFilter,
    ) -> crate::error::Result<Vec<ResolvedArtifact>> {
        let root = self.resolve(artifact, repository_id).await?;
        let version = root.artifact.version.clone().unwrap_or_default();

        let repositories = self.factory.resolution_repositories(repository_id)?;
        let descriptor_path = paths::pom_path(artifact, &version);
        let descriptor = match self
            .fetch_path(&descriptor_path, version::is_snapshot(&version), repositories)
            .await
        {
            Ok((_, path)) => tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::resolution(artifact.to_string(), e.into()))?,
            Err(e) => {
                warn!(
                    "no descriptor for {}, resolving without dependencies ({:#})",
                    artifact, e
                );
                return Ok(vec![root]);
            }
        };

        let dependencies =
            pom::parse_dependencies(&descriptor).map_err(|e| Error::resolution(artifact.to_string(), e))?;

        let mut resolved = vec![root];
        for dependency in dependencies {
            if !filter.accept(&dependency, 0) {
                continue;
            }
            let Some(dependency_version) = dependency.version.clone() else {
                warn!(
                    "skipping dependency {}:{} of {} without explicit version",
                    dependency.group_id, dependency.artifact_id, artifact
                );
                continue;
            };

            let mut dependency_artifact = Artifact::new(
                &dependency.group_id,
                &dependency.artifact_id,
                dependency_version,
            );
            dependency_artifact.classifier = dependency.classifier.clone().unwrap_or_default();
            dependency_artifact.extension = dependency.dependency_type.clone();

            resolved.push(self.resolve(&dependency_artifact, repository_id).await?);
        }
        Ok(resolved)
    }

    /// All known versions of an artifact across the queried repositories,
    /// ordered and filtered. An artifact no repository knows yields an
    /// empty list; all repositories failing to answer is an error.
    pub async fn resolve_available_versions(
        &self,
        group_id: &str,
        artifact_id: &str,
        repository_id: Option<&str>,
        oldest_first: bool,
        filter: &VersionFilter,
    ) -> crate::error::Result<Vec<String>> {
        let catalog = self.gather_catalog(group_id, artifact_id, repository_id).await?;
        Ok(version::sort_and_filter(catalog.into_versions(), oldest_first, filter))
    }

    /// Existence check for form validation; ordering is irrelevant here.
    pub async fn has_available_versions(
        &self,
        group_id: &str,
        artifact_id: &str,
        repository_id: Option<&str>,
        filter: &VersionFilter,
    ) -> crate::error::Result<bool> {
        let versions = self
            .resolve_available_versions(group_id, artifact_id, repository_id, false, filter)
            .await?;
        Ok(!versions.is_empty())
    }

    /// Installs a file (and its descriptor) into the local repository
    /// without touching any remote repository. A missing descriptor is
    /// generated from the coordinates. Returns the files placed in the
    /// layout, the artifact itself first.
    pub async fn install(&self, artifact: &Artifact) -> crate::error::Result<Vec<PathBuf>> {
        let version = artifact
            .version
            .as_deref()
            .ok_or_else(|| Error::installation(artifact.to_string(), anyhow!("no version given")))?;
        let source = artifact.target_file_name.as_deref().ok_or_else(|| {
            Error::installation(artifact.to_string(), anyhow!("no file to install"))
        })?;

        let destination = self.local_repository.join(paths::artifact_path(artifact, version));
        copy_into_layout(source, &destination)
            .await
            .map_err(|e| Error::installation(artifact.to_string(), e))?;

        let descriptor_destination = self.local_repository.join(paths::pom_path(artifact, version));
        self.place_descriptor(artifact, &descriptor_destination)
            .await
            .map_err(|e| Error::installation(artifact.to_string(), e))?;

        let rendered = destination.display().to_string();
        for listener in &self.listeners {
            listener.artifact_installed(artifact, &rendered);
        }

        debug!("installed {} at {}", artifact, rendered);
        Ok(vec![destination, descriptor_destination])
    }

    /// Deploys a file (and its descriptor, with checksum sidecars) to the
    /// deployment repository selected for the artifact's traffic type.
    pub async fn deploy(
        &self,
        artifact: &Artifact,
        repository_id: Option<&str>,
    ) -> crate::error::Result<DeployedArtifact> {
        let version = artifact
            .version
            .as_deref()
            .ok_or_else(|| Error::deployment(artifact.to_string(), anyhow!("no version given")))?;
        let source = artifact.target_file_name.as_deref().ok_or_else(|| {
            Error::deployment(artifact.to_string(), anyhow!("no file to deploy"))
        })?;

        let snapshot = version::is_snapshot(version);
        let repository = self.factory.deployment_repository(repository_id, snapshot)?;
        let repository_id = repository.id.clone();
        let client = RepositoryClient::new(repository, self.local_repository.clone());

        let path = paths::artifact_path(artifact, version);
        let url = client
            .put_file(&path, Path::new(source))
            .await
            .map_err(|e| Error::deployment(artifact.to_string(), e))?;

        let descriptor_path = paths::pom_path(artifact, version);
        match artifact.pom_file.as_deref() {
            Some(pom_file) => {
                client
                    .put_file(&descriptor_path, Path::new(pom_file))
                    .await
                    .map_err(|e| Error::deployment(artifact.to_string(), e))?;
            }
            None => {
                let generated =
                    pom::generate(artifact).map_err(|e| Error::deployment(artifact.to_string(), e))?;
                client
                    .put_file(&descriptor_path, generated.path())
                    .await
                    .map_err(|e| Error::deployment(artifact.to_string(), e))?;
            }
        }

        let deployed = DeployedArtifact {
            repository_id,
            group_id: artifact.group_id.clone(),
            artifact_id: artifact.artifact_id.clone(),
            version: version.to_string(),
            classifier: artifact.classifier.clone(),
            extension: artifact.extension().to_string(),
            snapshot,
            path,
            url,
        };

        for listener in &self.listeners {
            listener.artifact_deployed(&deployed);
        }
        Ok(deployed)
    }

    /// Pins a marker or range version to a concrete one via the merged
    /// metadata of the queried repositories.
    async fn pin_version(
        &self,
        artifact: &Artifact,
        requested: &str,
        repository_id: Option<&str>,
    ) -> crate::error::Result<String> {
        let catalog = self
            .gather_catalog(&artifact.group_id, &artifact.artifact_id, repository_id)
            .await?;

        version::resolve_alias(requested, catalog.versions(), catalog.latest(), catalog.release())
            .map_err(|e| Error::resolution(artifact.to_string(), e))
    }

    /// Fetches one layout path from the first repository that has it,
    /// restricted to repositories enabled for the traffic type.
    async fn fetch_path(
        &self,
        path: &str,
        snapshot: bool,
        repositories: Vec<RemoteRepository>,
    ) -> anyhow::Result<(String, PathBuf)> {
        let mut eligible = 0;
        let mut last_error = None;
        for repository in repositories {
            if !repository.handles(snapshot) {
                continue;
            }
            eligible += 1;

            let policy = *repository.policy(snapshot);
            let id = repository.id.clone();
            let client = RepositoryClient::new(repository, self.local_repository.clone());
            match client.fetch(path, &policy).await {
                Ok(local_path) => return Ok((id, local_path)),
                Err(e) => {
                    debug!("{} not available from [{}]: {:#}", path, id, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None if eligible == 0 => Err(anyhow!(
                "no repository accepts {} artifacts",
                if snapshot { "snapshot" } else { "release" }
            )),
            None => Err(anyhow!("{} not found in any repository", path)),
        }
    }

    /// Merges the version metadata of all queried repositories. A
    /// repository only contributes versions of traffic types it is enabled
    /// for, except repository managers, whose merged view is authoritative.
    async fn gather_catalog(
        &self,
        group_id: &str,
        artifact_id: &str,
        repository_id: Option<&str>,
    ) -> crate::error::Result<VersionCatalog> {
        let repositories = self.factory.resolution_repositories(repository_id)?;

        let mut catalog = VersionCatalog::default();
        let mut answered = 0;
        let mut last_error = None;
        let total = repositories.len();

        for repository in repositories {
            let client = RepositoryClient::new(repository, self.local_repository.clone());
            match client.fetch_metadata(group_id, artifact_id).await {
                Ok(Some(mut metadata)) => {
                    answered += 1;
                    gate_traffic_types(&mut metadata, client.repository());
                    catalog.merge(&metadata);
                }
                Ok(None) => answered += 1,
                Err(e) => {
                    warn!(
                        "version listing for {}:{} from [{}] failed: {:#}",
                        group_id,
                        artifact_id,
                        client.repository().id,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        if answered == 0 && total > 0 {
            let coordinate = format!("{}:{}", group_id, artifact_id);
            return Err(Error::resolution(
                coordinate,
                last_error.unwrap_or_else(|| anyhow!("no repository answered")),
            ));
        }
        Ok(catalog)
    }

    async fn place_descriptor(&self, artifact: &Artifact, destination: &Path) -> anyhow::Result<()> {
        match artifact.pom_file.as_deref() {
            Some(pom_file) => copy_into_layout(pom_file, destination).await,
            None => {
                let generated = pom::generate(artifact)?;
                if let Some(parent) = destination.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::copy(generated.path(), destination).await?;
                Ok(())
            }
        }
    }
}

fn requires_version_lookup(version: &str) -> bool {
    version == RELEASE_MARKER
        || version == LATEST_MARKER
        || version::VersionRange::is_range(version)
}

/// Drops the versions of traffic types the repository does not serve from
/// its metadata contribution. Repository managers serve the merged view of
/// everything behind them, so their metadata passes unfiltered.
fn gate_traffic_types(metadata: &mut crate::maven::metadata_xml::Metadata, repository: &RemoteRepository) {
    if repository.mirror_of_self {
        return;
    }
    let Some(versioning) = &mut metadata.versioning else {
        return;
    };

    if let Some(versions) = &mut versioning.versions {
        versions
            .version
            .retain(|v| repository.handles(version::is_snapshot(v)));
    }
    if let Some(latest) = versioning.latest.as_deref() {
        if !repository.handles(version::is_snapshot(latest)) {
            versioning.latest = None;
        }
    }
    if let Some(release) = versioning.release.as_deref() {
        if !repository.handles(version::is_snapshot(release)) {
            versioning.release = None;
        }
    }
}

async fn copy_into_layout(source: &str, destination: &Path) -> anyhow::Result<()> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(source, destination).await?;
    Ok(())
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use tempfile::TempDir;

    use super::*;
    use crate::config::repository::{Repository, RepositoryConfiguration, RepositoryType, UpdatePolicy};

    fn unreachable_configuration() -> RepositoryConfiguration {
        RepositoryConfiguration::new(vec![Repository::new("unreachable", "http://127.0.0.1:1/maven2")])
    }

    fn engine_with(configuration: RepositoryConfiguration, local: &TempDir) -> Engine {
        EngineBuilder::new(configuration)
            .local_repository(local.path().to_path_buf())
            .build()
            .unwrap()
    }

    #[derive(Default)]
    struct RecordingListener {
        installed: Mutex<Vec<String>>,
        resolved: Mutex<Vec<String>>,
    }

    impl RepositoryListener for RecordingListener {
        fn artifact_resolved(&self, artifact: &Artifact, _repository_id: &str, _local_path: &str) {
            self.resolved.lock().unwrap().push(artifact.to_string());
        }

        fn artifact_installed(&self, artifact: &Artifact, _local_path: &str) {
            self.installed.lock().unwrap().push(artifact.to_string());
        }
    }

    #[tokio::test]
    async fn test_install_places_file_and_generated_descriptor() {
        let workspace = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();

        let source = workspace.path().join("demo.jar");
        tokio::fs::write(&source, b"jar bytes").await.unwrap();

        let listener = Arc::new(RecordingListener::default());
        let engine = EngineBuilder::new(RepositoryConfiguration::default())
            .local_repository(local.path().to_path_buf())
            .listener(listener.clone())
            .build()
            .unwrap();

        let mut artifact = Artifact::new("org.example", "demo", "1.0.0");
        artifact.target_file_name = Some(source.display().to_string());

        let installed = engine.install(&artifact).await.unwrap();
        assert_eq!(
            installed,
            vec![
                local.path().join("org/example/demo/1.0.0/demo-1.0.0.jar"),
                local.path().join("org/example/demo/1.0.0/demo-1.0.0.pom"),
            ]
        );
        assert_eq!(tokio::fs::read(&installed[0]).await.unwrap(), b"jar bytes");

        let descriptor_text = tokio::fs::read_to_string(&installed[1]).await.unwrap();
        assert!(descriptor_text.contains("<artifactId>demo</artifactId>"));

        assert_eq!(
            listener.installed.lock().unwrap().as_slice(),
            ["org.example:demo:jar::1.0.0"]
        );
    }

    #[tokio::test]
    async fn test_install_with_explicit_descriptor() {
        let workspace = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();

        let source = workspace.path().join("demo.jar");
        tokio::fs::write(&source, b"jar bytes").await.unwrap();
        let pom = workspace.path().join("pom.xml");
        tokio::fs::write(&pom, b"<project>hand-written</project>").await.unwrap();

        let engine = engine_with(RepositoryConfiguration::default(), &local);

        let mut artifact = Artifact::new("org.example", "demo", "1.0.0");
        artifact.target_file_name = Some(source.display().to_string());
        artifact.pom_file = Some(pom.display().to_string());

        engine.install(&artifact).await.unwrap();

        let descriptor = local.path().join("org/example/demo/1.0.0/demo-1.0.0.pom");
        assert_eq!(
            tokio::fs::read(&descriptor).await.unwrap(),
            b"<project>hand-written</project>"
        );
    }

    #[tokio::test]
    async fn test_install_then_resolve_round_trips_bytes() {
        let workspace = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();

        let source = workspace.path().join("demo.jar");
        tokio::fs::write(&source, b"round trip bytes").await.unwrap();

        let mut repository = Repository::new("internal", "http://127.0.0.1:1/maven2");
        repository.release = Some(RepositoryType {
            update: UpdatePolicy::Never,
            ..Default::default()
        });
        let engine = engine_with(RepositoryConfiguration::new(vec![repository]), &local);

        let mut artifact = Artifact::new("org.example", "demo", "1.0.0");
        artifact.target_file_name = Some(source.display().to_string());
        engine.install(&artifact).await.unwrap();

        let resolved = engine
            .resolve(&Artifact::new("org.example", "demo", "1.0.0"), None)
            .await
            .unwrap();
        assert_eq!(
            tokio::fs::read(&resolved.path).await.unwrap(),
            b"round trip bytes"
        );
    }

    #[tokio::test]
    async fn test_install_without_file_is_an_installation_error() {
        let local = TempDir::new().unwrap();
        let engine = engine_with(RepositoryConfiguration::default(), &local);

        let error = engine
            .install(&Artifact::new("org.example", "demo", "1.0.0"))
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Installation { .. }));
        assert!(!error.is_fatal());
    }

    #[tokio::test]
    async fn test_resolve_without_version_is_a_resolution_error() {
        let local = TempDir::new().unwrap();
        let engine = engine_with(RepositoryConfiguration::default(), &local);

        let error = engine
            .resolve(&Artifact::without_version("org.example", "demo"), None)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Resolution { .. }));
    }

    #[tokio::test]
    async fn test_resolve_from_cache_under_never_policy() {
        let local = TempDir::new().unwrap();

        let cached = local.path().join("org/example/demo/1.0.0/demo-1.0.0.jar");
        tokio::fs::create_dir_all(cached.parent().unwrap()).await.unwrap();
        tokio::fs::write(&cached, b"cached bytes").await.unwrap();

        let mut repository = Repository::new("unreachable", "http://127.0.0.1:1/maven2");
        repository.release = Some(RepositoryType {
            update: UpdatePolicy::Never,
            ..Default::default()
        });

        let listener = Arc::new(RecordingListener::default());
        let engine = EngineBuilder::new(RepositoryConfiguration::new(vec![repository]))
            .local_repository(local.path().to_path_buf())
            .listener(listener.clone())
            .build()
            .unwrap();

        let resolved = engine
            .resolve(&Artifact::new("org.example", "demo", "1.0.0"), None)
            .await
            .unwrap();
        assert_eq!(resolved.path, cached);
        assert_eq!(resolved.repository_id, "unreachable");
        assert_eq!(
            listener.resolved.lock().unwrap().as_slice(),
            ["org.example:demo:jar::1.0.0"]
        );
    }

    #[tokio::test]
    async fn test_resolve_snapshot_with_snapshots_disabled_everywhere() {
        let local = TempDir::new().unwrap();
        // the default configuration is Maven Central, release traffic only
        let engine = engine_with(RepositoryConfiguration::default(), &local);

        let error = engine
            .resolve(&Artifact::new("org.example", "demo", "1.0-SNAPSHOT"), None)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Resolution { .. }));
    }

    #[tokio::test]
    async fn test_resolve_unknown_repository_id_is_fatal() {
        let local = TempDir::new().unwrap();
        let engine = engine_with(RepositoryConfiguration::default(), &local);

        let error = engine
            .resolve(&Artifact::new("org.example", "demo", "1.0.0"), Some("nope"))
            .await
            .unwrap_err();
        assert!(error.is_fatal());
    }

    #[tokio::test]
    async fn test_available_versions_error_when_no_repository_answers() {
        let local = TempDir::new().unwrap();
        let engine = engine_with(unreachable_configuration(), &local);

        let error = engine
            .resolve_available_versions("org.example", "demo", None, false, &VersionFilter::ALL)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Resolution { .. }));
    }

    #[tokio::test]
    async fn test_deploy_then_resolve_round_trips_bytes() {
        use crate::engine::events::DeployRecorder;
        use crate::engine::testserver::TestRepositoryServer;
        use crate::util::checksum::Checksums;

        let server = TestRepositoryServer::start().await;
        let workspace = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();

        let source = workspace.path().join("demo.jar");
        tokio::fs::write(&source, b"deployed bytes").await.unwrap();

        let recorder = Arc::new(DeployRecorder::new());
        let engine = EngineBuilder::new(RepositoryConfiguration::new(vec![Repository::new(
            "staging",
            server.url(),
        )]))
        .local_repository(local.path().to_path_buf())
        .listener(recorder.clone())
        .build()
        .unwrap();

        let mut artifact = Artifact::new("org.example", "demo", "1.0.0");
        artifact.target_file_name = Some(source.display().to_string());

        let deployed = engine.deploy(&artifact, None).await.unwrap();
        assert_eq!(deployed.repository_id, "staging");
        assert_eq!(deployed.path, "org/example/demo/1.0.0/demo-1.0.0.jar");
        assert_eq!(
            deployed.url,
            format!("{}/org/example/demo/1.0.0/demo-1.0.0.jar", server.url())
        );

        // artifact, descriptor and checksum sidecars all arrive
        assert_eq!(
            server.get("org/example/demo/1.0.0/demo-1.0.0.jar").unwrap(),
            b"deployed bytes"
        );
        let descriptor = server.get("org/example/demo/1.0.0/demo-1.0.0.pom").unwrap();
        assert!(String::from_utf8(descriptor)
            .unwrap()
            .contains("<artifactId>demo</artifactId>"));
        let checksums = Checksums::of_bytes(b"deployed bytes");
        assert_eq!(
            server
                .get("org/example/demo/1.0.0/demo-1.0.0.jar.sha1")
                .unwrap(),
            checksums.sha1.as_bytes()
        );
        assert_eq!(
            server
                .get("org/example/demo/1.0.0/demo-1.0.0.jar.md5")
                .unwrap(),
            checksums.md5.as_bytes()
        );

        let resolved = engine
            .resolve(&Artifact::new("org.example", "demo", "1.0.0"), None)
            .await
            .unwrap();
        assert_eq!(
            tokio::fs::read(&resolved.path).await.unwrap(),
            b"deployed bytes"
        );

        assert_eq!(recorder.records().len(), 1);
        assert_eq!(recorder.records()[0], deployed);
    }

    #[tokio::test]
    async fn test_deploy_without_file_is_a_deployment_error() {
        let local = TempDir::new().unwrap();
        let engine = engine_with(unreachable_configuration(), &local);

        let error = engine
            .deploy(&Artifact::new("org.example", "demo", "1.0.0"), None)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Deployment { .. }));
        assert!(!error.is_fatal());
    }

    #[tokio::test]
    async fn test_deploy_upload_failure_is_a_deployment_error() {
        let workspace = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();

        let source = workspace.path().join("demo.jar");
        tokio::fs::write(&source, b"jar bytes").await.unwrap();

        let engine = engine_with(unreachable_configuration(), &local);

        let mut artifact = Artifact::new("org.example", "demo", "1.0.0");
        artifact.target_file_name = Some(source.display().to_string());

        let error = engine.deploy(&artifact, None).await.unwrap_err();
        assert!(matches!(error, Error::Deployment { .. }));
    }

    #[test]
    fn test_version_lookup_detection() {
        assert!(requires_version_lookup("RELEASE"));
        assert!(requires_version_lookup("LATEST"));
        assert!(requires_version_lookup("[1.0,2.0)"));
        assert!(!requires_version_lookup("1.0.0"));
        assert!(!requires_version_lookup("1.0-SNAPSHOT"));
    }

    #[test]
    fn test_traffic_type_gating() {
        use crate::maven::metadata_xml;

        let xml = r#"<metadata><versioning>
            <latest>2.0-SNAPSHOT</latest><release>1.0</release>
            <versions><version>1.0</version><version>2.0-SNAPSHOT</version></versions>
        </versioning></metadata>"#;

        let release_only = RemoteRepository {
            id: "r".to_string(),
            url: "https://repo.example.com".to_string(),
            release_policy: crate::engine::remote_repo::RepositoryPolicy::default(),
            snapshot_policy: crate::engine::remote_repo::RepositoryPolicy::disabled(),
            authentication: None,
            proxy: None,
            mirror_of_self: false,
        };

        let mut metadata = metadata_xml::parse(xml).unwrap();
        gate_traffic_types(&mut metadata, &release_only);
        let versioning = metadata.versioning.as_ref().unwrap();
        assert_eq!(versioning.versions.as_ref().unwrap().version, vec!["1.0"]);
        assert!(versioning.latest.is_none());
        assert_eq!(versioning.release.as_deref(), Some("1.0"));

        // a repository manager's merged view passes unfiltered
        let mut manager = release_only;
        manager.mirror_of_self = true;
        let mut metadata = metadata_xml::parse(xml).unwrap();
        gate_traffic_types(&mut metadata, &manager);
        assert_eq!(
            metadata.versioning.unwrap().versions.unwrap().version,
            vec!["1.0", "2.0-SNAPSHOT"]
        );
    }
}
