use std::cmp::Ordering;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_REPOSITORY_ID: &str = "central";
pub const CENTRAL_URL: &str = "https://repo1.maven.org/maven2";

const LOCAL_REPOSITORY_DIR: &str = "repo-connector-repo";

/// How downloaded files are validated against their `.sha1` sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    Fail,
    #[default]
    Warn,
    Ignore,
}

/// How often a locally cached copy is refreshed from the remote repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePolicy {
    Always,
    #[default]
    Daily,
    Never,
}

/// Per-traffic-type (release or snapshot) settings of a repository. The URL
/// and credentials id, when present, override the repository-level values
/// for deployments of that type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RepositoryType {
    #[serde(default)]
    pub checksum: ChecksumPolicy,
    #[serde(default)]
    pub update: UpdatePolicy,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub credentials_id: Option<String>,
}

/// A configured remote repository artifacts can be resolved from or
/// deployed to. Identity is the id alone; two entries with the same id are
/// the same repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    #[serde(default = "default_repository_id")]
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub repository_manager: bool,
    #[serde(default = "default_true")]
    pub enable_release: bool,
    #[serde(default = "default_true")]
    pub enable_snapshot: bool,
    #[serde(default)]
    pub release: Option<RepositoryType>,
    #[serde(default)]
    pub snapshot: Option<RepositoryType>,
    #[serde(default)]
    pub credentials_id: Option<String>,
    /// Legacy plaintext credentials, present only until migration has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn default_repository_id() -> String {
    DEFAULT_REPOSITORY_ID.to_string()
}

fn default_true() -> bool {
    true
}

impl Repository {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Repository {
        let id = id.into();
        Repository {
            id: if id.is_empty() { default_repository_id() } else { id },
            url: url.into(),
            repository_manager: false,
            enable_release: true,
            enable_snapshot: true,
            release: None,
            snapshot: None,
            credentials_id: None,
            user: None,
            password: None,
        }
    }

    /// The well-known default: Maven Central, release traffic only.
    pub fn central() -> Repository {
        let mut repository = Repository::new(DEFAULT_REPOSITORY_ID, CENTRAL_URL);
        repository.enable_snapshot = false;
        repository
    }

    pub fn has_legacy_credentials(&self) -> bool {
        self.user.as_deref().map(|u| !u.is_empty()).unwrap_or(false)
    }
}

impl PartialEq for Repository {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Repository {}

impl PartialOrd for Repository {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Repository {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[repository id={}, url={}, repository_manager={}]",
            self.id, self.url, self.repository_manager
        )
    }
}

/// The full in-memory repository configuration of one process. Loaded once
/// at startup and treated as immutable during a build; `replace` is the
/// explicit reload operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfiguration {
    #[serde(default)]
    repositories: Vec<Repository>,
    #[serde(default)]
    pub local_repository: Option<PathBuf>,
    #[serde(default)]
    pub credentials_migrated: bool,
}

impl Default for RepositoryConfiguration {
    fn default() -> Self {
        RepositoryConfiguration {
            repositories: vec![Repository::central()],
            local_repository: None,
            credentials_migrated: false,
        }
    }
}

impl RepositoryConfiguration {
    pub fn new(repositories: Vec<Repository>) -> RepositoryConfiguration {
        let mut configuration = RepositoryConfiguration::default();
        configuration.replace(repositories);
        configuration
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn repositories_mut(&mut self) -> &mut [Repository] {
        &mut self.repositories
    }

    pub fn find(&self, id: &str) -> Option<&Repository> {
        self.repositories.iter().find(|r| r.id == id)
    }

    /// Replaces the repository set wholesale. Duplicate ids keep the first
    /// occurrence; an empty set falls back to the well-known default.
    pub fn replace(&mut self, repositories: Vec<Repository>) {
        let mut replacement: Vec<Repository> = Vec::with_capacity(repositories.len());
        for repository in repositories {
            if replacement.iter().any(|r| r.id == repository.id) {
                debug!("dropping duplicate repository id [{}]", repository.id);
                continue;
            }
            replacement.push(repository);
        }

        if replacement.is_empty() {
            replacement.push(Repository::central());
        }

        replacement.sort();
        self.repositories = replacement;
    }

    /// The on-disk local repository used for install/resolve caching, shared
    /// across job executions. Defaults to a fixed subdirectory of the
    /// platform temp directory.
    pub fn local_repository_path(&self) -> PathBuf {
        self.local_repository
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(LOCAL_REPOSITORY_DIR))
    }

    /// Sanity check applied after load: every repository needs a URL and at
    /// least one enabled traffic type.
    pub fn validate(&self) -> Result<(), String> {
        for repository in &self.repositories {
            if repository.url.is_empty() {
                return Err(format!("repository [{}] has no url", repository.id));
            }
            if !repository.enable_release && !repository.enable_snapshot {
                return Err(format!(
                    "repository [{}] has both release and snapshot traffic disabled",
                    repository.id
                ));
            }
        }
        Ok(())
    }
}
