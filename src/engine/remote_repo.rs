use crate::config::repository::{ChecksumPolicy, RepositoryType, UpdatePolicy};
use crate::engine::auth::Authentication;
use crate::engine::proxy::Proxy;

/// Per-traffic-type behavior of a connected repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryPolicy {
    pub enabled: bool,
    pub update: UpdatePolicy,
    pub checksum: ChecksumPolicy,
}

impl RepositoryPolicy {
    pub fn enabled(update: UpdatePolicy, checksum: ChecksumPolicy) -> RepositoryPolicy {
        RepositoryPolicy {
            enabled: true,
            update,
            checksum,
        }
    }

    pub fn disabled() -> RepositoryPolicy {
        RepositoryPolicy {
            enabled: false,
            update: UpdatePolicy::default(),
            checksum: ChecksumPolicy::default(),
        }
    }

    pub fn from_type(enabled: bool, repository_type: Option<&RepositoryType>) -> RepositoryPolicy {
        if !enabled {
            return RepositoryPolicy::disabled();
        }
        match repository_type {
            Some(t) => RepositoryPolicy::enabled(t.update, t.checksum),
            None => RepositoryPolicy::enabled(UpdatePolicy::default(), ChecksumPolicy::default()),
        }
    }
}

impl Default for RepositoryPolicy {
    fn default() -> Self {
        RepositoryPolicy::enabled(UpdatePolicy::default(), ChecksumPolicy::default())
    }
}

/// A fully wired remote repository: configuration resolved against the
/// credential store and the proxy selector, ready for transport use.
///
/// `mirror_of_self` marks repository managers; a managed repository serves
/// the merged view of everything behind it, so its own metadata is
/// authoritative and snapshot version listings must come from it directly.
#[derive(Debug, Clone)]
pub struct RemoteRepository {
    pub id: String,
    pub url: String,
    pub release_policy: RepositoryPolicy,
    pub snapshot_policy: RepositoryPolicy,
    pub authentication: Option<Authentication>,
    pub proxy: Option<Proxy>,
    pub mirror_of_self: bool,
}

impl RemoteRepository {
    pub fn policy(&self, snapshot: bool) -> &RepositoryPolicy {
        if snapshot {
            &self.snapshot_policy
        } else {
            &self.release_policy
        }
    }

    /// Whether the repository accepts the given traffic type at all.
    pub fn handles(&self, snapshot: bool) -> bool {
        self.policy(snapshot).enabled
    }
}

impl std::fmt::Display for RemoteRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} @ {}]", self.id, self.url)
    }
}
