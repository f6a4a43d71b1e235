//! Wiring of configured repositories into connected `RemoteRepository`
//! instances: credential lookup, proxy selection, per-traffic-type policy
//! and deployment overrides all happen here.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::repository::{Repository, RepositoryConfiguration};
use crate::engine::auth::{Authentication, CredentialStore};
use crate::engine::proxy::ProxySelector;
use crate::engine::remote_repo::{RemoteRepository, RepositoryPolicy};
use crate::error::Error;

pub struct RemoteRepositoryFactory {
    configuration: RepositoryConfiguration,
    credentials: Arc<dyn CredentialStore>,
    proxy_selector: ProxySelector,
}

impl RemoteRepositoryFactory {
    pub fn new(
        configuration: RepositoryConfiguration,
        credentials: Arc<dyn CredentialStore>,
        proxy_selector: ProxySelector,
    ) -> RemoteRepositoryFactory {
        RemoteRepositoryFactory {
            configuration,
            credentials,
            proxy_selector,
        }
    }

    pub fn configuration(&self) -> &RepositoryConfiguration {
        &self.configuration
    }

    /// The repositories consulted for a resolution, in configured order.
    /// `None` means all of them; a concrete id restricts the search to that
    /// repository and is an error when it is not configured.
    pub fn resolution_repositories(
        &self,
        repository_id: Option<&str>,
    ) -> crate::error::Result<Vec<RemoteRepository>> {
        let configured = self.configuration.repositories();
        if configured.is_empty() {
            return Err(Error::Configuration("no repositories configured".to_string()));
        }

        match repository_id {
            None => Ok(configured.iter().map(|r| self.connect(r)).collect()),
            Some(id) => {
                let repository = self.configuration.find(id).ok_or_else(|| {
                    Error::Configuration(format!("no repository configured with id [{}]", id))
                })?;
                Ok(vec![self.connect(repository)])
            }
        }
    }

    /// The single repository a deployment goes to. With no explicit id this
    /// only works when exactly one repository is configured; the per-type
    /// URL and credentials overrides of the deployed traffic type apply.
    pub fn deployment_repository(
        &self,
        repository_id: Option<&str>,
        snapshot: bool,
    ) -> crate::error::Result<RemoteRepository> {
        let repository = match repository_id {
            Some(id) => self.configuration.find(id).ok_or_else(|| {
                Error::Configuration(format!("no repository configured with id [{}]", id))
            })?,
            None => match self.configuration.repositories() {
                [single] => single,
                [] => {
                    return Err(Error::Configuration("no repositories configured".to_string()))
                }
                _ => {
                    return Err(Error::Configuration(
                        "no deployment repository id given and more than one repository configured"
                            .to_string(),
                    ))
                }
            },
        };

        let mut connected = self.connect(repository);

        let override_type = if snapshot {
            repository.snapshot.as_ref()
        } else {
            repository.release.as_ref()
        };
        if let Some(override_type) = override_type {
            if let Some(url) = override_type.url.as_deref().filter(|u| !u.is_empty()) {
                debug!(
                    "deployment url override for repository [{}]: {}",
                    repository.id, url
                );
                connected.url = url.to_string();
            }
            if let Some(credentials_id) = override_type.credentials_id.as_deref() {
                connected.authentication = self.lookup(&repository.id, credentials_id);
            }
        }

        Ok(connected)
    }

    fn connect(&self, repository: &Repository) -> RemoteRepository {
        let authentication = repository
            .credentials_id
            .as_deref()
            .and_then(|id| self.lookup(&repository.id, id));

        RemoteRepository {
            id: repository.id.clone(),
            url: repository.url.clone(),
            release_policy: RepositoryPolicy::from_type(
                repository.enable_release,
                repository.release.as_ref(),
            ),
            snapshot_policy: RepositoryPolicy::from_type(
                repository.enable_snapshot,
                repository.snapshot.as_ref(),
            ),
            authentication,
            proxy: self.proxy_selector.select(&repository.url).cloned(),
            mirror_of_self: repository.repository_manager,
        }
    }

    /// A lookup miss degrades to an anonymous connection.
    fn lookup(&self, repository_id: &str, credentials_id: &str) -> Option<Authentication> {
        let found = self.credentials.lookup(credentials_id);
        if found.is_none() {
            warn!(
                "credentials [{}] for repository [{}] not found, connecting anonymously",
                credentials_id, repository_id
            );
        }
        found
    }
}
