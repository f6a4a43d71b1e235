use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::config::repository::RepositoryConfiguration;
use crate::engine::auth::{CredentialStore, InMemoryCredentialStore};
use crate::engine::events::RepositoryListener;
use crate::engine::factory::RemoteRepositoryFactory;
use crate::engine::proxy::ProxySelector;
use crate::engine::Engine;
use crate::error::Error;

/// Assembles an [`Engine`] from the repository configuration and its
/// collaborators. Building validates the configuration and creates the
/// local repository directory; both failures are configuration errors.
pub struct EngineBuilder {
    configuration: RepositoryConfiguration,
    credentials: Arc<dyn CredentialStore>,
    proxy_selector: ProxySelector,
    listeners: Vec<Arc<dyn RepositoryListener>>,
    local_repository: Option<PathBuf>,
}

impl EngineBuilder {
    pub fn new(configuration: RepositoryConfiguration) -> EngineBuilder {
        EngineBuilder {
            configuration,
            credentials: Arc::new(InMemoryCredentialStore::new()),
            proxy_selector: ProxySelector::default(),
            listeners: Vec::new(),
            local_repository: None,
        }
    }

    pub fn credentials(mut self, credentials: Arc<dyn CredentialStore>) -> EngineBuilder {
        self.credentials = credentials;
        self
    }

    pub fn proxy_selector(mut self, proxy_selector: ProxySelector) -> EngineBuilder {
        self.proxy_selector = proxy_selector;
        self
    }

    pub fn listener(mut self, listener: Arc<dyn RepositoryListener>) -> EngineBuilder {
        self.listeners.push(listener);
        self
    }

    /// Overrides the local repository location from the configuration, used
    /// for builds that need an isolated cache.
    pub fn local_repository(mut self, path: PathBuf) -> EngineBuilder {
        self.local_repository = Some(path);
        self
    }

    pub fn build(self) -> crate::error::Result<Engine> {
        self.configuration.validate().map_err(Error::Configuration)?;

        let local_repository = self
            .local_repository
            .unwrap_or_else(|| self.configuration.local_repository_path());
        std::fs::create_dir_all(&local_repository).map_err(|e| {
            Error::Configuration(format!(
                "cannot create local repository at {}: {}",
                local_repository.display(),
                e
            ))
        })?;
        debug!("local repository at {}", local_repository.display());

        let factory = RemoteRepositoryFactory::new(
            self.configuration,
            self.credentials,
            self.proxy_selector,
        );

        Ok(Engine::new(factory, local_repository, self.listeners))
    }
}
