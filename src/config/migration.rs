use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::repository::RepositoryConfiguration;

/// Migration runs once at startup; a failure here must abort startup rather
/// than silently leave plaintext secrets in the configuration.
#[derive(Debug, Error)]
#[error("credential migration failed for repository [{repository_id}]: {source}")]
pub struct MigrationError {
    pub repository_id: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

/// Write side of the credential store, used only during migration.
pub trait CredentialWriter {
    fn store(
        &mut self,
        credentials_id: &str,
        username: &str,
        secret: &str,
        description: &str,
    ) -> anyhow::Result<()>;
}

/// Moves legacy plaintext user/password pairs into the credential store and
/// rewrites the repositories to hold only the generated opaque id.
/// Idempotent: guarded by the configuration's persisted `migrated` flag.
pub fn migrate(
    configuration: &mut RepositoryConfiguration,
    store: &mut dyn CredentialWriter,
) -> Result<(), MigrationError> {
    if configuration.credentials_migrated {
        return Ok(());
    }

    for repository in configuration.repositories_mut() {
        if !repository.has_legacy_credentials() {
            continue;
        }

        info!(
            "legacy credentials found for repository id [{}], migrating",
            repository.id
        );

        let credentials_id = Uuid::new_v4().to_string();
        let username = repository.user.clone().unwrap_or_default();
        let secret = repository.password.clone().unwrap_or_default();
        let description = format!("migrated from repository [{}]", repository.id);

        store
            .store(&credentials_id, &username, &secret, &description)
            .map_err(|e| MigrationError {
                repository_id: repository.id.clone(),
                source: e.into(),
            })?;

        repository.credentials_id = Some(credentials_id);
        repository.user = None;
        repository.password = None;
    }

    configuration.credentials_migrated = true;
    Ok(())
}
