use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::config::migration::CredentialWriter;

/// A username/secret pair looked up from the credential store. The secret
/// never appears in Debug output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Authentication {
    pub username: String,
    pub secret: String,
}

impl Authentication {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Authentication {
        Authentication {
            username: username.into(),
            secret: secret.into(),
        }
    }

    /// Value for an `Authorization: Basic` header.
    pub fn basic_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.secret);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

impl std::fmt::Debug for Authentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authentication")
            .field("username", &self.username)
            .field("secret", &"***")
            .finish()
    }
}

/// Read side of the credential store. A failed or empty lookup degrades the
/// connection to anonymous; it is never an error.
pub trait CredentialStore: Send + Sync {
    fn lookup(&self, credentials_id: &str) -> Option<Authentication>;
}

/// Credential store backed by a plain map, filled from the job file at
/// startup and by the legacy-credential migration.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    entries: HashMap<String, Authentication>,
}

impl InMemoryCredentialStore {
    pub fn new() -> InMemoryCredentialStore {
        InMemoryCredentialStore::default()
    }

    pub fn insert(&mut self, credentials_id: impl Into<String>, authentication: Authentication) {
        self.entries.insert(credentials_id.into(), authentication);
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn lookup(&self, credentials_id: &str) -> Option<Authentication> {
        self.entries.get(credentials_id).cloned()
    }
}

impl CredentialWriter for InMemoryCredentialStore {
    fn store(
        &mut self,
        credentials_id: &str,
        username: &str,
        secret: &str,
        _description: &str,
    ) -> anyhow::Result<()> {
        self.insert(credentials_id, Authentication::new(username, secret));
        Ok(())
    }
}
