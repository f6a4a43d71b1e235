mod config;
mod engine;
mod error;
mod maven;
mod steps;
mod util;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use crate::config::migration;
use crate::config::repository::RepositoryConfiguration;
use crate::engine::auth::{Authentication, InMemoryCredentialStore};
use crate::engine::events::{ConsoleRepositoryListener, DeployRecorder};
use crate::engine::proxy::{Proxy, ProxySelector};
use crate::engine::EngineBuilder;
use crate::steps::{ArtifactDeployer, ArtifactResolver, DirWorkspace, VersionParameter};

/// One build's worth of work, as handed over by the orchestrator.
#[derive(Deserialize)]
struct JobFile {
    #[serde(default)]
    configuration: RepositoryConfiguration,
    /// Credential store entries by id, referenced from the configuration.
    #[serde(default)]
    credentials: HashMap<String, CredentialEntry>,
    #[serde(default)]
    proxy: Option<ProxyConfig>,
    #[serde(default)]
    workspace: Option<PathBuf>,
    #[serde(default)]
    resolve: Option<ArtifactResolver>,
    #[serde(default)]
    deploy: Option<ArtifactDeployer>,
    #[serde(default)]
    versions: Option<VersionParameter>,
}

#[derive(Deserialize)]
struct CredentialEntry {
    username: String,
    secret: String,
}

#[derive(Deserialize)]
struct ProxyConfig {
    host: String,
    port: u16,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    secret: Option<String>,
    /// Hosts reached directly; whitespace, comma or pipe separated, with
    /// `*` wildcards.
    #[serde(default)]
    exclusions: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let job_path = std::env::args()
        .nth(1)
        .context("usage: repo-connector <job-file.json>")?;
    let job: JobFile = serde_json::from_str(
        &std::fs::read_to_string(&job_path)
            .with_context(|| format!("cannot read job file {}", job_path))?,
    )
    .with_context(|| format!("cannot parse job file {}", job_path))?;

    let mut configuration = job.configuration;
    let mut store = InMemoryCredentialStore::new();
    for (id, entry) in job.credentials {
        store.insert(id, Authentication::new(entry.username, entry.secret));
    }
    migration::migrate(&mut configuration, &mut store)?;

    let proxy_selector = match job.proxy {
        Some(proxy_config) => {
            let mut proxy = Proxy::new(proxy_config.host, proxy_config.port);
            if let (Some(username), Some(secret)) = (proxy_config.username, proxy_config.secret) {
                proxy.authentication = Some(Authentication::new(username, secret));
            }
            ProxySelector::new(Some(proxy), &proxy_config.exclusions)
        }
        None => ProxySelector::default(),
    };

    let recorder = Arc::new(DeployRecorder::new());
    let engine = EngineBuilder::new(configuration)
        .credentials(Arc::new(store))
        .proxy_selector(proxy_selector)
        .listener(Arc::new(ConsoleRepositoryListener))
        .listener(recorder.clone())
        .build()?;

    let workspace = DirWorkspace::new(job.workspace.unwrap_or_else(|| PathBuf::from(".")));

    if let Some(step) = job.resolve {
        let outcome = step.run(&engine, &workspace).await?;
        info!(
            "resolve step done: {} resolved, {} skipped",
            outcome.resolved.len(),
            outcome.skipped.len()
        );
    }

    if let Some(step) = job.deploy {
        step.run(&engine, &workspace).await?;
        let records = recorder.records();
        if !records.is_empty() {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    if let Some(step) = job.versions {
        for choice in step.list_choices(&engine).await? {
            println!("{}", choice);
        }
    }

    Ok(())
}
