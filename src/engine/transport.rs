//! HTTP transport against one remote repository: cache-aware downloads
//! into the local repository, metadata retrieval and deployment uploads.
//!
//! Instances do HTTP connection caching internally, so keeping them alive
//! for the duration of a batch has performance benefits.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{anyhow, bail};
use hyper::body::HttpBody;
use hyper::client::HttpConnector;
use hyper::header::{AUTHORIZATION, USER_AGENT};
use hyper::{Body, Client, Method, Request, StatusCode, Uri};
use hyper_tls::HttpsConnector;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, trace, warn};

use crate::config::repository::{ChecksumPolicy, UpdatePolicy};
use crate::engine::remote_repo::{RemoteRepository, RepositoryPolicy};
use crate::maven::metadata_xml::{self, Metadata};
use crate::maven::paths;
use crate::util::checksum::{self, ChecksumAccumulator, Checksums};

// Maven Central returns a 403 without a user agent
const USER_AGENT_STRING: &str = concat!("repo-connector/", env!("CARGO_PKG_VERSION"));

const DAILY_REFRESH: Duration = Duration::from_secs(24 * 60 * 60);

pub struct RepositoryClient {
    client: Client<HttpsConnector<HttpConnector>>,
    repository: RemoteRepository,
    local_repository: PathBuf,
}

impl RepositoryClient {
    pub fn new(repository: RemoteRepository, local_repository: PathBuf) -> RepositoryClient {
        RepositoryClient {
            client: Client::builder().build::<_, Body>(HttpsConnector::new()),
            repository,
            local_repository,
        }
    }

    pub fn repository(&self) -> &RemoteRepository {
        &self.repository
    }

    pub fn url_for(&self, path: &str) -> String {
        paths::join_url(&self.repository.url, path)
    }

    /// Fetches a layout path into the local repository, honoring the update
    /// policy against the cached copy. When a refresh fails but a cached
    /// copy exists, the cached copy is used with a warning.
    pub async fn fetch(&self, path: &str, policy: &RepositoryPolicy) -> anyhow::Result<PathBuf> {
        let cached = self.local_repository.join(path);
        let cached_at = modification_time(&cached);

        if !needs_remote(policy.update, cached_at) {
            trace!("using cached copy of {}", path);
            return Ok(cached);
        }

        match self.download(path, policy.checksum).await {
            Ok(downloaded) => Ok(downloaded),
            Err(e) if cached_at.is_some() => {
                warn!(
                    "refresh of {} from [{}] failed ({:#}), using cached copy",
                    path, self.repository.id, e
                );
                Ok(cached)
            }
            Err(e) => Err(e),
        }
    }

    /// Unconditionally downloads a layout path, hashing while writing and
    /// validating against the remote `.sha1` sidecar per the checksum
    /// policy. The file appears in the local repository atomically. The
    /// cache may be shared between concurrent builds, so staging goes
    /// through a uniquely named temp file in the target directory.
    pub async fn download(
        &self,
        path: &str,
        checksum_policy: ChecksumPolicy,
    ) -> anyhow::Result<PathBuf> {
        let target = self.local_repository.join(path);
        let parent = match target.parent() {
            Some(parent) => {
                tokio::fs::create_dir_all(parent).await?;
                parent.to_path_buf()
            }
            None => self.local_repository.clone(),
        };

        let mut response = self.request(Method::GET, path, Body::empty()).await?;
        if response.status() == StatusCode::NOT_FOUND {
            bail!("{} not found in [{}]", path, self.repository.id);
        }
        if !response.status().is_success() {
            bail!(
                "GET {} from [{}] failed with status {}",
                path,
                self.repository.id,
                response.status()
            );
        }

        let staged = tempfile::NamedTempFile::new_in(&parent)?;
        let mut accumulator = ChecksumAccumulator::new();
        let mut file = tokio::fs::File::from_std(staged.reopen()?);
        while let Some(chunk) = response.body_mut().data().await {
            let chunk = chunk?;
            accumulator.update(&chunk);
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        let checksums = accumulator.finalize();
        // a failed verification drops the temp file with it
        self.verify(path, &checksums, checksum_policy).await?;

        staged.persist(&target)?;
        debug!("downloaded {} from [{}]", path, self.repository.id);
        Ok(target)
    }

    async fn verify(
        &self,
        path: &str,
        checksums: &Checksums,
        policy: ChecksumPolicy,
    ) -> anyhow::Result<()> {
        if policy == ChecksumPolicy::Ignore {
            return Ok(());
        }

        let sidecar = format!("{}.sha1", path);
        let expected = match self.get_text(&sidecar).await {
            Ok(text) => text.and_then(|t| checksum::parse_sidecar(&t)),
            Err(e) => {
                debug!("cannot retrieve {}: {:#}", sidecar, e);
                None
            }
        };

        let problem = match expected {
            None => Some(format!("no checksum available for {}", path)),
            Some(expected) if expected != checksums.sha1 => Some(format!(
                "checksum mismatch for {}: expected {}, got {}",
                path, expected, checksums.sha1
            )),
            Some(_) => None,
        };

        match problem {
            None => Ok(()),
            Some(problem) if policy == ChecksumPolicy::Fail => Err(anyhow!(problem)),
            Some(problem) => {
                warn!("{}", problem);
                Ok(())
            }
        }
    }

    /// GET of a small text document. `None` for a 404, an error for any
    /// other non-success status.
    pub async fn get_text(&self, path: &str) -> anyhow::Result<Option<String>> {
        let response = self.request(Method::GET, path, Body::empty()).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = hyper::body::to_bytes(response.into_body()).await?;
                Ok(Some(String::from_utf8(body.to_vec())?))
            }
            status => bail!(
                "GET {} from [{}] failed with status {}",
                path,
                self.repository.id,
                status
            ),
        }
    }

    /// The artifact-level version metadata, always fetched fresh. `None`
    /// when the repository has never seen the artifact.
    pub async fn fetch_metadata(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> anyhow::Result<Option<Metadata>> {
        let path = paths::metadata_path(group_id, artifact_id);
        match self.get_text(&path).await? {
            None => Ok(None),
            Some(xml) => Ok(Some(metadata_xml::parse(&xml)?)),
        }
    }

    /// Streams a local file to the repository and uploads its checksum
    /// sidecars. Returns the upload URL.
    pub async fn put_file(&self, path: &str, file: &Path) -> anyhow::Result<String> {
        let checksums = Checksums::of_file(file).await?;

        let source = tokio::fs::File::open(file).await?;
        let body = Body::wrap_stream(ReaderStream::new(source));
        self.put(path, body).await?;

        self.put(&format!("{}.sha1", path), Body::from(checksums.sha1)).await?;
        self.put(&format!("{}.md5", path), Body::from(checksums.md5)).await?;

        debug!("uploaded {} to [{}]", path, self.repository.id);
        Ok(self.url_for(path))
    }

    async fn put(&self, path: &str, body: Body) -> anyhow::Result<()> {
        let response = self.request(Method::PUT, path, body).await?;
        if !response.status().is_success() {
            bail!(
                "PUT {} to [{}] failed with status {}",
                path,
                self.repository.id,
                response.status()
            );
        }
        Ok(())
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Body,
    ) -> anyhow::Result<hyper::Response<Body>> {
        let url = self.url_for(path);
        let mut builder = Request::builder()
            .method(method)
            .uri(Uri::try_from(url.clone())?)
            .header(USER_AGENT, USER_AGENT_STRING);

        if let Some(authentication) = &self.repository.authentication {
            builder = builder.header(AUTHORIZATION, authentication.basic_header());
        }

        let request = builder.body(body)?;
        trace!("{} {}", request.method(), url);
        Ok(self.client.request(request).await?)
    }
}

/// Whether the update policy requires contacting the remote repository,
/// given the cached copy's modification time.
fn needs_remote(policy: UpdatePolicy, cached_at: Option<SystemTime>) -> bool {
    match (policy, cached_at) {
        (_, None) => true,
        (UpdatePolicy::Never, Some(_)) => false,
        (UpdatePolicy::Always, Some(_)) => true,
        (UpdatePolicy::Daily, Some(modified)) => match modified.elapsed() {
            Ok(age) => age >= DAILY_REFRESH,
            Err(_) => false,
        },
    }
}

fn modification_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
