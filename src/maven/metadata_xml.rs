//! Artifact-level `maven-metadata.xml` documents. Field names mirror the
//! XML element names so the documents deserialize without rename noise.

#![allow(non_snake_case)]

use serde::Deserialize;

use crate::maven::version;

#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub groupId: Option<String>,
    pub artifactId: Option<String>,
    pub versioning: Option<Versioning>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Versioning {
    pub latest: Option<String>,
    pub release: Option<String>,
    pub versions: Option<Versions>,
    pub lastUpdated: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Versions {
    #[serde(default)]
    pub version: Vec<String>,
}

pub fn parse(xml: &str) -> anyhow::Result<Metadata> {
    Ok(serde_xml_rs::from_str(xml)?)
}

/// The merged view over the metadata documents of all queried repositories.
///
/// Version lists are unioned in first-seen order; `latest` and `release`
/// hints are kept from whichever document carries the newest value.
#[derive(Debug, Default)]
pub struct VersionCatalog {
    versions: Vec<String>,
    latest: Option<String>,
    release: Option<String>,
}

impl VersionCatalog {
    pub fn merge(&mut self, metadata: &Metadata) {
        let Some(versioning) = &metadata.versioning else {
            return;
        };

        if let Some(versions) = &versioning.versions {
            for v in &versions.version {
                if !self.versions.contains(v) {
                    self.versions.push(v.clone());
                }
            }
        }

        merge_hint(&mut self.latest, versioning.latest.as_deref());
        merge_hint(&mut self.release, versioning.release.as_deref());
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty() && self.latest.is_none() && self.release.is_none()
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn latest(&self) -> Option<&str> {
        self.latest.as_deref()
    }

    pub fn release(&self) -> Option<&str> {
        self.release.as_deref()
    }

    pub fn into_versions(self) -> Vec<String> {
        self.versions
    }
}

fn merge_hint(current: &mut Option<String>, incoming: Option<&str>) {
    let Some(incoming) = incoming else {
        return;
    };
    let newer = match current.as_deref() {
        Some(existing) => version::compare(incoming, existing) == std::cmp::Ordering::Greater,
        None => true,
    };
    if newer {
        *current = Some(incoming.to_string());
    }
}
