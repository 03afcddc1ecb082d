//! Artifact references, one type per artifact kind.
//!
//! A reference is a plain tuple that identifies one deletable artifact.
//! Equality is structural per kind: names, tags and keys are compared
//! byte-for-byte with no normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::product::ProductVersion;

/// The kinds of artifacts a product version can own.
///
/// `ORDER` is the order in which a removal run processes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    ContainerImage,
    ObjectArtifact,
    HelmChart,
    Manifest,
    BootImage,
    Recipe,
    HostedRepository,
}

impl ArtifactKind {
    pub const ORDER: [ArtifactKind; 7] = [
        ArtifactKind::ContainerImage,
        ArtifactKind::ObjectArtifact,
        ArtifactKind::HelmChart,
        ArtifactKind::Manifest,
        ArtifactKind::BootImage,
        ArtifactKind::Recipe,
        ArtifactKind::HostedRepository,
    ];

    /// Human readable plural used in log lines and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::ContainerImage => "container images",
            ArtifactKind::ObjectArtifact => "object storage artifacts",
            ArtifactKind::HelmChart => "helm charts",
            ArtifactKind::Manifest => "manifests",
            ArtifactKind::BootImage => "boot images",
            ArtifactKind::Recipe => "recipes",
            ArtifactKind::HostedRepository => "hosted repositories",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Common behaviour of every artifact reference type.
///
/// `artifacts_of` is the kind accessor: it picks this kind's list out of a
/// product version, which is what lets the resolver and orchestrator stay
/// generic over the seven kinds.
pub trait ArtifactRef: fmt::Display + fmt::Debug + Clone + PartialEq + Send + Sync + 'static {
    const KIND: ArtifactKind;

    fn artifacts_of(product: &ProductVersion) -> &[Self];
}

/// A container image in the registry: `(name, tag)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerImage {
    pub name: String,
    pub tag: String,
}

impl ContainerImage {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }
}

impl fmt::Display for ContainerImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}

impl ArtifactRef for ContainerImage {
    const KIND: ArtifactKind = ArtifactKind::ContainerImage;

    fn artifacts_of(product: &ProductVersion) -> &[Self] {
        &product.container_images
    }
}

/// An object in object storage: `(bucket, key)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectArtifact {
    pub bucket: String,
    pub key: String,
}

impl ObjectArtifact {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.bucket, self.key)
    }
}

impl ArtifactRef for ObjectArtifact {
    const KIND: ArtifactKind = ArtifactKind::ObjectArtifact;

    fn artifacts_of(product: &ProductVersion) -> &[Self] {
        &product.object_artifacts
    }
}

/// A chart stored as a component of the package repository: `(name, version)`.
///
/// The component id is not part of the catalog; it is looked up at removal
/// time by listing the chart repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HelmChart {
    pub name: String,
    pub version: String,
}

impl HelmChart {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for HelmChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

impl ArtifactRef for HelmChart {
    const KIND: ArtifactKind = ArtifactKind::HelmChart;

    fn artifacts_of(product: &ProductVersion) -> &[Self] {
        &product.helm_charts
    }
}

/// A configuration manifest, identified by its storage key as recorded in
/// the catalog (including the logical prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Manifest {
    pub key: String,
}

impl Manifest {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl ArtifactRef for Manifest {
    const KIND: ArtifactKind = ArtifactKind::Manifest;

    fn artifacts_of(product: &ProductVersion) -> &[Self] {
        &product.manifests
    }
}

/// A boot image registered in the image index: `(display name, index id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BootImage {
    pub name: String,
    pub id: String,
}

impl BootImage {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for BootImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.id)
    }
}

impl ArtifactRef for BootImage {
    const KIND: ArtifactKind = ArtifactKind::BootImage;

    fn artifacts_of(product: &ProductVersion) -> &[Self] {
        &product.boot_images
    }
}

/// An image recipe registered in the image index: `(display name, index id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub id: String,
}

impl Recipe {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.id)
    }
}

impl ArtifactRef for Recipe {
    const KIND: ArtifactKind = ArtifactKind::Recipe;

    fn artifacts_of(product: &ProductVersion) -> &[Self] {
        &product.recipes
    }
}

/// A hosted package repository: `(name, type)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostedRepository {
    pub name: String,
    #[serde(rename = "type", default)]
    pub repo_type: String,
}

impl HostedRepository {
    pub fn new(name: impl Into<String>, repo_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repo_type: repo_type.into(),
        }
    }
}

impl fmt::Display for HostedRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl ArtifactRef for HostedRepository {
    const KIND: ArtifactKind = ArtifactKind::HostedRepository;

    fn artifacts_of(product: &ProductVersion) -> &[Self] {
        &product.hosted_repositories
    }
}
