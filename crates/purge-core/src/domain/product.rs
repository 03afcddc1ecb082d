//! One installed product version and the artifacts it references.
//!
//! Versions are built from one product entry of the persisted catalog and are
//! immutable afterwards.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use super::artifact::{
    ArtifactRef, BootImage, ContainerImage, HelmChart, HostedRepository, Manifest, ObjectArtifact,
    Recipe,
};
use super::ids::ProductKey;

/// Repository type that marks a repository as owned by the product version.
pub const HOSTED_REPOSITORY_TYPE: &str = "hosted";

#[derive(Debug, Clone, PartialEq)]
pub struct ProductVersion {
    key: ProductKey,
    pub(crate) container_images: Vec<ContainerImage>,
    pub(crate) object_artifacts: Vec<ObjectArtifact>,
    pub(crate) helm_charts: Vec<HelmChart>,
    pub(crate) manifests: Vec<Manifest>,
    pub(crate) boot_images: Vec<BootImage>,
    pub(crate) recipes: Vec<Recipe>,
    pub(crate) hosted_repositories: Vec<HostedRepository>,
}

impl ProductVersion {
    /// A version with no artifacts. Use the `with_*` methods to populate it.
    pub fn new(key: ProductKey) -> Self {
        Self {
            key,
            container_images: Vec::new(),
            object_artifacts: Vec::new(),
            helm_charts: Vec::new(),
            manifests: Vec::new(),
            boot_images: Vec::new(),
            recipes: Vec::new(),
            hosted_repositories: Vec::new(),
        }
    }

    pub fn key(&self) -> &ProductKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn version(&self) -> &str {
        &self.key.version
    }

    /// This version's artifacts of kind `A`.
    pub fn artifacts<A: ArtifactRef>(&self) -> &[A] {
        A::artifacts_of(self)
    }

    pub fn with_container_image(mut self, image: ContainerImage) -> Self {
        self.container_images.push(image);
        self
    }

    pub fn with_object_artifact(mut self, object: ObjectArtifact) -> Self {
        self.object_artifacts.push(object);
        self
    }

    pub fn with_helm_chart(mut self, chart: HelmChart) -> Self {
        self.helm_charts.push(chart);
        self
    }

    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        self.manifests.push(manifest);
        self
    }

    pub fn with_boot_image(mut self, image: BootImage) -> Self {
        self.boot_images.push(image);
        self
    }

    pub fn with_recipe(mut self, recipe: Recipe) -> Self {
        self.recipes.push(recipe);
        self
    }

    pub fn with_hosted_repository(mut self, repo: HostedRepository) -> Self {
        self.hosted_repositories.push(repo);
        self
    }

    /// Parse every version of one product from its catalog entry text.
    ///
    /// The entry is a JSON object mapping version strings to version data.
    pub fn parse_entry(product_name: &str, entry: &str) -> Result<Vec<ProductVersion>, EntryParseError> {
        let versions: BTreeMap<String, RawVersion> =
            serde_json::from_str(entry).map_err(|e| EntryParseError {
                product: product_name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(versions
            .into_iter()
            .map(|(version, raw)| raw.into_product(ProductKey::new(product_name, version)))
            .collect())
    }
}

impl fmt::Display for ProductVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key.fmt(f)
    }
}

/// A product entry that could not be read as structured data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("entry for product {product} is malformed: {reason}")]
pub struct EntryParseError {
    pub product: String,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// On-disk shape of one version's data. Unknown keys are ignored; absent or
// null sections mean "no artifacts of that kind".
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct RawVersion {
    #[serde(default)]
    component_versions: Option<RawComponents>,
    #[serde(default)]
    images: Option<BTreeMap<String, RawIndexEntry>>,
    #[serde(default)]
    recipes: Option<BTreeMap<String, RawIndexEntry>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawComponents {
    #[serde(default)]
    docker: Option<RawDocker>,
    #[serde(default)]
    s3: Option<Vec<ObjectArtifact>>,
    #[serde(default)]
    helm: Option<Vec<RawNameVersion>>,
    #[serde(default)]
    manifests: Option<Vec<String>>,
    #[serde(default)]
    repositories: Option<Vec<HostedRepository>>,
}

/// Docker images are recorded either as a list of `{name, version}` or, in
/// older entries, as a map of `name -> version`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocker {
    List(Vec<RawNameVersion>),
    Map(BTreeMap<String, String>),
}

#[derive(Debug, Deserialize)]
struct RawNameVersion {
    name: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct RawIndexEntry {
    id: String,
}

impl RawVersion {
    fn into_product(self, key: ProductKey) -> ProductVersion {
        let mut product = ProductVersion::new(key);
        let components = self.component_versions.unwrap_or_default();

        product.container_images = match components.docker {
            Some(RawDocker::List(list)) => list
                .into_iter()
                .map(|d| ContainerImage::new(d.name, d.version))
                .collect(),
            Some(RawDocker::Map(map)) => map
                .into_iter()
                .map(|(name, tag)| ContainerImage::new(name, tag))
                .collect(),
            None => Vec::new(),
        };
        product.object_artifacts = components.s3.unwrap_or_default();
        product.helm_charts = components
            .helm
            .unwrap_or_default()
            .into_iter()
            .map(|h| HelmChart::new(h.name, h.version))
            .collect();
        product.manifests = components
            .manifests
            .unwrap_or_default()
            .into_iter()
            .map(Manifest::new)
            .collect();
        product.hosted_repositories = components
            .repositories
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.repo_type == HOSTED_REPOSITORY_TYPE)
            .collect();
        product.boot_images = self
            .images
            .unwrap_or_default()
            .into_iter()
            .map(|(name, entry)| BootImage::new(name, entry.id))
            .collect();
        product.recipes = self
            .recipes
            .unwrap_or_default()
            .into_iter()
            .map(|(name, entry)| Recipe::new(name, entry.id))
            .collect();
        product
    }
}
