use async_trait::async_trait;
use std::sync::Arc;

use super::{RemoveError, Removal, Remover, settle};
use crate::domain::{ArtifactRef, Manifest};
use crate::ports::ObjectStore;

/// Deletes configuration manifests from their storage bucket.
///
/// Catalog keys carry the bucket's logical prefix (`config-data/...`); the
/// prefix is stripped before the delete call.
pub struct ManifestRemover {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    prefix: String,
}

impl ManifestRemover {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    pub fn storage_key<'a>(&self, manifest: &'a Manifest) -> &'a str {
        manifest
            .key
            .strip_prefix(self.prefix.as_str())
            .unwrap_or(&manifest.key)
    }
}

#[async_trait]
impl Remover<Manifest> for ManifestRemover {
    async fn remove(&self, manifest: &Manifest) -> Result<Removal, RemoveError> {
        let key = self.storage_key(manifest);
        tracing::debug!(bucket = %self.bucket, key, "removing manifest");
        let status = self
            .store
            .delete_object(&self.bucket, key)
            .await
            .map_err(|e| RemoveError::client(manifest, e))?;
        Ok(settle(Manifest::KIND, manifest, status.into()))
    }
}
