//! Boot image and recipe removal.
//!
//! Both are entries of the image index that point at objects in storage.
//! The index id is first resolved to its storage keys; every key is deleted,
//! then the index entry. An id with no storage keys cannot be resolved and
//! is reported as a failure for that item.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use super::{RemoveError, Removal, Remover, combine, settle};
use crate::domain::{ArtifactKind, ArtifactRef, BootImage, Recipe};
use crate::ports::{ClientError, ImageIndex, IndexKind};

pub struct BootImageRemover {
    index: Arc<dyn ImageIndex>,
}

impl BootImageRemover {
    pub fn new(index: Arc<dyn ImageIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Remover<BootImage> for BootImageRemover {
    async fn remove(&self, image: &BootImage) -> Result<Removal, RemoveError> {
        remove_indexed(
            self.index.as_ref(),
            IndexKind::BootImage,
            BootImage::KIND,
            image,
            &image.id,
        )
        .await
    }
}

pub struct RecipeRemover {
    index: Arc<dyn ImageIndex>,
}

impl RecipeRemover {
    pub fn new(index: Arc<dyn ImageIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Remover<Recipe> for RecipeRemover {
    async fn remove(&self, recipe: &Recipe) -> Result<Removal, RemoveError> {
        remove_indexed(
            self.index.as_ref(),
            IndexKind::Recipe,
            Recipe::KIND,
            recipe,
            &recipe.id,
        )
        .await
    }
}

async fn remove_indexed(
    index: &dyn ImageIndex,
    index_kind: IndexKind,
    kind: ArtifactKind,
    artifact: &(dyn fmt::Display + Sync),
    id: &str,
) -> Result<Removal, RemoveError> {
    let failed = |source: ClientError| RemoveError::Client {
        kind,
        artifact: artifact.to_string(),
        source,
    };

    let keys = index.find_storage_keys(index_kind, id).await.map_err(failed)?;
    tracing::debug!(%kind, %artifact, ?keys, "resolved storage keys");
    if keys.is_empty() {
        return Err(RemoveError::Unresolvable {
            kind: index_kind,
            id: id.to_string(),
        });
    }

    let mut statuses = Vec::with_capacity(keys.len() + 1);
    for key in &keys {
        let status = index
            .delete_storage_object(index_kind, key)
            .await
            .map_err(failed)?;
        statuses.push(status);
    }
    let status = index.delete_index_entry(index_kind, id).await.map_err(failed)?;
    statuses.push(status);

    Ok(settle(kind, artifact, combine(&statuses)))
}
