use async_trait::async_trait;
use std::sync::Arc;

use super::{RemoveError, Removal, Remover, settle};
use crate::domain::{ArtifactRef, ObjectArtifact};
use crate::ports::ObjectStore;

/// Deletes product artifacts from object storage.
pub struct ObjectRemover {
    store: Arc<dyn ObjectStore>,
}

impl ObjectRemover {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Remover<ObjectArtifact> for ObjectRemover {
    async fn remove(&self, object: &ObjectArtifact) -> Result<Removal, RemoveError> {
        let status = self
            .store
            .delete_object(&object.bucket, &object.key)
            .await
            .map_err(|e| RemoveError::client(object, e))?;
        Ok(settle(ObjectArtifact::KIND, object, status.into()))
    }
}
