use async_trait::async_trait;
use std::sync::Arc;

use super::{RemoveError, Removal, Remover, settle};
use crate::domain::{ArtifactRef, ContainerImage};
use crate::ports::ContainerRegistry;

/// Deletes container images from the registry.
pub struct ImageRemover {
    registry: Arc<dyn ContainerRegistry>,
}

impl ImageRemover {
    pub fn new(registry: Arc<dyn ContainerRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Remover<ContainerImage> for ImageRemover {
    async fn remove(&self, image: &ContainerImage) -> Result<Removal, RemoveError> {
        let status = self
            .registry
            .delete_image(&image.name, &image.tag)
            .await
            .map_err(|e| RemoveError::client(image, e))?;
        Ok(settle(ContainerImage::KIND, image, status.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryRegistry;
    use crate::ports::ClientError;

    #[tokio::test]
    async fn second_delete_of_same_image_is_already_absent() {
        let registry = Arc::new(InMemoryRegistry::with_images([("cray/sat", "1.0")]));
        let remover = ImageRemover::new(registry.clone());
        let image = ContainerImage::new("cray/sat", "1.0");

        assert_eq!(remover.remove(&image).await.unwrap(), Removal::Deleted);
        assert_eq!(remover.remove(&image).await.unwrap(), Removal::AlreadyAbsent);
        assert_eq!(registry.calls().await.len(), 2);
    }

    #[tokio::test]
    async fn non_404_failure_is_an_error() {
        let registry = Arc::new(InMemoryRegistry::with_images([("cray/sat", "1.0")]));
        registry
            .fail_on(
                "cray/sat:1.0",
                ClientError::Status {
                    status: 500,
                    message: "internal".into(),
                },
            )
            .await;
        let remover = ImageRemover::new(registry);

        let err = remover
            .remove(&ContainerImage::new("cray/sat", "1.0"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cray/sat:1.0"));
        assert!(err.to_string().contains("500"));
    }
}
