//! ContainerRegistry port - deletes tagged images.

use async_trait::async_trait;

use super::{ClientError, DeleteStatus};

#[async_trait]
pub trait ContainerRegistry: Send + Sync {
    async fn delete_image(&self, name: &str, tag: &str) -> Result<DeleteStatus, ClientError>;
}
