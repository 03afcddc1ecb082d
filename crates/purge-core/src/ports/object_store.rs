//! ObjectStore port - deletes objects by `(bucket, key)`.

use async_trait::async_trait;

use super::{ClientError, DeleteStatus};

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<DeleteStatus, ClientError>;
}
