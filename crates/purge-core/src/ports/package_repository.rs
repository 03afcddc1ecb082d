//! PackageRepository port - components and hosted repositories of the
//! package repository service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ClientError, DeleteStatus};

/// One component stored in a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryComponent {
    pub id: String,
    pub name: String,
    pub version: String,
}

#[async_trait]
pub trait PackageRepository: Send + Sync {
    async fn list_components(&self, repository: &str)
        -> Result<Vec<RepositoryComponent>, ClientError>;

    async fn delete_component(&self, id: &str) -> Result<DeleteStatus, ClientError>;

    async fn delete_repository(&self, name: &str) -> Result<DeleteStatus, ClientError>;
}
