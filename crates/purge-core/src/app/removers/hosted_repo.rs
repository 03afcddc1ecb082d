use async_trait::async_trait;
use std::sync::Arc;

use super::{RemoveError, Removal, Remover, settle};
use crate::domain::{ArtifactRef, HostedRepository};
use crate::ports::PackageRepository;

/// Deletes a version's hosted repositories from the package repository.
pub struct HostedRepoRemover {
    repository: Arc<dyn PackageRepository>,
}

impl HostedRepoRemover {
    pub fn new(repository: Arc<dyn PackageRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Remover<HostedRepository> for HostedRepoRemover {
    async fn remove(&self, repo: &HostedRepository) -> Result<Removal, RemoveError> {
        let status = self
            .repository
            .delete_repository(&repo.name)
            .await
            .map_err(|e| RemoveError::client(repo, e))?;
        Ok(settle(HostedRepository::KIND, repo, status.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryPackageRepository;
    use crate::ports::ClientError;

    #[tokio::test]
    async fn removes_repository_by_name() {
        let repo = Arc::new(InMemoryPackageRepository::new().with_repository("sat-2.0.3-sle"));
        let remover = HostedRepoRemover::new(repo.clone());
        let target = HostedRepository::new("sat-2.0.3-sle", "hosted");

        assert_eq!(remover.remove(&target).await.unwrap(), Removal::Deleted);
        assert_eq!(remover.remove(&target).await.unwrap(), Removal::AlreadyAbsent);
    }

    #[tokio::test]
    async fn server_error_keeps_the_repository() {
        let repo = Arc::new(InMemoryPackageRepository::new().with_repository("sat-2.0.3-sle"));
        repo.fail_on(
            "sat-2.0.3-sle",
            ClientError::Status {
                status: 403,
                message: "forbidden".into(),
            },
        )
        .await;
        let remover = HostedRepoRemover::new(repo.clone());

        let err = remover
            .remove(&HostedRepository::new("sat-2.0.3-sle", "hosted"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("403"));
        assert!(repo.has_repository("sat-2.0.3-sle").await);
    }
}
