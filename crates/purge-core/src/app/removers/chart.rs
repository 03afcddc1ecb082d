//! Helm chart removal.
//!
//! Charts are components of the chart repository. The catalog only records
//! `(name, version)`, so the repository is listed once, on first use, and
//! every component matching both fields is deleted by id.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::{RemoveError, Removal, Remover, combine, settle};
use crate::domain::{ArtifactRef, HelmChart};
use crate::ports::{PackageRepository, RepositoryComponent};

pub struct ChartRemover {
    repository: Arc<dyn PackageRepository>,
    chart_repository: String,
    components: OnceCell<Vec<RepositoryComponent>>,
}

impl ChartRemover {
    pub fn new(repository: Arc<dyn PackageRepository>, chart_repository: impl Into<String>) -> Self {
        Self {
            repository,
            chart_repository: chart_repository.into(),
            components: OnceCell::new(),
        }
    }

    async fn components(&self) -> Result<&[RepositoryComponent], RemoveError> {
        let components = self
            .components
            .get_or_try_init(|| async {
                let listed = self
                    .repository
                    .list_components(&self.chart_repository)
                    .await
                    .map_err(|source| RemoveError::Listing {
                        repository: self.chart_repository.clone(),
                        source,
                    })?;
                tracing::debug!(
                    repository = %self.chart_repository,
                    components = listed.len(),
                    "listed chart repository"
                );
                Ok::<_, RemoveError>(listed)
            })
            .await?;
        Ok(components.as_slice())
    }
}

#[async_trait]
impl Remover<HelmChart> for ChartRemover {
    async fn remove(&self, chart: &HelmChart) -> Result<Removal, RemoveError> {
        let ids: Vec<String> = self
            .components()
            .await?
            .iter()
            .filter(|c| c.name == chart.name && c.version == chart.version)
            .map(|c| c.id.clone())
            .collect();

        if ids.is_empty() {
            return Ok(settle(HelmChart::KIND, chart, Removal::AlreadyAbsent));
        }

        let mut statuses = Vec::with_capacity(ids.len());
        for id in &ids {
            tracing::debug!(chart = %chart, component_id = %id, "removing chart component");
            let status = self
                .repository
                .delete_component(id)
                .await
                .map_err(|e| RemoveError::client(chart, e))?;
            statuses.push(status);
        }
        Ok(settle(HelmChart::KIND, chart, combine(&statuses)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryPackageRepository;
    use crate::ports::ClientError;

    fn repo() -> Arc<InMemoryPackageRepository> {
        Arc::new(
            InMemoryPackageRepository::new()
                .with_component("charts", "id-1", "cray-sat", "2.0.3")
                .with_component("charts", "id-2", "cray-sat", "2.0.4")
                .with_component("charts", "id-3", "cray-cos", "2.0.3"),
        )
    }

    #[tokio::test]
    async fn deletes_only_the_matching_component() {
        let repo = repo();
        let remover = ChartRemover::new(repo.clone(), "charts");

        let removal = remover.remove(&HelmChart::new("cray-sat", "2.0.3")).await.unwrap();
        assert_eq!(removal, Removal::Deleted);
        assert_eq!(repo.deleted_components().await, vec!["id-1".to_string()]);
    }

    #[tokio::test]
    async fn repository_is_listed_once() {
        let repo = repo();
        let remover = ChartRemover::new(repo.clone(), "charts");

        remover.remove(&HelmChart::new("cray-sat", "2.0.3")).await.unwrap();
        remover.remove(&HelmChart::new("cray-cos", "2.0.3")).await.unwrap();
        assert_eq!(repo.list_calls().await, 1);
    }

    #[tokio::test]
    async fn chart_missing_from_listing_is_already_absent() {
        let remover = ChartRemover::new(repo(), "charts");
        let removal = remover.remove(&HelmChart::new("cray-sat", "9.9.9")).await.unwrap();
        assert_eq!(removal, Removal::AlreadyAbsent);
    }

    #[tokio::test]
    async fn component_delete_not_found_is_already_absent() {
        let repo = repo();
        repo.forget_component("id-1").await;
        let remover = ChartRemover::new(repo, "charts");

        let removal = remover.remove(&HelmChart::new("cray-sat", "2.0.3")).await.unwrap();
        assert_eq!(removal, Removal::AlreadyAbsent);
    }

    #[tokio::test]
    async fn listing_failure_is_an_item_error() {
        let repo = repo();
        repo.fail_listing_with(ClientError::Transport("timeout".into())).await;
        let remover = ChartRemover::new(repo, "charts");

        let err = remover.remove(&HelmChart::new("cray-sat", "2.0.3")).await.unwrap_err();
        assert!(matches!(err, RemoveError::Listing { .. }));
    }

    #[tokio::test]
    async fn component_delete_error_is_an_item_error() {
        let repo = Arc::new(
            InMemoryPackageRepository::new()
                .with_component("charts", "id-1", "cray-sat", "2.0.3")
                .with_component("charts", "id-4", "cray-sat", "2.0.3"),
        );
        repo.fail_on(
            "id-1",
            ClientError::Status {
                status: 500,
                message: "internal".into(),
            },
        )
        .await;
        let remover = ChartRemover::new(repo.clone(), "charts");

        let err = remover.remove(&HelmChart::new("cray-sat", "2.0.3")).await.unwrap_err();
        assert!(matches!(err, RemoveError::Client { .. }));
        assert!(err.to_string().contains("cray-sat:2.0.3"));
        assert!(repo.deleted_components().await.is_empty());
    }
}
