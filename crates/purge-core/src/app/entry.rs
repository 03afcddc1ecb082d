//! Catalog entry removal - the last step of every non-dry run.
//!
//! The record is read fresh (not taken from the catalog loaded at start),
//! the target version is removed from its product's entry, and the record is
//! written back. A product left with no versions is dropped from the record.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::domain::{EntryOutcome, ProductKey};
use crate::ports::{CatalogLocation, CatalogStore, ClientError};

/// Which version to remove from which catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntryRequest {
    pub location: CatalogLocation,
    pub product: ProductKey,
}

impl CatalogEntryRequest {
    pub fn new(location: CatalogLocation, product: ProductKey) -> Self {
        Self { location, product }
    }
}

pub struct CatalogEntryRemover {
    store: Arc<dyn CatalogStore>,
}

impl CatalogEntryRemover {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn remove(&self, request: &CatalogEntryRequest) -> Result<EntryOutcome, ClientError> {
        let CatalogEntryRequest { location, product } = request;
        let mut record = self.store.read(location).await?;

        let Some(entry) = record.get(&product.name) else {
            tracing::warn!(catalog = %location, %product, "product is not in the catalog; nothing to remove");
            return Ok(EntryOutcome::AlreadyRemoved);
        };

        let mut versions: Map<String, Value> = serde_json::from_str(entry).map_err(|e| {
            ClientError::InvalidResponse(format!("catalog entry for {}: {e}", product.name))
        })?;

        if versions.remove(&product.version).is_none() {
            tracing::warn!(catalog = %location, %product, "version is not in the catalog; nothing to remove");
            return Ok(EntryOutcome::AlreadyRemoved);
        }

        if versions.is_empty() {
            tracing::debug!(product = %product.name, "no versions left; dropping product");
            record.remove(&product.name);
        } else {
            let text = serde_json::to_string(&versions)
                .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
            record.insert(product.name.clone(), text);
        }

        self.store.write(location, &record).await?;
        tracing::info!(catalog = %location, %product, "Deleted {product} from product catalog");
        Ok(EntryOutcome::Removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryCatalogStore;
    use crate::ports::CatalogRecord;
    use serde_json::json;

    fn location() -> CatalogLocation {
        CatalogLocation::new("cray-product-catalog", "services")
    }

    async fn seeded() -> Arc<InMemoryCatalogStore> {
        let store = Arc::new(InMemoryCatalogStore::new());
        let mut record = CatalogRecord::new();
        record.insert(
            "sat".into(),
            json!({"2.0.3": {"component_versions": {}}, "2.0.4": {}}).to_string(),
        );
        record.insert("cos".into(), json!({"1.0.0": {}}).to_string());
        store.put(&location(), record).await;
        store
    }

    #[tokio::test]
    async fn removes_only_the_target_version() {
        let store = seeded().await;
        let remover = CatalogEntryRemover::new(store.clone());

        let outcome = remover
            .remove(&CatalogEntryRequest::new(location(), ProductKey::new("sat", "2.0.3")))
            .await
            .unwrap();

        assert_eq!(outcome, EntryOutcome::Removed);
        let record = store.get(&location()).await.unwrap();
        let sat: Value = serde_json::from_str(&record["sat"]).unwrap();
        assert!(sat.get("2.0.3").is_none());
        assert!(sat.get("2.0.4").is_some());
        assert!(record.contains_key("cos"));
    }

    #[tokio::test]
    async fn last_version_drops_the_product() {
        let store = seeded().await;
        let remover = CatalogEntryRemover::new(store.clone());

        remover
            .remove(&CatalogEntryRequest::new(location(), ProductKey::new("cos", "1.0.0")))
            .await
            .unwrap();

        let record = store.get(&location()).await.unwrap();
        assert!(!record.contains_key("cos"));
        assert!(record.contains_key("sat"));
    }

    #[tokio::test]
    async fn missing_version_is_already_removed_without_write() {
        let store = seeded().await;
        let remover = CatalogEntryRemover::new(store.clone());

        let outcome = remover
            .remove(&CatalogEntryRequest::new(location(), ProductKey::new("sat", "9.9.9")))
            .await
            .unwrap();

        assert_eq!(outcome, EntryOutcome::AlreadyRemoved);
        assert_eq!(store.write_count().await, 0);
    }

    #[tokio::test]
    async fn write_failure_is_returned() {
        let store = seeded().await;
        store
            .fail_writes_with(ClientError::Transport("forbidden".into()))
            .await;
        let remover = CatalogEntryRemover::new(store.clone());

        let err = remover
            .remove(&CatalogEntryRequest::new(location(), ProductKey::new("sat", "2.0.3")))
            .await
            .unwrap_err();

        assert_eq!(err, ClientError::Transport("forbidden".into()));
    }
}
