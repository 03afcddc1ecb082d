//! The catalog: every installed product version, loaded once per run.

use crate::ports::{CatalogLocation, CatalogRecord, CatalogStore};

use super::errors::PurgeError;
use super::ids::ProductKey;
use super::product::ProductVersion;

/// Snapshot of all installed product versions.
///
/// `(name, version)` pairs are unique: products come from the keys of one
/// record and versions from the keys of one entry.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<ProductVersion>,
}

impl Catalog {
    pub fn new(products: Vec<ProductVersion>) -> Self {
        Self { products }
    }

    /// Read and parse the catalog record at `location`.
    pub async fn load(
        store: &dyn CatalogStore,
        location: &CatalogLocation,
    ) -> Result<Self, PurgeError> {
        let record = store.read(location).await.map_err(|e| PurgeError::CatalogLoad {
            location: location.to_string(),
            reason: e.to_string(),
        })?;
        let catalog = Self::from_record(location, &record)?;
        tracing::debug!(
            catalog = %location,
            product_versions = catalog.len(),
            "loaded product catalog"
        );
        Ok(catalog)
    }

    /// Build a catalog from a raw record (`product name -> entry text`).
    pub fn from_record(
        location: &CatalogLocation,
        record: &CatalogRecord,
    ) -> Result<Self, PurgeError> {
        if record.is_empty() {
            return Err(PurgeError::CatalogLoad {
                location: location.to_string(),
                reason: "catalog contains no data".to_string(),
            });
        }

        let mut products = Vec::new();
        for (name, entry) in record {
            let versions =
                ProductVersion::parse_entry(name, entry).map_err(|e| PurgeError::CatalogLoad {
                    location: location.to_string(),
                    reason: e.to_string(),
                })?;
            products.extend(versions);
        }
        Ok(Self { products })
    }

    pub fn get(&self, name: &str, version: &str) -> Result<&ProductVersion, PurgeError> {
        self.products
            .iter()
            .find(|p| p.key().matches(name, version))
            .ok_or_else(|| PurgeError::ProductNotFound {
                name: name.to_string(),
                version: version.to_string(),
            })
    }

    /// Every version except `excluding`, in load order.
    pub fn others(&self, excluding: &ProductKey) -> Vec<&ProductVersion> {
        self.products
            .iter()
            .filter(|p| p.key() != excluding)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
