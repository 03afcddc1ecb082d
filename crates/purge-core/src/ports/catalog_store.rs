//! CatalogStore port - the persisted product catalog record.
//!
//! The record is a flat map `product name -> entry text`, read whole and
//! written whole. The catalog is read once per run and written once at the
//! end, when the target's entry is removed.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;

use super::ClientError;

/// Raw catalog record: `product name -> entry text`.
pub type CatalogRecord = BTreeMap<String, String>;

/// Where a catalog record lives: `(name, namespace)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CatalogLocation {
    pub name: String,
    pub namespace: String,
}

impl CatalogLocation {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for CatalogLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fails with `ClientError::NotFound` when no record exists at `location`.
    async fn read(&self, location: &CatalogLocation) -> Result<CatalogRecord, ClientError>;

    async fn write(
        &self,
        location: &CatalogLocation,
        record: &CatalogRecord,
    ) -> Result<(), ClientError>;
}
