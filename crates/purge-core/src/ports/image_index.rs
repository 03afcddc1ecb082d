//! ImageIndex port - the index of boot images and recipes.
//!
//! An index entry points at one or more objects in storage. Removing an
//! entry means deleting those objects and then the entry itself.

use async_trait::async_trait;
use std::fmt;

use super::{ClientError, DeleteStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    BootImage,
    Recipe,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::BootImage => f.write_str("boot image"),
            IndexKind::Recipe => f.write_str("recipe"),
        }
    }
}

#[async_trait]
pub trait ImageIndex: Send + Sync {
    /// Storage keys belonging to the entry `id`. Empty when none match.
    async fn find_storage_keys(&self, kind: IndexKind, id: &str)
        -> Result<Vec<String>, ClientError>;

    async fn delete_storage_object(
        &self,
        kind: IndexKind,
        key: &str,
    ) -> Result<DeleteStatus, ClientError>;

    async fn delete_index_entry(&self, kind: IndexKind, id: &str)
        -> Result<DeleteStatus, ClientError>;
}
