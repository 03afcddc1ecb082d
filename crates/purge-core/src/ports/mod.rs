//! Ports - interfaces to the external systems a removal run talks to.
//!
//! Each trait covers one collaborator (catalog store, container registry,
//! object store, package repository, boot-image/recipe index, credentials).
//! Implementations live in `impls`; the removal logic only sees these traits.
//!
//! Delete calls return a structured `DeleteStatus`, so "already gone" is
//! decided by the implementation once, not by string matching at call sites.

pub mod catalog_store;
pub mod container_registry;
pub mod credentials;
pub mod image_index;
pub mod object_store;
pub mod package_repository;

pub use self::catalog_store::{CatalogLocation, CatalogRecord, CatalogStore};
pub use self::container_registry::ContainerRegistry;
pub use self::credentials::{CredentialProvider, Credentials};
pub use self::image_index::{ImageIndex, IndexKind};
pub use self::object_store::ObjectStore;
pub use self::package_repository::{PackageRepository, RepositoryComponent};

use thiserror::Error;

/// Result of a successful delete call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    Deleted,
    /// The target did not exist (404 or equivalent).
    NotFound,
}

/// Failure talking to an external system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("command `{command}` failed: {output}")]
    Command { command: String, output: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
