//! Impls - concrete collaborators for the ports.
//!
//! # Included
//! - **memory**: in-memory fakes of every port (tests and local runs)
//! - **file_store**: `FileCatalogStore`, catalog records as JSON files
//! - **nexus**: `NexusClient`, container registry and package repository over HTTP
//! - **cray_cli**: `CrayCli`, object store and image index through the `cray` tool
//! - **credentials**: static and file-based credential providers

pub mod cray_cli;
pub mod credentials;
pub mod file_store;
pub mod memory;
pub mod nexus;

pub use self::cray_cli::{CrayCli, CraySettings};
pub use self::credentials::{FileCredentialProvider, StaticCredentials};
pub use self::file_store::FileCatalogStore;
pub use self::memory::{
    InMemoryCatalogStore, InMemoryImageIndex, InMemoryObjectStore, InMemoryPackageRepository,
    InMemoryRegistry,
};
pub use self::nexus::{NexusClient, NexusSettings};
