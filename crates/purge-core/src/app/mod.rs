//! App - removal logic built on the ports.
//!
//! # Components
//! - **resolver**: splits a kind's artifacts into exclusive and shared
//! - **removers**: one adapter per artifact kind
//! - **orchestrator**: runs one kind for the target version
//! - **entry**: removes the target from the catalog record
//! - **driver**: `ProductPurge`, the end-to-end run over every step

pub mod driver;
pub mod entry;
pub mod orchestrator;
pub mod removers;
pub mod resolver;

pub use self::driver::{Collaborators, ProductPurge, RemovalFailed, RemovalSettings, Removers};
pub use self::entry::{CatalogEntryRemover, CatalogEntryRequest};
pub use self::orchestrator::Orchestrator;
pub use self::removers::{Removal, RemoveError, Remover};
pub use self::resolver::{Partition, Placement, partition};
