//! Kind-specific removers.
//!
//! One adapter per artifact kind. Each performs the delete call(s) for a
//! single artifact and classifies the result:
//! - `NotFound` from the external system becomes `Removal::AlreadyAbsent`,
//!   so a retry after a partial run does not fail.
//! - anything else is a `RemoveError` for that item only; the orchestrator
//!   keeps going with the next item.

pub mod chart;
pub mod hosted_repo;
pub mod image;
pub mod indexed;
pub mod manifest;
pub mod object;

pub use self::chart::ChartRemover;
pub use self::hosted_repo::HostedRepoRemover;
pub use self::image::ImageRemover;
pub use self::indexed::{BootImageRemover, RecipeRemover};
pub use self::manifest::ManifestRemover;
pub use self::object::ObjectRemover;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::domain::{ArtifactKind, ArtifactRef};
use crate::ports::{ClientError, DeleteStatus, IndexKind};

/// Successful handling of one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Deleted,
    AlreadyAbsent,
}

impl From<DeleteStatus> for Removal {
    fn from(status: DeleteStatus) -> Self {
        match status {
            DeleteStatus::Deleted => Removal::Deleted,
            DeleteStatus::NotFound => Removal::AlreadyAbsent,
        }
    }
}

#[derive(Debug, Error)]
pub enum RemoveError {
    #[error("failed to remove {kind} {artifact}: {source}")]
    Client {
        kind: ArtifactKind,
        artifact: String,
        #[source]
        source: ClientError,
    },

    #[error("storage key could not be retrieved for {kind} {id}")]
    Unresolvable { kind: IndexKind, id: String },

    #[error("failed to list components of repository {repository}: {source}")]
    Listing {
        repository: String,
        #[source]
        source: ClientError,
    },
}

impl RemoveError {
    pub(crate) fn client<A: ArtifactRef>(artifact: &A, source: ClientError) -> Self {
        RemoveError::Client {
            kind: A::KIND,
            artifact: artifact.to_string(),
            source,
        }
    }
}

/// Removes one artifact of kind `A`.
#[async_trait]
pub trait Remover<A: ArtifactRef>: Send + Sync {
    async fn remove(&self, artifact: &A) -> Result<Removal, RemoveError>;
}

/// Combine the statuses of several calls made for one artifact: it was
/// already absent only if every call said so.
pub(crate) fn combine(statuses: &[DeleteStatus]) -> Removal {
    if statuses.iter().all(|s| *s == DeleteStatus::NotFound) {
        Removal::AlreadyAbsent
    } else {
        Removal::Deleted
    }
}

/// Log the classified result of a removal and pass it through.
pub(crate) fn settle(kind: ArtifactKind, artifact: &dyn fmt::Display, removal: Removal) -> Removal {
    match removal {
        Removal::Deleted => {
            tracing::info!(%kind, %artifact, "successfully removed");
        }
        Removal::AlreadyAbsent => {
            tracing::warn!(%kind, %artifact, "has already been removed");
        }
    }
    removal
}
