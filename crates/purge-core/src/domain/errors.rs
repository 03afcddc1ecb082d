//! Errors raised by a removal run.
//!
//! - `CatalogLoad` / `ProductNotFound`: fatal, raised before anything is deleted.
//! - `Deletion`: at least one item of one kind could not be removed.
//! - `CatalogEntry`: the final catalog write failed; always terminates the run.
//! - `Incomplete`: the catalog entry was removed but earlier kinds failed.
//!
//! An artifact that is already gone is not an error; it is reported as the
//! `AlreadyAbsent` outcome.

use thiserror::Error;

use super::artifact::ArtifactKind;
use super::ids::ProductKey;
use crate::ports::ClientError;

#[derive(Debug, Error)]
pub enum PurgeError {
    #[error("unable to load product catalog {location}: {reason}")]
    CatalogLoad { location: String, reason: String },

    #[error("product {name} version {version} is not installed")]
    ProductNotFound { name: String, version: String },

    #[error("one or more errors occurred removing {kind} for {} {}", product.name, product.version)]
    Deletion { kind: ArtifactKind, product: ProductKey },

    #[error("error removing {product} from product catalog: {source}")]
    CatalogEntry {
        product: ProductKey,
        #[source]
        source: ClientError,
    },

    #[error("removed {product} from product catalog, but errors occurred removing {}", join_kinds(failed))]
    Incomplete {
        product: ProductKey,
        failed: Vec<ArtifactKind>,
    },
}

impl PurgeError {
    /// Whether the run stopped before any deletion was attempted.
    pub fn is_fatal_before_deletion(&self) -> bool {
        matches!(
            self,
            PurgeError::CatalogLoad { .. } | PurgeError::ProductNotFound { .. }
        )
    }
}

fn join_kinds(kinds: &[ArtifactKind]) -> String {
    kinds
        .iter()
        .map(|k| k.label())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deletion_error_names_product_and_version() {
        let err = PurgeError::Deletion {
            kind: ArtifactKind::ContainerImage,
            product: ProductKey::new("sat", "2.0.3"),
        };
        assert_eq!(
            err.to_string(),
            "one or more errors occurred removing container images for sat 2.0.3"
        );
        assert!(!err.is_fatal_before_deletion());
    }

    #[test]
    fn incomplete_lists_every_failed_kind() {
        let err = PurgeError::Incomplete {
            product: ProductKey::new("sat", "2.0.3"),
            failed: vec![ArtifactKind::ContainerImage, ArtifactKind::Recipe],
        };
        let msg = err.to_string();
        assert!(msg.contains("sat-2.0.3"));
        assert!(msg.contains("container images, recipes"));
    }

    #[test]
    fn lookup_failures_are_fatal() {
        let err = PurgeError::ProductNotFound {
            name: "sat".into(),
            version: "9.9.9".into(),
        };
        assert!(err.is_fatal_before_deletion());
        assert_eq!(err.to_string(), "product sat version 9.9.9 is not installed");
    }
}
