//! Domain model (product keys, artifact references, catalog, outcomes, errors).

pub mod artifact;
pub mod catalog;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod product;

pub use self::artifact::{
    ArtifactKind, ArtifactRef, BootImage, ContainerImage, HelmChart, HostedRepository, Manifest,
    ObjectArtifact, Recipe,
};
pub use self::catalog::Catalog;
pub use self::errors::PurgeError;
pub use self::ids::{ProductKey, RunId};
pub use self::outcome::{
    DeletionOutcome, EntryOutcome, ItemReport, KindReport, RemovalReport, RemovalStep,
};
pub use self::product::{EntryParseError, ProductVersion};
