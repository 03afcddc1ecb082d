//! Orchestrator - runs one artifact kind for the target version.
//!
//! # Flow (per kind)
//! 1. take the target's list of the kind; empty means nothing to do
//! 2. partition it against every other installed version
//! 3. shared items are logged and skipped
//! 4. exclusive items go to the kind's remover, one at a time, in order
//!
//! A failing item never stops the loop. The returned `KindReport` holds one
//! outcome per item; `KindReport::check` turns it into the kind-level error.

use crate::domain::{
    ArtifactRef, Catalog, DeletionOutcome, KindReport, ProductKey, ProductVersion,
};

use super::removers::{Removal, Remover};
use super::resolver::{self, Placement};

pub struct Orchestrator<'c> {
    target: &'c ProductVersion,
    others: Vec<&'c ProductVersion>,
    dry_run: bool,
}

impl<'c> Orchestrator<'c> {
    pub fn new(catalog: &'c Catalog, target: &'c ProductVersion) -> Self {
        Self {
            target,
            others: catalog.others(target.key()),
            dry_run: false,
        }
    }

    /// In dry-run mode exclusive items are reported as `WouldDelete` and no
    /// remover is called.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn target(&self) -> &ProductKey {
        self.target.key()
    }

    pub async fn run_kind<A, R>(&self, remover: &R) -> KindReport
    where
        A: ArtifactRef,
        R: Remover<A> + ?Sized,
    {
        let kind = A::KIND;
        let product = self.target.key();
        let mut report = KindReport::new(kind);

        let targets = self.target.artifacts::<A>();
        if targets.is_empty() {
            tracing::info!(%kind, %product, "No {kind} found in the catalog data for {product}");
            return report;
        }
        tracing::debug!(%kind, count = targets.len(), "removing {kind}");

        let partition = resolver::partition(targets, &self.others, A::artifacts_of);
        for placement in partition {
            match placement {
                Placement::Shared { artifact, owners } => {
                    tracing::info!(
                        %kind,
                        %artifact,
                        "Not removing {kind} {artifact} as it is used by the following other product versions: {}",
                        join_keys(&owners)
                    );
                    report.push(artifact.to_string(), DeletionOutcome::SkippedShared(owners));
                }
                Placement::Exclusive(artifact) if self.dry_run => {
                    tracing::info!(%kind, %artifact, "would remove {kind} {artifact}");
                    report.push(artifact.to_string(), DeletionOutcome::WouldDelete);
                }
                Placement::Exclusive(artifact) => {
                    let outcome = match remover.remove(&artifact).await {
                        Ok(Removal::Deleted) => DeletionOutcome::Deleted,
                        Ok(Removal::AlreadyAbsent) => DeletionOutcome::AlreadyAbsent,
                        Err(err) => {
                            tracing::error!(%kind, %artifact, error = %err, "failed to remove");
                            DeletionOutcome::Failed(err.to_string())
                        }
                    };
                    report.push(artifact.to_string(), outcome);
                }
            }
        }

        report
    }
}

fn join_keys(keys: &[ProductKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
