//! Outcome model: what happened to each artifact, each kind, and the run.
//!
//! These types only describe results. They are produced by the orchestrator
//! and driver and consumed by whoever reports the run (CLI, tests).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifact::ArtifactKind;
use super::errors::PurgeError;
use super::ids::{ProductKey, RunId};

/// Result of handling one artifact item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeletionOutcome {
    /// The remover deleted the artifact.
    Deleted,

    /// Another installed version references the artifact; nothing was called.
    /// Owners are listed in catalog order.
    SkippedShared(Vec<ProductKey>),

    /// The external system reported the artifact as not present.
    AlreadyAbsent,

    /// Dry run: the artifact is exclusive and would have been deleted.
    WouldDelete,

    /// The removal failed; the cause is kept for the operator.
    Failed(String),
}

impl DeletionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DeletionOutcome::Failed(_))
    }
}

/// One artifact item and its outcome, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
    pub artifact: String,
    pub outcome: DeletionOutcome,
}

/// Everything that happened for one artifact kind.
///
/// An empty `items` list means the target had no artifacts of the kind and
/// the kind was skipped; that is not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindReport {
    pub kind: ArtifactKind,
    pub items: Vec<ItemReport>,
}

impl KindReport {
    pub fn new(kind: ArtifactKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, artifact: impl Into<String>, outcome: DeletionOutcome) {
        self.items.push(ItemReport {
            artifact: artifact.into(),
            outcome,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        self.items.iter().any(|i| i.outcome.is_failure())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items.iter().filter(|i| i.outcome.is_failure())
    }

    /// Number of items whose outcome satisfies `pred`.
    pub fn count(&self, pred: impl Fn(&DeletionOutcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }

    pub fn outcome_of(&self, artifact: &str) -> Option<&DeletionOutcome> {
        self.items
            .iter()
            .find(|i| i.artifact == artifact)
            .map(|i| &i.outcome)
    }

    /// Kind-level verdict: `Deletion` if any item failed.
    pub fn check(&self, product: &ProductKey) -> Result<(), PurgeError> {
        if self.has_failures() {
            Err(PurgeError::Deletion {
                kind: self.kind,
                product: product.clone(),
            })
        } else {
            Ok(())
        }
    }
}

/// What happened to the catalog entry at the end of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryOutcome {
    Removed,
    /// The entry was already missing when the write was prepared.
    AlreadyRemoved,
    /// Dry run: the catalog was not written.
    Skipped,
    Failed(String),
}

/// Steps of a removal run, in order.
///
/// `Failed` is absorbing: it is the terminal step of any run in which some
/// step reported an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalStep {
    Start,
    RemoveImages,
    RemoveObjects,
    RemovePackageRepos,
    RemoveManifests,
    RemoveBootImages,
    RemoveRecipes,
    RemoveHostedRepos,
    RemoveCatalogEntry,
    Done,
    Failed,
}

impl RemovalStep {
    /// Next step in the sequence. Terminal steps map to themselves.
    pub fn next(self) -> Self {
        match self {
            RemovalStep::Start => RemovalStep::RemoveImages,
            RemovalStep::RemoveImages => RemovalStep::RemoveObjects,
            RemovalStep::RemoveObjects => RemovalStep::RemovePackageRepos,
            RemovalStep::RemovePackageRepos => RemovalStep::RemoveManifests,
            RemovalStep::RemoveManifests => RemovalStep::RemoveBootImages,
            RemovalStep::RemoveBootImages => RemovalStep::RemoveRecipes,
            RemovalStep::RemoveRecipes => RemovalStep::RemoveHostedRepos,
            RemovalStep::RemoveHostedRepos => RemovalStep::RemoveCatalogEntry,
            RemovalStep::RemoveCatalogEntry => RemovalStep::Done,
            RemovalStep::Done => RemovalStep::Done,
            RemovalStep::Failed => RemovalStep::Failed,
        }
    }

    /// The artifact kind handled by this step, if it is a kind step.
    pub fn kind(self) -> Option<ArtifactKind> {
        match self {
            RemovalStep::RemoveImages => Some(ArtifactKind::ContainerImage),
            RemovalStep::RemoveObjects => Some(ArtifactKind::ObjectArtifact),
            RemovalStep::RemovePackageRepos => Some(ArtifactKind::HelmChart),
            RemovalStep::RemoveManifests => Some(ArtifactKind::Manifest),
            RemovalStep::RemoveBootImages => Some(ArtifactKind::BootImage),
            RemovalStep::RemoveRecipes => Some(ArtifactKind::Recipe),
            RemovalStep::RemoveHostedRepos => Some(ArtifactKind::HostedRepository),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RemovalStep::Done | RemovalStep::Failed)
    }
}

/// Full record of one removal run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalReport {
    pub run_id: RunId,
    pub product: ProductKey,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub kinds: Vec<KindReport>,
    pub catalog_entry: Option<EntryOutcome>,
    pub terminal_step: RemovalStep,
}

impl RemovalReport {
    pub fn new(run_id: RunId, product: ProductKey, dry_run: bool) -> Self {
        Self {
            run_id,
            product,
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            kinds: Vec::new(),
            catalog_entry: None,
            terminal_step: RemovalStep::Start,
        }
    }

    pub fn kind(&self, kind: ArtifactKind) -> Option<&KindReport> {
        self.kinds.iter().find(|k| k.kind == kind)
    }

    /// Kinds with at least one failed item, in processing order.
    pub fn failed_kinds(&self) -> Vec<ArtifactKind> {
        self.kinds
            .iter()
            .filter(|k| k.has_failures())
            .map(|k| k.kind)
            .collect()
    }

    pub fn succeeded(&self) -> bool {
        self.terminal_step == RemovalStep::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn outcome_serializes_as_tagged_enum() {
        let o = DeletionOutcome::SkippedShared(vec![ProductKey::new("sat", "2.0.4")]);
        let v: serde_json::Value = serde_json::to_value(&o).unwrap();
        assert_eq!(v["outcome"], "SKIPPED_SHARED");
        assert_eq!(v["detail"][0]["version"], "2.0.4");

        let v = serde_json::to_value(DeletionOutcome::AlreadyAbsent).unwrap();
        assert_eq!(v["outcome"], "ALREADY_ABSENT");
    }

    #[test]
    fn kind_report_fails_only_on_failed_items() {
        let product = ProductKey::new("sat", "2.0.3");
        let mut report = KindReport::new(ArtifactKind::ContainerImage);
        report.push("a:1", DeletionOutcome::SkippedShared(vec![]));
        report.push("b:1", DeletionOutcome::AlreadyAbsent);
        report.push("c:1", DeletionOutcome::Deleted);
        assert!(report.check(&product).is_ok());

        report.push("d:1", DeletionOutcome::Failed("boom".into()));
        assert!(matches!(
            report.check(&product),
            Err(PurgeError::Deletion { kind: ArtifactKind::ContainerImage, .. })
        ));
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.count(|o| *o == DeletionOutcome::Deleted), 1);
        assert_eq!(report.outcome_of("b:1"), Some(&DeletionOutcome::AlreadyAbsent));
    }

    #[test]
    fn empty_kind_is_not_a_failure() {
        let report = KindReport::new(ArtifactKind::ObjectArtifact);
        assert!(report.is_empty());
        assert!(report.check(&ProductKey::new("sat", "1")).is_ok());
    }

    #[test]
    fn steps_walk_every_kind_then_the_catalog_entry() {
        let mut step = RemovalStep::Start;
        let mut kinds = Vec::new();
        while !step.is_terminal() {
            step = step.next();
            if let Some(kind) = step.kind() {
                kinds.push(kind);
            }
            if step == RemovalStep::RemoveCatalogEntry {
                assert_eq!(step.next(), RemovalStep::Done);
            }
        }
        assert_eq!(kinds, ArtifactKind::ORDER.to_vec());
        assert_eq!(step, RemovalStep::Done);
    }

    #[rstest]
    #[case::done(RemovalStep::Done)]
    #[case::failed(RemovalStep::Failed)]
    fn terminal_steps_are_absorbing(#[case] step: RemovalStep) {
        assert!(step.is_terminal());
        assert_eq!(step.next(), step);
    }
}
