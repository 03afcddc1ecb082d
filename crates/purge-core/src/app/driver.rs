//! ProductPurge - removes one product version end to end.
//!
//! # Flow
//! 1. load the catalog and find the target (fatal on failure, nothing deleted)
//! 2. walk `RemovalStep` through the seven kinds in fixed order
//! 3. remove the target's catalog entry, even if some kinds failed
//! 4. settle the terminal step and the run's error
//!
//! Every run is wrapped in a span carrying the run id and product, so the
//! per-item log lines of one run can be grepped together.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

use crate::domain::{
    BootImage, Catalog, ContainerImage, EntryOutcome, HelmChart, HostedRepository, KindReport,
    Manifest, ObjectArtifact, ProductKey, ProductVersion, PurgeError, Recipe, RemovalReport,
    RemovalStep, RunId,
};
use crate::ports::{
    CatalogLocation, CatalogStore, ClientError, ContainerRegistry, ImageIndex, ObjectStore,
    PackageRepository,
};

use super::entry::{CatalogEntryRemover, CatalogEntryRequest};
use super::orchestrator::Orchestrator;
use super::removers::{
    BootImageRemover, ChartRemover, HostedRepoRemover, ImageRemover, ManifestRemover,
    ObjectRemover, RecipeRemover, Remover,
};

/// External systems a run talks to, besides the catalog store.
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn ContainerRegistry>,
    pub objects: Arc<dyn ObjectStore>,
    pub packages: Arc<dyn PackageRepository>,
    pub index: Arc<dyn ImageIndex>,
}

/// Names that locate artifacts inside the collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalSettings {
    /// Package repository holding helm charts.
    pub chart_repository: String,
    pub manifest_bucket: String,
    /// Logical prefix stripped from manifest keys before deletion.
    pub manifest_prefix: String,
}

impl Default for RemovalSettings {
    fn default() -> Self {
        Self {
            chart_repository: "charts".to_string(),
            manifest_bucket: "config-data".to_string(),
            manifest_prefix: "config-data/".to_string(),
        }
    }
}

/// One remover per artifact kind.
pub struct Removers {
    pub images: Box<dyn Remover<ContainerImage>>,
    pub objects: Box<dyn Remover<ObjectArtifact>>,
    pub charts: Box<dyn Remover<HelmChart>>,
    pub manifests: Box<dyn Remover<Manifest>>,
    pub boot_images: Box<dyn Remover<BootImage>>,
    pub recipes: Box<dyn Remover<Recipe>>,
    pub hosted_repos: Box<dyn Remover<HostedRepository>>,
}

impl Removers {
    pub fn new(collaborators: Collaborators, settings: &RemovalSettings) -> Self {
        let Collaborators {
            registry,
            objects,
            packages,
            index,
        } = collaborators;
        Self {
            images: Box::new(ImageRemover::new(registry)),
            objects: Box::new(ObjectRemover::new(objects.clone())),
            charts: Box::new(ChartRemover::new(
                packages.clone(),
                settings.chart_repository.clone(),
            )),
            manifests: Box::new(ManifestRemover::new(
                objects,
                settings.manifest_bucket.clone(),
                settings.manifest_prefix.clone(),
            )),
            boot_images: Box::new(BootImageRemover::new(index.clone())),
            recipes: Box::new(RecipeRemover::new(index)),
            hosted_repos: Box::new(HostedRepoRemover::new(packages)),
        }
    }
}

/// A run that did not finish cleanly.
///
/// `report` is absent when the run stopped before any deletion (catalog
/// could not be loaded or the target is not installed).
#[derive(Debug, Error)]
#[error("removal of {product} did not complete")]
pub struct RemovalFailed {
    pub product: ProductKey,
    pub report: Option<Box<RemovalReport>>,
    #[source]
    pub error: PurgeError,
}

impl RemovalFailed {
    fn before_start(product: ProductKey, error: PurgeError) -> Self {
        Self {
            product,
            report: None,
            error,
        }
    }
}

pub struct ProductPurge {
    store: Arc<dyn CatalogStore>,
    location: CatalogLocation,
    removers: Removers,
    entry: CatalogEntryRemover,
    dry_run: bool,
}

impl ProductPurge {
    pub fn new(store: Arc<dyn CatalogStore>, location: CatalogLocation, removers: Removers) -> Self {
        Self {
            entry: CatalogEntryRemover::new(store.clone()),
            store,
            location,
            removers,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Remove `version` of product `name`.
    pub async fn run(&self, name: &str, version: &str) -> Result<RemovalReport, RemovalFailed> {
        let run_id = RunId::generate();
        let product = ProductKey::new(name, version);
        let span = tracing::info_span!(
            "product_removal",
            run_id = %run_id,
            product = %product,
            dry_run = self.dry_run
        );
        self.run_with_id(run_id, product).instrument(span).await
    }

    async fn run_with_id(
        &self,
        run_id: RunId,
        product: ProductKey,
    ) -> Result<RemovalReport, RemovalFailed> {
        let catalog = Catalog::load(self.store.as_ref(), &self.location)
            .await
            .map_err(|e| RemovalFailed::before_start(product.clone(), e))?;
        let target = catalog
            .get(&product.name, &product.version)
            .map_err(|e| RemovalFailed::before_start(product.clone(), e))?;

        tracing::info!("Removing {product}");
        let mut report = RemovalReport::new(run_id, product, self.dry_run);
        let orchestrator = Orchestrator::new(&catalog, target).dry_run(self.dry_run);

        let mut entry_error = None;
        let mut step = RemovalStep::Start;
        loop {
            step = step.next();
            report.terminal_step = step;
            let kind_report = match step {
                RemovalStep::RemoveImages => {
                    orchestrator.run_kind(self.removers.images.as_ref()).await
                }
                RemovalStep::RemoveObjects => {
                    orchestrator.run_kind(self.removers.objects.as_ref()).await
                }
                RemovalStep::RemovePackageRepos => {
                    orchestrator.run_kind(self.removers.charts.as_ref()).await
                }
                RemovalStep::RemoveManifests => {
                    orchestrator.run_kind(self.removers.manifests.as_ref()).await
                }
                RemovalStep::RemoveBootImages => {
                    orchestrator.run_kind(self.removers.boot_images.as_ref()).await
                }
                RemovalStep::RemoveRecipes => {
                    orchestrator.run_kind(self.removers.recipes.as_ref()).await
                }
                RemovalStep::RemoveHostedRepos => {
                    orchestrator.run_kind(self.removers.hosted_repos.as_ref()).await
                }
                RemovalStep::RemoveCatalogEntry => {
                    match self.remove_entry(target).await {
                        Ok(outcome) => report.catalog_entry = Some(outcome),
                        Err(err) => {
                            report.catalog_entry = Some(EntryOutcome::Failed(err.to_string()));
                            entry_error = Some(err);
                        }
                    }
                    continue;
                }
                RemovalStep::Start | RemovalStep::Done | RemovalStep::Failed => break,
            };
            self.record(&mut report, kind_report, target.key());
        }

        self.settle(report, entry_error)
    }

    fn record(&self, report: &mut RemovalReport, kind_report: KindReport, product: &ProductKey) {
        if let Err(err) = kind_report.check(product) {
            tracing::error!("{err}");
        }
        report.kinds.push(kind_report);
    }

    async fn remove_entry(&self, target: &ProductVersion) -> Result<EntryOutcome, ClientError> {
        let product = target.key();
        if self.dry_run {
            tracing::info!("would remove {product} from product catalog");
            return Ok(EntryOutcome::Skipped);
        }
        let request = CatalogEntryRequest::new(self.location.clone(), product.clone());
        self.entry.remove(&request).await.inspect_err(|err| {
            tracing::error!(error = %err, "error removing {product} from product catalog");
        })
    }

    /// Decide the terminal step and the run's error from the finished report.
    fn settle(
        &self,
        mut report: RemovalReport,
        entry_error: Option<ClientError>,
    ) -> Result<RemovalReport, RemovalFailed> {
        report.finished_at = Some(Utc::now());
        let product = report.product.clone();

        let error = match entry_error {
            Some(source) => Some(PurgeError::CatalogEntry {
                product: product.clone(),
                source,
            }),
            None => {
                let failed = report.failed_kinds();
                if failed.is_empty() {
                    None
                } else {
                    Some(PurgeError::Incomplete {
                        product: product.clone(),
                        failed,
                    })
                }
            }
        };

        match error {
            None => {
                report.terminal_step = RemovalStep::Done;
                tracing::info!(
                    dry_run = report.dry_run,
                    "Removal of {product} finished"
                );
                Ok(report)
            }
            Some(error) => {
                report.terminal_step = RemovalStep::Failed;
                Err(RemovalFailed {
                    product,
                    report: Some(Box::new(report)),
                    error,
                })
            }
        }
    }
}
