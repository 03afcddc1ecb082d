//! `delete` command: wire the collaborators, run, print the report.

use anyhow::Context;
use std::sync::Arc;

use purge_core::app::{Collaborators, ProductPurge, RemovalSettings, Removers};
use purge_core::domain::{DeletionOutcome, EntryOutcome, KindReport, RemovalReport};
use purge_core::impls::{
    CrayCli, CraySettings, FileCatalogStore, FileCredentialProvider, NexusClient, NexusSettings,
    StaticCredentials,
};
use purge_core::ports::{CatalogLocation, CredentialProvider, Credentials};

use crate::cli::DeleteArgs;
use crate::config::{NexusConfig, PurgeConfig};

pub async fn run(config: &PurgeConfig, args: &DeleteArgs) -> anyhow::Result<()> {
    let credentials = resolve_credentials(&config.nexus).await;
    let nexus = Arc::new(
        NexusClient::new(
            &NexusSettings {
                url: config.nexus.url.clone(),
                docker_url: config.nexus.docker_url.clone(),
                timeout: config.http.timeout,
            },
            credentials,
        )
        .context("building Nexus client")?,
    );
    let cray = Arc::new(CrayCli::new(CraySettings {
        bin: config.cray.bin.clone(),
        boot_image_bucket: config.index.boot_image_bucket.clone(),
        recipe_bucket: config.index.recipe_bucket.clone(),
        timeout: config.http.timeout,
    }));

    let removers = Removers::new(
        Collaborators {
            registry: nexus.clone(),
            objects: cray.clone(),
            packages: nexus,
            index: cray,
        },
        &RemovalSettings {
            chart_repository: config.nexus.charts_repository.clone(),
            manifest_bucket: config.manifests.bucket.clone(),
            manifest_prefix: config.manifests.prefix.clone(),
        },
    );
    let store = Arc::new(FileCatalogStore::new(&config.catalog.dir));
    let location = CatalogLocation::new(&config.catalog.name, &config.catalog.namespace);
    let purge = ProductPurge::new(store, location, removers).dry_run(args.dry_run);

    match purge.run(&args.product, &args.version).await {
        Ok(report) => print_report(&report, args.json),
        Err(failed) => {
            if let Some(report) = &failed.report {
                print_report(report, args.json)?;
            }
            Err(failed.into())
        }
    }
}

/// Credentials are optional: a provider failure is logged and the run
/// continues unauthenticated.
async fn resolve_credentials(nexus: &NexusConfig) -> Option<Credentials> {
    let provider: Box<dyn CredentialProvider> = match &nexus.credentials_file {
        Some(path) => Box::new(FileCredentialProvider::new(path)),
        None => Box::new(StaticCredentials::new(nexus.inline_credentials())),
    };
    match provider.credentials().await {
        Ok(credentials) => credentials,
        Err(err) => {
            tracing::warn!(error = %err, "could not load Nexus credentials; continuing without them");
            None
        }
    }
}

fn print_report(report: &RemovalReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("serializing report")?
        );
    } else {
        for line in summary_lines(report) {
            println!("{line}");
        }
    }
    Ok(())
}

fn summary_lines(report: &RemovalReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.kinds.len() + 2);
    let mode = if report.dry_run { " (dry run)" } else { "" };
    lines.push(format!("{}{mode} [{}]", report.product, report.run_id));

    for kind in &report.kinds {
        lines.push(kind_line(kind, report.dry_run));
    }

    let entry = match &report.catalog_entry {
        Some(EntryOutcome::Removed) => "removed".to_string(),
        Some(EntryOutcome::AlreadyRemoved) => "already removed".to_string(),
        Some(EntryOutcome::Skipped) => "skipped".to_string(),
        Some(EntryOutcome::Failed(e)) => format!("failed: {e}"),
        None => "not attempted".to_string(),
    };
    lines.push(format!("  catalog entry: {entry}"));
    lines
}

fn kind_line(kind: &KindReport, dry_run: bool) -> String {
    if kind.is_empty() {
        return format!("  {}: none", kind.kind);
    }
    let shared = kind.count(|o| matches!(o, DeletionOutcome::SkippedShared(_)));
    let absent = kind.count(|o| *o == DeletionOutcome::AlreadyAbsent);
    let failed = kind.count(DeletionOutcome::is_failure);
    let acted = if dry_run {
        format!("{} would be removed", kind.count(|o| *o == DeletionOutcome::WouldDelete))
    } else {
        format!("{} removed", kind.count(|o| *o == DeletionOutcome::Deleted))
    };
    format!(
        "  {}: {acted}, {shared} shared, {absent} already absent, {failed} failed",
        kind.kind
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use purge_core::domain::{ArtifactKind, ProductKey, RunId};

    #[test]
    fn summary_has_one_line_per_kind() {
        let mut report = RemovalReport::new(RunId::generate(), ProductKey::new("sat", "2.0.3"), false);
        let mut images = KindReport::new(ArtifactKind::ContainerImage);
        images.push("a:1", DeletionOutcome::SkippedShared(vec![ProductKey::new("sat", "2.0.4")]));
        images.push("b:1", DeletionOutcome::Deleted);
        images.push("c:1", DeletionOutcome::Failed("boom".into()));
        report.kinds.push(images);
        report.kinds.push(KindReport::new(ArtifactKind::ObjectArtifact));
        report.catalog_entry = Some(EntryOutcome::Removed);

        let lines = summary_lines(&report);

        assert!(lines[0].starts_with("sat-2.0.3 [run-"));
        assert_eq!(
            lines[1],
            "  container images: 1 removed, 1 shared, 0 already absent, 1 failed"
        );
        assert_eq!(lines[2], "  object storage artifacts: none");
        assert_eq!(lines[3], "  catalog entry: removed");
    }

    #[test]
    fn dry_run_summary_counts_would_be_removed() {
        let mut report = RemovalReport::new(RunId::generate(), ProductKey::new("sat", "2.0.3"), true);
        let mut charts = KindReport::new(ArtifactKind::HelmChart);
        charts.push("cray-sat:2.0.3", DeletionOutcome::WouldDelete);
        report.kinds.push(charts);
        report.catalog_entry = Some(EntryOutcome::Skipped);

        let lines = summary_lines(&report);

        assert!(lines[0].contains("(dry run)"));
        assert_eq!(
            lines[1],
            "  helm charts: 1 would be removed, 0 shared, 0 already absent, 0 failed"
        );
        assert_eq!(lines[2], "  catalog entry: skipped");
    }

    #[tokio::test]
    async fn unreadable_credentials_file_is_not_fatal() {
        let nexus = NexusConfig {
            credentials_file: Some("/nonexistent/nexus.json".into()),
            ..NexusConfig::default()
        };
        assert_eq!(resolve_credentials(&nexus).await, None);
    }
}
