use anyhow::{Context, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use figment::providers::Serialized;
use std::path::PathBuf;

use crate::config::PurgeConfig;
use crate::{delete, logging};

/// Remove installed product versions and the artifacts only they use
#[derive(Parser)]
#[command(name = "product-purge", version, about)]
pub struct Cli {
    /// Configuration file (default: ./product-purge.toml if present)
    #[arg(long, global = true, env = "PURGE_CONFIG")]
    config: Option<PathBuf>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Also write debug-level logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove one version of a product
    #[command(visible_alias = "uninstall")]
    Delete(DeleteArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// Product name, e.g. `sat`
    pub product: String,

    /// Version to remove, e.g. `2.0.3`
    pub version: String,

    /// Resolve and report, but delete nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(long)]
    pub catalog_name: Option<String>,

    #[arg(long)]
    pub catalog_namespace: Option<String>,

    #[arg(long)]
    pub catalog_dir: Option<PathBuf>,

    #[arg(long)]
    pub nexus_url: Option<String>,

    #[arg(long)]
    pub docker_url: Option<String>,

    #[arg(long)]
    pub nexus_credentials_file: Option<PathBuf>,
}

impl DeleteArgs {
    /// Merge flag overrides on top of the loaded layers.
    fn configure(&self, mut figment: figment::Figment) -> figment::Figment {
        if let Some(v) = &self.catalog_name {
            figment = figment.merge(Serialized::default("catalog.name", v));
        }
        if let Some(v) = &self.catalog_namespace {
            figment = figment.merge(Serialized::default("catalog.namespace", v));
        }
        if let Some(v) = &self.catalog_dir {
            figment = figment.merge(Serialized::default("catalog.dir", v));
        }
        if let Some(v) = &self.nexus_url {
            figment = figment.merge(Serialized::default("nexus.url", v));
        }
        if let Some(v) = &self.docker_url {
            figment = figment.merge(Serialized::default("nexus.docker_url", v));
        }
        if let Some(v) = &self.nexus_credentials_file {
            figment = figment.merge(Serialized::default("nexus.credentials_file", v));
        }
        figment
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        logging::init(self.verbose, self.quiet, self.log_file.as_deref())?;

        if let Some(path) = &self.config {
            if !path.exists() {
                bail!("configuration file {} does not exist", path.display());
            }
        }
        let figment = PurgeConfig::figment(self.config.as_deref());

        match self.command {
            Commands::Delete(args) => {
                let config: PurgeConfig = args
                    .configure(figment)
                    .extract()
                    .context("loading configuration")?;
                tracing::debug!(catalog = ?config.catalog, nexus = %config.nexus.url, "configuration loaded");
                delete::run(&config, &args).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn uninstall_is_an_alias_for_delete() {
        let cli = Cli::try_parse_from(["product-purge", "uninstall", "sat", "2.0.3", "--dry-run"])
            .unwrap();
        let Commands::Delete(args) = cli.command;
        assert_eq!(args.product, "sat");
        assert_eq!(args.version, "2.0.3");
        assert!(args.dry_run);
    }

    #[test]
    fn flags_override_loaded_configuration() {
        let cli = Cli::try_parse_from([
            "product-purge",
            "delete",
            "sat",
            "2.0.3",
            "--catalog-namespace",
            "staging",
            "--nexus-url",
            "https://nexus.example",
        ])
        .unwrap();
        let Commands::Delete(args) = cli.command;

        let config: PurgeConfig = args
            .configure(figment::Figment::from(Serialized::defaults(PurgeConfig::default())))
            .extract()
            .unwrap();
        assert_eq!(config.catalog.namespace, "staging");
        assert_eq!(config.catalog.name, "cray-product-catalog");
        assert_eq!(config.nexus.url, "https://nexus.example");
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["product-purge", "-v", "-q", "delete", "sat", "1"]).is_err());
    }
}
