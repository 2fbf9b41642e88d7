//! Export command implementation
//!
//! This module implements the `export` command, which mirrors the published
//! notes into a local folder with the same layout as the repository.

use super::publish::run_sync;
use crate::config::load_config;
use crate::core::sync::{SyncOptions, SyncTarget};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Override the export folder from the configuration
    #[arg(short, long)]
    pub output: Option<String>,

    /// Slugify every path segment of the written files
    #[arg(long)]
    pub slugify: bool,

    /// Dry run mode - compute what would change without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Delete exported files that are no longer published
    #[arg(long)]
    pub prune: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if let Some(output) = &self.output {
            tracing::info!(output = %output, "Overriding export path from CLI");
            config.export.path = Some(output.clone());
        }

        if self.slugify {
            config.export.slugify_paths = true;
        }

        if let Err(e) = config.export.validate_target() {
            tracing::error!(error = %e, "Missing export path");
            eprintln!("{e}");
            return Ok(2);
        }

        let options = SyncOptions {
            dry_run: self.dry_run || config.application.dry_run,
            prune: self.prune,
        };

        Ok(run_sync(config, SyncTarget::Local, options, shutdown_signal).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_args_defaults() {
        let args = ExportArgs {
            output: None,
            slugify: false,
            dry_run: false,
            prune: false,
        };

        assert!(args.output.is_none());
        assert!(!args.slugify);
        assert!(!args.dry_run);
    }

    #[tokio::test]
    async fn test_missing_config_is_configuration_error() {
        let args = ExportArgs {
            output: Some("/tmp/out".to_string()),
            slugify: false,
            dry_run: true,
            prune: false,
        };
        let (_tx, rx) = watch::channel(false);

        let code = args
            .execute("/definitely/not/here/garden.toml", rx)
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
