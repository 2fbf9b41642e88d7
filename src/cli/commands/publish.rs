//! Publish command implementation
//!
//! This module implements the `publish` command, which syncs the vault's
//! flagged notes to the configured GitHub repository.

use crate::config::{load_config, GardenConfig};
use crate::core::sync::{SyncCoordinator, SyncOptions, SyncSummary, SyncTarget};
use crate::domain::{FailureKind, GardenError};
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the publish command
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - compute what would change without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Delete remote notes and images that are no longer published
    #[arg(long)]
    pub prune: bool,
}

impl PublishArgs {
    /// Execute the publish command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting publish command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if let Err(e) = config.github.validate_credentials() {
            tracing::error!(error = %e, "Missing GitHub settings");
            eprintln!("{e}");
            return Ok(2);
        }

        let options = SyncOptions {
            dry_run: self.dry_run || config.application.dry_run,
            prune: self.prune,
        };

        if !self.yes && !options.dry_run {
            println!("Publish Configuration:");
            println!("  Vault: {}", config.vault.root);
            println!(
                "  Repository: {}/{} ({})",
                config.github.username, config.github.repo, config.github.branch
            );
            println!("  Prune: {}", options.prune);
            println!();
            if !confirm("Proceed with publish?")? {
                println!("Publish cancelled.");
                return Ok(0);
            }
        }

        Ok(run_sync(config, SyncTarget::Remote, options, shutdown_signal).await)
    }
}

/// Ask a yes/no question on stdin
pub(crate) fn confirm(question: &str) -> anyhow::Result<bool> {
    use std::io::{self, Write};

    print!("{question} [y/N]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Run one sync and print its summary, returning the exit code
pub(crate) async fn run_sync(
    config: GardenConfig,
    target: SyncTarget,
    options: SyncOptions,
    shutdown_signal: watch::Receiver<bool>,
) -> i32 {
    if options.dry_run {
        tracing::info!("Dry run mode enabled - nothing will be written");
        println!("🔍 DRY RUN MODE - Nothing will be written");
        println!();
    }

    let coordinator = match SyncCoordinator::from_config(Arc::new(config), target, shutdown_signal)
    {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create sync coordinator");
            eprintln!("Failed to initialize sync: {e}");
            return setup_exit_code(&e);
        }
    };

    println!("🚀 Starting sync...");
    println!();

    let summary = match coordinator.run(options).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Sync failed");
            eprintln!("Sync failed: {e}");
            return setup_exit_code(&e);
        }
    };

    summary.log_summary();
    print_summary(&summary);
    exit_code(&summary)
}

/// Exit code for an error raised before any file was written
pub(crate) fn setup_exit_code(error: &GardenError) -> i32 {
    match error.failure_kind() {
        FailureKind::Configuration => 2,
        FailureKind::Remote | FailureKind::Conflict | FailureKind::Timeout => 4,
        _ => 5,
    }
}

/// Exit code for a finished run
pub(crate) fn exit_code(summary: &SyncSummary) -> i32 {
    if summary.interrupted {
        130 // SIGINT exit code (standard Unix convention)
    } else if summary.is_successful() {
        0
    } else {
        1 // Partial success
    }
}

fn print_summary(summary: &SyncSummary) {
    println!();
    println!("📊 Sync Summary ({}):", summary.target);
    println!("  Candidates: {}", summary.candidates);
    println!("  Images: {}", summary.images);
    println!("  Compiled: {}", summary.compiled);
    println!("  New: {}", summary.unpublished);
    println!("  Changed: {}", summary.changed);
    println!("  Unchanged: {}", summary.unchanged);
    if summary.dry_run {
        println!("  Would publish: {}", summary.unpublished + summary.changed);
        println!("  Would delete: {}", summary.orphaned);
    } else {
        println!("  Published: {}", summary.published);
        println!("  Failed: {}", summary.publish_failed);
        println!("  Deleted: {}", summary.deleted);
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in &summary.errors {
            println!("  - {:?}: {}", error.error_type, error.message);
            if let Some(context) = &error.context {
                println!("    Context: {context}");
            }
        }
        println!();
    }

    if summary.interrupted {
        println!("⚠️  Sync interrupted. Run the same command again to finish.");
    } else if summary.is_successful() {
        println!("✅ Sync completed successfully!");
    } else {
        println!("⚠️  Sync completed with failures");
    }
}
