//! Status command implementation
//!
//! This module implements the `status` command for displaying which notes
//! are new, changed, unchanged or orphaned.

use super::publish::setup_exit_code;
use crate::config::load_config;
use crate::core::sync::{SyncCoordinator, SyncSummary, SyncTarget};
use crate::core::PublishStatus;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Compare with the local export folder instead of the repository
    #[arg(long)]
    pub local: bool,

    /// List unchanged notes too
    #[arg(long)]
    pub all: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(local = self.local, "Checking publish status");

        println!("📊 Publish Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2); // Configuration error exit code
            }
        };

        let target = if self.local {
            SyncTarget::Local
        } else {
            SyncTarget::Remote
        };

        let coordinator =
            match SyncCoordinator::from_config(Arc::new(config), target, shutdown_signal) {
                Ok(c) => c,
                Err(e) => {
                    println!("❌ Failed to initialize");
                    println!("   Error: {}", e);
                    return Ok(setup_exit_code(&e));
                }
            };

        let mut summary = SyncSummary::new(coordinator.publisher().sink_name(), true);
        let status = match coordinator.compute_status(&mut summary).await {
            Ok(Some(status)) => status,
            Ok(None) => return Ok(130),
            Err(e) => {
                println!("❌ Failed to read current state");
                println!("   Error: {}", e);
                return Ok(setup_exit_code(&e));
            }
        };

        self.print_status(&status);

        for error in &summary.errors {
            println!("⚠️  {:?}: {}", error.error_type, error.message);
        }

        Ok(if summary.errors.is_empty() { 0 } else { 1 })
    }

    fn print_status(&self, status: &PublishStatus) {
        print_section(
            "New",
            status.unpublished_notes.iter().map(|a| a.garden_path.as_str()),
        );
        print_section(
            "Changed",
            status.changed_notes.iter().map(|a| a.garden_path.as_str()),
        );
        if self.all {
            print_section(
                "Unchanged",
                status.published_notes.iter().map(|a| a.garden_path.as_str()),
            );
        } else {
            println!("Unchanged: {}", status.published_notes.len());
            println!();
        }
        print_section(
            "Deleted notes",
            status.deleted_note_paths.iter().map(String::as_str),
        );
        print_section(
            "Deleted images",
            status.deleted_image_paths.iter().map(String::as_str),
        );
        if let Some(reason) = &status.orphans_withheld {
            println!("⚠️  Deleted files may be incomplete: {reason}");
        }
    }
}

fn print_section<'a>(title: &str, paths: impl ExactSizeIterator<Item = &'a str>) {
    println!("{title}: {}", paths.len());
    for path in paths {
        println!("  - {path}");
    }
    println!();
}
