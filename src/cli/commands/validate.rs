//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the garden-sync configuration file.

use crate::config::load_config;
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates every section
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Vault: {}", config.vault.root);
        if !Path::new(&config.vault.root).is_dir() {
            println!("  ⚠️  Vault folder does not exist");
        }

        match config.github.validate_credentials() {
            Ok(()) => {
                println!(
                    "  GitHub: {}/{} ({})",
                    config.github.username, config.github.repo, config.github.branch
                );
                println!("  GitHub API: {}", config.github.api_base_url);
            }
            Err(e) => println!("  GitHub: not configured ({e})"),
        }

        match config.export.path.as_deref() {
            Some(path) if config.export.validate_target().is_ok() => {
                println!("  Export Folder: {path}");
                println!("  Slugify Paths: {}", config.export.slugify_paths);
            }
            _ => println!("  Export Folder: not configured"),
        }

        println!(
            "  Operation Timeout: {}s",
            config.publish.operation_timeout_seconds
        );
        println!(
            "  Path Rewrite Rules: {}",
            config.publish.path_rewrite_rules.len()
        );
        println!();
        Ok(0)
    }
}
