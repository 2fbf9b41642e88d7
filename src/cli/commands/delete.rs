//! Delete command implementation
//!
//! This module implements the `delete` command for unpublishing notes or
//! images by their vault path.

use super::publish::{confirm, setup_exit_code};
use crate::config::{load_config, GardenConfig};
use crate::core::paths::{asset_relative_path, garden_path, image_path, note_path};
use crate::core::Publisher;
use crate::domain::VaultPath;
use clap::Args;
use std::sync::Arc;

/// Arguments for the delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Vault paths of the notes (or images, with --image) to unpublish
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Treat the paths as images instead of notes
    #[arg(long)]
    pub image: bool,

    /// Delete from the local export folder instead of the repository
    #[arg(long)]
    pub local: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl DeleteArgs {
    /// Execute the delete command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(count = self.paths.len(), image = self.image, "Starting delete command");

        let config = match load_config(config_path) {
            Ok(c) => Arc::new(c),
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let targets = match self.sink_paths(&config) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Invalid path: {e}");
                return Ok(2);
            }
        };

        let publisher = if self.local {
            Publisher::local(config.clone())
        } else {
            Publisher::remote(config.clone())
        };
        let publisher = match publisher {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create publisher");
                eprintln!("{e}");
                return Ok(setup_exit_code(&e));
            }
        };

        if !self.yes {
            println!("Files to delete ({}):", publisher.sink_name());
            for target in &targets {
                println!("  - {target}");
            }
            println!();
            if !confirm("Proceed with delete?")? {
                println!("Delete cancelled.");
                return Ok(0);
            }
        }

        if let [single] = targets.as_slice() {
            return Ok(if publisher.delete(single, None).await {
                println!("✅ Deleted {single}");
                0
            } else {
                println!("⚠️  Nothing deleted at {single}");
                1
            });
        }

        let outcome = publisher.delete_batch(&targets).await;
        for (path, result) in outcome.iter() {
            println!("  {path}: {result}");
        }

        Ok(if outcome.is_success() { 0 } else { 1 })
    }

    /// Sink paths for the given vault paths
    fn sink_paths(&self, config: &GardenConfig) -> Result<Vec<String>, String> {
        self.paths
            .iter()
            .map(|raw| {
                let path = VaultPath::new(raw.replace('\\', "/"))?;
                Ok(if self.image {
                    image_path(&asset_relative_path(&path))
                } else {
                    note_path(&garden_path(&path, &config.publish.path_rewrite_rules))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathRewriteRule;

    fn args(paths: &[&str], image: bool) -> DeleteArgs {
        DeleteArgs {
            paths: paths.iter().map(|p| p.to_string()).collect(),
            image,
            local: false,
            yes: true,
        }
    }

    #[test]
    fn test_note_paths_apply_rewrite_rules() {
        let mut config = GardenConfig::new("/vault");
        config.publish.path_rewrite_rules = vec![PathRewriteRule {
            from: "Public".to_string(),
            to: String::new(),
        }];

        let paths = args(&["Public/a.md", "b.md"], false)
            .sink_paths(&config)
            .unwrap();
        assert_eq!(paths, vec!["src/site/notes/a.md", "src/site/notes/b.md"]);
    }

    #[test]
    fn test_image_paths() {
        let config = GardenConfig::new("/vault");
        let paths = args(&["pics/cat.png"], true).sink_paths(&config).unwrap();
        assert_eq!(paths, vec!["src/site/img/user/pics/cat.png"]);
    }

    #[test]
    fn test_invalid_path_rejected() {
        let config = GardenConfig::new("/vault");
        assert!(args(&["../escape.md"], false).sink_paths(&config).is_err());
    }
}
