//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "garden.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing garden-sync configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} and point vault.root at your vault", self.output);
                println!("  2. Create a .env file with GARDEN_GITHUB_TOKEN=<your token>");
                println!("  3. Validate configuration: garden-sync validate-config");
                println!("  4. Preview changes: garden-sync status");
                println!("  5. Publish: garden-sync publish");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# garden-sync configuration

[application]
log_level = "info"
dry_run = false

[vault]
root = "/path/to/vault"

[github]
repo = "digital-garden"
username = "your-github-user"
token = "${GARDEN_GITHUB_TOKEN}"
branch = "main"

[export]
# path = "/path/to/export"
slugify_paths = false

[publish]
operation_timeout_seconds = 60

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# garden-sync configuration
#
# Publishes notes whose frontmatter contains `dg-publish: true` to a GitHub
# repository (src/site/notes/...) or mirrors them into a local folder.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Dry run mode (compute changes, write nothing)
dry_run = false

# ============================================================================
# Vault
# ============================================================================
[vault]
# Root folder of the markdown vault
root = "/path/to/vault"

# ============================================================================
# GitHub Repository
# ============================================================================
[github]
# Repository name and owner
repo = "digital-garden"
username = "your-github-user"

# Personal access token with contents:write (use environment variable)
token = "${GARDEN_GITHUB_TOKEN}"

# Branch that receives the commits
branch = "main"

# REST API base URL (change for GitHub Enterprise)
api_base_url = "https://api.github.com"

# HTTP request timeout in seconds
timeout_seconds = 30

# ============================================================================
# Local Export
# ============================================================================
[export]
# Folder that receives the mirrored site tree
path = "/path/to/export"

# Lowercase and dash-separate every path segment
slugify_paths = false

# ============================================================================
# Publishing
# ============================================================================
[publish]
# Deadline for every single store or filesystem operation
operation_timeout_seconds = 60

# Move notes to a different place in the garden.
# The first rule whose `from` folder matches wins.
[[publish.path_rewrite_rules]]
from = "Public"
to = ""

[[publish.path_rewrite_rules]]
from = "Blog/Drafts"
to = "posts"

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local JSON file logging
local_enabled = false

# Local log folder
local_path = "logs"

# Log rotation (daily, hourly or never)
local_rotation = "daily"
"#
        .to_string()
    }
}
