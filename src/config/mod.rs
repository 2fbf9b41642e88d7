//! Configuration management for garden-sync.
//!
//! # Overview
//!
//! garden-sync uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `GARDEN_*` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [vault]
//! root = "/home/alice/vault"
//!
//! [github]
//! repo = "digital-garden"
//! username = "alice"
//! token = "${GARDEN_GITHUB_TOKEN}"
//!
//! [export]
//! path = "/home/alice/garden-export/"
//!
//! [[publish.path_rewrite_rules]]
//! from = "Public"
//! to = ""
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use garden_sync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("garden.toml")?;
//! println!("Vault: {}", config.vault.root);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, ExportConfig, GardenConfig, GithubConfig, LoggingConfig,
    PathRewriteRule, PublishConfig, VaultConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
