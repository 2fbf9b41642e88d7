//! Configuration schema types
//!
//! This module defines the configuration structure for garden-sync.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Main garden-sync configuration
///
/// This is the root configuration structure that maps to the TOML file.
/// It is validated once after loading and then shared immutably.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GardenConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Source vault
    pub vault: VaultConfig,

    /// Remote repository (GitHub) settings
    #[serde(default)]
    pub github: GithubConfig,

    /// Local mirror settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Publish pipeline settings
    #[serde(default)]
    pub publish: PublishConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GardenConfig {
    /// Configuration for a vault with every other section at its default
    pub fn new(vault_root: impl Into<String>) -> Self {
        Self {
            application: ApplicationConfig::default(),
            vault: VaultConfig {
                root: vault_root.into(),
            },
            github: GithubConfig::default(),
            export: ExportConfig::default(),
            publish: PublishConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validates the configuration
    ///
    /// Remote credentials are not required here: the local mirror works
    /// without them. They are checked by [`GithubConfig::validate_credentials`]
    /// when a remote publisher is built.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.vault.validate()?;
        self.github.validate()?;
        self.publish.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (compute everything, write nothing)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Vault configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Root directory of the markdown vault
    pub root: String,
}

impl VaultConfig {
    fn validate(&self) -> Result<(), String> {
        if self.root.trim().is_empty() {
            return Err("vault.root cannot be empty".to_string());
        }
        Ok(())
    }
}

/// GitHub repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Repository name (owner is `username`)
    #[serde(default)]
    pub repo: String,

    /// Repository owner
    #[serde(default)]
    pub username: String,

    /// Access token
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Branch that receives commits
    #[serde(default = "default_branch")]
    pub branch: String,

    /// REST API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl GithubConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err("github.api_base_url must start with http:// or https://".to_string());
        }

        if self.branch.trim().is_empty() {
            return Err("github.branch cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("github.timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }

    /// Checks the three settings every remote operation needs
    ///
    /// Each missing value produces its own message; the first one found wins.
    pub fn validate_credentials(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.repo.trim().is_empty() {
            return Err("You need to define a GitHub repo in the settings".to_string());
        }

        if self.username.trim().is_empty() {
            return Err("You need to define a GitHub Username in the settings".to_string());
        }

        let token_missing = self
            .token
            .as_ref()
            .map(|t| t.expose_secret().is_blank())
            .unwrap_or(true);
        if token_missing {
            return Err("You need to define a GitHub Token in the settings".to_string());
        }

        Ok(())
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            username: String::new(),
            token: None,
            branch: default_branch(),
            api_base_url: default_api_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Local mirror configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExportConfig {
    /// Root of the export tree
    #[serde(default)]
    pub path: Option<String>,

    /// Slugify every path segment of local writes
    #[serde(default)]
    pub slugify_paths: bool,
}

impl ExportConfig {
    /// Checks that an export root is configured
    pub fn validate_target(&self) -> Result<(), String> {
        match self.path.as_deref() {
            Some(p) if !p.trim().is_empty() => Ok(()),
            _ => Err("You need to define an export path in the settings".to_string()),
        }
    }
}

/// A single prefix rewrite applied to vault paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRewriteRule {
    /// Vault folder prefix to replace
    pub from: String,

    /// Replacement garden folder (may be empty)
    #[serde(default)]
    pub to: String,
}

/// Publish pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Deadline for each store or filesystem call
    #[serde(default = "default_operation_timeout_seconds")]
    pub operation_timeout_seconds: u64,

    /// Vault-to-garden path rewrites, first match wins
    #[serde(default)]
    pub path_rewrite_rules: Vec<PathRewriteRule>,
}

impl PublishConfig {
    fn validate(&self) -> Result<(), String> {
        if self.operation_timeout_seconds == 0 {
            return Err("publish.operation_timeout_seconds must be > 0".to_string());
        }

        if let Some(rule) = self
            .path_rewrite_rules
            .iter()
            .find(|r| r.from.trim().is_empty())
        {
            return Err(format!(
                "publish.path_rewrite_rules entry with empty 'from' (to = '{}')",
                rule.to
            ));
        }

        Ok(())
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            operation_timeout_seconds: default_operation_timeout_seconds(),
            path_rewrite_rules: Vec::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_operation_timeout_seconds() -> u64 {
    60
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
