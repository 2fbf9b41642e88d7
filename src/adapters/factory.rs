//! Adapter factory
//!
//! Builds the default adapter implementations from configuration.

use crate::adapters::compiler::{ArtifactCompiler, VaultCompiler};
use crate::adapters::github::{GithubRepository, RemoteStore};
use crate::config::GardenConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the remote store client for the configured repository
///
/// # Errors
///
/// Returns a configuration error if repo, username or token is missing.
pub fn create_remote_store(config: &GardenConfig) -> Result<Arc<dyn RemoteStore + Send + Sync>> {
    tracing::info!(
        repo = %config.github.repo,
        owner = %config.github.username,
        branch = %config.github.branch,
        "Creating GitHub client"
    );
    let client = GithubRepository::new(&config.github)?;
    Ok(Arc::new(client) as Arc<dyn RemoteStore + Send + Sync>)
}

/// Create the compiler for the configured vault
///
/// # Errors
///
/// Returns a configuration error if the vault root is not a directory.
pub fn create_compiler(config: &GardenConfig) -> Result<Arc<dyn ArtifactCompiler + Send + Sync>> {
    let compiler = VaultCompiler::new(&config.vault.root)?;
    Ok(Arc::new(compiler) as Arc<dyn ArtifactCompiler + Send + Sync>)
}
