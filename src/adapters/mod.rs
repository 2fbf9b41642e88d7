//! External system integrations for garden-sync.
//!
//! - [`github`] - GitHub repository client behind the [`github::RemoteStore`] trait
//! - [`compiler`] - Note compilation behind the [`compiler::ArtifactCompiler`] trait
//! - [`factory`] - Builds the default implementations from configuration
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the publish
//! pipeline can be exercised against mock implementations.
//!
//! ```rust,no_run
//! use garden_sync::adapters::factory::create_remote_store;
//! use garden_sync::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("garden.toml")?;
//! let store = create_remote_store(&config)?;
//! let tree = store.list_tree().await?;
//! println!("{} remote files", tree.entries.len());
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod factory;
pub mod github;
