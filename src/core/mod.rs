//! Core business logic for garden-sync.
//!
//! This module contains the selection, publishing and sync orchestration.
//!
//! # Modules
//!
//! - [`selection`] - Vault scan and the publish predicate
//! - [`paths`] - Remote and local path layout, path rewrite rules
//! - [`publish`] - Single-document and batch publishing through a sink
//! - [`sink`] - Remote and local delivery backends
//! - [`mirror`] - Local export workflow
//! - [`status`] - New / changed / unchanged / deleted classification
//! - [`sync`] - End-to-end sync runs and their summary
//!
//! # Sync Workflow
//!
//! 1. **Scan**: Select notes with a truthy `dg-publish` flag
//! 2. **Compile**: Rewrite image embeds and collect assets
//! 3. **Status**: Compare blob ids with the sink
//! 4. **Publish**: Write new and changed notes in one batch
//! 5. **Prune** (optional): Delete orphaned sink files in one batch
//! 6. **Report**: Generate the sync summary
//!
//! # Example
//!
//! ```rust,no_run
//! use garden_sync::config::load_config;
//! use garden_sync::core::sync::{SyncCoordinator, SyncOptions, SyncTarget};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(load_config("garden.toml")?);
//!
//! // Create shutdown signal
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = SyncCoordinator::from_config(config, SyncTarget::Remote, shutdown_rx)?;
//! let summary = coordinator.run(SyncOptions::default()).await?;
//!
//! println!("Published: {}", summary.published);
//! println!("Failed: {}", summary.publish_failed);
//! # Ok(())
//! # }
//! ```

pub mod deadline;
pub mod mirror;
pub mod outcome;
pub mod paths;
pub mod publish;
pub mod selection;
pub mod sink;
pub mod status;
pub mod sync;

pub use mirror::LocalMirror;
pub use outcome::{BatchOutcome, FileOutcome, SkipReason};
pub use publish::Publisher;
pub use selection::{should_publish, MarkedForPublishing, Scanner};
pub use sink::{LocalSink, PublishSink, RemoteSink};
pub use status::{blob_id, PublishStatus, PublishStatusManager};
