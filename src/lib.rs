// garden-sync - Publish a markdown vault as a digital garden
// Copyright (c) 2025 garden-sync Contributors
// Licensed under the MIT License

//! # garden-sync - digital garden publisher
//!
//! garden-sync selects the notes of a markdown vault that carry
//! `dg-publish: true` in their frontmatter, compiles them into portable
//! artifacts and synchronizes those with a GitHub repository or a local
//! export folder.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Selecting** publishable notes and the images they embed
//! - **Compiling** notes into text plus base64 assets
//! - **Publishing** idempotently, keyed by git blob id, one commit per batch
//! - **Mirroring** the same layout into a local folder
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (selection, publishing, status, sync)
//! - [`adapters`] - External integrations (GitHub REST API, vault compiler)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use garden_sync::config::load_config;
//! use garden_sync::core::sync::{SyncCoordinator, SyncOptions, SyncTarget};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(load_config("garden.toml")?);
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let coordinator = SyncCoordinator::from_config(config, SyncTarget::Local, shutdown_rx)?;
//!     let summary = coordinator.run(SyncOptions::default()).await?;
//!
//!     println!("Published {} notes", summary.published);
//!     Ok(())
//! }
//! ```
//!
//! ## Publishing a single artifact
//!
//! ```rust,no_run
//! use garden_sync::config::load_config;
//! use garden_sync::core::Publisher;
//! use garden_sync::domain::CompiledArtifact;
//! use std::sync::Arc;
//!
//! # async fn example(artifact: CompiledArtifact) -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(load_config("garden.toml")?);
//! let publisher = Publisher::remote(config)?;
//!
//! if !publisher.publish(&artifact).await {
//!     eprintln!("publish failed, see the log");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Constructors return [`domain::GardenError`]. Publish, delete and write
//! operations never do: they log and report `bool` or a
//! [`core::BatchOutcome`] with one entry per file.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
