//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for garden-sync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// garden-sync - publish a markdown vault as a digital garden
#[derive(Parser, Debug)]
#[command(name = "garden-sync")]
#[command(version, about, long_about = None)]
#[command(author = "garden-sync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "garden.toml", env = "GARDEN_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GARDEN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish flagged notes to the GitHub repository
    Publish(commands::publish::PublishArgs),

    /// Mirror flagged notes into the local export folder
    Export(commands::export::ExportArgs),

    /// Show which notes are new, changed or orphaned
    Status(commands::status::StatusArgs),

    /// Unpublish notes or images
    Delete(commands::delete::DeleteArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
