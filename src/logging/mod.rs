//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted file logs
//! - Configurable log levels
//! - Local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use garden_sync::logging::init_logging;
//! use garden_sync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(path = "notes/a.md", "Published");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a sync run
///
/// # Example
///
/// ```no_run
/// use garden_sync::log_sync_start;
///
/// log_sync_start!("/home/alice/vault", "remote", false);
/// ```
#[macro_export]
macro_rules! log_sync_start {
    ($vault:expr, $target:expr, $dry_run:expr) => {
        tracing::info!(
            vault = %$vault,
            sink = $target,
            dry_run = $dry_run,
            "Starting sync"
        );
    };
}

/// Log the per-file result counts of a batch
///
/// # Example
///
/// ```no_run
/// use garden_sync::log_batch_outcome;
///
/// log_batch_outcome!("publish", 10, 1, 0);
/// ```
#[macro_export]
macro_rules! log_batch_outcome {
    ($operation:expr, $succeeded:expr, $failed:expr, $skipped:expr) => {
        tracing::info!(
            operation = $operation,
            succeeded = $succeeded,
            failed = $failed,
            skipped = $skipped,
            "Batch finished"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use garden_sync::log_error_with_context;
/// use garden_sync::domain::GardenError;
///
/// let error = GardenError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
