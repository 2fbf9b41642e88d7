//! Sync orchestration
//!
//! This module provides the end-to-end publish run:
//! - Scan, compile and status comparison
//! - One publish batch and an optional prune batch
//! - Summary and reporting

pub mod coordinator;
pub mod summary;

pub use coordinator::{SyncCoordinator, SyncOptions, SyncTarget};
pub use summary::{SyncError, SyncErrorType, SyncSummary};
