//! Sync summary and reporting
//!
//! This module defines structures for tracking and reporting sync results.

use crate::core::outcome::BatchOutcome;
use crate::domain::{FailureKind, GardenError};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Summary of one sync run
#[derive(Debug, Clone)]
pub struct SyncSummary {
    /// Sink the run wrote to (`remote` or `local`)
    pub target: String,

    /// Whether writes were suppressed
    pub dry_run: bool,

    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,

    /// Notes selected for publishing
    pub candidates: usize,

    /// Distinct images referenced by the candidates
    pub images: usize,

    /// Candidates compiled successfully
    pub compiled: usize,

    /// Compiled notes missing from the sink
    pub unpublished: usize,

    /// Compiled notes that differ from the sink
    pub changed: usize,

    /// Compiled notes identical to the sink
    pub unchanged: usize,

    /// Notes written
    pub published: usize,

    /// Notes whose write failed
    pub publish_failed: usize,

    /// Orphaned sink files found (only collected with pruning)
    pub orphaned: usize,

    /// Sink files removed
    pub deleted: usize,

    /// Sink files whose removal failed
    pub delete_failed: usize,

    /// Stopped early on a shutdown signal
    pub interrupted: bool,

    /// Duration of the run
    pub duration: Duration,

    /// Errors encountered during the run
    pub errors: Vec<SyncError>,
}

impl SyncSummary {
    /// Create a new empty summary
    pub fn new(target: impl Into<String>, dry_run: bool) -> Self {
        Self {
            target: target.into(),
            dry_run,
            started_at: Utc::now(),
            candidates: 0,
            images: 0,
            compiled: 0,
            unpublished: 0,
            changed: 0,
            unchanged: 0,
            published: 0,
            publish_failed: 0,
            orphaned: 0,
            deleted: 0,
            delete_failed: 0,
            interrupted: false,
            duration: Duration::from_secs(0),
            errors: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: SyncError) {
        self.errors.push(error);
    }

    /// Fold the outcome of a publish batch into the counters
    pub fn record_publish(&mut self, outcome: &BatchOutcome) {
        self.published += outcome.succeeded();
        self.publish_failed += outcome.failed();
        for (path, kind) in outcome.failures() {
            self.add_error(
                SyncError::new(SyncErrorType::Publish, format!("{kind} failure"))
                    .with_context(format!("path={path}")),
            );
        }
    }

    /// Fold the outcome of a delete batch into the counters
    pub fn record_delete(&mut self, outcome: &BatchOutcome) {
        self.deleted += outcome.succeeded();
        self.delete_failed += outcome.failed();
        for (path, kind) in outcome.failures() {
            self.add_error(
                SyncError::new(SyncErrorType::Delete, format!("{kind} failure"))
                    .with_context(format!("path={path}")),
            );
        }
    }

    /// Check if the run was successful (no failures)
    pub fn is_successful(&self) -> bool {
        self.publish_failed == 0 && self.delete_failed == 0 && self.errors.is_empty()
    }

    /// Get success rate of the writes as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.published + self.publish_failed;
        if attempted == 0 {
            return 100.0;
        }
        (self.published as f64 / attempted as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            target_sink = %self.target,
            dry_run = self.dry_run,
            started_at = %self.started_at.to_rfc3339(),
            candidates = self.candidates,
            images = self.images,
            compiled = self.compiled,
            unpublished = self.unpublished,
            changed = self.changed,
            unchanged = self.unchanged,
            published = self.published,
            publish_failed = self.publish_failed,
            deleted = self.deleted,
            delete_failed = self.delete_failed,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Sync completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(error_count = self.errors.len(), "Sync completed with errors");
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = error.context.as_deref().unwrap_or(""),
                    "Sync error"
                );
            }
        }
    }
}

/// Type of sync error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorType {
    /// Compiling a candidate failed
    Compile,
    /// Writing a note failed
    Publish,
    /// Removing an orphan failed
    Delete,
    /// Talking to the remote store failed
    Remote,
    /// Configuration error
    Configuration,
    /// Unknown error
    Unknown,
}

impl From<FailureKind> for SyncErrorType {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Compile => SyncErrorType::Compile,
            FailureKind::Configuration => SyncErrorType::Configuration,
            FailureKind::Remote | FailureKind::Conflict | FailureKind::Timeout => {
                SyncErrorType::Remote
            }
            FailureKind::Validation | FailureKind::Io | FailureKind::Other => {
                SyncErrorType::Unknown
            }
        }
    }
}

/// Sync error with context
#[derive(Debug, Clone)]
pub struct SyncError {
    /// Type of error
    pub error_type: SyncErrorType,

    /// Error message
    pub message: String,

    /// Optional context (e.g. the vault path)
    pub context: Option<String>,
}

impl SyncError {
    /// Create a new sync error
    pub fn new(error_type: SyncErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
            context: None,
        }
    }

    /// Classify a domain error
    pub fn from_error(error: &GardenError) -> Self {
        Self::new(error.failure_kind().into(), error.to_string())
    }

    /// Add context to the error
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}
