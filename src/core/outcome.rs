//! Per-file results of batch operations

use crate::domain::{FailureKind, GardenError};
use std::collections::BTreeMap;
use std::fmt;

/// Why a file was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Frontmatter does not carry a truthy publish flag
    InvalidFrontmatter,
    /// Remote content already matches
    Unchanged,
    /// Dry run, nothing written
    DryRun,
    /// Nothing to delete at that path
    Missing,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InvalidFrontmatter => f.write_str("invalid frontmatter"),
            SkipReason::Unchanged => f.write_str("unchanged"),
            SkipReason::DryRun => f.write_str("dry run"),
            SkipReason::Missing => f.write_str("missing"),
        }
    }
}

/// Result for one file of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Published,
    Deleted,
    Skipped(SkipReason),
    Failed(FailureKind),
}

impl FileOutcome {
    /// Failure outcome for an error
    pub fn failed(error: &GardenError) -> Self {
        FileOutcome::Failed(error.failure_kind())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::Failed(_))
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Published => f.write_str("published"),
            FileOutcome::Deleted => f.write_str("deleted"),
            FileOutcome::Skipped(reason) => write!(f, "skipped ({reason})"),
            FileOutcome::Failed(kind) => write!(f, "failed ({kind})"),
        }
    }
}

/// Map from file identity to outcome
///
/// The identity is the garden path of an artifact, or the remote path of
/// a deletion. A batch succeeds when no file failed, so an empty batch is
/// a success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    files: BTreeMap<String, FileOutcome>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same outcome for every identity
    pub fn uniform<I, S>(ids: I, outcome: FileOutcome) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter().fold(Self::new(), |mut batch, id| {
            batch.record(id, outcome);
            batch
        })
    }

    /// Record (or overwrite) the outcome of one file
    pub fn record(&mut self, id: impl Into<String>, outcome: FileOutcome) {
        self.files.insert(id.into(), outcome);
    }

    /// Fold another batch into this one
    pub fn merge(&mut self, other: BatchOutcome) {
        self.files.extend(other.files);
    }

    pub fn get(&self, id: &str) -> Option<FileOutcome> {
        self.files.get(id).copied()
    }

    /// True when no file failed
    pub fn is_success(&self) -> bool {
        !self.files.values().any(FileOutcome::is_failure)
    }

    /// Files written or deleted
    pub fn succeeded(&self) -> usize {
        self.files
            .values()
            .filter(|o| matches!(o, FileOutcome::Published | FileOutcome::Deleted))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.files.values().filter(|o| o.is_failure()).count()
    }

    pub fn skipped(&self) -> usize {
        self.files
            .values()
            .filter(|o| matches!(o, FileOutcome::Skipped(_)))
            .count()
    }

    /// Identities and kinds of every failed file
    pub fn failures(&self) -> impl Iterator<Item = (&str, FailureKind)> {
        self.files.iter().filter_map(|(id, outcome)| match outcome {
            FileOutcome::Failed(kind) => Some((id.as_str(), *kind)),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FileOutcome)> {
        self.files.iter().map(|(id, outcome)| (id.as_str(), *outcome))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
