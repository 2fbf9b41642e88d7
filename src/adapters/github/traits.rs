//! Remote store abstraction
//!
//! The publish pipeline talks to the hosted repository only through
//! [`RemoteStore`], so tests and alternative hosts can stand in for GitHub.

use crate::domain::{RemoteWriteRequest, Result};
use async_trait::async_trait;

/// Current state of one remote file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Blob id of the stored content
    pub sha: String,

    /// Content as returned by the store (base64)
    pub content: Option<String>,
}

/// One blob entry of the remote tree listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTreeEntry {
    /// Repository-relative path
    pub path: String,

    /// Blob id
    pub sha: String,
}

/// Listing of every blob on the branch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteTree {
    pub entries: Vec<RemoteTreeEntry>,

    /// Some folder could not be listed in full, so `entries` may miss files
    pub truncated: bool,
}

/// Stateless façade over a hosted repository
///
/// Every method is a single logical operation; implementations keep no
/// per-call state between invocations.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read one file
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the path does not exist on the remote.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than not-found.
    async fn get_file(&self, path: &str) -> Result<Option<RemoteFile>>;

    /// Create or update one file
    ///
    /// `request.expected_hash` is forwarded as the store's precondition.
    ///
    /// # Returns
    ///
    /// The blob id of the written content.
    async fn update_file(&self, request: &RemoteWriteRequest) -> Result<String>;

    /// Delete one file
    ///
    /// When `sha` is `None` the current blob id is looked up first.
    ///
    /// # Returns
    ///
    /// `false` when the file did not exist.
    async fn delete_file(&self, path: &str, sha: Option<&str>, message: &str) -> Result<bool>;

    /// Write many files in one logical operation (one commit)
    async fn update_files(&self, writes: &[RemoteWriteRequest], message: &str) -> Result<()>;

    /// Delete many files in one logical operation (one commit)
    ///
    /// Paths that do not exist on the remote are ignored.
    async fn delete_files(&self, paths: &[String], message: &str) -> Result<()>;

    /// List every blob on the configured branch
    ///
    /// An empty, complete tree when the branch does not exist yet.
    async fn list_tree(&self) -> Result<RemoteTree>;
}
