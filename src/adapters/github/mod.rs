//! GitHub repository integration
//!
//! This module provides the [`RemoteStore`] abstraction, the REST client
//! implementing it and the API models.

pub mod client;
pub mod models;
pub mod traits;

pub use client::{GithubRepository, BLOB_UPLOAD_CONCURRENCY};
pub use traits::{RemoteFile, RemoteStore, RemoteTree, RemoteTreeEntry};
