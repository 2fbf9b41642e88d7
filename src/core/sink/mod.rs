//! Publish sinks
//!
//! A sink is where compiled artifacts end up. [`RemoteSink`] writes to the
//! hosted repository, [`LocalSink`] mirrors the same layout into a local
//! folder. Both lay files out with [`crate::core::paths`].
//!
//! Every path handed to [`PublishSink::delete`] and
//! [`PublishSink::delete_batch`] is sink-relative, for example
//! `src/site/notes/a.md`.

pub mod local;
pub mod remote;

pub use local::LocalSink;
pub use remote::RemoteSink;

use crate::core::outcome::BatchOutcome;
use crate::domain::{Asset, CompiledArtifact, Result};
use async_trait::async_trait;

/// Destination for compiled artifacts
#[async_trait]
pub trait PublishSink: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &'static str;

    /// Write the text of one note
    ///
    /// # Arguments
    ///
    /// * `garden_path` - Note path below the note root
    /// * `text` - Compiled note text
    /// * `known_hash` - Current remote blob id, when already known
    async fn write_text(&self, garden_path: &str, text: &str, known_hash: Option<&str>)
        -> Result<()>;

    /// Write one asset below the image root
    async fn write_asset(&self, asset: &Asset) -> Result<()>;

    /// Remove one file
    ///
    /// # Returns
    ///
    /// `false` when there was nothing at `path`.
    async fn delete(&self, path: &str, sha: Option<&str>) -> Result<bool>;

    /// Write every artifact (text and assets), keyed by garden path
    ///
    /// Never fails as a whole; failures are reported per file.
    async fn write_batch(&self, artifacts: &[&CompiledArtifact]) -> BatchOutcome;

    /// Remove every path, keyed by path
    async fn delete_batch(&self, paths: &[String]) -> BatchOutcome;
}
