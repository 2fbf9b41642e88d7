//! Artifact compiler abstraction

use crate::domain::{CompiledArtifact, PublishCandidate, Result, VaultPath};
use async_trait::async_trait;

/// Turns one publish candidate into a portable artifact
///
/// Implementations must be pure with respect to the publish pipeline: the
/// same candidate compiles to the same artifact within one run.
#[async_trait]
pub trait ArtifactCompiler: Send + Sync {
    /// Compile a candidate into text plus its assets
    ///
    /// # Errors
    ///
    /// Returns an error if the source or one of its assets cannot be read.
    async fn compile(&self, candidate: &PublishCandidate) -> Result<CompiledArtifact>;

    /// Vault paths of every image the candidate embeds, in order of first use
    async fn image_links(&self, candidate: &PublishCandidate) -> Result<Vec<VaultPath>>;
}
