//! Local mirror writer
//!
//! The export workflow: the same artifacts the remote path publishes,
//! written below `export.path` with the remote layout.

use crate::config::GardenConfig;
use crate::core::outcome::BatchOutcome;
use crate::core::publish::Publisher;
use crate::core::sink::{LocalSink, PublishSink};
use crate::domain::{CompiledArtifact, Result};
use std::path::Path;
use std::sync::Arc;

pub struct LocalMirror {
    sink: Arc<LocalSink>,
    publisher: Publisher,
}

impl LocalMirror {
    pub fn new(sink: LocalSink, config: Arc<GardenConfig>) -> Self {
        let sink = Arc::new(sink);
        let publisher = Publisher::new(sink.clone(), config);
        Self { sink, publisher }
    }

    /// Mirror for the configured export folder
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `export.path` is not set.
    pub fn from_config(config: Arc<GardenConfig>) -> Result<Self> {
        let sink = LocalSink::from_config(&config)?;
        Ok(Self::new(sink, config))
    }

    pub fn root(&self) -> &Path {
        self.sink.root()
    }

    /// Write one artifact after validating its frontmatter
    pub async fn publish_to_folder(&self, artifact: &CompiledArtifact) -> bool {
        self.publisher.publish(artifact).await
    }

    /// Write every artifact concurrently, without frontmatter validation
    pub async fn write_these_files(&self, artifacts: &[CompiledArtifact]) -> BatchOutcome {
        let refs: Vec<&CompiledArtifact> = artifacts.iter().collect();
        let outcome = self.sink.write_batch(&refs).await;
        tracing::info!(
            root = %self.root().display(),
            written = outcome.succeeded(),
            failed = outcome.failed(),
            "Mirrored files"
        );
        outcome
    }

    /// Validate, then write the survivors as one batch
    pub async fn publish_write_batch(&self, artifacts: &[CompiledArtifact]) -> BatchOutcome {
        self.publisher.publish_batch(artifacts).await
    }

    /// Remove mirrored files by sink path
    pub async fn delete_batch(&self, paths: &[String]) -> BatchOutcome {
        self.publisher.delete_batch(paths).await
    }
}
