//! Publish orchestrator
//!
//! Drives single-document and batch synchronization through a
//! [`PublishSink`]. None of the public operations return errors: failures are
//! logged and surface as `false` or as a failed entry in a [`BatchOutcome`].

use crate::adapters::factory::create_remote_store;
use crate::adapters::github::RemoteStore;
use crate::config::GardenConfig;
use crate::core::outcome::{BatchOutcome, FileOutcome, SkipReason};
use crate::core::paths::{image_path, note_path};
use crate::core::sink::{LocalSink, PublishSink, RemoteSink};
use crate::domain::{CompiledArtifact, GardenError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Publishes compiled artifacts to one sink
pub struct Publisher {
    sink: Arc<dyn PublishSink + Send + Sync>,
    config: Arc<GardenConfig>,
}

impl Publisher {
    pub fn new(sink: Arc<dyn PublishSink + Send + Sync>, config: Arc<GardenConfig>) -> Self {
        Self { sink, config }
    }

    /// Publisher for the configured GitHub repository
    ///
    /// # Errors
    ///
    /// Returns [`GardenError::Configuration`] when repo, username or token is
    /// missing. Nothing touches the network before this check.
    pub fn remote(config: Arc<GardenConfig>) -> Result<Self> {
        Self::check_credentials(&config)?;
        let store = create_remote_store(&config)?;
        Self::with_store(store, config)
    }

    /// Publisher over an existing store client
    ///
    /// Credentials are checked the same way as in [`Publisher::remote`].
    pub fn with_store(
        store: Arc<dyn RemoteStore + Send + Sync>,
        config: Arc<GardenConfig>,
    ) -> Result<Self> {
        Self::check_credentials(&config)?;
        let timeout = Duration::from_secs(config.publish.operation_timeout_seconds);
        let sink = Arc::new(RemoteSink::new(store, timeout));
        Ok(Self::new(sink, config))
    }

    /// Publisher for the configured export folder
    pub fn local(config: Arc<GardenConfig>) -> Result<Self> {
        let sink = Arc::new(LocalSink::from_config(&config)?);
        Ok(Self::new(sink, config))
    }

    fn check_credentials(config: &GardenConfig) -> Result<()> {
        config
            .github
            .validate_credentials()
            .map_err(GardenError::Configuration)
    }

    pub fn config(&self) -> &GardenConfig {
        &self.config
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    /// Publish one artifact: its text, then each asset in order
    ///
    /// # Returns
    ///
    /// `false` when the frontmatter is not publishable or any write failed.
    pub async fn publish(&self, artifact: &CompiledArtifact) -> bool {
        if !artifact.frontmatter.is_publish_valid() {
            tracing::debug!(
                path = %artifact.vault_path,
                "Frontmatter not publishable, skipping"
            );
            return false;
        }

        match self.publish_inner(artifact).await {
            Ok(()) => {
                tracing::info!(
                    path = %artifact.garden_path,
                    assets = artifact.assets.len(),
                    sink = self.sink.name(),
                    "Published note"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    path = %artifact.garden_path,
                    sink = self.sink.name(),
                    error = %e,
                    "Failed to publish note"
                );
                false
            }
        }
    }

    async fn publish_inner(&self, artifact: &CompiledArtifact) -> Result<()> {
        let (text, assets) = artifact.compiled_file();

        self.sink
            .write_text(&artifact.garden_path, text, artifact.remote_hash.as_deref())
            .await?;

        for asset in assets.iter() {
            self.sink.write_asset(asset).await?;
        }
        Ok(())
    }

    /// Publish many artifacts in one sink call
    ///
    /// Artifacts with unpublishable frontmatter are reported as skipped. An
    /// empty set of survivors succeeds without touching the sink.
    pub async fn publish_batch(&self, artifacts: &[CompiledArtifact]) -> BatchOutcome {
        let (valid, invalid): (Vec<&CompiledArtifact>, Vec<&CompiledArtifact>) = artifacts
            .iter()
            .partition(|artifact| artifact.frontmatter.is_publish_valid());

        let mut outcome = BatchOutcome::uniform(
            invalid.iter().map(|artifact| artifact.garden_path.as_str()),
            FileOutcome::Skipped(SkipReason::InvalidFrontmatter),
        );

        if valid.is_empty() {
            tracing::debug!(skipped = invalid.len(), "Nothing to publish in batch");
            return outcome;
        }

        outcome.merge(self.sink.write_batch(&valid).await);
        crate::log_batch_outcome!(
            "publish",
            outcome.succeeded(),
            outcome.failed(),
            outcome.skipped()
        );
        outcome
    }

    /// Delete many sink paths in one sink call
    pub async fn delete_batch(&self, paths: &[String]) -> BatchOutcome {
        if paths.is_empty() {
            return BatchOutcome::new();
        }

        let outcome = self.sink.delete_batch(paths).await;
        crate::log_batch_outcome!(
            "delete",
            outcome.succeeded(),
            outcome.failed(),
            outcome.skipped()
        );
        outcome
    }

    /// Delete one sink path
    ///
    /// # Returns
    ///
    /// `true` only when a file was removed.
    pub async fn delete(&self, path: &str, sha: Option<&str>) -> bool {
        match self.sink.delete(path, sha).await {
            Ok(true) => {
                tracing::info!(path = %path, sink = self.sink.name(), "Deleted file");
                true
            }
            Ok(false) => {
                tracing::warn!(path = %path, "Nothing to delete");
                false
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Failed to delete file");
                false
            }
        }
    }

    /// Delete a published note by its garden path
    pub async fn delete_note(&self, garden_path: &str, sha: Option<&str>) -> bool {
        self.delete(&note_path(garden_path), sha).await
    }

    /// Delete a published image by its asset path (`img/user/...`)
    pub async fn delete_image(&self, relative_path: &str, sha: Option<&str>) -> bool {
        self.delete(&image_path(relative_path), sha).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Asset, AssetList, Frontmatter, VaultPath};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every call; fails writes whose path contains "fail"
    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PublishSink for RecordingSink {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn write_text(
            &self,
            garden_path: &str,
            _text: &str,
            known_hash: Option<&str>,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("text {garden_path} {known_hash:?}"));
            if garden_path.contains("fail") {
                return Err(GardenError::Io("disk full".to_string()));
            }
            Ok(())
        }

        async fn write_asset(&self, asset: &Asset) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("asset {}", asset.relative_path));
            Ok(())
        }

        async fn delete(&self, path: &str, _sha: Option<&str>) -> Result<bool> {
            self.calls.lock().unwrap().push(format!("delete {path}"));
            Ok(!path.contains("gone"))
        }

        async fn write_batch(&self, artifacts: &[&CompiledArtifact]) -> BatchOutcome {
            self.calls
                .lock()
                .unwrap()
                .push(format!("batch {}", artifacts.len()));
            BatchOutcome::uniform(
                artifacts.iter().map(|a| a.garden_path.as_str()),
                FileOutcome::Published,
            )
        }

        async fn delete_batch(&self, paths: &[String]) -> BatchOutcome {
            self.calls
                .lock()
                .unwrap()
                .push(format!("delete_batch {}", paths.len()));
            BatchOutcome::uniform(paths.iter().cloned(), FileOutcome::Deleted)
        }
    }

    fn artifact(path: &str, publish: bool) -> CompiledArtifact {
        let mut frontmatter = Frontmatter::default();
        frontmatter.insert("dg-publish", publish);
        CompiledArtifact {
            vault_path: VaultPath::new(path).unwrap(),
            garden_path: path.to_string(),
            frontmatter,
            text: "body".to_string(),
            assets: vec![
                Asset::from_bytes("img/user/1.png", b"1"),
                Asset::from_bytes("img/user/2.png", b"2"),
            ]
            .into_iter()
            .collect::<AssetList>(),
            remote_hash: None,
        }
    }

    fn publisher(sink: Arc<RecordingSink>) -> Publisher {
        Publisher::new(sink, Arc::new(GardenConfig::new("/vault")))
    }

    #[tokio::test]
    async fn test_publish_writes_text_then_assets() {
        let sink = Arc::new(RecordingSink::default());
        let published = publisher(sink.clone())
            .publish(&artifact("a.md", true).with_remote_hash("abc"))
            .await;

        assert!(published);
        assert_eq!(
            sink.calls(),
            vec![
                "text a.md Some(\"abc\")",
                "asset img/user/1.png",
                "asset img/user/2.png"
            ]
        );
    }

    #[tokio::test]
    async fn test_publish_invalid_frontmatter_has_no_side_effect() {
        let sink = Arc::new(RecordingSink::default());
        assert!(!publisher(sink.clone()).publish(&artifact("a.md", false)).await);
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_stops_and_returns_false() {
        let sink = Arc::new(RecordingSink::default());
        assert!(!publisher(sink.clone()).publish(&artifact("fail.md", true)).await);
        assert_eq!(sink.calls(), vec!["text fail.md None"]);
    }

    #[tokio::test]
    async fn test_publish_batch_filters_invalid() {
        let sink = Arc::new(RecordingSink::default());
        let outcome = publisher(sink.clone())
            .publish_batch(&[
                artifact("a.md", true),
                artifact("draft.md", false),
                artifact("b.md", true),
            ])
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.succeeded(), 2);
        assert_eq!(
            outcome.get("draft.md"),
            Some(FileOutcome::Skipped(SkipReason::InvalidFrontmatter))
        );
        assert_eq!(sink.calls(), vec!["batch 2"]);
    }

    #[tokio::test]
    async fn test_empty_batches_skip_the_sink() {
        let sink = Arc::new(RecordingSink::default());
        let publisher = publisher(sink.clone());

        assert!(publisher.publish_batch(&[]).await.is_success());
        assert!(publisher
            .publish_batch(&[artifact("draft.md", false)])
            .await
            .is_success());
        assert!(publisher.delete_batch(&[]).await.is_success());
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_helpers_prefix_paths() {
        let sink = Arc::new(RecordingSink::default());
        let publisher = publisher(sink.clone());

        assert!(publisher.delete_note("a.md", None).await);
        assert!(publisher.delete_image("img/user/x.png", Some("sha")).await);
        assert!(!publisher.delete("src/site/notes/gone.md", None).await);
        assert_eq!(
            sink.calls(),
            vec![
                "delete src/site/notes/a.md",
                "delete src/site/img/user/x.png",
                "delete src/site/notes/gone.md"
            ]
        );
    }

    #[test]
    fn test_remote_requires_credentials() {
        let config = GardenConfig::new("/vault");
        let err = Publisher::remote(Arc::new(config)).err().unwrap();
        assert!(matches!(err, GardenError::Configuration(_)));
        assert!(err.to_string().contains("GitHub repo"));
    }
}
