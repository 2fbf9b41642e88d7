//! Sync coordinator - main orchestrator for a publish run
//!
//! Scans the vault, compiles every candidate, compares the result with the
//! sink, then publishes what changed in one batch and optionally prunes
//! orphans in a second batch.

use crate::adapters::compiler::ArtifactCompiler;
use crate::adapters::factory::{create_compiler, create_remote_store};
use crate::adapters::github::RemoteStore;
use crate::config::GardenConfig;
use crate::core::publish::Publisher;
use crate::core::selection::Scanner;
use crate::core::status::{PublishStatus, PublishStatusManager};
use crate::core::sync::summary::{SyncError, SyncSummary};
use crate::domain::{CompiledArtifact, GardenError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Where a run delivers its artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTarget {
    Remote,
    Local,
}

/// Per-run switches
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Compute everything, write nothing
    pub dry_run: bool,

    /// Delete sink files no candidate produces any more
    pub prune: bool,
}

/// Where the status index comes from
enum StatusSource {
    Remote(Arc<dyn RemoteStore + Send + Sync>),
    Local { root: PathBuf, slugify: bool },
}

/// Sync coordinator
pub struct SyncCoordinator {
    config: Arc<GardenConfig>,
    compiler: Arc<dyn ArtifactCompiler + Send + Sync>,
    publisher: Publisher,
    source: StatusSource,
    shutdown_signal: watch::Receiver<bool>,
}

impl SyncCoordinator {
    /// Coordinator for a remote store
    ///
    /// # Errors
    ///
    /// Returns a configuration error when credentials are missing.
    pub fn remote(
        config: Arc<GardenConfig>,
        store: Arc<dyn RemoteStore + Send + Sync>,
        compiler: Arc<dyn ArtifactCompiler + Send + Sync>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Result<Self> {
        let publisher = Publisher::with_store(store.clone(), config.clone())?;
        Ok(Self {
            config,
            compiler,
            publisher,
            source: StatusSource::Remote(store),
            shutdown_signal,
        })
    }

    /// Coordinator for the configured export folder
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no export path is set.
    pub fn local(
        config: Arc<GardenConfig>,
        compiler: Arc<dyn ArtifactCompiler + Send + Sync>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Result<Self> {
        let publisher = Publisher::local(config.clone())?;
        let source = StatusSource::Local {
            root: PathBuf::from(config.export.path.clone().unwrap_or_default()),
            slugify: config.export.slugify_paths,
        };
        Ok(Self {
            config,
            compiler,
            publisher,
            source,
            shutdown_signal,
        })
    }

    /// Coordinator built from configuration with the default adapters
    pub fn from_config(
        config: Arc<GardenConfig>,
        target: SyncTarget,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Result<Self> {
        let compiler = create_compiler(&config)?;
        match target {
            SyncTarget::Remote => {
                config
                    .github
                    .validate_credentials()
                    .map_err(GardenError::Configuration)?;
                let store = create_remote_store(&config)?;
                Self::remote(config, store, compiler, shutdown_signal)
            }
            SyncTarget::Local => Self::local(config, compiler, shutdown_signal),
        }
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    fn is_shutdown_requested(&self) -> bool {
        *self.shutdown_signal.borrow()
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.publish.operation_timeout_seconds)
    }

    /// Scan, compile and classify without writing anything
    ///
    /// Compile failures are recorded in `summary` and the candidate is
    /// left out of the publish set; its sink copy is kept. Returns `None`
    /// when a shutdown was requested.
    pub async fn compute_status(&self, summary: &mut SyncSummary) -> Result<Option<PublishStatus>> {
        let scanner = Scanner::from_config(&self.config, self.compiler.clone());
        let marked = scanner.scan().await;
        summary.candidates = marked.notes.len();
        summary.images = marked.images.len();

        let mut artifacts: Vec<CompiledArtifact> = Vec::with_capacity(marked.notes.len());
        for candidate in &marked.notes {
            if self.is_shutdown_requested() {
                tracing::warn!(
                    compiled = artifacts.len(),
                    "Shutdown requested, stopping before the next compile"
                );
                return Ok(None);
            }

            match self.compiler.compile(candidate).await {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => {
                    tracing::error!(
                        path = %candidate.vault_path(),
                        error = %e,
                        "Failed to compile note, skipping"
                    );
                    summary.add_error(
                        SyncError::from_error(&e)
                            .with_context(format!("path={}", candidate.vault_path())),
                    );
                }
            }
        }
        summary.compiled = artifacts.len();

        let manager = match &self.source {
            StatusSource::Remote(store) => {
                PublishStatusManager::from_store(store.as_ref(), self.timeout()).await?
            }
            StatusSource::Local { root, slugify } => {
                PublishStatusManager::from_export(root, *slugify).await?
            }
        };

        let status = manager.status(artifacts, &marked);
        status.log_status();
        summary.unpublished = status.unpublished_notes.len();
        summary.changed = status.changed_notes.len();
        summary.unchanged = status.published_notes.len();

        Ok(Some(status))
    }

    /// Execute one sync run
    ///
    /// 1. Scans the vault and compiles every candidate
    /// 2. Compares the artifacts with the sink
    /// 3. Publishes new and changed notes in one batch
    /// 4. With `prune`, deletes orphaned sink files in one batch
    ///
    /// # Errors
    ///
    /// Only a failure to read the sink's current state is returned; every
    /// per-file failure ends up in the summary.
    pub async fn run(&self, options: SyncOptions) -> Result<SyncSummary> {
        let start_time = Instant::now();
        let mut summary = SyncSummary::new(self.publisher.sink_name(), options.dry_run);

        crate::log_sync_start!(
            self.config.vault.root,
            self.publisher.sink_name(),
            options.dry_run
        );

        let status = match self.compute_status(&mut summary).await? {
            Some(status) => status,
            None => {
                summary.interrupted = true;
                return Ok(summary.with_duration(start_time.elapsed()));
            }
        };

        let pending = status.pending();
        let orphans = if options.prune {
            if let Some(reason) = &status.orphans_withheld {
                tracing::warn!(reason = %reason, "Pruning only the orphans that are certain");
            }
            status.orphans()
        } else {
            Vec::new()
        };
        summary.orphaned = orphans.len();

        if options.dry_run {
            for artifact in &pending {
                tracing::info!(path = %artifact.garden_path, "Would publish");
            }
            for path in &orphans {
                tracing::info!(path = %path, "Would delete");
            }
            return Ok(summary.with_duration(start_time.elapsed()));
        }

        if self.is_shutdown_requested() {
            tracing::warn!("Shutdown requested, nothing written");
            summary.interrupted = true;
            return Ok(summary.with_duration(start_time.elapsed()));
        }

        let outcome = self.publisher.publish_batch(&pending).await;
        summary.record_publish(&outcome);

        if !orphans.is_empty() {
            if self.is_shutdown_requested() {
                tracing::warn!(orphans = orphans.len(), "Shutdown requested, skipping prune");
                summary.interrupted = true;
            } else {
                let outcome = self.publisher.delete_batch(&orphans).await;
                summary.record_delete(&outcome);
            }
        }

        Ok(summary.with_duration(start_time.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::summary::SyncErrorType;
    use crate::domain::{Asset, AssetList, PublishCandidate, VaultPath};
    use async_trait::async_trait;
    use std::fs;
    use tempfile::TempDir;

    /// Copies the note text through unchanged and embeds one shared image
    struct PassthroughCompiler {
        root: PathBuf,
    }

    #[async_trait]
    impl ArtifactCompiler for PassthroughCompiler {
        async fn compile(&self, candidate: &PublishCandidate) -> Result<CompiledArtifact> {
            if candidate.vault_path().file_name() == "broken.md" {
                return Err(GardenError::Compile("unresolvable embed".to_string()));
            }
            let text = tokio::fs::read_to_string(candidate.vault_path().to_fs_path(&self.root))
                .await?;
            Ok(CompiledArtifact {
                vault_path: candidate.vault_path().clone(),
                garden_path: candidate.garden_path.clone(),
                frontmatter: candidate.frontmatter().clone(),
                text,
                assets: std::iter::once(Asset::from_bytes("img/user/shared.png", b"png"))
                    .collect::<AssetList>(),
                remote_hash: None,
            })
        }

        async fn image_links(&self, _candidate: &PublishCandidate) -> Result<Vec<VaultPath>> {
            Ok(vec![VaultPath::new("shared.png").unwrap()])
        }
    }

    struct Fixture {
        vault: TempDir,
        export: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let vault = TempDir::new().unwrap();
            fs::write(vault.path().join("a.md"), "---\ndg-publish: true\n---\nA").unwrap();
            fs::write(vault.path().join("b.md"), "---\ndg-publish: true\n---\nB").unwrap();
            fs::write(vault.path().join("draft.md"), "---\ndg-publish: false\n---\n").unwrap();
            fs::write(vault.path().join("broken.md"), "---\ndg-publish: true\n---\n").unwrap();
            Self {
                vault,
                export: TempDir::new().unwrap(),
            }
        }

        fn coordinator(&self, shutdown: watch::Receiver<bool>) -> SyncCoordinator {
            let mut config = GardenConfig::new(self.vault.path().to_string_lossy());
            config.export.path = Some(self.export.path().to_string_lossy().into_owned());
            let compiler = Arc::new(PassthroughCompiler {
                root: self.vault.path().to_path_buf(),
            });
            SyncCoordinator::local(Arc::new(config), compiler, shutdown).unwrap()
        }
    }

    #[tokio::test]
    async fn test_run_publishes_then_reports_unchanged() {
        let fixture = Fixture::new();
        let (_tx, rx) = watch::channel(false);
        let coordinator = fixture.coordinator(rx);

        let first = coordinator.run(SyncOptions::default()).await.unwrap();
        assert_eq!(first.candidates, 3);
        assert_eq!(first.compiled, 2);
        assert_eq!(first.unpublished, 2);
        assert_eq!(first.published, 2);
        assert_eq!(first.errors.len(), 1);
        assert_eq!(first.errors[0].error_type, SyncErrorType::Compile);
        assert!(fixture.export.path().join("src/site/notes/a.md").exists());
        assert!(fixture.export.path().join("src/site/img/user/shared.png").exists());

        let second = coordinator.run(SyncOptions::default()).await.unwrap();
        assert_eq!(second.unchanged, 2);
        assert_eq!(second.published, 0);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let fixture = Fixture::new();
        let (_tx, rx) = watch::channel(false);

        let summary = fixture
            .coordinator(rx)
            .run(SyncOptions {
                dry_run: true,
                prune: true,
            })
            .await
            .unwrap();

        assert_eq!(summary.unpublished, 2);
        assert_eq!(summary.published, 0);
        assert!(!fixture.export.path().join("src").exists());
    }

    #[tokio::test]
    async fn test_prune_removes_orphans() {
        let fixture = Fixture::new();
        let stale = fixture.export.path().join("src/site/notes/stale.md");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        let (_tx, rx) = watch::channel(false);
        let summary = fixture
            .coordinator(rx)
            .run(SyncOptions {
                dry_run: false,
                prune: true,
            })
            .await
            .unwrap();

        assert_eq!(summary.orphaned, 1);
        assert_eq!(summary.deleted, 1);
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn test_prune_keeps_notes_that_failed_to_compile() {
        let fixture = Fixture::new();
        let published = fixture.export.path().join("src/site/notes/broken.md");
        fs::create_dir_all(published.parent().unwrap()).unwrap();
        fs::write(&published, "published earlier").unwrap();

        let (_tx, rx) = watch::channel(false);
        let summary = fixture
            .coordinator(rx)
            .run(SyncOptions {
                dry_run: false,
                prune: true,
            })
            .await
            .unwrap();

        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.orphaned, 0);
        assert_eq!(summary.deleted, 0);
        assert_eq!(fs::read_to_string(&published).unwrap(), "published earlier");
    }

    #[tokio::test]
    async fn test_shutdown_before_run_is_interrupted() {
        let fixture = Fixture::new();
        let (tx, rx) = watch::channel(false);
        let coordinator = fixture.coordinator(rx);
        tx.send(true).unwrap();

        let summary = coordinator.run(SyncOptions::default()).await.unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.published, 0);
        assert!(!fixture.export.path().join("src").exists());
    }
}
