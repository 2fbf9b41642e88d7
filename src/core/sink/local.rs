//! Sink backed by a local export folder

use super::PublishSink;
use crate::config::GardenConfig;
use crate::core::deadline::with_deadline;
use crate::core::outcome::{BatchOutcome, FileOutcome, SkipReason};
use crate::core::paths::{image_path, local_relative_path, note_path};
use crate::domain::{Asset, CompiledArtifact, GardenError, Result};
use async_trait::async_trait;
use futures::future::{join, join_all};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Mirrors the remote layout below an export root
///
/// Every target path goes through [`local_relative_path`]; missing parent
/// folders are created on the way.
#[derive(Debug, Clone)]
pub struct LocalSink {
    root: PathBuf,
    slugify: bool,
    timeout: Duration,
}

impl LocalSink {
    pub fn new(root: impl Into<PathBuf>, slugify: bool, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            slugify,
            timeout,
        }
    }

    /// Create a sink for the configured export folder
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no export path is set.
    pub fn from_config(config: &GardenConfig) -> Result<Self> {
        config
            .export
            .validate_target()
            .map_err(GardenError::Configuration)?;

        let root = config.export.path.clone().unwrap_or_default();
        Ok(Self::new(
            root,
            config.export.slugify_paths,
            Duration::from_secs(config.publish.operation_timeout_seconds),
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of a sink-relative path
    pub fn resolve(&self, path: &str) -> PathBuf {
        local_relative_path(path, self.slugify)
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    async fn write_file(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let target = self.resolve(path);
        let operation = format!("write {}", target.display());

        with_deadline(self.timeout, &operation, async {
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&target, bytes).await?;
            Ok::<(), GardenError>(())
        })
        .await?;

        tracing::debug!(path = %target.display(), bytes = bytes.len(), "Wrote file");
        Ok(())
    }
}

#[async_trait]
impl PublishSink for LocalSink {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn write_text(
        &self,
        garden_path: &str,
        text: &str,
        _known_hash: Option<&str>,
    ) -> Result<()> {
        self.write_file(&note_path(garden_path), text.as_bytes())
            .await
    }

    async fn write_asset(&self, asset: &Asset) -> Result<()> {
        let bytes = asset.decode()?;
        self.write_file(&image_path(&asset.relative_path), &bytes)
            .await
    }

    async fn delete(&self, path: &str, _sha: Option<&str>) -> Result<bool> {
        let target = self.resolve(path);
        let operation = format!("delete {}", target.display());

        with_deadline(self.timeout, &operation, async {
            match tokio::fs::remove_file(&target).await {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(GardenError::from(e)),
            }
        })
        .await
    }

    /// Every note text and every distinct asset path is written once, all
    /// concurrently; a document fails when its text or any of its assets did
    async fn write_batch(&self, artifacts: &[&CompiledArtifact]) -> BatchOutcome {
        let mut assets: BTreeMap<String, &Asset> = BTreeMap::new();
        for artifact in artifacts {
            for asset in artifact.assets.iter() {
                assets.entry(image_path(&asset.relative_path)).or_insert(asset);
            }
        }

        let (asset_results, text_results) = join(
            join_all(
                assets
                    .into_iter()
                    .map(|(path, asset)| async move { (path, self.write_asset(asset).await) }),
            ),
            join_all(artifacts.iter().map(|artifact| async move {
                let result = self
                    .write_text(&artifact.garden_path, &artifact.text, None)
                    .await;
                (*artifact, result)
            })),
        )
        .await;
        let asset_results: BTreeMap<String, Result<()>> = asset_results.into_iter().collect();

        let mut outcome = BatchOutcome::new();
        for (artifact, text_result) in text_results {
            let garden_path = &artifact.garden_path;
            let asset_error = artifact.assets.iter().find_map(|asset| {
                asset_results
                    .get(&image_path(&asset.relative_path))
                    .and_then(|result| result.as_ref().err())
            });

            match (text_result, asset_error) {
                (Ok(()), None) => outcome.record(garden_path.as_str(), FileOutcome::Published),
                (Ok(()), Some(e)) => {
                    tracing::error!(
                        path = %garden_path,
                        error = %e,
                        "Failed to write asset of document"
                    );
                    outcome.record(garden_path.as_str(), FileOutcome::failed(e));
                }
                (Err(e), _) => {
                    tracing::error!(
                        path = %garden_path,
                        error = %e,
                        "Failed to write document"
                    );
                    outcome.record(garden_path.as_str(), FileOutcome::failed(&e));
                }
            }
        }
        outcome
    }

    async fn delete_batch(&self, paths: &[String]) -> BatchOutcome {
        let results = join_all(
            paths
                .iter()
                .map(|path| async move { (path, self.delete(path, None).await) }),
        )
        .await;

        let mut outcome = BatchOutcome::new();
        for (path, result) in results {
            let file = match result {
                Ok(true) => FileOutcome::Deleted,
                Ok(false) => FileOutcome::Skipped(SkipReason::Missing),
                Err(e) => {
                    tracing::error!(path = %path, error = %e, "Failed to delete file");
                    FileOutcome::failed(&e)
                }
            };
            outcome.record(path.as_str(), file);
        }
        outcome
    }
}
