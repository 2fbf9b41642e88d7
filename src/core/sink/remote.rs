//! Sink backed by the remote store

use super::PublishSink;
use crate::adapters::github::RemoteStore;
use crate::core::deadline::{batch_deadline, with_deadline};
use crate::core::outcome::{BatchOutcome, FileOutcome};
use crate::core::paths::{image_path, note_path};
use crate::domain::{Asset, CompiledArtifact, RemoteWriteRequest, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Publishes through a [`RemoteStore`]
///
/// Content travels base64-encoded. Single writes probe the store for the
/// current blob id when none is known; batch writes become one commit.
pub struct RemoteSink {
    store: Arc<dyn RemoteStore + Send + Sync>,
    timeout: Duration,
}

impl RemoteSink {
    pub fn new(store: Arc<dyn RemoteStore + Send + Sync>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Create-or-update one file, choosing the commit message from whether
    /// the file already exists
    async fn upload(&self, path: String, content: String, known_hash: Option<&str>) -> Result<()> {
        let expected_hash = match known_hash {
            Some(hash) => Some(hash.to_string()),
            None => {
                let existing = with_deadline(
                    self.timeout,
                    &format!("read {path}"),
                    self.store.get_file(&path),
                )
                .await?;
                if existing.is_none() {
                    tracing::info!(path = %path, "File does not exist remotely, adding");
                }
                existing.map(|file| file.sha)
            }
        };

        let message = match expected_hash {
            Some(_) => format!("Update content {path}"),
            None => format!("Add content {path}"),
        };

        let request = RemoteWriteRequest {
            path,
            content,
            message,
            expected_hash,
        };

        let sha = with_deadline(
            self.timeout,
            &format!("write {}", request.path),
            self.store.update_file(&request),
        )
        .await?;

        tracing::debug!(path = %request.path, sha = %sha, "Uploaded file");
        Ok(())
    }

    /// One write per note text and per distinct asset path
    fn batch_writes(artifacts: &[&CompiledArtifact]) -> Vec<RemoteWriteRequest> {
        let mut seen = HashSet::new();
        let mut writes = Vec::new();

        for artifact in artifacts {
            let path = note_path(&artifact.garden_path);
            if seen.insert(path.clone()) {
                writes.push(RemoteWriteRequest {
                    message: format!("Update content {path}"),
                    content: general_purpose::STANDARD.encode(artifact.text.as_bytes()),
                    expected_hash: artifact.remote_hash.clone(),
                    path,
                });
            }

            for asset in artifact.assets.iter() {
                let path = image_path(&asset.relative_path);
                if seen.insert(path.clone()) {
                    writes.push(RemoteWriteRequest {
                        message: format!("Update content {path}"),
                        content: asset.content.clone(),
                        expected_hash: asset.remote_hash.clone(),
                        path,
                    });
                }
            }
        }

        writes
    }
}

#[async_trait]
impl PublishSink for RemoteSink {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn write_text(
        &self,
        garden_path: &str,
        text: &str,
        known_hash: Option<&str>,
    ) -> Result<()> {
        let content = general_purpose::STANDARD.encode(text.as_bytes());
        self.upload(note_path(garden_path), content, known_hash)
            .await
    }

    async fn write_asset(&self, asset: &Asset) -> Result<()> {
        self.upload(
            image_path(&asset.relative_path),
            asset.content.clone(),
            asset.remote_hash.as_deref(),
        )
        .await
    }

    async fn delete(&self, path: &str, sha: Option<&str>) -> Result<bool> {
        let message = format!("Delete content {path}");
        with_deadline(
            self.timeout,
            &format!("delete {path}"),
            self.store.delete_file(path, sha, &message),
        )
        .await
    }

    async fn write_batch(&self, artifacts: &[&CompiledArtifact]) -> BatchOutcome {
        let ids = artifacts.iter().map(|a| a.garden_path.clone());
        if artifacts.is_empty() {
            return BatchOutcome::new();
        }

        let writes = Self::batch_writes(artifacts);
        let message = format!(
            "Publish {} notes ({} files)",
            artifacts.len(),
            writes.len()
        );

        match with_deadline(
            batch_deadline(self.timeout, writes.len()),
            "batch publish",
            self.store.update_files(&writes, &message),
        )
        .await
        {
            Ok(()) => BatchOutcome::uniform(ids, FileOutcome::Published),
            Err(e) => {
                tracing::error!(
                    files = writes.len(),
                    error = %e,
                    "Batch publish failed"
                );
                BatchOutcome::uniform(ids, FileOutcome::failed(&e))
            }
        }
    }

    async fn delete_batch(&self, paths: &[String]) -> BatchOutcome {
        if paths.is_empty() {
            return BatchOutcome::new();
        }

        let message = format!("Delete content ({} files)", paths.len());
        match with_deadline(
            batch_deadline(self.timeout, paths.len()),
            "batch delete",
            self.store.delete_files(paths, &message),
        )
        .await
        {
            Ok(()) => BatchOutcome::uniform(paths.iter().cloned(), FileOutcome::Deleted),
            Err(e) => {
                tracing::error!(
                    files = paths.len(),
                    error = %e,
                    "Batch delete failed"
                );
                BatchOutcome::uniform(paths.iter().cloned(), FileOutcome::failed(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssetList, Frontmatter, VaultPath};

    fn artifact(path: &str, images: &[&str]) -> CompiledArtifact {
        CompiledArtifact {
            vault_path: VaultPath::new(path).unwrap(),
            garden_path: path.to_string(),
            frontmatter: Frontmatter::default(),
            text: format!("# {path}"),
            assets: images
                .iter()
                .map(|p| Asset::from_bytes(*p, p.as_bytes()))
                .collect::<AssetList>(),
            remote_hash: None,
        }
    }

    #[test]
    fn test_batch_writes_layout_and_dedup() {
        let a = artifact("a.md", &["img/user/shared.png"]);
        let b = artifact("b.md", &["img/user/shared.png", "img/user/b.png"]);

        let writes = RemoteSink::batch_writes(&[&a, &b]);
        let paths: Vec<&str> = writes.iter().map(|w| w.path.as_str()).collect();

        assert_eq!(
            paths,
            vec![
                "src/site/notes/a.md",
                "src/site/img/user/shared.png",
                "src/site/notes/b.md",
                "src/site/img/user/b.png",
            ]
        );
        assert_eq!(
            general_purpose::STANDARD.decode(&writes[0].content).unwrap(),
            b"# a.md"
        );
    }
}
