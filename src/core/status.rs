//! Publish status
//!
//! Classifies compiled artifacts against what the sink already holds. Content
//! is compared by git blob id, which is also the hash the remote tree
//! listing reports for every file.

use crate::adapters::github::RemoteStore;
use crate::core::deadline::with_deadline;
use crate::core::paths::{
    asset_relative_path, image_path, local_relative_path, note_path, IMAGE_ASSET_PREFIX,
    IMAGE_PATH_BASE, NOTE_PATH_BASE,
};
use crate::core::selection::{vault_files, MarkedForPublishing};
use crate::domain::{CompiledArtifact, GardenError, Result};
use sha1::{Digest, Sha1};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

/// Git blob id of `bytes`: `sha1("blob <len>\0" + bytes)` in lowercase hex
pub fn blob_id(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("blob {}\0", bytes.len()).as_bytes());
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Classified publish set
///
/// Artifacts carry the hash the sink currently holds for their text and
/// assets, so a later single-document publish can skip the existence probe.
#[derive(Debug, Clone, Default)]
pub struct PublishStatus {
    /// Not present in the sink yet
    pub unpublished_notes: Vec<CompiledArtifact>,

    /// Present, but the text or an asset differs
    pub changed_notes: Vec<CompiledArtifact>,

    /// Present and identical
    pub published_notes: Vec<CompiledArtifact>,

    /// Sink note paths no candidate produces any more
    pub deleted_note_paths: Vec<String>,

    /// Sink image paths no candidate embeds any more
    pub deleted_image_paths: Vec<String>,

    /// Why some orphans were not looked for
    pub orphans_withheld: Option<String>,
}

impl PublishStatus {
    /// Artifacts that need a write, new ones first
    pub fn pending(&self) -> Vec<CompiledArtifact> {
        self.unpublished_notes
            .iter()
            .chain(self.changed_notes.iter())
            .cloned()
            .collect()
    }

    /// Every orphaned sink path, notes first
    pub fn orphans(&self) -> Vec<String> {
        self.deleted_note_paths
            .iter()
            .chain(self.deleted_image_paths.iter())
            .cloned()
            .collect()
    }

    pub fn log_status(&self) {
        tracing::info!(
            unpublished = self.unpublished_notes.len(),
            changed = self.changed_notes.len(),
            published = self.published_notes.len(),
            deleted_notes = self.deleted_note_paths.len(),
            deleted_images = self.deleted_image_paths.len(),
            "Publish status"
        );
        if let Some(reason) = &self.orphans_withheld {
            tracing::warn!(reason = %reason, "Orphaned files not fully listed");
        }
    }
}

/// Compares artifacts with an index of sink paths to blob ids
pub struct PublishStatusManager {
    index: BTreeMap<String, String>,
    slugify: bool,
    complete: bool,
}

impl PublishStatusManager {
    /// Build from an existing index
    ///
    /// Keys are sink paths in the form [`local_relative_path`] produces.
    pub fn new(index: BTreeMap<String, String>, slugify: bool) -> Self {
        Self {
            index,
            slugify,
            complete: true,
        }
    }

    /// Mark the index as missing some sink files
    pub fn incomplete(mut self) -> Self {
        self.complete = false;
        self
    }

    /// Whether the index lists every sink file
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Index the remote tree with one listing call
    pub async fn from_store(
        store: &(dyn RemoteStore + Send + Sync),
        timeout: Duration,
    ) -> Result<Self> {
        let tree = with_deadline(timeout, "list remote tree", store.list_tree()).await?;
        let index = tree
            .entries
            .into_iter()
            .map(|entry| (entry.path, entry.sha))
            .collect();
        let manager = Self::new(index, false);
        Ok(if tree.truncated {
            manager.incomplete()
        } else {
            manager
        })
    }

    /// Index an export folder by hashing every file in it
    ///
    /// A missing folder is an empty index.
    pub async fn from_export(root: &Path, slugify: bool) -> Result<Self> {
        let mut index = BTreeMap::new();
        if !root.is_dir() {
            return Ok(Self::new(index, slugify));
        }

        let listing = vault_files(root).await?;
        for file in listing.files {
            let relative = file
                .strip_prefix(root)
                .map_err(|e| GardenError::Io(e.to_string()))?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let bytes = tokio::fs::read(&file).await?;
            index.insert(relative, blob_id(&bytes));
        }

        let manager = Self::new(index, slugify);
        Ok(if listing.skipped.is_empty() {
            manager
        } else {
            manager.incomplete()
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn key(&self, path: &str) -> String {
        local_relative_path(path, self.slugify)
    }

    fn folder_key(&self, folder: &str) -> String {
        format!("{}/", self.key(folder).trim_end_matches('/'))
    }

    fn lookup(&self, path: &str) -> Option<&String> {
        self.index.get(&self.key(path))
    }

    /// Classify `artifacts` and find orphaned sink files
    ///
    /// Every note and image in `marked` counts as expected, compiled or not,
    /// so a failed compile never turns a published note into an orphan.
    pub fn status(
        &self,
        artifacts: Vec<CompiledArtifact>,
        marked: &MarkedForPublishing,
    ) -> PublishStatus {
        let mut status = PublishStatus::default();
        let mut expected_notes: BTreeSet<String> = marked
            .notes
            .iter()
            .map(|candidate| candidate.garden_path.as_str())
            .chain(marked.unreadable.iter().map(String::as_str))
            .map(|garden| self.key(&note_path(garden)))
            .collect();
        let mut expected_images: BTreeSet<String> = marked
            .images
            .iter()
            .map(|image| self.key(&image_path(&asset_relative_path(image))))
            .collect();

        for mut artifact in artifacts {
            let text_path = note_path(&artifact.garden_path);
            expected_notes.insert(self.key(&text_path));

            let remote_text = self.lookup(&text_path).cloned();
            let mut changed = match &remote_text {
                Some(hash) => *hash != blob_id(artifact.text.as_bytes()),
                None => false,
            };

            for asset in artifact.assets.images_mut() {
                let path = image_path(&asset.relative_path);
                expected_images.insert(self.key(&path));

                match self.lookup(&path) {
                    Some(hash) => {
                        let same = asset
                            .decode()
                            .map(|bytes| blob_id(&bytes) == *hash)
                            .unwrap_or(false);
                        changed |= !same;
                        asset.remote_hash = Some(hash.clone());
                    }
                    None => changed = true,
                }
            }

            match remote_text {
                None => status.unpublished_notes.push(artifact),
                Some(hash) => {
                    artifact.remote_hash = Some(hash);
                    if changed {
                        status.changed_notes.push(artifact);
                    } else {
                        status.published_notes.push(artifact);
                    }
                }
            }
        }

        if !self.complete {
            status.orphans_withheld = Some("the sink listing is incomplete".to_string());
            return status;
        }
        if marked.incomplete {
            status.orphans_withheld = Some("some vault folders could not be read".to_string());
            return status;
        }

        // Embeds of an unreadable document are unknown, so no image is an orphan
        let prune_images = marked.unreadable.is_empty();
        if !prune_images {
            status.orphans_withheld = Some(format!(
                "{} documents could not be read, images are kept",
                marked.unreadable.len()
            ));
        }

        let image_root = self.folder_key(&format!("{IMAGE_PATH_BASE}{IMAGE_ASSET_PREFIX}"));
        let note_root = self.folder_key(NOTE_PATH_BASE);

        for path in self.index.keys() {
            if path.starts_with(&note_root) && !expected_notes.contains(path) {
                status.deleted_note_paths.push(path.clone());
            } else if prune_images
                && path.starts_with(&image_root)
                && !expected_images.contains(path)
            {
                status.deleted_image_paths.push(path.clone());
            }
        }

        status
    }
}
