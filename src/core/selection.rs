//! Selection engine
//!
//! Walks the vault, keeps the notes whose frontmatter carries a truthy
//! `dg-publish` flag and gathers every image they embed.

use crate::adapters::compiler::ArtifactCompiler;
use crate::config::{GardenConfig, PathRewriteRule};
use crate::core::paths::garden_path;
use crate::domain::{Document, Frontmatter, GardenError, PublishCandidate, Result, VaultPath};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Output of a vault scan
#[derive(Debug, Clone, Default)]
pub struct MarkedForPublishing {
    /// Candidates in their total order
    pub notes: Vec<PublishCandidate>,

    /// Every image referenced by at least one candidate, once
    pub images: BTreeSet<VaultPath>,

    /// Garden paths of markdown documents that could not be read or resolved
    ///
    /// Their publish flag and embeds are unknown, so their sink copies are
    /// never treated as orphans.
    pub unreadable: Vec<String>,

    /// Some vault folder could not be walked
    pub incomplete: bool,
}

/// Publish predicate
pub fn should_publish(document: &Document) -> bool {
    document.publish_flag()
}

/// Scans a vault for publish candidates
pub struct Scanner {
    root: PathBuf,
    compiler: Arc<dyn ArtifactCompiler + Send + Sync>,
    rewrite_rules: Vec<PathRewriteRule>,
}

impl Scanner {
    /// Create a scanner
    pub fn new(
        root: impl Into<PathBuf>,
        compiler: Arc<dyn ArtifactCompiler + Send + Sync>,
        rewrite_rules: Vec<PathRewriteRule>,
    ) -> Self {
        Self {
            root: root.into(),
            compiler,
            rewrite_rules,
        }
    }

    /// Create a scanner for the configured vault and rewrite rules
    pub fn from_config(
        config: &GardenConfig,
        compiler: Arc<dyn ArtifactCompiler + Send + Sync>,
    ) -> Self {
        Self::new(
            &config.vault.root,
            compiler,
            config.publish.path_rewrite_rules.clone(),
        )
    }

    /// Scan the whole vault
    ///
    /// A document that cannot be read or parsed, or whose links cannot be
    /// resolved, is logged and skipped; the scan always completes.
    pub async fn scan(&self) -> MarkedForPublishing {
        let mut marked = MarkedForPublishing::default();
        let mut examined = 0usize;

        let listing = match vault_files(&self.root).await {
            Ok(listing) => listing,
            Err(e) => {
                tracing::error!(root = %self.root.display(), error = %e, "Failed to walk vault");
                marked.incomplete = true;
                return marked;
            }
        };
        marked.incomplete = !listing.skipped.is_empty();

        for path in listing.files {
            if !is_markdown(&path) {
                continue;
            }
            examined += 1;

            match self.process(&path).await {
                Ok(Some((candidate, images))) => {
                    marked.images.extend(images);
                    marked.notes.push(candidate);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(
                        path = %path.display(),
                        error = %e,
                        "Failed to process document, skipping"
                    );
                    if let Ok(vault_path) = VaultPath::from_fs(&self.root, &path) {
                        marked
                            .unreadable
                            .push(garden_path(&vault_path, &self.rewrite_rules));
                    }
                }
            }
        }

        marked.notes.sort();

        tracing::info!(
            examined = examined,
            notes = marked.notes.len(),
            images = marked.images.len(),
            "Vault scan complete"
        );

        marked
    }

    /// Read one document from disk
    pub async fn read_document(&self, path: &Path) -> Result<Document> {
        let vault_path = VaultPath::from_fs(&self.root, path).map_err(GardenError::Validation)?;
        let text = tokio::fs::read_to_string(path).await?;
        let frontmatter = Frontmatter::parse(&text)?;
        Ok(Document::new(vault_path, frontmatter))
    }

    async fn process(&self, path: &Path) -> Result<Option<(PublishCandidate, Vec<VaultPath>)>> {
        let document = self.read_document(path).await?;
        if !should_publish(&document) {
            return Ok(None);
        }

        let garden = garden_path(&document.path, &self.rewrite_rules);
        let candidate = PublishCandidate::new(document, garden);
        let images = self.compiler.image_links(&candidate).await?;

        Ok(Some((candidate, images)))
    }
}

/// Files found below a root folder
#[derive(Debug, Clone, Default)]
pub struct VaultFiles {
    /// Regular files, hidden entries excluded, sorted by path
    pub files: Vec<PathBuf>,

    /// Folders that could not be read
    pub skipped: Vec<PathBuf>,
}

/// Walk `root` on the blocking pool
///
/// # Errors
///
/// Returns an error only when the walk itself could not run.
pub async fn vault_files(root: &Path) -> Result<VaultFiles> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || walk_files(&root))
        .await
        .map_err(|e| GardenError::Other(format!("Folder walk failed: {e}")))
}

/// Blocking walk of every regular file below `root`
///
/// Unreadable folders are logged and reported in [`VaultFiles::skipped`].
pub fn walk_files(root: &Path) -> VaultFiles {
    let mut listing = VaultFiles::default();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Skipping unreadable folder");
                listing.skipped.push(dir);
                continue;
            }
        };

        for entry in entries.flatten() {
            if is_hidden(&entry.file_name()) {
                continue;
            }
            let path = entry.path();
            match entry.file_type() {
                Ok(kind) if kind.is_dir() => pending.push(path),
                Ok(kind) if kind.is_file() => listing.files.push(path),
                _ => {}
            }
        }
    }

    listing.files.sort();
    listing
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|n| n.starts_with('.')).unwrap_or(false)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CompiledArtifact;
    use async_trait::async_trait;
    use std::fs;
    use tempfile::TempDir;

    /// Reports a fixed image for every note; fails for `broken.md`
    struct StubCompiler;

    #[async_trait]
    impl ArtifactCompiler for StubCompiler {
        async fn compile(&self, _candidate: &PublishCandidate) -> Result<CompiledArtifact> {
            Err(GardenError::Compile("not used".to_string()))
        }

        async fn image_links(&self, candidate: &PublishCandidate) -> Result<Vec<VaultPath>> {
            if candidate.vault_path().file_name() == "broken.md" {
                return Err(GardenError::Compile("link extraction failed".to_string()));
            }
            Ok(vec![VaultPath::new("img/shared.png").unwrap()])
        }
    }

    fn write(dir: &TempDir, path: &str, body: &str) {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, body).unwrap();
    }

    #[tokio::test]
    async fn test_scan_selects_sorts_and_dedups() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b.md", "---\ndg-publish: true\n---\nB");
        write(&dir, "Public/a.md", "---\ndg-publish: yes\n---\nA");
        write(&dir, "draft.md", "---\ndg-publish: false\n---\nD");
        write(&dir, "plain.md", "no frontmatter");
        write(&dir, "bad.md", "---\ndg-publish: [oops\n---\n");
        write(&dir, "broken.md", "---\ndg-publish: true\n---\n");
        write(&dir, ".obsidian/hidden.md", "---\ndg-publish: true\n---\n");
        write(&dir, "notes.txt", "dg-publish: true");

        let rules = vec![PathRewriteRule {
            from: "Public".to_string(),
            to: String::new(),
        }];
        let scanner = Scanner::new(dir.path(), Arc::new(StubCompiler), rules);
        let marked = scanner.scan().await;

        let paths: Vec<&str> = marked.notes.iter().map(|c| c.vault_path().as_str()).collect();
        assert_eq!(paths, vec!["Public/a.md", "b.md"]);
        assert_eq!(marked.notes[0].garden_path, "a.md");
        assert_eq!(marked.images.len(), 1);
        assert_eq!(marked.unreadable, vec!["bad.md", "broken.md"]);
    }

    #[tokio::test]
    async fn test_vault_files_skips_hidden() {
        let dir = TempDir::new().unwrap();
        write(&dir, ".git/config", "x");
        write(&dir, "a/.hidden/b.md", "x");
        write(&dir, "a/c.md", "x");

        let listing = vault_files(dir.path()).await.unwrap();
        assert_eq!(listing.files, vec![dir.path().join("a/c.md")]);
        assert!(listing.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_missing_vault_is_an_incomplete_scan() {
        let dir = TempDir::new().unwrap();
        let scanner = Scanner::new(dir.path().join("gone"), Arc::new(StubCompiler), Vec::new());

        let marked = scanner.scan().await;
        assert!(marked.notes.is_empty());
        assert!(marked.incomplete);
    }
}
