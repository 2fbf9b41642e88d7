//! Default compiler for an on-disk markdown vault
//!
//! Compilation keeps the note text and frontmatter as written and rewrites
//! image embeds (`![[pic.png]]`, `![alt](pic.png)`) so they point at the
//! published asset location. Every resolved image becomes an [`Asset`].

use super::traits::ArtifactCompiler;
use crate::core::paths::{asset_relative_path, asset_url};
use crate::core::selection::walk_files;
use crate::domain::{
    Asset, AssetList, CompiledArtifact, GardenError, PublishCandidate, Result, VaultPath,
};
use async_trait::async_trait;
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// `![[target#anchor|alias]]` or `![alt](link "title")`
const EMBED_PATTERN: &str = r#"!\[\[(?P<wiki>[^\]|#]+)(?:#[^\]|]*)?(?:\|(?P<alias>[^\]]*))?\]\]|!\[(?P<alt>[^\]]*)\]\((?P<link>[^)\s]+)(?:\s+"[^"]*")?\)"#;

/// File extensions treated as embeddable images
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp"];

/// Compiler over a vault directory
///
/// The image index is built once at construction.
pub struct VaultCompiler {
    root: PathBuf,
    images: HashSet<VaultPath>,
    by_name: HashMap<String, VaultPath>,
    embed: Regex,
}

impl VaultCompiler {
    /// Index the images below `root`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `root` is not a directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(GardenError::Configuration(format!(
                "Vault root is not a directory: {}",
                root.display()
            )));
        }

        let mut images = HashSet::new();
        let mut by_name = HashMap::new();
        for file in walk_files(&root).files {
            let Ok(path) = VaultPath::from_fs(&root, &file) else {
                continue;
            };
            if !is_image(&path) {
                continue;
            }
            by_name
                .entry(path.file_name().to_string())
                .or_insert_with(|| path.clone());
            images.insert(path);
        }

        tracing::debug!(
            root = %root.display(),
            images = images.len(),
            "Indexed vault images"
        );

        Ok(Self {
            root,
            images,
            by_name,
            embed: compile_regex(EMBED_PATTERN)?,
        })
    }

    /// Vault root this compiler reads from
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_source(&self, path: &VaultPath) -> Result<String> {
        tokio::fs::read_to_string(path.to_fs_path(&self.root))
            .await
            .map_err(|e| GardenError::Compile(format!("Failed to read {path}: {e}")))
    }

    /// Resolve an embed target: next to the note, then from the vault root,
    /// then by bare file name anywhere in the vault
    fn resolve(&self, link: &str, note_dir: Option<&str>) -> Option<VaultPath> {
        let target = link.trim().replace("%20", " ");
        if target.contains("://") {
            return None;
        }

        if let Some(dir) = note_dir {
            if let Some(path) = normalize(&format!("{dir}/{target}")) {
                if self.images.contains(&path) {
                    return Some(path);
                }
            }
        }

        if let Some(path) = normalize(&target) {
            if self.images.contains(&path) {
                return Some(path);
            }
        }

        let name = target.rsplit('/').next()?;
        self.by_name.get(name).cloned()
    }

    /// Embed targets in order of appearance
    fn embedded_targets<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.embed
            .captures_iter(text)
            .filter_map(|caps| caps.name("wiki").or_else(|| caps.name("link")))
            .map(|m| m.as_str())
            .collect()
    }

    /// Rewrite resolvable embeds and return the images they point at
    fn rewrite_embeds(&self, text: &str, note_dir: Option<&str>) -> (String, Vec<VaultPath>) {
        let mut embedded = Vec::new();

        let text = self
            .embed
            .replace_all(text, |caps: &Captures| {
                let (target, alt) = match caps.name("wiki") {
                    Some(wiki) => (wiki.as_str(), caps.name("alias").map(|m| m.as_str())),
                    None => (
                        caps.name("link").map(|m| m.as_str()).unwrap_or_default(),
                        Some(caps.name("alt").map(|m| m.as_str()).unwrap_or_default()),
                    ),
                };

                match self.resolve(target, note_dir) {
                    Some(image) => {
                        let alt = alt.unwrap_or_else(|| image.file_name()).to_string();
                        let rewritten = format!("![{}]({})", alt, asset_url(&image));
                        embedded.push(image);
                        rewritten
                    }
                    None => caps[0].to_string(),
                }
            })
            .into_owned();

        (text, embedded)
    }
}

#[async_trait]
impl ArtifactCompiler for VaultCompiler {
    async fn compile(&self, candidate: &PublishCandidate) -> Result<CompiledArtifact> {
        let path = candidate.vault_path();
        let source = self.read_source(path).await?;
        let (text, embedded) = self.rewrite_embeds(&source, path.parent());

        let mut assets = AssetList::new();
        let mut seen = HashSet::new();
        for image in embedded {
            if !seen.insert(image.clone()) {
                continue;
            }
            let bytes = tokio::fs::read(image.to_fs_path(&self.root))
                .await
                .map_err(|e| GardenError::Compile(format!("Failed to read image {image}: {e}")))?;
            assets.push(Asset::from_bytes(asset_relative_path(&image), &bytes));
        }

        tracing::debug!(
            path = %path,
            assets = assets.len(),
            "Compiled note"
        );

        Ok(CompiledArtifact {
            vault_path: path.clone(),
            garden_path: candidate.garden_path.clone(),
            frontmatter: candidate.frontmatter().clone(),
            text,
            assets,
            remote_hash: None,
        })
    }

    async fn image_links(&self, candidate: &PublishCandidate) -> Result<Vec<VaultPath>> {
        let path = candidate.vault_path();
        let source = self.read_source(path).await?;

        let mut seen = HashSet::new();
        Ok(self
            .embedded_targets(&source)
            .into_iter()
            .filter_map(|target| self.resolve(target, path.parent()))
            .filter(|image| seen.insert(image.clone()))
            .collect())
    }
}

fn compile_regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| GardenError::Other(format!("Invalid embed pattern: {e}")))
}

fn is_image(path: &VaultPath) -> bool {
    path.extension()
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Collapse `.`/`..` segments; `None` when the path escapes the vault
fn normalize(path: &str) -> Option<VaultPath> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            s => parts.push(s),
        }
    }
    VaultPath::new(parts.join("/")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Document, Frontmatter};
    use std::fs;
    use tempfile::TempDir;

    fn vault() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("notes/pics")).unwrap();
        fs::create_dir_all(dir.path().join("attachments")).unwrap();
        fs::write(dir.path().join("notes/pics/local.png"), b"local-bytes").unwrap();
        fs::write(dir.path().join("attachments/shared.jpg"), b"shared-bytes").unwrap();
        fs::write(dir.path().join("attachments/readme.txt"), b"not an image").unwrap();
        dir
    }

    fn candidate(dir: &TempDir, path: &str, body: &str) -> PublishCandidate {
        fs::write(dir.path().join(path), body).unwrap();
        let fm = Frontmatter::parse(body).unwrap();
        PublishCandidate::new(Document::new(VaultPath::new(path).unwrap(), fm), path)
    }

    #[tokio::test]
    async fn test_image_links_resolution_order() {
        let dir = vault();
        let note = candidate(
            &dir,
            "notes/a.md",
            "---\ndg-publish: true\n---\n![[shared.jpg]]\n![x](pics/local.png)\n![[shared.jpg|again]]\n![[missing.png]]\n![web](https://example.com/x.png)\n",
        );
        let compiler = VaultCompiler::new(dir.path()).unwrap();

        let links = compiler.image_links(&note).await.unwrap();
        let links: Vec<&str> = links.iter().map(|p| p.as_str()).collect();
        assert_eq!(links, vec!["attachments/shared.jpg", "notes/pics/local.png"]);
    }

    #[tokio::test]
    async fn test_compile_rewrites_embeds_and_collects_assets() {
        let dir = vault();
        let note = candidate(
            &dir,
            "notes/a.md",
            "---\ndg-publish: true\n---\n![[shared.jpg]] ![alt](/notes/pics/local.png) ![[missing.png]]\n",
        );
        let compiler = VaultCompiler::new(dir.path()).unwrap();

        let artifact = compiler.compile(&note).await.unwrap();

        assert!(artifact.text.starts_with("---\ndg-publish: true\n---\n"));
        assert!(artifact
            .text
            .contains("![shared.jpg](/img/user/attachments/shared.jpg)"));
        assert!(artifact
            .text
            .contains("![alt](/img/user/notes/pics/local.png)"));
        assert!(artifact.text.contains("![[missing.png]]"));

        let paths: Vec<&str> = artifact
            .assets
            .iter()
            .map(|a| a.relative_path.as_str())
            .collect();
        assert_eq!(
            paths,
            vec!["img/user/attachments/shared.jpg", "img/user/notes/pics/local.png"]
        );
        assert_eq!(artifact.assets.images()[0].decode().unwrap(), b"shared-bytes");
        assert!(artifact.frontmatter.has_publish_flag());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a/./b/../c.png").unwrap().as_str(), "a/c.png");
        assert!(normalize("../escape.png").is_none());
    }

    #[test]
    fn test_new_rejects_missing_root() {
        assert!(VaultCompiler::new("/definitely/not/a/vault").is_err());
    }
}
