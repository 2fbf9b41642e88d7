//! Compiled artifact model
//!
//! A [`CompiledArtifact`] is produced once per candidate by the compiler and
//! is never recompiled within a run. Assets keep their content base64-encoded;
//! only the local mirror decodes them back to bytes.

use super::document::Frontmatter;
use super::ids::VaultPath;
use super::Result;
use base64::{engine::general_purpose, Engine as _};

/// One binary resource referenced by a note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Path below the image root, e.g. `img/user/photos/cat.png`
    pub relative_path: String,

    /// Base64-encoded content
    pub content: String,

    /// Known remote blob hash, if the caller already has it
    pub remote_hash: Option<String>,
}

impl Asset {
    /// Create an asset from raw bytes
    pub fn from_bytes(relative_path: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            relative_path: relative_path.into(),
            content: general_purpose::STANDARD.encode(bytes),
            remote_hash: None,
        }
    }

    /// Decode the stored base64 back to bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(general_purpose::STANDARD.decode(self.content.as_bytes())?)
    }

    pub fn with_remote_hash(mut self, hash: impl Into<String>) -> Self {
        self.remote_hash = Some(hash.into());
        self
    }
}

/// Ordered set of assets, unique by `relative_path`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetList {
    images: Vec<Asset>,
}

impl AssetList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an asset; a second asset with the same path is ignored
    pub fn push(&mut self, asset: Asset) -> bool {
        if self
            .images
            .iter()
            .any(|existing| existing.relative_path == asset.relative_path)
        {
            return false;
        }
        self.images.push(asset);
        true
    }

    pub fn images(&self) -> &[Asset] {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut [Asset] {
        &mut self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Asset> {
        self.images.iter()
    }
}

impl FromIterator<Asset> for AssetList {
    fn from_iter<I: IntoIterator<Item = Asset>>(iter: I) -> Self {
        let mut list = AssetList::new();
        for asset in iter {
            list.push(asset);
        }
        list
    }
}

/// Compiled output of one document: text plus its asset list
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledArtifact {
    /// Source note
    pub vault_path: VaultPath,

    /// Path below the note root (after rewrite rules)
    pub garden_path: String,

    /// Frontmatter of the source note, re-validated before every publish
    pub frontmatter: Frontmatter,

    /// Compiled markdown text
    pub text: String,

    /// Embedded images
    pub assets: AssetList,

    /// Known remote blob hash of the text
    pub remote_hash: Option<String>,
}

impl CompiledArtifact {
    /// Split into `(text, assets)`
    pub fn compiled_file(&self) -> (&str, &AssetList) {
        (&self.text, &self.assets)
    }

    pub fn with_remote_hash(mut self, hash: impl Into<String>) -> Self {
        self.remote_hash = Some(hash.into());
        self
    }
}

/// The unit of idempotent remote mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteWriteRequest {
    /// Full repository path
    pub path: String,

    /// Base64-encoded content
    pub content: String,

    /// Commit message
    pub message: String,

    /// Hash the store must currently hold for `path`; forwarded, not checked locally
    pub expected_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_base64_round_trip() {
        let bytes = [0u8, 159, 146, 150, 255];
        let asset = Asset::from_bytes("img/user/a.png", &bytes);
        assert_eq!(asset.decode().unwrap(), bytes);
        assert!(asset.remote_hash.is_none());
    }

    #[test]
    fn test_asset_decode_invalid() {
        let asset = Asset {
            relative_path: "img/user/a.png".to_string(),
            content: "not base64!!".to_string(),
            remote_hash: None,
        };
        assert!(asset.decode().is_err());
    }

    #[test]
    fn test_asset_list_dedup() {
        let mut list = AssetList::new();
        assert!(list.push(Asset::from_bytes("img/user/a.png", b"1")));
        assert!(!list.push(Asset::from_bytes("img/user/a.png", b"2")));
        assert!(list.push(Asset::from_bytes("img/user/b.png", b"3")));
        assert_eq!(list.len(), 2);
        assert_eq!(list.images()[0].decode().unwrap(), b"1");
    }
}
