//! Vault path newtype with validation
//!
//! Every document and image in the vault is addressed by its path relative
//! to the vault root, always using `/` as separator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Vault-relative path of a note or image
///
/// # Examples
///
/// ```
/// use garden_sync::domain::ids::VaultPath;
/// use std::str::FromStr;
///
/// let path = VaultPath::from_str("Projects/garden.md").unwrap();
/// assert_eq!(path.file_name(), "garden.md");
/// assert_eq!(path.parent(), Some("Projects"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VaultPath(String);

impl VaultPath {
    /// Creates a new VaultPath, normalising `\` to `/` and stripping leading separators
    ///
    /// # Errors
    ///
    /// Returns `Err` for empty paths and paths containing `.` or `..` segments.
    pub fn new(path: impl Into<String>) -> Result<Self, String> {
        let raw = path.into().replace('\\', "/");
        let normalized = raw.trim_start_matches('/');

        if normalized.trim().is_empty() {
            return Err("Vault path cannot be empty".to_string());
        }

        if normalized
            .split('/')
            .any(|segment| segment == ".." || segment == "." || segment.is_empty())
        {
            return Err(format!("Vault path must not contain empty, '.' or '..' segments: {raw}"));
        }

        Ok(Self(normalized.to_string()))
    }

    /// Builds a VaultPath from a filesystem path below `root`
    pub fn from_fs(root: &Path, path: &Path) -> Result<Self, String> {
        let relative = path
            .strip_prefix(root)
            .map_err(|_| format!("{} is not inside {}", path.display(), root.display()))?;
        let joined = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Self::new(joined)
    }

    /// Returns the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Last path segment
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Everything before the last segment, `None` for top-level files
    pub fn parent(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(parent, _)| parent)
    }

    /// Lower-cased extension without the dot
    pub fn extension(&self) -> Option<String> {
        self.file_name()
            .rsplit_once('.')
            .filter(|(stem, _)| !stem.is_empty())
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    /// Resolve this path against the vault root on disk
    pub fn to_fs_path(&self, root: &Path) -> std::path::PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |acc, s| acc.join(s))
    }
}

impl fmt::Display for VaultPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VaultPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for VaultPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
