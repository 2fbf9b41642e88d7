//! Document and publish-candidate domain models
//!
//! A [`Document`] is a read-only snapshot of one markdown note taken at scan
//! time. A [`PublishCandidate`] is a document that passed the publish
//! predicate, carrying its garden path and a total ordering.

use super::ids::VaultPath;
use super::Result;
use serde_yaml::{Mapping, Value};
use std::cmp::Ordering;

/// Frontmatter key that marks a note for publication
pub const PUBLISH_FLAG: &str = "dg-publish";

/// Parsed YAML frontmatter of a note
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter(Mapping);

impl Frontmatter {
    /// Parse the frontmatter block at the top of a markdown document
    ///
    /// A document without a leading `---` block has empty frontmatter.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the block is not a YAML mapping.
    pub fn parse(markdown: &str) -> Result<Self> {
        match split_frontmatter(markdown).0 {
            Some(yaml) => Self::from_yaml(yaml),
            None => Ok(Self::default()),
        }
    }

    /// Parse a bare YAML mapping
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(super::GardenError::Validation(format!(
                "Frontmatter must be a mapping, got {other:?}"
            ))),
        }
    }

    /// Look up a top-level key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert or replace a top-level key
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(Value::String(key.to_string()), value.into());
    }

    /// True when `dg-publish` is present and truthy
    pub fn has_publish_flag(&self) -> bool {
        self.get(PUBLISH_FLAG).map(is_truthy).unwrap_or(false)
    }

    /// The sole local precondition for publishing an artifact
    pub fn is_publish_valid(&self) -> bool {
        self.has_publish_flag()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Truthiness of a frontmatter value
///
/// `false`, `null`, `0`, `NaN` and `""` are falsy; every other value,
/// including the string `"false"`, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(_) | Value::Mapping(_) => true,
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

/// Split a markdown document into its frontmatter block and body
pub fn split_frontmatter(markdown: &str) -> (Option<&str>, &str) {
    let rest = match markdown
        .strip_prefix("---\n")
        .or_else(|| markdown.strip_prefix("---\r\n"))
    {
        Some(rest) => rest,
        None => return (None, markdown),
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    // Unterminated block: treat the whole thing as body
    (None, markdown)
}

/// A source note snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Vault-relative path, unique within the corpus
    pub path: VaultPath,

    /// Parsed frontmatter
    pub frontmatter: Frontmatter,
}

impl Document {
    pub fn new(path: VaultPath, frontmatter: Frontmatter) -> Self {
        Self { path, frontmatter }
    }

    /// Publish flag derived from the frontmatter
    pub fn publish_flag(&self) -> bool {
        self.frontmatter.has_publish_flag()
    }
}

/// A document selected for publication, prior to compilation
#[derive(Debug, Clone)]
pub struct PublishCandidate {
    /// The underlying note
    pub document: Document,

    /// Path under the garden's note root after rewrite rules
    pub garden_path: String,
}

impl PublishCandidate {
    pub fn new(document: Document, garden_path: impl Into<String>) -> Self {
        Self {
            document,
            garden_path: garden_path.into(),
        }
    }

    pub fn vault_path(&self) -> &VaultPath {
        &self.document.path
    }

    pub fn frontmatter(&self) -> &Frontmatter {
        &self.document.frontmatter
    }

    /// Deterministic publish order: by vault path
    pub fn compare(&self, other: &Self) -> Ordering {
        self.document.path.cmp(&other.document.path)
    }
}

impl PartialEq for PublishCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.document.path == other.document.path
    }
}

impl Eq for PublishCandidate {}

impl PartialOrd for PublishCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PublishCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}
