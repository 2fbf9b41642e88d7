//! GitHub REST API models
//!
//! Request and response bodies for the contents and git-data endpoints.

use serde::{Deserialize, Serialize};

/// Response of `GET /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Clone, Deserialize)]
pub struct ContentResponse {
    pub sha: String,

    #[serde(default)]
    pub content: Option<String>,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Clone, Serialize)]
pub struct PutContentRequest<'a> {
    pub message: &'a str,
    pub content: &'a str,
    pub branch: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

/// Response of a contents write
#[derive(Debug, Clone, Deserialize)]
pub struct PutContentResponse {
    pub content: ContentResponse,
}

/// Body of `DELETE /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteContentRequest<'a> {
    pub message: &'a str,
    pub sha: &'a str,
    pub branch: &'a str,
}

/// Response of `GET /repos/{owner}/{repo}/git/ref/heads/{branch}`
#[derive(Debug, Clone, Deserialize)]
pub struct RefResponse {
    pub object: GitObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitObject {
    pub sha: String,
}

/// Response of `GET /repos/{owner}/{repo}/git/commits/{sha}`
#[derive(Debug, Clone, Deserialize)]
pub struct CommitResponse {
    pub sha: String,
    pub tree: GitObject,
}

/// Body of `POST /repos/{owner}/{repo}/git/blobs`
#[derive(Debug, Clone, Serialize)]
pub struct CreateBlobRequest<'a> {
    pub content: &'a str,
    pub encoding: &'static str,
}

/// Response of blob creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlobResponse {
    pub sha: String,
}

/// One entry of a tree creation request
///
/// A `sha` of `None` serializes as `null`, which removes the path.
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub sha: Option<String>,
}

impl TreeEntry {
    /// Regular file entry pointing at `sha`
    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: "100644",
            kind: "blob",
            sha: Some(sha.into()),
        }
    }

    /// Entry that deletes `path`
    pub fn removal(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: "100644",
            kind: "blob",
            sha: None,
        }
    }
}

/// Body of `POST /repos/{owner}/{repo}/git/trees`
#[derive(Debug, Clone, Serialize)]
pub struct CreateTreeRequest<'a> {
    pub base_tree: &'a str,
    pub tree: Vec<TreeEntry>,
}

/// Body of `POST /repos/{owner}/{repo}/git/commits`
#[derive(Debug, Clone, Serialize)]
pub struct CreateCommitRequest<'a> {
    pub message: &'a str,
    pub tree: &'a str,
    pub parents: Vec<&'a str>,
}

/// Body of `PATCH /repos/{owner}/{repo}/git/refs/heads/{branch}`
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRefRequest<'a> {
    pub sha: &'a str,
    pub force: bool,
}

/// Response of tree creation and of `GET .../git/trees/{ref}?recursive=1`
#[derive(Debug, Clone, Deserialize)]
pub struct TreeResponse {
    pub sha: String,

    #[serde(default)]
    pub tree: Vec<TreeListingEntry>,

    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeListingEntry {
    pub path: String,

    #[serde(rename = "type")]
    pub kind: String,

    pub sha: String,
}

/// Generic error body
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_serializes_null_sha() {
        let json = serde_json::to_value(TreeEntry::removal("src/site/notes/a.md")).unwrap();
        assert_eq!(json["sha"], serde_json::Value::Null);
        assert_eq!(json["type"], "blob");
        assert_eq!(json["mode"], "100644");
    }

    #[test]
    fn test_put_content_omits_missing_sha() {
        let body = PutContentRequest {
            message: "Add content a.md",
            content: "aGk=",
            branch: "main",
            sha: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
    }

    #[test]
    fn test_tree_listing_parses() {
        let json = r#"{"sha":"t1","truncated":false,"tree":[
            {"path":"src","type":"tree","sha":"d1","mode":"040000"},
            {"path":"src/site/notes/a.md","type":"blob","sha":"b1","mode":"100644","size":3}
        ]}"#;
        let parsed: TreeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.tree.len(), 2);
        assert_eq!(parsed.tree[1].kind, "blob");
    }
}
