//! GitHub REST client
//!
//! Single-file operations go through the contents API. Batch writes and
//! deletes go through the git data API so that any number of files lands
//! in exactly one commit: blobs, then a tree on top of the branch head,
//! then a commit, then a fast-forward of the branch ref.

use super::models::{
    CommitResponse, ContentResponse, CreateBlobRequest, CreateBlobResponse, CreateCommitRequest,
    CreateTreeRequest, DeleteContentRequest, ErrorResponse, PutContentRequest,
    PutContentResponse, RefResponse, TreeEntry, TreeResponse, UpdateRefRequest,
};
use super::traits::{RemoteFile, RemoteStore, RemoteTree, RemoteTreeEntry};
use crate::config::{GithubConfig, SecretString};
use crate::domain::{GardenError, RemoteError, RemoteWriteRequest, Result};
use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use reqwest::header::ACCEPT;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Blob uploads in flight at once during a batch
pub const BLOB_UPLOAD_CONCURRENCY: usize = 8;

/// Remote store backed by a GitHub repository
///
/// # Example
///
/// ```no_run
/// use garden_sync::adapters::github::{GithubRepository, RemoteStore};
/// use garden_sync::config::{secret_string, GithubConfig};
///
/// # async fn example() -> garden_sync::domain::Result<()> {
/// let config = GithubConfig {
///     repo: "digital-garden".to_string(),
///     username: "alice".to_string(),
///     token: Some(secret_string("ghp_example".to_string())),
///     ..Default::default()
/// };
/// let repo = GithubRepository::new(&config)?;
/// let file = repo.get_file("src/site/notes/home.md").await?;
/// # Ok(())
/// # }
/// ```
pub struct GithubRepository {
    client: Client,
    base_url: Url,
    owner: String,
    repo: String,
    branch: String,
    token: SecretString,
}

/// Branch head: commit id and its root tree id
struct Head {
    commit_sha: String,
    tree_sha: String,
}

impl GithubRepository {
    /// Create a client for the configured repository
    ///
    /// # Errors
    ///
    /// Returns a configuration error if repo, username or token is missing,
    /// or if the API base URL is not a valid URL.
    pub fn new(config: &GithubConfig) -> Result<Self> {
        config
            .validate_credentials()
            .map_err(GardenError::Configuration)?;

        let token = config.token.clone().ok_or_else(|| {
            GardenError::Configuration("You need to define a GitHub Token in the settings".into())
        })?;

        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            GardenError::Configuration(format!(
                "Invalid github.api_base_url '{}': {}",
                config.api_base_url, e
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GardenError::Configuration(format!(
                "github.api_base_url cannot be used as a base URL: {}",
                config.api_base_url
            )));
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)))
            .user_agent(concat!("garden-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::ConnectionFailed(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            owner: config.username.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            token,
        })
    }

    /// `{base}/repos/{owner}/{repo}/{segments...}` with each segment escaped
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GardenError::Configuration(format!(
                    "github.api_base_url cannot be used as a base URL: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str()])
            .extend(segments.iter().flat_map(|s| s.split('/')).filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let token: &str = self.token.expose_secret().as_ref();
        self.client
            .request(method, url)
            .bearer_auth(token)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| RemoteError::ConnectionFailed(e.to_string()))?;
        check_status(response).await
    }

    async fn head(&self) -> Result<Head> {
        let url = self.endpoint(&["git", "ref", "heads", self.branch.as_str()])?;
        let reference: RefResponse = parse_json(self.send(self.request(Method::GET, url)).await?).await?;

        let url = self.endpoint(&["git", "commits", reference.object.sha.as_str()])?;
        let commit: CommitResponse =
            parse_json(self.send(self.request(Method::GET, url)).await?).await?;

        Ok(Head {
            commit_sha: commit.sha,
            tree_sha: commit.tree.sha,
        })
    }

    async fn create_blob(&self, content: &str) -> Result<String> {
        let url = self.endpoint(&["git", "blobs"])?;
        let body = CreateBlobRequest {
            content,
            encoding: "base64",
        };
        let blob: CreateBlobResponse =
            parse_json(self.send(self.request(Method::POST, url).json(&body)).await?).await?;
        Ok(blob.sha)
    }

    /// One tree object; `None` when the branch or tree does not exist
    async fn fetch_tree(&self, tree: &str, recursive: bool) -> Result<Option<TreeResponse>> {
        let mut url = self.endpoint(&["git", "trees", tree])?;
        if recursive {
            url.query_pairs_mut().append_pair("recursive", "1");
        }

        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| RemoteError::ConnectionFailed(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(parse_json(check_status(response).await?).await?))
    }

    /// Non-recursive listing of every folder, one request per folder
    async fn walk_tree(&self) -> Result<RemoteTree> {
        let mut tree = RemoteTree::default();
        let mut pending = vec![(String::new(), self.branch.clone())];

        while let Some((prefix, sha)) = pending.pop() {
            let listing = match self.fetch_tree(&sha, false).await? {
                Some(listing) => listing,
                None => continue,
            };
            if listing.truncated {
                tracing::warn!(folder = %prefix, "Remote folder listing was truncated");
                tree.truncated = true;
            }

            for entry in listing.tree {
                let path = if prefix.is_empty() {
                    entry.path
                } else {
                    format!("{prefix}/{}", entry.path)
                };
                match entry.kind.as_str() {
                    "blob" => tree.entries.push(RemoteTreeEntry {
                        path,
                        sha: entry.sha,
                    }),
                    "tree" => pending.push((path, entry.sha)),
                    _ => {}
                }
            }
        }

        tree.entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(tree)
    }

    /// Tree on top of `head`, commit, then move the branch ref
    async fn commit_tree(&self, head: &Head, entries: Vec<TreeEntry>, message: &str) -> Result<String> {
        let url = self.endpoint(&["git", "trees"])?;
        let body = CreateTreeRequest {
            base_tree: &head.tree_sha,
            tree: entries,
        };
        let tree: TreeResponse =
            parse_json(self.send(self.request(Method::POST, url).json(&body)).await?).await?;

        let url = self.endpoint(&["git", "commits"])?;
        let body = CreateCommitRequest {
            message,
            tree: &tree.sha,
            parents: vec![head.commit_sha.as_str()],
        };
        let commit: CommitResponse =
            parse_json(self.send(self.request(Method::POST, url).json(&body)).await?).await?;

        let url = self.endpoint(&["git", "refs", "heads", self.branch.as_str()])?;
        let body = UpdateRefRequest {
            sha: &commit.sha,
            force: false,
        };
        self.send(self.request(Method::PATCH, url).json(&body)).await?;

        tracing::info!(
            branch = %self.branch,
            commit = %commit.sha,
            "Committed batch"
        );

        Ok(commit.sha)
    }
}

#[async_trait]
impl RemoteStore for GithubRepository {
    async fn get_file(&self, path: &str) -> Result<Option<RemoteFile>> {
        let mut url = self.endpoint(&["contents", path])?;
        url.query_pairs_mut().append_pair("ref", &self.branch);

        tracing::debug!(path = %path, "Fetching remote file");

        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| RemoteError::ConnectionFailed(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: ContentResponse = parse_json(check_status(response).await?).await?;
        Ok(Some(RemoteFile {
            sha: body.sha,
            content: body.content,
        }))
    }

    async fn update_file(&self, request: &RemoteWriteRequest) -> Result<String> {
        let url = self.endpoint(&["contents", request.path.as_str()])?;
        let body = PutContentRequest {
            message: &request.message,
            content: &request.content,
            branch: &self.branch,
            sha: request.expected_hash.as_deref(),
        };

        tracing::debug!(
            path = %request.path,
            has_sha = request.expected_hash.is_some(),
            "Writing remote file"
        );

        let written: PutContentResponse =
            parse_json(self.send(self.request(Method::PUT, url).json(&body)).await?).await?;
        Ok(written.content.sha)
    }

    async fn delete_file(&self, path: &str, sha: Option<&str>, message: &str) -> Result<bool> {
        let sha = match sha {
            Some(sha) => sha.to_string(),
            None => match self.get_file(path).await? {
                Some(file) => file.sha,
                None => {
                    tracing::debug!(path = %path, "Nothing to delete");
                    return Ok(false);
                }
            },
        };

        let url = self.endpoint(&["contents", path])?;
        let body = DeleteContentRequest {
            message,
            sha: &sha,
            branch: &self.branch,
        };

        let response = self
            .request(Method::DELETE, url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteError::ConnectionFailed(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(response).await?;

        tracing::debug!(path = %path, "Deleted remote file");
        Ok(true)
    }

    async fn update_files(&self, writes: &[RemoteWriteRequest], message: &str) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }

        let head = self.head().await?;
        let uploads: Vec<_> = writes
            .iter()
            .map(|write| self.create_blob(&write.content))
            .collect();
        let blobs: Vec<String> = stream::iter(uploads)
            .buffered(BLOB_UPLOAD_CONCURRENCY)
            .try_collect()
            .await?;

        let entries = writes
            .iter()
            .zip(blobs)
            .map(|(write, sha)| TreeEntry::blob(&write.path, sha))
            .collect::<Vec<_>>();

        tracing::info!(files = entries.len(), "Publishing batch");
        self.commit_tree(&head, entries, message).await?;
        Ok(())
    }

    async fn delete_files(&self, paths: &[String], message: &str) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let existing: HashSet<String> = self
            .list_tree()
            .await?
            .entries
            .into_iter()
            .map(|entry| entry.path)
            .collect();

        let entries = paths
            .iter()
            .filter(|path| existing.contains(path.as_str()))
            .map(|path| TreeEntry::removal(path.as_str()))
            .collect::<Vec<_>>();

        if entries.is_empty() {
            tracing::debug!(requested = paths.len(), "No requested paths exist remotely");
            return Ok(());
        }

        let head = self.head().await?;
        tracing::info!(files = entries.len(), "Deleting batch");
        self.commit_tree(&head, entries, message).await?;
        Ok(())
    }

    async fn list_tree(&self) -> Result<RemoteTree> {
        let listing = match self.fetch_tree(&self.branch, true).await? {
            Some(listing) => listing,
            None => {
                tracing::warn!(branch = %self.branch, "Branch has no tree yet");
                return Ok(RemoteTree::default());
            }
        };

        if listing.truncated {
            tracing::warn!(
                entries = listing.tree.len(),
                "Remote tree listing was truncated, listing folder by folder"
            );
            return self.walk_tree().await;
        }

        Ok(RemoteTree {
            entries: listing
                .tree
                .into_iter()
                .filter(|entry| entry.kind == "blob")
                .map(|entry| RemoteTreeEntry {
                    path: entry.path,
                    sha: entry.sha,
                })
                .collect(),
            truncated: false,
        })
    }
}

/// Map a non-success response onto [`RemoteError`]
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN
            && response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                == Some("0"));

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or(body);

    let error = if rate_limited {
        RemoteError::RateLimited(message)
    } else {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                RemoteError::AuthenticationFailed(message)
            }
            StatusCode::NOT_FOUND => RemoteError::NotFound(message),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                RemoteError::Conflict(message)
            }
            s if s.is_server_error() => RemoteError::ServerError {
                status: s.as_u16(),
                message,
            },
            s => RemoteError::ClientError {
                status: s.as_u16(),
                message,
            },
        }
    };

    Err(error.into())
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| RemoteError::InvalidResponse(e.to_string()).into())
}
