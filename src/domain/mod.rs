//! Domain models and types for garden-sync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed paths** ([`VaultPath`])
//! - **Source models** ([`Document`], [`Frontmatter`], [`PublishCandidate`])
//! - **Compiled models** ([`CompiledArtifact`], [`Asset`], [`AssetList`], [`RemoteWriteRequest`])
//! - **Error types** ([`GardenError`], [`RemoteError`], [`FailureKind`])
//! - **Result type alias** ([`Result`])
//!
//! # Publish predicate
//!
//! ```rust
//! use garden_sync::domain::Frontmatter;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fm = Frontmatter::parse("---\ndg-publish: true\n---\n# Hello")?;
//! assert!(fm.has_publish_flag());
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod document;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use artifact::{Asset, AssetList, CompiledArtifact, RemoteWriteRequest};
pub use document::{Document, Frontmatter, PublishCandidate, PUBLISH_FLAG};
pub use errors::{FailureKind, GardenError, RemoteError};
pub use ids::VaultPath;
pub use result::Result;
