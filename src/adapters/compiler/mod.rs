//! Artifact compilation
//!
//! [`ArtifactCompiler`] is the seam; [`VaultCompiler`] reads notes and
//! images straight from the vault directory.

pub mod traits;
pub mod vault;

pub use traits::ArtifactCompiler;
pub use vault::{VaultCompiler, IMAGE_EXTENSIONS};
