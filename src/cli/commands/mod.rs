//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod delete;
pub mod export;
pub mod init;
pub mod publish;
pub mod status;
pub mod validate;
