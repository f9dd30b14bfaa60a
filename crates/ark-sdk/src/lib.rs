//! High-level repository API for Ark.
//!
//! [`Repository`] ties the object store, HEAD, configuration and working
//! directory together. This is the entry point for the CLI and for
//! programs embedding Ark.

pub mod config;
pub mod error;
pub mod repository;

pub use config::RepoConfig;
pub use error::{SdkError, SdkResult};
pub use repository::{Repository, Status, MIN_PREFIX_LEN, STORAGE_DIR};

// Re-export key types
pub use ark_store::{Commit, Tree, TreeEntry};
pub use ark_types::Fingerprint;
