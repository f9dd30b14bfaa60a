//! Content-addressed object storage for Ark.
//!
//! Every piece of repository data -- file contents, directory listings,
//! commits -- is stored as an immutable object named by the [`Fingerprint`]
//! of its serialized bytes.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw file content, stored verbatim
//! - [`Tree`] -- ordered directory listing of blobs and subtrees
//! - [`Commit`] -- root tree + parent link + description
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`FsObjectStore`] -- one file per object under `objects/`
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and scratch work
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written.
//! 2. Writing an existing fingerprint is a no-op.
//! 3. Unknown tags and malformed bodies are `CorruptObject`, never defaulted.
//! 4. All I/O errors are propagated, never silently ignored.
//!
//! [`Fingerprint`]: ark_types::Fingerprint

pub mod error;
pub mod fs;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{validate_entry_name, Blob, Commit, ObjectKind, StoredObject, Tree, TreeEntry};
pub use traits::ObjectStore;
