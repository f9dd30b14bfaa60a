//! Error types for the worktree crate.

use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while snapshotting or restoring a directory.
#[derive(Debug, thiserror::Error)]
pub enum WorktreeError {
    /// A filesystem entry that is neither a regular file nor a directory,
    /// or whose name cannot be stored in a tree.
    #[error("unsupported entry {}: {reason}", .path.display())]
    UnsupportedEntry { path: PathBuf, reason: String },

    /// Checkout target already exists.
    #[error("checkout destination already exists: {}", .0.display())]
    DestinationConflict(PathBuf),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] ark_store::StoreError),

    /// I/O error on a working-directory path.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Attach `path` to an I/O error.
pub(crate) fn io_at(path: &Path) -> impl FnOnce(io::Error) -> WorktreeError + '_ {
    move |source| WorktreeError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Convenience alias for worktree results.
pub type WorktreeResult<T> = Result<T, WorktreeError>;
