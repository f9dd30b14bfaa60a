use std::io;
use std::path::PathBuf;

use ark_history::HistoryError;
use ark_store::StoreError;
use ark_types::Fingerprint;
use ark_worktree::WorktreeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("repository already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("not an ark repository (or any parent up to /): {}", .0.display())]
    NotInitialized(PathBuf),

    #[error("object not found: {0}")]
    ObjectNotFound(Fingerprint),

    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: Fingerprint, reason: String },

    #[error("unsupported entry {}: {reason}", .path.display())]
    UnsupportedEntry { path: PathBuf, reason: String },

    #[error("checkout destination already exists: {}", .0.display())]
    DestinationConflict(PathBuf),

    #[error("invalid fingerprint {input:?}: {reason}")]
    InvalidFingerprint { input: String, reason: String },

    #[error("invalid config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("ref error: {0}")]
    Ref(#[from] ark_refs::RefError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<StoreError> for SdkError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ObjectNotFound(id) => Self::ObjectNotFound(id),
            StoreError::CorruptObject { id, reason } => Self::CorruptObject { id, reason },
            StoreError::Io(e) => Self::Io(e),
        }
    }
}

impl From<WorktreeError> for SdkError {
    fn from(e: WorktreeError) -> Self {
        match e {
            WorktreeError::UnsupportedEntry { path, reason } => {
                Self::UnsupportedEntry { path, reason }
            }
            WorktreeError::DestinationConflict(path) => Self::DestinationConflict(path),
            WorktreeError::Store(e) => e.into(),
            WorktreeError::Io { path, source } => Self::Io(io::Error::new(
                source.kind(),
                format!("{}: {source}", path.display()),
            )),
        }
    }
}

impl From<HistoryError> for SdkError {
    fn from(e: HistoryError) -> Self {
        match e {
            HistoryError::Store(e) => e.into(),
            HistoryError::Worktree(e) => e.into(),
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
