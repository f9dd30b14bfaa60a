//! Error types for commit chain operations.

/// Errors that can occur while recording, walking, or restoring history.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Object store failure, including missing links in the chain.
    #[error(transparent)]
    Store(#[from] ark_store::StoreError),

    /// Snapshot or restore of the working directory failed.
    #[error(transparent)]
    Worktree(#[from] ark_worktree::WorktreeError),
}

/// Convenience alias for history results.
pub type HistoryResult<T> = Result<T, HistoryError>;
