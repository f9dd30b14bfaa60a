use ark_types::Fingerprint;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    ObjectNotFound(Fingerprint),

    /// The object data is malformed, carries an unknown tag, or does not
    /// hash to its name.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: Fingerprint, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn corrupt(id: Fingerprint, reason: impl Into<String>) -> Self {
        Self::CorruptObject {
            id,
            reason: reason.into(),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
