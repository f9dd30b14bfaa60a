use ark_types::Fingerprint;

use crate::error::{StoreError, StoreResult};
use crate::object::{Blob, Commit, StoredObject, Tree};

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. A write whose fingerprint is already
///   present is a no-op and never touches the existing record.
/// - The fingerprint is computed from the object's data, never supplied by
///   the caller.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read an object by fingerprint.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    /// Returns `Err` on I/O failure or data corruption.
    fn read(&self, id: &Fingerprint) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its fingerprint.
    ///
    /// If the object already exists, this is a no-op (idempotent).
    fn write(&self, object: &StoredObject) -> StoreResult<Fingerprint>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &Fingerprint) -> StoreResult<bool>;

    /// Read an object that must exist.
    fn get(&self, id: &Fingerprint) -> StoreResult<StoredObject> {
        self.read(id)?.ok_or(StoreError::ObjectNotFound(*id))
    }

    /// Write multiple objects and return their fingerprints in order.
    ///
    /// Default implementation calls `write()` for each object.
    fn write_batch(&self, objects: &[StoredObject]) -> StoreResult<Vec<Fingerprint>> {
        objects.iter().map(|obj| self.write(obj)).collect()
    }

    /// Read and decode a blob.
    fn read_blob(&self, id: &Fingerprint) -> StoreResult<Blob> {
        Blob::from_stored_object(self.get(id)?)
    }

    /// Read and decode a tree.
    fn read_tree(&self, id: &Fingerprint) -> StoreResult<Tree> {
        Tree::from_stored_object(&self.get(id)?)
    }

    /// Read and decode a commit.
    fn read_commit(&self, id: &Fingerprint) -> StoreResult<Commit> {
        Commit::from_stored_object(&self.get(id)?)
    }
}
