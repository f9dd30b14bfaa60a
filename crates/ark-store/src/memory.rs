use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard};

use ark_types::Fingerprint;
use tracing::debug;

use crate::error::StoreResult;
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Object store that lives only as long as the value.
///
/// Used for tests and for throwaway snapshots such as status checks, where
/// building a tree must not leave anything on disk. Records are kept in
/// fingerprint order.
#[derive(Default)]
pub struct InMemoryObjectStore {
    records: RwLock<BTreeMap<Fingerprint, StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Every stored fingerprint, ascending.
    pub fn all_ids(&self) -> Vec<Fingerprint> {
        self.records().keys().copied().collect()
    }

    fn records(&self) -> RwLockReadGuard<'_, BTreeMap<Fingerprint, StoredObject>> {
        self.records.read().expect("lock poisoned")
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &Fingerprint) -> StoreResult<Option<StoredObject>> {
        Ok(self.records().get(id).cloned())
    }

    fn write(&self, object: &StoredObject) -> StoreResult<Fingerprint> {
        let id = object.compute_id();
        let mut records = self.records.write().expect("lock poisoned");
        if !records.contains_key(&id) {
            debug!(%id, kind = %object.kind, size = object.data.len(), "object kept in memory");
            records.insert(id, object.clone());
        }
        Ok(id)
    }

    fn exists(&self, id: &Fingerprint) -> StoreResult<bool> {
        Ok(self.records().contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}
