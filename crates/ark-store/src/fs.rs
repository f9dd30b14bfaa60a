//! On-disk object store: one file per object under `objects/`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ark_types::Fingerprint;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Filesystem-backed object store.
///
/// Each object lives in `<objects_dir>/<fingerprint-hex>` as a record of the
/// form `<tag>\n<content>`. Records are written to a temporary file in the
/// same directory and then linked into place without clobbering, so an
/// existing object is never overwritten and a crash never leaves a
/// half-written record under a fingerprint name.
#[derive(Debug)]
pub struct FsObjectStore {
    objects_dir: PathBuf,
    verify_on_read: bool,
}

impl FsObjectStore {
    /// Open a store rooted at an existing `objects/` directory.
    pub fn open(objects_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let objects_dir = objects_dir.into();
        if !objects_dir.is_dir() {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("object directory {} does not exist", objects_dir.display()),
            )));
        }
        Ok(Self {
            objects_dir,
            verify_on_read: true,
        })
    }

    /// Recompute fingerprints on read and reject records that do not match
    /// their file name. On by default.
    pub fn with_verify_on_read(mut self, verify: bool) -> Self {
        self.verify_on_read = verify;
        self
    }

    /// The directory holding the object files.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// Path of the record for `id`.
    pub fn object_path(&self, id: &Fingerprint) -> PathBuf {
        self.objects_dir.join(id.to_hex())
    }

    /// All fingerprints present on disk, sorted.
    ///
    /// Files whose names are not fingerprints (leftover temp files) are
    /// skipped.
    pub fn all_ids(&self) -> StoreResult<Vec<Fingerprint>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.objects_dir)? {
            let entry = entry?;
            if let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| Fingerprint::from_hex(name).ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl ObjectStore for FsObjectStore {
    fn read(&self, id: &Fingerprint) -> StoreResult<Option<StoredObject>> {
        let record = match fs::read(self.object_path(id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let object = StoredObject::decode(*id, &record)?;
        if self.verify_on_read {
            let computed = object.compute_id();
            if computed != *id {
                return Err(StoreError::CorruptObject {
                    id: *id,
                    reason: format!("content hashes to {computed}"),
                });
            }
        }
        Ok(Some(object))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<Fingerprint> {
        let id = object.compute_id();
        let path = self.object_path(&id);
        if path.exists() {
            debug!(%id, kind = %object.kind, "object already stored");
            return Ok(id);
        }

        let mut tmp = NamedTempFile::new_in(&self.objects_dir)?;
        tmp.write_all(&object.encode())?;
        tmp.as_file().sync_all()?;
        match tmp.persist_noclobber(&path) {
            Ok(_) => {
                debug!(%id, kind = %object.kind, size = object.data.len(), "object written");
            }
            // Another writer got there first; the content is identical.
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.error.into()),
        }
        Ok(id)
    }

    fn exists(&self, id: &Fingerprint) -> StoreResult<bool> {
        Ok(self.object_path(id).try_exists()?)
    }
}
