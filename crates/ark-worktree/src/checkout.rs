//! Materialize a tree object graph onto the filesystem.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ark_store::{ObjectKind, ObjectStore, StoreError, Tree};
use tracing::debug;

use crate::error::{io_at, WorktreeError, WorktreeResult};
use crate::options::WorktreeOptions;

/// Counts reported by a finished checkout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CheckoutStats {
    pub files: usize,
    pub directories: usize,
}

/// Writes trees from a store back onto disk.
pub struct Checkout<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> Checkout<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    /// Recreate `tree` under `dest`.
    ///
    /// Every target path must be free: an existing file or directory fails
    /// with [`WorktreeError::DestinationConflict`]. Call [`clean`] first when
    /// replacing the contents of a working directory. Subtrees are walked
    /// with an explicit stack, so nesting depth is bounded by memory rather
    /// than the call stack.
    pub fn checkout(&self, tree: &Tree, dest: &Path) -> WorktreeResult<CheckoutStats> {
        let mut stats = CheckoutStats::default();
        let mut pending: Vec<(Tree, PathBuf)> = vec![(tree.clone(), dest.to_path_buf())];

        while let Some((tree, dir)) = pending.pop() {
            for entry in &tree.entries {
                let target = dir.join(&entry.name);
                let object = self.store.get(&entry.fingerprint)?;
                match (entry.kind, object.kind) {
                    (ObjectKind::Tree, ObjectKind::Tree) => {
                        let subtree = Tree::from_stored_object(&object)?;
                        fs::create_dir(&target).map_err(conflict_or_io(&target))?;
                        stats.directories += 1;
                        pending.push((subtree, target));
                    }
                    (ObjectKind::Blob, ObjectKind::Blob) => {
                        write_new_file(&target, &object.data)?;
                        stats.files += 1;
                    }
                    (expected, found) => {
                        return Err(StoreError::CorruptObject {
                            id: entry.fingerprint,
                            reason: format!(
                                "tree entry {:?} expects {expected}, store holds {found}",
                                entry.name
                            ),
                        }
                        .into());
                    }
                }
            }
        }

        debug!(
            dest = %dest.display(),
            files = stats.files,
            directories = stats.directories,
            "checkout finished"
        );
        Ok(stats)
    }
}

/// Remove every direct child of `dest` except the skipped names.
///
/// Destructive: nothing is preserved or checked. Returns the number of
/// top-level entries removed.
pub fn clean(dest: &Path, options: &WorktreeOptions) -> WorktreeResult<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dest).map_err(io_at(dest))? {
        let entry = entry.map_err(io_at(dest))?;
        if options.is_skipped(&entry.file_name()) {
            continue;
        }
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_at(&path))?;
        if file_type.is_dir() {
            fs::remove_dir_all(&path).map_err(io_at(&path))?;
        } else {
            fs::remove_file(&path).map_err(io_at(&path))?;
        }
        removed += 1;
    }
    debug!(dest = %dest.display(), removed, "cleaned working directory");
    Ok(removed)
}

fn write_new_file(path: &Path, data: &[u8]) -> WorktreeResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(conflict_or_io(path))?;
    file.write_all(data).map_err(io_at(path))
}

fn conflict_or_io(path: &Path) -> impl FnOnce(io::Error) -> WorktreeError + '_ {
    move |source| {
        if source.kind() == io::ErrorKind::AlreadyExists {
            WorktreeError::DestinationConflict(path.to_path_buf())
        } else {
            WorktreeError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}
