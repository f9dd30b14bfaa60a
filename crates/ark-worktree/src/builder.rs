//! Snapshot a directory into a tree object graph.
//!
//! Blobs are written to the store as they are read. Trees are only computed:
//! the caller persists [`BuiltTree::trees`] once the whole walk succeeded,
//! so a failed build never leaves dangling tree objects behind.

use std::ffi::OsString;
use std::fs::{self, FileType};
use std::path::Path;

use ark_store::{validate_entry_name, ObjectKind, ObjectStore, StoredObject, Tree, TreeEntry};
use ark_types::Fingerprint;
use tracing::debug;

use crate::error::{io_at, WorktreeError, WorktreeResult};
use crate::options::WorktreeOptions;

/// Result of snapshotting one directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltTree {
    /// Tree of the directory that was built.
    pub root: Tree,
    /// Every tree created during the walk, children before their parent.
    /// The root is last.
    pub trees: Vec<Tree>,
}

impl BuiltTree {
    /// Fingerprint of the root tree.
    pub fn root_id(&self) -> Fingerprint {
        self.root.id()
    }

    /// Every tree as a storable object, in build order.
    pub fn to_stored_objects(&self) -> Vec<StoredObject> {
        self.trees.iter().map(Tree::to_stored_object).collect()
    }
}

/// Recursive directory snapshotter.
pub struct TreeBuilder<'a> {
    store: &'a dyn ObjectStore,
    options: &'a WorktreeOptions,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(store: &'a dyn ObjectStore, options: &'a WorktreeOptions) -> Self {
        Self { store, options }
    }

    /// Snapshot `dir`.
    ///
    /// Children are visited in name order so that identical content always
    /// yields the same tree fingerprint regardless of how the filesystem
    /// happens to list them.
    pub fn build(&self, dir: &Path) -> WorktreeResult<BuiltTree> {
        let mut trees = Vec::new();
        let root = self.build_dir(dir, &mut trees)?;
        debug!(dir = %dir.display(), trees = trees.len(), root = %root.id(), "built tree");
        Ok(BuiltTree { root, trees })
    }

    fn build_dir(&self, dir: &Path, trees: &mut Vec<Tree>) -> WorktreeResult<Tree> {
        let mut children = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_at(dir))? {
            let entry = entry.map_err(io_at(dir))?;
            if self.options.is_skipped(&entry.file_name()) {
                continue;
            }
            children.push(entry);
        }
        children.sort_by_key(|e| e.file_name());

        let mut entries = Vec::with_capacity(children.len());
        for child in children {
            let path = child.path();
            let name = entry_name(&path, child.file_name())?;
            let file_type = child.file_type().map_err(io_at(&path))?;

            if file_type.is_dir() {
                let subtree = self.build_dir(&path, trees)?;
                entries.push(TreeEntry::tree(name, subtree.id()));
            } else if file_type.is_file() {
                let data = fs::read(&path).map_err(io_at(&path))?;
                let id = self
                    .store
                    .write(&StoredObject::new(ObjectKind::Blob, data))?;
                entries.push(TreeEntry::blob(name, id));
            } else {
                return Err(WorktreeError::UnsupportedEntry {
                    path,
                    reason: describe(file_type).into(),
                });
            }
        }

        let tree = Tree::new(entries);
        trees.push(tree.clone());
        Ok(tree)
    }
}

fn entry_name(path: &Path, raw: OsString) -> WorktreeResult<String> {
    let name = raw.into_string().map_err(|_| WorktreeError::UnsupportedEntry {
        path: path.to_path_buf(),
        reason: "name is not valid UTF-8".into(),
    })?;
    validate_entry_name(&name).map_err(|reason| WorktreeError::UnsupportedEntry {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(name)
}

fn describe(file_type: FileType) -> &'static str {
    if file_type.is_symlink() {
        return "symbolic link";
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if file_type.is_fifo() {
            return "named pipe";
        }
        if file_type.is_socket() {
            return "socket";
        }
        if file_type.is_block_device() || file_type.is_char_device() {
            return "device file";
        }
    }
    "special file"
}
