//! Commit creation, history walk, and restore.

use std::ffi::OsStr;
use std::path::Path;

use ark_store::{Commit, ObjectStore};
use ark_types::Fingerprint;
use ark_worktree::{clean, Checkout, TreeBuilder, WorktreeError, WorktreeOptions};
use tracing::debug;

use crate::error::HistoryResult;

/// Snapshot `working_root` and record it as a commit on top of `parent`.
///
/// Blobs are written while the directory is walked; trees follow in one
/// batch once the walk succeeded, and the commit object goes last. HEAD is
/// not touched here.
pub fn commit(
    store: &dyn ObjectStore,
    working_root: &Path,
    parent: Option<Fingerprint>,
    description: &str,
    options: &WorktreeOptions,
) -> HistoryResult<Fingerprint> {
    let built = TreeBuilder::new(store, options).build(working_root)?;
    store.write_batch(&built.to_stored_objects())?;

    let commit = Commit::new(built.root_id(), parent, description);
    let id = store.write(&commit.to_stored_object())?;
    debug!(
        commit = %id.short_hex(),
        tree = %commit.tree.short_hex(),
        trees = built.trees.len(),
        "recorded commit"
    );
    Ok(id)
}

/// Walk the chain starting at `head`, most recent commit first.
pub fn log(store: &dyn ObjectStore, head: Option<Fingerprint>) -> History<'_> {
    History { store, next: head }
}

/// Replace the contents of `working_root` with the snapshot in `id`.
///
/// The commit and its root tree are resolved before anything is removed,
/// so an unknown fingerprint leaves the working directory untouched. A root
/// entry whose name is skipped (for example one added to the ignore list
/// after the commit was taken) would survive the clean and collide during
/// checkout, so it is rejected up front as a destination conflict.
pub fn checkout_commit(
    store: &dyn ObjectStore,
    id: &Fingerprint,
    working_root: &Path,
    options: &WorktreeOptions,
) -> HistoryResult<Commit> {
    let commit = store.read_commit(id)?;
    let tree = store.read_tree(&commit.tree)?;
    if let Some(entry) = tree
        .entries
        .iter()
        .find(|e| options.is_skipped(OsStr::new(&e.name)))
    {
        return Err(WorktreeError::DestinationConflict(working_root.join(&entry.name)).into());
    }

    let removed = clean(working_root, options)?;
    let stats = Checkout::new(store).checkout(&tree, working_root)?;
    debug!(
        commit = %id.short_hex(),
        removed,
        files = stats.files,
        directories = stats.directories,
        "restored commit"
    );
    Ok(commit)
}

/// Lazy iterator over `(fingerprint, commit)` pairs along parent links.
///
/// Ends after the root commit. A link that cannot be resolved is yielded
/// once as an error and ends the walk.
pub struct History<'a> {
    store: &'a dyn ObjectStore,
    next: Option<Fingerprint>,
}

impl Iterator for History<'_> {
    type Item = HistoryResult<(Fingerprint, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        match self.store.read_commit(&id) {
            Ok(commit) => {
                self.next = commit.parent;
                Some(Ok((id, commit)))
            }
            Err(e) => Some(Err(e.into())),
        }
    }
}
