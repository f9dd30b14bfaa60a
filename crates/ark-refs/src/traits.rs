//! The [`HeadStore`] trait defining the HEAD storage interface.

use ark_types::Fingerprint;

use crate::error::Result;

/// Storage backend for the single HEAD pointer.
///
/// HEAD names the current commit, or nothing before the first commit.
/// There are no branches: moving HEAD is the only ref operation.
pub trait HeadStore: Send + Sync {
    /// Read the current HEAD.
    ///
    /// Returns `Ok(None)` while no commit exists yet.
    fn read_head(&self) -> Result<Option<Fingerprint>>;

    /// Point HEAD at `commit`, replacing any previous value.
    fn write_head(&self, commit: &Fingerprint) -> Result<()>;
}
