//! File-backed HEAD: a single text file holding a fingerprint or nothing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ark_types::Fingerprint;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::traits::HeadStore;

/// [`HeadStore`] persisted as `<storage-root>/HEAD`.
///
/// A missing or empty file means no commit yet. Writes replace the whole
/// file; there is no guard against a torn write on crash.
#[derive(Debug, Clone)]
pub struct FileHeadStore {
    path: PathBuf,
}

impl FileHeadStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HeadStore for FileHeadStore {
    fn read_head(&self) -> Result<Option<Fingerprint>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        Fingerprint::from_hex(text)
            .map(Some)
            .map_err(|e| RefError::InvalidHead {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    fn write_head(&self, commit: &Fingerprint) -> Result<()> {
        fs::write(&self.path, commit.to_hex())?;
        debug!(head = %commit, "HEAD updated");
        Ok(())
    }
}
