use std::ffi::OsStr;

/// Names that belong to the repository machinery rather than the snapshot.
///
/// Build skips them at every directory level; clean leaves them alone at the
/// top of the working directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorktreeOptions {
    skip: Vec<String>,
}

impl WorktreeOptions {
    /// Skip only the given storage directory name.
    pub fn new(storage_name: impl Into<String>) -> Self {
        Self {
            skip: vec![storage_name.into()],
        }
    }

    /// Also skip each of `names` (for example `.git`).
    pub fn with_ignored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.skip.contains(&name) {
                self.skip.push(name);
            }
        }
        self
    }

    /// Returns `true` if a child with this name is excluded.
    pub fn is_skipped(&self, name: &OsStr) -> bool {
        self.skip.iter().any(|s| OsStr::new(s) == name)
    }

    /// All skipped names, storage directory first.
    pub fn skipped(&self) -> &[String] {
        &self.skip
    }
}
