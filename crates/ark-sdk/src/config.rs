use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Per-repository settings, read from `<storage-root>/config.toml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Names skipped by snapshots and left alone by checkout, in addition
    /// to the storage directory itself.
    pub ignore: Vec<String>,
    /// Recompute object fingerprints on every read.
    pub verify_on_read: bool,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            ignore: vec![".git".into()],
            verify_on_read: true,
        }
    }
}

impl RepoConfig {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> SdkResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&text).map_err(|e| SdkError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> SdkResult<()> {
        let text = toml::to_string_pretty(self).map_err(|e| SdkError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(path, text)?;
        Ok(())
    }
}
