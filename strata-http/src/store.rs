//! JSON state persistence
//!
//! Mirrors the whole repository registry into a single pretty-printed JSON
//! file after every successful mutation. Writes go through a temp file and
//! a rename so a crash mid-write never leaves a torn state file behind.

use std::fs;
use std::path::{Path, PathBuf};

use strata_core::RepositoryRegistry;

/// Failures while loading or saving the state file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("State I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persists a [`RepositoryRegistry`] as JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the registry, or a fresh empty one when no file exists yet.
    pub fn load(&self) -> Result<RepositoryRegistry, StoreError> {
        if !self.path.exists() {
            return Ok(RepositoryRegistry::new());
        }
        let data = fs::read_to_string(&self.path)?;
        let registry: RepositoryRegistry = serde_json::from_str(&data)?;
        Ok(registry)
    }

    /// Write the registry atomically (temp file, then rename).
    pub fn save(&self, registry: &RepositoryRegistry) -> Result<(), StoreError> {
        let tmp_path = self.path.with_extension("tmp");
        let data = serde_json::to_string_pretty(registry)?;
        fs::write(&tmp_path, &data)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}
