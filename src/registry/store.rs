//! Registry state file.
//!
//! The whole record set is rewritten on every change. Writes go to a
//! temporary file next to the target and are renamed into place, so a crash
//! mid-write leaves the previous state intact.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::entry::PersistedMonitorRecord;
use crate::error_handling::PersistenceError;

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

    /// Reads all records. A missing file is an empty registry.
    pub async fn load(&self) -> Result<Vec<PersistedMonitorRecord>, PersistenceError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    /// Replaces the file contents with `records`, in order.
    pub async fn save(&self, records: &[PersistedMonitorRecord]) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(records)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, json.as_bytes()))
            .await
            .map_err(|e| PersistenceError::Io(std::io::Error::other(e)))?
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), PersistenceError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;
    let mut file = NamedTempFile::new_in(&dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| PersistenceError::Io(e.error))?;
    Ok(())
}
