use super::{BreakerSnapshot, StorageAdapter, StorageError, DEFAULT_KEY};
use crate::{logging, utils, Result};
use std::fs;
use std::path::{Path, PathBuf};

const STORAGE_FILE_STEM: &str = "circuit_breaker";

/// `FileStorageAdapter` persists one snapshot per key as a single JSON
/// file at `<base_dir>/circuit_breaker[.<key>]`. The base directory is an
/// explicit constructor argument and must already exist; the first state
/// access on a missing directory raises
/// `StorageError::MissingStorageDirectory`.
///
/// Writes go to a temporary file in the same directory followed by a
/// rename, so a concurrent `load_state` never observes a partially
/// written record.
#[derive(Debug)]
pub struct FileStorageAdapter {
    base_dir: PathBuf,
    key: String,
}

impl FileStorageAdapter {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        FileStorageAdapter {
            base_dir: base_dir.into(),
            key: DEFAULT_KEY.into(),
        }
    }

    /// Full path of the record for the bound key.
    /// An empty sanitized key drops the suffix, sharing the default record.
    fn storage_file(&self) -> Result<PathBuf> {
        if !self.base_dir.is_dir() {
            return Err(StorageError::MissingStorageDirectory(self.base_dir.clone()).into());
        }
        let mut name = String::from(STORAGE_FILE_STEM);
        if !self.key.is_empty() {
            name.push('.');
            name.push_str(&self.key);
        }
        Ok(self.base_dir.join(name))
    }

    fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, contents).map_err(StorageError::Io)?;
        fs::rename(&tmp, path).map_err(StorageError::Io)?;
        Ok(())
    }
}

impl StorageAdapter for FileStorageAdapter {
    fn set_key(&mut self, key: &str) {
        if !utils::is_blank(key) {
            self.key = utils::sanitize_key(key);
        }
    }

    fn load_state(&self) -> Result<BreakerSnapshot> {
        let path = self.storage_file()?;
        if !path.exists() {
            return Ok(BreakerSnapshot::default());
        }
        let contents = fs::read_to_string(&path).map_err(StorageError::Io)?;
        let snapshot = serde_json::from_str(&contents).map_err(StorageError::Serialization)?;
        Ok(snapshot)
    }

    fn save_state(&mut self, snapshot: &BreakerSnapshot) -> Result<()> {
        let path = self.storage_file()?;
        let contents = serde_json::to_vec(snapshot).map_err(StorageError::Serialization)?;
        Self::write_atomically(&path, &contents)?;
        logging::debug!(
            "[FileStorageAdapter] persisted state {:?} to {}",
            snapshot.state,
            path.display()
        );
        Ok(())
    }
}
