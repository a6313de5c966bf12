use super::{BreakerSnapshot, StorageAdapter, DEFAULT_KEY};
use crate::{utils, Result};
use std::collections::HashMap;

/// `MemoryStorageAdapter` keeps one snapshot per key in a process-local
/// map. It is the zero-dependency backend for single-process use and the
/// default test double; state does not survive the process.
#[derive(Debug, Default)]
pub struct MemoryStorageAdapter {
    key: Option<String>,
    records: HashMap<String, BreakerSnapshot>,
}

impl MemoryStorageAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn bound_key(&self) -> &str {
        self.key.as_deref().unwrap_or(DEFAULT_KEY)
    }
}

impl StorageAdapter for MemoryStorageAdapter {
    fn set_key(&mut self, key: &str) {
        if !utils::is_blank(key) {
            self.key = Some(utils::sanitize_key(key));
        }
    }

    fn load_state(&self) -> Result<BreakerSnapshot> {
        Ok(self
            .records
            .get(self.bound_key())
            .cloned()
            .unwrap_or_default())
    }

    fn save_state(&mut self, snapshot: &BreakerSnapshot) -> Result<()> {
        self.records
            .insert(self.bound_key().to_owned(), snapshot.clone());
        Ok(())
    }
}
