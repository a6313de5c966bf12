//! Storage adapters persist and retrieve a breaker's state record keyed by
//! a sanitized breaker key. The adapter is the durable owner of state
//! across process lifetimes; the in-memory `CircuitBreaker` instance is a
//! cache-through view on top of it.
//!
//! Absence of a record is never an error: `load_state` hydrates the
//! default snapshot (Closed / 0 / no failure time). A structurally
//! unusable medium raises the distinguished
//! `StorageError::MissingStorageDirectory`, which is propagated, never
//! swallowed.

pub mod file;
pub mod memory;

pub use self::file::*;
pub use self::memory::*;

use crate::core::breaker::State;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Key the adapters fall back to when no breaker key was ever bound.
pub(crate) const DEFAULT_KEY: &str = "default";

/// `BreakerSnapshot` is the persisted breaker state record.
///
/// Every field carries a `serde` default so that records written by older
/// versions, or partially populated by hand, hydrate with the breaker's
/// compiled-in defaults instead of failing the load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerSnapshot {
    pub state: State,
    pub failure_count: u32,
    /// Set on transition into Open, cleared on transition into HalfOpen.
    /// Explicitly optional; "never failed" is distinct from "failed at 0".
    pub last_failure_time: Option<u64>,
}

/// `StorageAdapter` is the persistence capability consumed by
/// `CircuitBreaker`. The state machine depends only on this trait, never
/// on a concrete backend.
pub trait StorageAdapter: Send {
    /// Binds the adapter to a breaker key. The raw key is sanitized by the
    /// adapter; a blank raw key is a no-op, so an adapter never silently
    /// becomes keyless.
    fn set_key(&mut self, key: &str);

    /// Returns the last persisted snapshot for the bound key, or the
    /// default snapshot when no record exists yet.
    fn load_state(&self) -> Result<BreakerSnapshot>;

    /// Create-or-replace write of the whole snapshot. Must be atomic
    /// enough that a concurrent `load_state` never observes a partially
    /// written record.
    fn save_state(&mut self, snapshot: &BreakerSnapshot) -> Result<()>;
}

/// `StorageError` indicates that a storage medium could not be read or
/// written. `MissingStorageDirectory` distinguishes a structurally
/// unusable medium from transient I/O trouble; callers recover it with
/// `err.downcast_ref::<StorageError>()`.
#[derive(Debug)]
pub enum StorageError {
    /// The configured base directory does not exist.
    MissingStorageDirectory(PathBuf),
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::MissingStorageDirectory(dir) => {
                write!(f, "storage directory does not exist: {}", dir.display())
            }
            StorageError::Io(err) => write!(f, "storage I/O failed: {}", err),
            StorageError::Serialization(err) => {
                write!(f, "storage record serialization failed: {}", err)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::MissingStorageDirectory(_) => None,
            StorageError::Io(err) => Some(err),
            StorageError::Serialization(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_default_is_closed_with_no_failures() {
        let snapshot = BreakerSnapshot::default();
        assert_eq!(snapshot.state, State::Closed);
        assert_eq!(snapshot.failure_count, 0);
        assert_eq!(snapshot.last_failure_time, None);
    }

    #[test]
    fn snapshot_state_serializes_as_conventional_strings() {
        let snapshot = BreakerSnapshot {
            state: State::HalfOpen,
            failure_count: 0,
            last_failure_time: None,
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["state"], "HALF_OPEN");
        assert_eq!(value["last_failure_time"], json!(null));
    }

    #[test]
    fn snapshot_missing_fields_hydrate_defaults() {
        let snapshot: BreakerSnapshot = serde_json::from_str(r#"{"state":"OPEN"}"#).unwrap();
        assert_eq!(snapshot.state, State::Open);
        assert_eq!(snapshot.failure_count, 0);
        assert_eq!(snapshot.last_failure_time, None);

        let snapshot: BreakerSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot, BreakerSnapshot::default());
    }

    #[test]
    fn storage_error_is_recoverable_through_anyhow() {
        let err: crate::Error = StorageError::MissingStorageDirectory("/nonexistent".into()).into();
        match err.downcast_ref::<StorageError>() {
            Some(StorageError::MissingStorageDirectory(dir)) => {
                assert_eq!(dir, &PathBuf::from("/nonexistent"))
            }
            other => panic!("unexpected error shape: {:?}", other),
        }
    }
}
