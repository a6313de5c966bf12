//! Breaker state must survive restarts of stateless workers: these tests
//! drive one breaker instance through the file adapter, drop it, and
//! verify that a freshly constructed instance on the same key picks up
//! the persisted state.

use breaker_core::core::{BreakerConfig, CircuitBreaker, State};
use breaker_core::storage::{
    BreakerSnapshot, FileStorageAdapter, MemoryStorageAdapter, StorageAdapter, StorageError,
};
use tempfile::tempdir;

#[test]
fn tripped_breaker_survives_worker_restart() {
    let dir = tempdir().unwrap();

    let adapter = FileStorageAdapter::new(dir.path());
    let mut breaker = CircuitBreaker::new(adapter, "billing-api").unwrap();
    breaker.failure().unwrap();
    breaker.failure().unwrap();
    breaker.failure().unwrap();
    assert_eq!(breaker.current_state(), State::Open);
    drop(breaker);

    // a new worker process constructs its own breaker on the same key
    let adapter = FileStorageAdapter::new(dir.path());
    let mut restarted = CircuitBreaker::new(adapter, "billing-api").unwrap();
    assert_eq!(restarted.current_state(), State::Open);
    assert_eq!(restarted.failure_count(), 3);
    assert!(restarted.is_not_available().unwrap());
}

#[test]
fn partially_healed_state_survives_restart() {
    let dir = tempdir().unwrap();

    // seed an Open record whose failure is older than the reset timeout
    let mut adapter = FileStorageAdapter::new(dir.path());
    adapter.set_key("billing-api");
    adapter
        .save_state(&BreakerSnapshot {
            state: State::Open,
            failure_count: 3,
            last_failure_time: Some(breaker_core::utils::curr_time_secs() - 3600),
        })
        .unwrap();

    let adapter = FileStorageAdapter::new(dir.path());
    let mut breaker = CircuitBreaker::new(adapter, "billing-api").unwrap();
    assert!(!breaker.is_not_available().unwrap());
    assert_eq!(breaker.current_state(), State::HalfOpen);
    drop(breaker);

    // the probe state reached the disk, the next worker sees HalfOpen
    let adapter = FileStorageAdapter::new(dir.path());
    let breaker = CircuitBreaker::new(adapter, "billing-api").unwrap();
    assert_eq!(breaker.current_state(), State::HalfOpen);
    assert_eq!(breaker.failure_count(), 0);
    assert_eq!(breaker.last_failure_time(), None);
}

#[test]
fn snapshots_round_trip_across_both_reference_adapters() {
    let dir = tempdir().unwrap();
    let snapshots = [
        BreakerSnapshot::default(),
        BreakerSnapshot {
            state: State::Open,
            failure_count: 7,
            last_failure_time: Some(1_700_000_000),
        },
        BreakerSnapshot {
            state: State::HalfOpen,
            failure_count: 0,
            last_failure_time: None,
        },
    ];

    let mut file_adapter = FileStorageAdapter::new(dir.path());
    file_adapter.set_key("round-trip");
    let mut memory_adapter = MemoryStorageAdapter::new();
    memory_adapter.set_key("round-trip");

    for snapshot in &snapshots {
        file_adapter.save_state(snapshot).unwrap();
        assert_eq!(&file_adapter.load_state().unwrap(), snapshot);
        memory_adapter.save_state(snapshot).unwrap();
        assert_eq!(&memory_adapter.load_state().unwrap(), snapshot);
    }
}

#[test]
fn equivalent_raw_keys_resolve_to_one_record() {
    let dir = tempdir().unwrap();

    let adapter = FileStorageAdapter::new(dir.path());
    let mut breaker = CircuitBreaker::new(adapter, "Payments API!").unwrap();
    breaker.set_failure_threshold(1);
    breaker.failure().unwrap();
    drop(breaker);

    let adapter = FileStorageAdapter::new(dir.path());
    let breaker = CircuitBreaker::new(adapter, "payments_api").unwrap();
    assert_eq!(breaker.current_state(), State::Open);
}

#[test]
fn config_tuning_applies_to_rehydrated_state() {
    let dir = tempdir().unwrap();

    let adapter = FileStorageAdapter::new(dir.path());
    let config = BreakerConfig {
        failure_threshold: 2,
        ..Default::default()
    };
    let mut breaker = CircuitBreaker::with_config(adapter, "tight", config.clone()).unwrap();
    breaker.failure().unwrap();
    assert_eq!(breaker.current_state(), State::Closed);
    drop(breaker);

    // the accumulated count persists, one more failure trips the breaker
    let adapter = FileStorageAdapter::new(dir.path());
    let mut breaker = CircuitBreaker::with_config(adapter, "tight", config).unwrap();
    assert_eq!(breaker.failure_count(), 1);
    breaker.failure().unwrap();
    assert_eq!(breaker.current_state(), State::Open);
}

#[test]
fn missing_storage_directory_fails_construction() {
    let adapter = FileStorageAdapter::new("/nonexistent/breaker-core-test");
    let err = CircuitBreaker::new(adapter, "billing-api").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StorageError>(),
        Some(StorageError::MissingStorageDirectory(_))
    ));
}
