//! # breaker-core
//!
//! A circuit breaker that protects a remote-call-making client from
//! repeatedly invoking a failing dependency, and that persists its state
//! through a pluggable storage adapter so the breaker survives restarts of
//! stateless workers.
//!
//! Circuit Breaker State Machine:
//!
//!                            threshold reached
//!
//!             +-----------------------------------------------------------------------+
//!             |                                                                       |
//!             |                                                                       v
//!     +----------------+                   +----------------+   Reset timeout  +----------------+
//!     |                |                   |                |<-----------------|                |
//!     |                |   Probe succeed   |                |     expired      |                |
//!     |     Closed     |<------------------|    HalfOpen    |                  |      Open      |
//!     |                |                   |                |   Probe failed   |                |
//!     |                |                   |                +----------------->|                |
//!     +----------------+                   +----------------+                  +----------------+
//!
//! Generally, there are several steps when using the breaker:
//! 1. Pick a storage adapter (`storage::FileStorageAdapter` for durable
//!    state, `storage::MemoryStorageAdapter` for in-process use) and point
//!    it at its medium.
//! 2. Construct a `CircuitBreaker` bound to the key of the protected
//!    dependency. The persisted state for that key is loaded immediately.
//! 3. Before each unit of work, consult `is_not_available()`; afterwards,
//!    report exactly one of `success()` / `failure()`. Every transition is
//!    written back through the adapter before the call returns.
//!
//! ```rust
//! use breaker_core::{core::CircuitBreaker, storage::FileStorageAdapter};
//!
//! let adapter = FileStorageAdapter::new("/var/lib/my-worker");
//! let mut breaker = CircuitBreaker::new(adapter, "billing-api")?;
//! if !breaker.is_not_available()? {
//!     match call_billing_api() {
//!         Ok(resp) => breaker.success()?,
//!         Err(err) => breaker.failure()?,
//!     }
//! }
//! ```
//!
//! The `guard` module provides a ready-made call guard in the manner of an
//! HTTP-client middleware: it aborts guarded calls with a distinguished
//! error while the breaker is open and classifies completed outcomes into
//! success or failure reports.

/// The circuit breaker state machine and its configuration.
pub mod core;
/// Call guard wrapping a breaker around arbitrary units of work.
pub mod guard;
/// Adapters for different logging crates.
pub mod logging;
/// Storage adapters persisting breaker state across process lifetimes.
pub mod storage;
// Utility functions: key sanitizing, clock reads.
pub mod utils;

// re-export precludes
pub use crate::core::*;
pub use crate::guard::*;
pub use crate::storage::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
