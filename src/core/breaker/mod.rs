//! The circuit breaker state machine. Transition rules:
//!
//! | Current  | Trigger                                   | Next     |
//! |----------|-------------------------------------------|----------|
//! | Closed   | `failure()`, count + 1 < threshold        | Closed   |
//! | Closed   | `failure()`, count + 1 >= threshold       | Open     |
//! | Open     | `is_not_available()`, timeout not expired | Open     |
//! | Open     | `is_not_available()`, timeout expired     | HalfOpen |
//! | HalfOpen | `failure()`                               | Open     |
//! | HalfOpen | `success()`                               | Closed   |
//! | any      | `success()`                               | Closed   |
//!
//! A single failure in HalfOpen reopens immediately, bypassing the
//! threshold: the trial probe is authoritative. Every transition-causing
//! call persists the new state through the bound storage adapter before
//! returning.

use crate::core::config::BreakerConfig;
use crate::storage::{BreakerSnapshot, StorageAdapter};
use crate::{logging, utils, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// States of the circuit breaker state machine.
/// Serialized under the conventional `CLOSED` / `OPEN` / `HALF_OPEN`
/// names so persisted records stay readable by other tooling.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    #[serde(rename = "CLOSED")]
    Closed,
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "HALF_OPEN")]
    HalfOpen,
}

impl Default for State {
    fn default() -> State {
        State::Closed
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Closed => write!(f, "CLOSED"),
            State::Open => write!(f, "OPEN"),
            State::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// `StateChangeListener` listens on the circuit breaker state change
/// event. Listeners are registered per breaker instance and fired after
/// the in-memory transition, before the new state is persisted.
pub trait StateChangeListener: Send + Sync {
    /// Triggered when the breaker transformed to Closed.
    fn on_transform_to_closed(&self, prev: State);

    /// Triggered when the breaker transformed to Open. The snapshot
    /// carries the state that is about to be persisted.
    fn on_transform_to_open(&self, prev: State, snapshot: &BreakerSnapshot);

    /// Triggered when the breaker transformed to HalfOpen.
    fn on_transform_to_half_open(&self, prev: State);
}

/// `CircuitBreaker` tracks consecutive failures of one protected
/// dependency, identified by a breaker key, and gates calls to it based
/// on the state machine above.
///
/// The breaker is a single-threaded-per-instance data structure with no
/// background tasks; all operations are synchronous. The storage adapter
/// is the durable owner of state across process lifetimes, so a breaker
/// constructed on the same key later (or in another process) picks up
/// where this one left off. Instances sharing a key coordinate only
/// through the backend; the last writer wins.
pub struct CircuitBreaker<S: StorageAdapter> {
    adapter: S,
    state: State,
    failure_count: u32,
    last_failure_time: Option<u64>,
    failure_threshold: u32,
    reset_timeout_secs: u64,
    listeners: Vec<Arc<dyn StateChangeListener>>,
}

impl<S: StorageAdapter> fmt::Debug for CircuitBreaker<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("state", &self.state)
            .field("failure_count", &self.failure_count)
            .field("last_failure_time", &self.last_failure_time)
            .field("failure_threshold", &self.failure_threshold)
            .field("reset_timeout_secs", &self.reset_timeout_secs)
            .finish()
    }
}

impl<S: StorageAdapter> CircuitBreaker<S> {
    /// Creates a breaker with the default configuration, binds the
    /// adapter to `key` and immediately loads the persisted state.
    /// Construction fails only if the adapter's medium is structurally
    /// unusable; an absent record hydrates the defaults.
    pub fn new(adapter: S, key: &str) -> Result<Self> {
        Self::with_config(adapter, key, BreakerConfig::default())
    }

    pub fn with_config(mut adapter: S, key: &str, config: BreakerConfig) -> Result<Self> {
        config.check()?;
        adapter.set_key(key);
        let snapshot = adapter.load_state()?;
        Ok(CircuitBreaker {
            adapter,
            state: snapshot.state,
            failure_count: snapshot.failure_count,
            last_failure_time: snapshot.last_failure_time,
            failure_threshold: config.failure_threshold,
            reset_timeout_secs: config.reset_timeout_secs,
            listeners: Vec::new(),
        })
    }

    pub fn register_state_change_listener(&mut self, listener: Arc<dyn StateChangeListener>) {
        self.listeners.push(listener);
    }

    /// `current_state` returns current state of the circuit breaker.
    #[inline]
    pub fn current_state(&self) -> State {
        self.state
    }

    #[inline]
    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    #[inline]
    pub fn last_failure_time(&self) -> Option<u64> {
        self.last_failure_time
    }

    /// Read access to the bound adapter, e.g. to inspect persisted state.
    #[inline]
    pub fn adapter(&self) -> &S {
        &self.adapter
    }

    /// Takes effect on the next `failure()` evaluation.
    /// Values are expected positive; the setter trusts the caller.
    pub fn set_failure_threshold(&mut self, threshold: u32) {
        self.failure_threshold = threshold;
    }

    /// Takes effect on the next `is_not_available()` evaluation.
    pub fn set_reset_timeout(&mut self, timeout_secs: u64) {
        self.reset_timeout_secs = timeout_secs;
    }

    /// The guard query. Returns `false` unless the breaker is Open. While
    /// Open, returns `true` until the reset timeout has elapsed; the
    /// first check past the timeout transforms the breaker to HalfOpen,
    /// persists it, and returns `false` so the caller can attempt a trial
    /// request.
    pub fn is_not_available(&mut self) -> Result<bool> {
        if self.state != State::Open {
            return Ok(false);
        }
        if self.is_reset_timeout_expired() {
            self.reset()?;
            return Ok(false);
        }
        Ok(true)
    }

    /// A successful call always fully heals the breaker: drives the
    /// machine to Closed, resets the failure count and persists.
    pub fn success(&mut self) -> Result<()> {
        self.set_closed();
        self.save()
    }

    /// Records a failed call. In HalfOpen a single failure reopens
    /// immediately; otherwise the failure count accumulates and the
    /// breaker opens once it reaches the threshold.
    pub fn failure(&mut self) -> Result<()> {
        if self.state == State::HalfOpen {
            self.set_open();
        } else {
            self.failure_count += 1;
            if self.failure_count >= self.failure_threshold {
                self.set_open();
            }
        }
        self.save()
    }

    fn is_reset_timeout_expired(&self) -> bool {
        match self.last_failure_time {
            Some(at) => utils::curr_time_secs().saturating_sub(at) >= self.reset_timeout_secs,
            // an Open record without a failure time is stale, probe right away
            None => true,
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.set_half_open();
        self.save()
    }

    fn set_open(&mut self) {
        let prev = self.state;
        self.state = State::Open;
        self.last_failure_time = Some(utils::curr_time_secs());
        if prev != State::Open {
            logging::warn!(
                "[CircuitBreaker] transformed to {} from {}, at {}",
                State::Open,
                prev,
                utils::format_time_secs(self.last_failure_time.unwrap_or_default())
            );
            let snapshot = self.snapshot();
            for listener in &self.listeners {
                listener.on_transform_to_open(prev, &snapshot);
            }
        }
    }

    fn set_half_open(&mut self) {
        let prev = self.state;
        self.state = State::HalfOpen;
        self.failure_count = 0;
        self.last_failure_time = None;
        if prev != State::HalfOpen {
            logging::info!(
                "[CircuitBreaker] transformed to {} from {}",
                State::HalfOpen,
                prev
            );
            for listener in &self.listeners {
                listener.on_transform_to_half_open(prev);
            }
        }
    }

    fn set_closed(&mut self) {
        let prev = self.state;
        self.state = State::Closed;
        self.failure_count = 0;
        if prev != State::Closed {
            logging::info!(
                "[CircuitBreaker] transformed to {} from {}",
                State::Closed,
                prev
            );
            for listener in &self.listeners {
                listener.on_transform_to_closed(prev);
            }
        }
    }

    fn snapshot(&self) -> BreakerSnapshot {
        BreakerSnapshot {
            state: self.state,
            failure_count: self.failure_count,
            last_failure_time: self.last_failure_time,
        }
    }

    fn save(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        self.adapter.save_state(&snapshot)
    }
}
