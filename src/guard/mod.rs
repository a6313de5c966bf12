//! `CallGuard` wraps a circuit breaker around arbitrary units of work, in
//! the manner of an HTTP-client middleware: it consults the breaker before
//! the work is attempted, surfaces a distinguished error while the breaker
//! is open, and classifies completed outcomes into exactly one
//! `success()` / `failure()` report.
//!
//! Outcome classification follows the transport's view of the world:
//! a connectivity-level error always counts as a failure; a result code
//! counts as a failure only when the caller listed it; every other error
//! kind is passed through unchanged without touching breaker state.

use crate::core::breaker::CircuitBreaker;
use crate::storage::StorageAdapter;
use crate::Result;
use std::fmt;

/// Raised by the guard instead of attempting the dependency while the
/// breaker is open. A control-flow signal, not a dependency failure;
/// recover it with `err.downcast_ref::<ServiceUnreachableError>()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceUnreachableError;

impl fmt::Display for ServiceUnreachableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service is unreachable, circuit breaker is open")
    }
}

impl std::error::Error for ServiceUnreachableError {}

/// Marks a dependency error as connectivity-level. Transports map their
/// connect/timeout errors into this kind before handing them to the
/// guard, so that `call` can count them against the breaker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectivityError {
    message: String,
}

impl ConnectivityError {
    pub fn new<M: Into<String>>(message: M) -> Self {
        ConnectivityError {
            message: message.into(),
        }
    }
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connection to dependency failed: {}", self.message)
    }
}

impl std::error::Error for ConnectivityError {}

/// The transport-classified outcome of one completed unit of work.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The dependency answered with a protocol-level result code.
    Response(u16),
    /// The dependency could not be reached at all.
    ConnectivityError,
    /// Any other error kind; leaves breaker state untouched.
    OtherError,
}

/// Implemented by transport responses so the guard can read a result code
/// off a successful call.
pub trait GuardedResponse {
    fn status_code(&self) -> u16;
}

/// `CallGuard` owns a breaker and the caller-supplied list of failure
/// result codes. When the list is empty, no result code ever counts as a
/// failure.
pub struct CallGuard<S: StorageAdapter> {
    breaker: CircuitBreaker<S>,
    failure_status_codes: Vec<u16>,
}

impl<S: StorageAdapter> CallGuard<S> {
    pub fn new(breaker: CircuitBreaker<S>) -> Self {
        CallGuard {
            breaker,
            failure_status_codes: Vec::new(),
        }
    }

    pub fn set_failure_status_codes(&mut self, codes: Vec<u16>) {
        self.failure_status_codes = codes;
    }

    pub fn breaker(&self) -> &CircuitBreaker<S> {
        &self.breaker
    }

    pub fn breaker_mut(&mut self) -> &mut CircuitBreaker<S> {
        &mut self.breaker
    }

    /// Aborts with `ServiceUnreachableError` while the breaker is open;
    /// otherwise the call may proceed.
    pub fn check(&mut self) -> Result<()> {
        if self.breaker.is_not_available()? {
            return Err(ServiceUnreachableError.into());
        }
        Ok(())
    }

    /// Reports one classified outcome to the breaker.
    pub fn record(&mut self, outcome: &CallOutcome) -> Result<()> {
        match outcome {
            CallOutcome::Response(code) if self.is_failure_code(*code) => self.breaker.failure(),
            CallOutcome::Response(_) => self.breaker.success(),
            CallOutcome::ConnectivityError => self.breaker.failure(),
            CallOutcome::OtherError => Ok(()),
        }
    }

    /// `check` + invoke + classify in one step. The unit of work runs
    /// only when the breaker permits it; its result code is classified
    /// against the failure list, a `ConnectivityError` in the error chain
    /// is counted as a failure, and the original error is re-raised
    /// unchanged either way.
    pub fn call<T, F>(&mut self, f: F) -> Result<T>
    where
        T: GuardedResponse,
        F: FnOnce() -> Result<T>,
    {
        self.check()?;
        match f() {
            Ok(response) => {
                self.record(&CallOutcome::Response(response.status_code()))?;
                Ok(response)
            }
            Err(err) => {
                if err.downcast_ref::<ConnectivityError>().is_some() {
                    self.record(&CallOutcome::ConnectivityError)?;
                }
                Err(err)
            }
        }
    }

    fn is_failure_code(&self, code: u16) -> bool {
        self.failure_status_codes.contains(&code)
    }
}
