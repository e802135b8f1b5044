//! Failure-injection helpers for resilience tests.
//!
//! [`FlakyBackend`] wraps a real backend and fails a configured number of
//! upcoming statements with a transient error before delegating again. The
//! paired [`FailureTrigger`] stays with the test after the backend moves
//! into an engine, so failures can be armed mid-scenario.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::backend::{Backend, BackendError, Dialect, ErrorKind, QueryResult};

/// Shared handle that arms failure injection from outside the engine.
#[derive(Clone, Debug, Default)]
pub struct FailureTrigger(Arc<AtomicU32>);

impl FailureTrigger {
    /// Fail the next `n` statements with a transient error (0 disarms).
    pub fn fail_next(&self, n: u32) {
        self.0.store(n, Ordering::SeqCst);
    }

    /// Consume one armed failure, if any.
    fn take(&self) -> bool {
        self.0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1))
            .is_ok()
    }
}

/// A backend wrapper that injects transient failures on demand.
pub struct FlakyBackend<B> {
    inner: B,
    trigger: FailureTrigger,
}

impl<B: Backend> FlakyBackend<B> {
    /// Wrap `inner`; the returned trigger arms failures later.
    pub fn new(inner: B) -> (Self, FailureTrigger) {
        let trigger = FailureTrigger::default();
        (
            Self {
                inner,
                trigger: trigger.clone(),
            },
            trigger,
        )
    }
}

impl<B: Backend> Backend for FlakyBackend<B> {
    fn dialect(&self) -> Dialect {
        self.inner.dialect()
    }

    fn execute(&mut self, sql: &str) -> Result<QueryResult, BackendError> {
        if self.trigger.take() {
            return Err(BackendError::new(
                ErrorKind::Transient,
                2006,
                "server has gone away",
            ));
        }
        self.inner.execute(sql)
    }

    fn lock_write(&mut self, table: &str) -> Result<(), BackendError> {
        self.inner.lock_write(table)
    }

    fn unlock(&mut self) -> Result<(), BackendError> {
        self.inner.unlock()
    }
}
