//! Bounded migration worker pool
//!
//! Operations run on the runtime's blocking pool, at most `capacity` at a
//! time. A submission that finds no free slot is dropped and reported; there
//! is no queue behind the pool.
//!
//! Slots only gate admission. Waiting for the pool to drain goes through a
//! separate in-flight counter, so a waiter never holds a slot.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{watch, OwnedSemaphorePermit, Semaphore, TryAcquireError};

use crate::diagnostics::{Severity, SharedSink};

use super::operation::MigrationOperation;

/// Reported when an operation cannot be scheduled
pub const ERROR_REJECTED: &str = "Unable to schedule migration on the executor";

/// Runs migration operations in the background
pub struct MigrationExecutor {
    handle: Handle,
    slots: Arc<Semaphore>,
    capacity: usize,
    in_flight: Arc<watch::Sender<usize>>,
    diagnostics: SharedSink,
}

/// A slot taken by one running operation
///
/// Dropping it frees the slot and decrements the in-flight count, also when
/// the operation panics.
struct Running {
    _slot: OwnedSemaphorePermit,
    in_flight: Arc<watch::Sender<usize>>,
}

impl Drop for Running {
    fn drop(&mut self) {
        self.in_flight.send_modify(|count| *count = count.saturating_sub(1));
    }
}

impl MigrationExecutor {
    /// Create an executor running at most `capacity` operations at once
    pub fn new(handle: Handle, capacity: usize, diagnostics: SharedSink) -> Self {
        let capacity = capacity.min(Semaphore::MAX_PERMITS);
        let (in_flight, _) = watch::channel(0);
        Self {
            handle,
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
            in_flight: Arc::new(in_flight),
            diagnostics,
        }
    }

    /// Maximum number of concurrently running operations
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of operations currently running
    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Submit `operation` for fire-and-forget execution
    ///
    /// Never blocks. If the pool is saturated or shut down the operation is
    /// dropped and [`ERROR_REJECTED`] is reported.
    pub fn schedule(&self, operation: MigrationOperation) {
        let running = match self.reserve() {
            Ok(running) => running,
            Err(e) => {
                let reason = match e {
                    TryAcquireError::NoPermits => "pool saturated",
                    TryAcquireError::Closed => "pool shut down",
                };
                self.diagnostics.record(
                    Severity::Error,
                    &format!("{} ({}): {}", ERROR_REJECTED, reason, operation),
                    Some(&e),
                );
                return;
            }
        };

        let diagnostics = self.diagnostics.clone();
        self.handle.spawn_blocking(move || {
            let _running = running;
            let report = operation.run(diagnostics.as_ref());
            diagnostics.record(
                Severity::Debug,
                &format!("Migration {} done: {}", operation, report),
                None,
            );
        });
    }

    fn reserve(&self) -> Result<Running, TryAcquireError> {
        let slot = self.slots.clone().try_acquire_owned()?;
        self.in_flight.send_modify(|count| *count += 1);
        Ok(Running {
            _slot: slot,
            in_flight: self.in_flight.clone(),
        })
    }

    /// Stop accepting operations; running ones finish normally
    pub fn shutdown(&self) {
        self.slots.close();
    }

    /// Wait until no operation is running
    ///
    /// Also waits for operations that were running when [`shutdown`](Self::shutdown)
    /// was called.
    pub async fn wait_idle(&self) {
        let mut count = self.in_flight.subscribe();
        // The sender lives in `self`, so the channel cannot close here
        let _ = count.wait_for(|running| *running == 0).await;
    }
}
