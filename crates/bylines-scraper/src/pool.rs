//! Bounded-concurrency dispatcher for per-item fetch tasks.
//!
//! A [`Dispatcher`] admits at most `capacity` tasks at a time. Each task
//! owns its semaphore permit, so the slot is released when the task ends
//! whether it returned `Ok`, returned `Err`, or panicked.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// Outcome counts returned by [`Dispatcher::drain`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub panicked: usize,
}

impl DrainSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.panicked
    }

    fn record<E: Display>(&mut self, pool: &str, outcome: Result<(String, Result<(), E>), JoinError>) {
        match outcome {
            Ok((_, Ok(()))) => self.succeeded += 1,
            Ok((label, Err(e))) => {
                self.failed += 1;
                tracing::warn!(pool, task = %label, error = %e, "task failed");
            }
            Err(e) => {
                self.panicked += 1;
                tracing::error!(pool, error = %e, "task panicked or was cancelled");
            }
        }
    }
}

/// Runs submitted futures with a fixed concurrency ceiling.
///
/// ```ignore
/// let mut pool = Dispatcher::new("images", 3);
/// for journalist in pending {
///     pool.submit(journalist.name.clone(), backfill_one(journalist)).await;
/// }
/// let summary = pool.drain().await;
/// ```
pub struct Dispatcher<E> {
    name: &'static str,
    capacity: usize,
    permits: Arc<Semaphore>,
    tasks: JoinSet<(String, Result<(), E>)>,
    summary: DrainSummary,
}

impl<E> Dispatcher<E>
where
    E: Display + Send + 'static,
{
    /// Creates a dispatcher admitting at most `capacity` tasks (minimum 1).
    #[must_use]
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name,
            capacity,
            permits: Arc::new(Semaphore::new(capacity)),
            tasks: JoinSet::new(),
            summary: DrainSummary::default(),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tasks admitted and not yet finished.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    /// Waits for a free slot, then spawns `task`.
    ///
    /// Finished tasks are reaped opportunistically so the join set does not
    /// grow with the number of submissions.
    pub async fn submit<F>(&mut self, label: impl Into<String>, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
    {
        let label = label.into();
        // The semaphore is never closed, so acquisition only fails if that
        // invariant is broken; drop the task rather than panic.
        let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
            tracing::error!(pool = self.name, task = %label, "dispatcher semaphore closed");
            return;
        };

        tracing::debug!(pool = self.name, task = %label, "task admitted");
        self.tasks.spawn(async move {
            let result = task.await;
            drop(permit);
            (label, result)
        });

        while let Some(outcome) = self.tasks.try_join_next() {
            self.summary.record(self.name, outcome);
        }
    }

    /// Waits for every admitted task and returns the outcome counts.
    pub async fn drain(mut self) -> DrainSummary {
        while let Some(outcome) = self.tasks.join_next().await {
            self.summary.record(self.name, outcome);
        }
        tracing::info!(
            pool = self.name,
            succeeded = self.summary.succeeded,
            failed = self.summary.failed,
            panicked = self.summary.panicked,
            "dispatcher drained"
        );
        self.summary
    }
}
