// ABOUTME: Task groups on a worker pool with a wait-group join.
// ABOUTME: Waiting consumes the group and yields the first task error.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::pool::{Pool, PoolClosed};

/// A task in a group panicked instead of returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("task panicked")]
pub struct TaskPanicked;

/// Counts outstanding tasks and wakes waiters when the count reaches zero.
#[derive(Debug, Clone, Default)]
struct WaitGroup {
    inner: Arc<WaitGroupInner>,
}

#[derive(Debug, Default)]
struct WaitGroupInner {
    pending: AtomicUsize,
    notify: Notify,
}

/// Marks one outstanding task; dropping it marks the task done.
struct WaitGuard {
    inner: Arc<WaitGroupInner>,
}

impl WaitGroup {
    fn add(&self) -> WaitGuard {
        self.inner.pending.fetch_add(1, Ordering::AcqRel);
        WaitGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent final `done` is not missed
            notified.as_mut().enable();

            if self.inner.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for WaitGuard {
    fn drop(&mut self) {
        if self.inner.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.notify.notify_waiters();
        }
    }
}

/// A set of tasks submitted to one [`Pool`] and awaited together.
///
/// Tasks may start and finish in any order. [`TaskGroup::wait`] takes the
/// group by value, so nothing can be added once waiting has begun.
pub struct TaskGroup<'p, E> {
    pool: &'p Pool,
    pending: WaitGroup,
    first_error: Arc<Mutex<Option<E>>>,
}

impl<E> std::fmt::Debug for TaskGroup<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGroup")
            .field("pending", &self.pending.inner.pending.load(Ordering::Relaxed))
            .finish()
    }
}

impl<'p, E> TaskGroup<'p, E>
where
    E: Send + 'static,
{
    pub(super) fn new(pool: &'p Pool) -> Self {
        Self {
            pool,
            pending: WaitGroup::default(),
            first_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Queue a task on the pool as part of this group.
    ///
    /// Waits while the pool's queue is full.
    pub async fn submit<F>(&self, task: F) -> Result<(), PoolClosed>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: From<TaskPanicked>,
    {
        let guard = self.pending.add();
        let first_error = Arc::clone(&self.first_error);

        self.pool
            .submit(async move {
                let result = match AssertUnwindSafe(task).catch_unwind().await {
                    Ok(result) => result,
                    Err(_) => Err(E::from(TaskPanicked)),
                };

                if let Err(e) = result {
                    let mut slot = first_error.lock();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                }
                drop(guard);
            })
            .await
    }

    /// Wait for every submitted task to finish.
    ///
    /// Returns the first error recorded, if any. Later errors are discarded.
    pub async fn wait(self) -> Result<(), E> {
        self.pending.wait().await;
        let first = self.first_error.lock().take();
        match first {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
