// ABOUTME: Fixed-size worker pool fed by a bounded task queue.
// ABOUTME: Submission waits while the queue is full, so no task is dropped.

use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use super::group::TaskGroup;

/// Queue capacity per worker used by [`Pool::new`].
pub const QUEUE_FACTOR: NonZeroUsize = NonZeroUsize::new(3).unwrap();

type Job = BoxFuture<'static, ()>;

/// Returned when the pool's workers are gone and nothing can be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("worker pool is closed")]
pub struct PoolClosed;

/// A fixed number of long-lived workers consuming a bounded queue.
///
/// At most `workers` tasks run at once; up to `queue_capacity` more wait in
/// the queue. Must be created inside a tokio runtime.
pub struct Pool {
    sender: mpsc::Sender<Job>,
    workers: Vec<JoinHandle<()>>,
    queue_capacity: usize,
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("workers", &self.workers.len())
            .field("queue_capacity", &self.queue_capacity)
            .finish()
    }
}

impl Pool {
    /// Create a pool with `workers` workers and a queue of `3 * workers`.
    pub fn new(workers: NonZeroUsize) -> Self {
        Self::with_queue_capacity(workers, workers.saturating_mul(QUEUE_FACTOR))
    }

    pub fn with_queue_capacity(size: NonZeroUsize, queue_capacity: NonZeroUsize) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>(queue_capacity.get());
        let receiver = Arc::new(Mutex::new(receiver));

        let workers: Vec<_> = (0..size.get())
            .map(|id| tokio::spawn(run_worker(id, Arc::clone(&receiver))))
            .collect();

        tracing::debug!(
            "Started worker pool with {} workers, queue capacity {}",
            size,
            queue_capacity
        );

        Self {
            sender,
            workers,
            queue_capacity: queue_capacity.get(),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Queue a task, waiting for room if the queue is full.
    pub async fn submit<F>(&self, task: F) -> Result<(), PoolClosed>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.sender
            .send(Box::pin(task))
            .await
            .map_err(|_| PoolClosed)
    }

    /// Start a group of tasks that can be awaited together.
    pub fn group<E>(&self) -> TaskGroup<'_, E>
    where
        E: Send + 'static,
    {
        TaskGroup::new(self)
    }

    /// Close the queue and wait for every worker to drain it and exit.
    pub async fn shutdown(self) {
        let Self {
            sender, workers, ..
        } = self;
        drop(sender);

        for worker in workers {
            if let Err(e) = worker.await {
                tracing::warn!("Worker exited abnormally: {}", e);
            }
        }
        tracing::debug!("Worker pool shut down");
    }
}

async fn run_worker(id: usize, receiver: Arc<Mutex<mpsc::Receiver<Job>>>) {
    loop {
        // Only the idle worker holding the lock waits on the queue
        let job = receiver.lock().await.recv().await;
        let Some(job) = job else {
            break;
        };

        if AssertUnwindSafe(job).catch_unwind().await.is_err() {
            tracing::error!("Task panicked on worker {}", id);
        }
    }
    tracing::trace!("Worker {} stopped", id);
}
