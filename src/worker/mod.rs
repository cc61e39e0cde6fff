// ABOUTME: Bounded worker pool and the purge orchestrator built on it.
// ABOUTME: Exports Pool, TaskGroup, Purger, and purge results, errors, and events.

mod error;
mod event;
mod group;
mod pool;
mod purger;

pub use error::{PurgeError, PurgeErrorKind};
pub use event::PurgeEvent;
pub use group::{TaskGroup, TaskPanicked};
pub use pool::{Pool, PoolClosed, QUEUE_FACTOR};
pub use purger::{DeletionTarget, PurgeOutcome, Purger};
