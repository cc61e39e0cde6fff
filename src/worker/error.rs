// ABOUTME: Purge error types with SNAFU context selectors.
// ABOUTME: Wraps registry failures with the target or repository involved.

use snafu::Snafu;

use super::group::TaskPanicked;
use super::pool::PoolClosed;
use crate::registry::RegistryError;

/// Errors surfaced by purge operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PurgeError {
    #[snafu(display("failed to delete {target}: {source}"))]
    Delete {
        target: String,
        source: RegistryError,
    },

    #[snafu(display("failed to list manifests in {repository}: {source}"))]
    List {
        repository: String,
        source: RegistryError,
    },

    #[snafu(display("manifest listing for {repository} returned a page without digests"))]
    MalformedListing { repository: String },

    #[snafu(display("manifest listing for {repository} did not advance past {cursor}"))]
    ListingStalled { repository: String, cursor: String },

    #[snafu(display("purge cancelled"))]
    Cancelled,

    #[snafu(display("worker pool is closed"))]
    PoolClosed,

    #[snafu(display("purge task panicked"))]
    TaskPanicked,
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeErrorKind {
    /// A delete call failed with something other than 404.
    DeleteFailed,
    /// A manifest listing call failed or could not be continued.
    ListFailed,
    /// The purge was cancelled or hit its deadline.
    Cancelled,
    /// The worker pool could not accept or run a task.
    Executor,
}

impl PurgeError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> PurgeErrorKind {
        match self {
            PurgeError::Delete { .. } => PurgeErrorKind::DeleteFailed,
            PurgeError::List { .. }
            | PurgeError::MalformedListing { .. }
            | PurgeError::ListingStalled { .. } => PurgeErrorKind::ListFailed,
            PurgeError::Cancelled => PurgeErrorKind::Cancelled,
            PurgeError::PoolClosed | PurgeError::TaskPanicked => PurgeErrorKind::Executor,
        }
    }

    /// The underlying registry error, if one caused this failure.
    pub fn registry_error(&self) -> Option<&RegistryError> {
        match self {
            PurgeError::Delete { source, .. } | PurgeError::List { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<TaskPanicked> for PurgeError {
    fn from(_: TaskPanicked) -> Self {
        PurgeError::TaskPanicked
    }
}

impl From<PoolClosed> for PurgeError {
    fn from(_: PoolClosed) -> Self {
        PurgeError::PoolClosed
    }
}
