// ABOUTME: Per-target purge events for callers that need every outcome.
// ABOUTME: Sent over an optional unbounded channel alongside the returned result.

use tokio::sync::mpsc::UnboundedSender;

/// What happened to one deletion target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeEvent {
    /// The registry removed the target.
    Deleted { target: String },
    /// The registry reported the target as already gone.
    AlreadyAbsent { target: String },
    /// Deletion failed; only the first such failure is returned by the purge.
    Failed { target: String, error: String },
    /// The task reached a worker after cancellation and never called the registry.
    Cancelled { target: String },
}

impl PurgeEvent {
    pub fn target(&self) -> &str {
        match self {
            PurgeEvent::Deleted { target }
            | PurgeEvent::AlreadyAbsent { target }
            | PurgeEvent::Failed { target, .. }
            | PurgeEvent::Cancelled { target } => target,
        }
    }

    /// Whether the target counts towards the deleted total.
    pub fn is_deleted(&self) -> bool {
        matches!(
            self,
            PurgeEvent::Deleted { .. } | PurgeEvent::AlreadyAbsent { .. }
        )
    }
}

/// Optional event sink; a closed receiver is ignored.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink(Option<UnboundedSender<PurgeEvent>>);

impl EventSink {
    pub(crate) fn new(sender: UnboundedSender<PurgeEvent>) -> Self {
        Self(Some(sender))
    }

    pub(crate) fn emit(&self, event: PurgeEvent) {
        if let Some(ref sender) = self.0 {
            let _ = sender.send(event);
        }
    }
}
