// ABOUTME: Repository-scoped purger that deletes tags and manifests concurrently.
// ABOUTME: Counts 404s as deletions, sweeps untagged manifests, returns the first failure.

use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use hyper::StatusCode;
use snafu::IntoError;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::{
    DeleteSnafu, ListSnafu, ListingStalledSnafu, MalformedListingSnafu, PurgeError,
};
use super::event::{EventSink, PurgeEvent};
use super::group::TaskGroup;
use super::pool::Pool;
use crate::registry::RegistryClient;
use crate::types::{Digest, RepositoryName, TagName};

/// A single thing to delete within the purger's repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeletionTarget {
    Tag(TagName),
    Manifest(Digest),
}

impl fmt::Display for DeletionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionTarget::Tag(tag) => write!(f, ":{}", tag),
            DeletionTarget::Manifest(digest) => write!(f, "@{}", digest),
        }
    }
}

/// Result of one purge call.
///
/// `deleted` is authoritative even when `error` is set: targets are deleted
/// independently and nothing is rolled back.
#[derive(Debug, Default)]
pub struct PurgeOutcome {
    /// Targets removed, or already absent when the delete was attempted.
    pub deleted: usize,
    /// First failure observed, other than a 404.
    pub error: Option<PurgeError>,
}

impl PurgeOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Cancellation token plus an optional deadline.
#[derive(Debug, Clone, Default)]
struct CancelSignal {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CancelSignal {
    /// Token for one purge call, cancelled with the purger's token or at the deadline.
    fn scope(&self) -> CancelScope {
        let token = self.token.child_token();
        let timer = match self.deadline {
            Some(deadline) if deadline <= Instant::now() => {
                token.cancel();
                None
            }
            Some(deadline) => {
                let token = token.clone();
                Some(tokio::spawn(async move {
                    tokio::select! {
                        _ = tokio::time::sleep_until(deadline) => token.cancel(),
                        _ = token.cancelled() => {}
                    }
                }))
            }
            None => None,
        };
        CancelScope { token, timer }
    }
}

/// Cancellation for one purge call; dropping it stops the deadline timer.
struct CancelScope {
    token: CancellationToken,
    timer: Option<JoinHandle<()>>,
}

impl Drop for CancelScope {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// State shared by every delete task of one purge call.
struct DeleteContext<C> {
    client: Arc<C>,
    login_url: String,
    repository: RepositoryName,
    cancel: CancellationToken,
    events: EventSink,
    deleted: AtomicUsize,
}

impl<C> DeleteContext<C> {
    fn label(&self, target: &DeletionTarget) -> String {
        format!("{}/{}{}", self.login_url, self.repository, target)
    }
}

/// Deletes tags and manifests of one repository on a bounded worker pool.
///
/// A purger owns its pool for the lifetime of the purge session; create one
/// per repository. Must be created inside a tokio runtime.
pub struct Purger<C> {
    pool: Pool,
    client: Arc<C>,
    login_url: String,
    repository: RepositoryName,
    signal: CancelSignal,
    events: EventSink,
}

impl<C> fmt::Debug for Purger<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Purger")
            .field("pool", &self.pool)
            .field("login_url", &self.login_url)
            .field("repository", &self.repository)
            .finish()
    }
}

impl<C> Purger<C>
where
    C: RegistryClient + 'static,
{
    /// Create a purger running up to `parallelism` deletions at once.
    pub fn new(
        parallelism: NonZeroUsize,
        client: Arc<C>,
        login_url: impl Into<String>,
        repository: RepositoryName,
    ) -> Self {
        Self::with_pool(Pool::new(parallelism), client, login_url, repository)
    }

    pub fn with_pool(
        pool: Pool,
        client: Arc<C>,
        login_url: impl Into<String>,
        repository: RepositoryName,
    ) -> Self {
        Self {
            pool,
            client,
            login_url: login_url.into(),
            repository,
            signal: CancelSignal::default(),
            events: EventSink::default(),
        }
    }

    /// Stop dispatching deletions once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.signal.token = token;
        self
    }

    /// Cancel all purging `timeout` from now.
    pub fn with_deadline(mut self, timeout: Duration) -> Self {
        self.signal.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Report every finished target on `sender`.
    pub fn with_events(mut self, sender: UnboundedSender<PurgeEvent>) -> Self {
        self.events = EventSink::new(sender);
        self
    }

    pub fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.signal.token.clone()
    }

    /// Delete tags. A tag that is already gone counts as deleted.
    pub async fn purge_tags(&self, tags: &[TagName]) -> PurgeOutcome {
        self.purge_targets(tags.iter().cloned().map(DeletionTarget::Tag))
            .await
    }

    /// Delete manifests by digest. A manifest that is already gone counts as deleted.
    pub async fn purge_manifests(&self, digests: &[Digest]) -> PurgeOutcome {
        self.purge_targets(digests.iter().cloned().map(DeletionTarget::Manifest))
            .await
    }

    /// Delete every deletable manifest in the repository whose digest is not in `skip`.
    ///
    /// Pages through the listing and dispatches deletions as each page
    /// arrives. A repository that does not exist has nothing to purge and is
    /// not an error. A page that cannot be continued from ends the sweep
    /// with a listing error.
    pub async fn purge_untagged_manifests(&self, skip: &HashSet<Digest>) -> PurgeOutcome {
        let scope = self.signal.scope();
        let ctx = self.context(&scope);
        let group = self.pool.group::<PurgeError>();
        let mut cursor: Option<String> = None;
        let mut stopped = None;

        'pages: loop {
            if ctx.cancel.is_cancelled() {
                stopped = Some(PurgeError::Cancelled);
                break;
            }

            let page = match self
                .client
                .list_manifests(&self.repository, None, cursor.as_deref(), &ctx.cancel)
                .await
            {
                Ok(page) => page,
                Err(e) if ctx.cancel.is_cancelled() => {
                    tracing::debug!(
                        "Listing {} abandoned after cancellation: {}",
                        self.repository,
                        e
                    );
                    stopped = Some(PurgeError::Cancelled);
                    break;
                }
                Err(e) if e.is_not_found() => {
                    tracing::info!("Repository {} not found, nothing to purge", self.repository);
                    break;
                }
                Err(e) => {
                    tracing::warn!("Failed to list manifests in {}: {}", self.repository, e);
                    stopped = Some(
                        ListSnafu {
                            repository: self.repository.as_str(),
                        }
                        .into_error(e),
                    );
                    break;
                }
            };

            tracing::debug!(
                "Listed {} manifests in {} after {:?}",
                page.len(),
                self.repository,
                cursor
            );

            if page.is_empty() {
                break;
            }
            let next_cursor = page.iter().rev().find_map(|m| m.digest.clone());

            for manifest in &page {
                let Some(raw) = manifest.digest.as_deref() else {
                    tracing::warn!("Skipping manifest without digest in {}", self.repository);
                    continue;
                };
                if !self.client.is_deletable(manifest) {
                    tracing::debug!("Skipping locked manifest {}", raw);
                    continue;
                }
                if skip.contains(raw) {
                    continue;
                }
                let digest = match Digest::parse(raw) {
                    Ok(digest) => digest,
                    Err(e) => {
                        tracing::warn!("Skipping manifest with invalid digest {:?}: {}", raw, e);
                        continue;
                    }
                };

                if let Err(e) = self
                    .dispatch(&group, &ctx, DeletionTarget::Manifest(digest))
                    .await
                {
                    stopped = Some(e);
                    break 'pages;
                }
            }

            match next_cursor {
                Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
                Some(next) => {
                    tracing::warn!(
                        "Manifest listing for {} did not advance past {}, stopping",
                        self.repository,
                        next
                    );
                    stopped = Some(
                        ListingStalledSnafu {
                            repository: self.repository.as_str(),
                            cursor: next,
                        }
                        .build(),
                    );
                    break;
                }
                None => {
                    tracing::warn!(
                        "Manifest page in {} has no digests to continue from, stopping",
                        self.repository
                    );
                    stopped = Some(
                        MalformedListingSnafu {
                            repository: self.repository.as_str(),
                        }
                        .build(),
                    );
                    break;
                }
            }
        }

        Self::finish(group, ctx, stopped).await
    }

    /// Close the pool and wait for its workers to exit.
    pub async fn shutdown(self) {
        self.pool.shutdown().await;
    }

    fn context(&self, scope: &CancelScope) -> Arc<DeleteContext<C>> {
        Arc::new(DeleteContext {
            client: Arc::clone(&self.client),
            login_url: self.login_url.clone(),
            repository: self.repository.clone(),
            cancel: scope.token.clone(),
            events: self.events.clone(),
            deleted: AtomicUsize::new(0),
        })
    }

    async fn purge_targets<I>(&self, targets: I) -> PurgeOutcome
    where
        I: Iterator<Item = DeletionTarget>,
    {
        let scope = self.signal.scope();
        let ctx = self.context(&scope);
        let group = self.pool.group::<PurgeError>();
        let mut stopped = None;

        for target in targets {
            if let Err(e) = self.dispatch(&group, &ctx, target).await {
                stopped = Some(e);
                break;
            }
        }

        Self::finish(group, ctx, stopped).await
    }

    /// Queue one deletion, giving up if cancellation fires while the queue is full.
    async fn dispatch(
        &self,
        group: &TaskGroup<'_, PurgeError>,
        ctx: &Arc<DeleteContext<C>>,
        target: DeletionTarget,
    ) -> Result<(), PurgeError> {
        if ctx.cancel.is_cancelled() {
            return Err(PurgeError::Cancelled);
        }

        let task = delete_target(Arc::clone(ctx), target);
        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => Err(PurgeError::Cancelled),
            submitted = group.submit(task) => submitted.map_err(PurgeError::from),
        }
    }

    async fn finish(
        group: TaskGroup<'_, PurgeError>,
        ctx: Arc<DeleteContext<C>>,
        stopped: Option<PurgeError>,
    ) -> PurgeOutcome {
        let task_error = group.wait().await.err();
        PurgeOutcome {
            deleted: ctx.deleted.load(Ordering::Acquire),
            error: task_error.or(stopped),
        }
    }
}

/// Delete one target and classify the result. 404 counts as deleted.
async fn delete_target<C>(
    ctx: Arc<DeleteContext<C>>,
    target: DeletionTarget,
) -> Result<(), PurgeError>
where
    C: RegistryClient,
{
    let label = ctx.label(&target);

    if ctx.cancel.is_cancelled() {
        tracing::debug!("Skipped {} after cancellation", label);
        ctx.events.emit(PurgeEvent::Cancelled { target: label });
        return Err(PurgeError::Cancelled);
    }

    let result = match &target {
        DeletionTarget::Tag(tag) => {
            ctx.client
                .delete_tag(&ctx.repository, tag, &ctx.cancel)
                .await
        }
        DeletionTarget::Manifest(digest) => {
            ctx.client
                .delete_manifest(&ctx.repository, digest, &ctx.cancel)
                .await
        }
    };

    match result {
        Ok(()) => {
            ctx.deleted.fetch_add(1, Ordering::AcqRel);
            tracing::info!("Deleted {}", label);
            ctx.events.emit(PurgeEvent::Deleted { target: label });
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            ctx.deleted.fetch_add(1, Ordering::AcqRel);
            tracing::info!(
                "Skipped {}, HTTP status: {}",
                label,
                StatusCode::NOT_FOUND.as_u16()
            );
            ctx.events.emit(PurgeEvent::AlreadyAbsent { target: label });
            Ok(())
        }
        Err(e) if ctx.cancel.is_cancelled() => {
            tracing::debug!("Abandoned {} after cancellation: {}", label, e);
            ctx.events.emit(PurgeEvent::Cancelled { target: label });
            Err(PurgeError::Cancelled)
        }
        Err(e) => {
            tracing::warn!("Failed to delete {}, error: {}", label, e);
            ctx.events.emit(PurgeEvent::Failed {
                target: label.clone(),
                error: e.to_string(),
            });
            Err(DeleteSnafu { target: label }.into_error(e))
        }
    }
}
