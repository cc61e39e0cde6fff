// ABOUTME: In-memory RegistryClient used by integration tests.
// ABOUTME: Records calls, injects failures and 404s, measures concurrency, honours cancellation.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use regsweep::registry::{ManifestAttributes, RegistryClient, RegistryError, TagAttributes};
use regsweep::types::{Digest, RepositoryName, TagName};
use tokio_util::sync::CancellationToken;

/// Registry double with configurable listings and per-item delete responses.
#[derive(Debug, Default)]
pub struct MockRegistry {
    manifests: Vec<ManifestAttributes>,
    tags: Vec<TagAttributes>,
    page_size: usize,
    missing: HashSet<String>,
    failures: HashMap<String, RegistryError>,
    repository_missing: bool,
    list_failure_after: Option<(usize, RegistryError)>,
    delete_delay: Duration,
    list_delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    abandoned: AtomicUsize,
    deleted: Mutex<Vec<String>>,
    list_calls: Mutex<Vec<Option<String>>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self {
            page_size: 100,
            ..Default::default()
        }
    }

    pub fn with_manifests(mut self, manifests: Vec<ManifestAttributes>) -> Self {
        self.manifests = manifests;
        self
    }

    pub fn with_digests(self, digests: &[&str]) -> Self {
        self.with_manifests(
            digests
                .iter()
                .map(|d| ManifestAttributes::with_digest(*d))
                .collect(),
        )
    }

    pub fn with_tags(mut self, names: &[&str]) -> Self {
        self.tags = names
            .iter()
            .map(|n| TagAttributes {
                name: n.to_string(),
                ..Default::default()
            })
            .collect();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Deleting `key` (tag name or digest) returns 404.
    pub fn with_missing(mut self, key: &str) -> Self {
        self.missing.insert(key.to_string());
        self
    }

    /// Deleting `key` (tag name or digest) returns `error`.
    pub fn with_failure(mut self, key: &str, error: RegistryError) -> Self {
        self.failures.insert(key.to_string(), error);
        self
    }

    /// Every call reports 404 for the repository.
    pub fn with_repository_missing(mut self) -> Self {
        self.repository_missing = true;
        self
    }

    /// List calls after the first `pages` succeed fail with `error`.
    pub fn with_list_failure_after(mut self, pages: usize, error: RegistryError) -> Self {
        self.list_failure_after = Some((pages, error));
        self
    }

    pub fn with_delete_delay(mut self, delay: Duration) -> Self {
        self.delete_delay = delay;
        self
    }

    /// Each manifest listing waits this long unless its token is cancelled first.
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = delay;
        self
    }

    /// Keys of every delete request received, sorted.
    pub fn delete_requests(&self) -> Vec<String> {
        let mut deleted = self.deleted.lock().clone();
        deleted.sort();
        deleted
    }

    pub fn delete_request_count(&self) -> usize {
        self.deleted.lock().len()
    }

    pub fn list_calls(&self) -> Vec<Option<String>> {
        self.list_calls.lock().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Deletes that gave up because their token was cancelled mid-request.
    pub fn abandoned_requests(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }

    async fn delete(&self, key: &str, cancel: &CancellationToken) -> Result<(), RegistryError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delete_delay.is_zero() {
            let cancelled = tokio::select! {
                _ = tokio::time::sleep(self.delete_delay) => false,
                _ = cancel.cancelled() => true,
            };
            if cancelled {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                self.abandoned.fetch_add(1, Ordering::SeqCst);
                return Err(RegistryError::Transport(format!("{} cancelled", key)));
            }
        }
        self.deleted.lock().push(key.to_string());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.repository_missing || self.missing.contains(key) {
            return Err(RegistryError::not_found(format!("{} not found", key)));
        }
        match self.failures.get(key) {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    /// Records after the one whose key equals `last`, up to one page.
    fn page<T: Clone>(
        &self,
        items: &[T],
        key: impl Fn(&T) -> Option<&str>,
        last: Option<&str>,
    ) -> Vec<T> {
        let start = match last {
            None => 0,
            Some(last) => items
                .iter()
                .position(|item| key(item) == Some(last))
                .map(|i| i + 1)
                .unwrap_or(items.len()),
        };
        items.iter().skip(start).take(self.page_size).cloned().collect()
    }
}

#[async_trait]
impl RegistryClient for MockRegistry {
    async fn delete_tag(
        &self,
        _repository: &RepositoryName,
        tag: &TagName,
        cancel: &CancellationToken,
    ) -> Result<(), RegistryError> {
        self.delete(tag.as_str(), cancel).await
    }

    async fn delete_manifest(
        &self,
        _repository: &RepositoryName,
        digest: &Digest,
        cancel: &CancellationToken,
    ) -> Result<(), RegistryError> {
        self.delete(digest.as_str(), cancel).await
    }

    async fn list_manifests(
        &self,
        _repository: &RepositoryName,
        _filter: Option<&str>,
        last: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ManifestAttributes>, RegistryError> {
        let calls = {
            let mut calls = self.list_calls.lock();
            calls.push(last.map(str::to_string));
            calls.len()
        };

        if !self.list_delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(self.list_delay) => {}
                _ = cancel.cancelled() => {
                    return Err(RegistryError::Transport("listing cancelled".to_string()));
                }
            }
        }

        if self.repository_missing {
            return Err(RegistryError::not_found("repository not found"));
        }
        if let Some((pages, ref error)) = self.list_failure_after
            && calls > pages
        {
            return Err(error.clone());
        }

        Ok(self.page(&self.manifests, |m| m.digest.as_deref(), last))
    }

    async fn list_tags(
        &self,
        _repository: &RepositoryName,
        last: Option<&str>,
    ) -> Result<Vec<TagAttributes>, RegistryError> {
        if self.repository_missing {
            return Err(RegistryError::not_found("repository not found"));
        }
        Ok(self.page(&self.tags, |t| Some(t.name.as_str()), last))
    }
}
