// ABOUTME: Async trait implemented by registry HTTP clients.
// ABOUTME: Delete and list operations consumed by the purge orchestrator.

use super::error::RegistryError;
use super::records::{ManifestAttributes, TagAttributes};
use crate::types::{Digest, RepositoryName, TagName};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Registry operations needed to purge a repository.
///
/// Implementations must tolerate concurrent calls and deletions arriving in
/// any order. A deletion of something already gone should be reported as a
/// 404 [`RegistryError::Status`].
///
/// `cancel` fires when the purge is cancelled or its deadline passes; an
/// implementation should abandon the request and return an error promptly.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Delete a tag. The manifest it points to is left in place.
    async fn delete_tag(
        &self,
        repository: &RepositoryName,
        tag: &TagName,
        cancel: &CancellationToken,
    ) -> Result<(), RegistryError>;

    /// Delete a manifest by digest.
    async fn delete_manifest(
        &self,
        repository: &RepositoryName,
        digest: &Digest,
        cancel: &CancellationToken,
    ) -> Result<(), RegistryError>;

    /// List one page of manifests, starting after the `last` digest.
    ///
    /// An empty page marks the end of the listing. A 404 means the
    /// repository does not exist.
    async fn list_manifests(
        &self,
        repository: &RepositoryName,
        filter: Option<&str>,
        last: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ManifestAttributes>, RegistryError>;

    /// List one page of tags, starting after the `last` tag name.
    async fn list_tags(
        &self,
        repository: &RepositoryName,
        last: Option<&str>,
    ) -> Result<Vec<TagAttributes>, RegistryError>;

    /// Whether a listed manifest may be removed on its own.
    ///
    /// Defaults to the manifest's changeable attributes.
    fn is_deletable(&self, manifest: &ManifestAttributes) -> bool {
        manifest.is_deletable()
    }
}
