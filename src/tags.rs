// ABOUTME: Tag listing and one-shot tag deletion for a repository.
// ABOUTME: Pages through tag listings and reports partial deletion counts.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::PurgeConfig;
use crate::error::{Error, Result};
use crate::registry::{RegistryClient, RegistryError, TagAttributes};
use crate::types::{RepositoryName, TagName};

/// List every tag in a repository, following `last` cursors until an empty page.
pub async fn list_tags<C>(
    client: &C,
    repository: &RepositoryName,
) -> std::result::Result<Vec<TagAttributes>, RegistryError>
where
    C: RegistryClient + ?Sized,
{
    let mut tags = Vec::new();
    let mut last: Option<String> = None;

    loop {
        let page = client.list_tags(repository, last.as_deref()).await?;
        let Some(tail) = page.last() else {
            break;
        };

        if last.as_deref() == Some(tail.name.as_str()) {
            tracing::warn!("Tag listing for {} did not advance, stopping", repository);
            break;
        }
        last = Some(tail.name.clone());
        tags.extend(page);
    }

    tracing::debug!("Listed {} tags in {}", tags.len(), repository);
    Ok(tags)
}

/// Delete the named tags from a repository.
///
/// Duplicate names are deleted once. Returns the number deleted (404s
/// included); on failure the count is carried in [`Error::Purge`].
pub async fn delete_tags<C>(
    client: Arc<C>,
    config: &PurgeConfig,
    repository: &RepositoryName,
    names: &[String],
) -> Result<usize>
where
    C: RegistryClient + 'static,
{
    let mut seen = HashSet::new();
    let mut tags = Vec::with_capacity(names.len());
    for name in names {
        let tag = TagName::new(name)
            .map_err(|e| Error::InvalidConfig(format!("tag '{}': {}", name, e)))?;
        if seen.insert(tag.clone()) {
            tags.push(tag);
        }
    }

    let purger = config.purger(client, repository.clone());
    let outcome = purger.purge_tags(&tags).await;
    purger.shutdown().await;

    match outcome.error {
        None => Ok(outcome.deleted),
        Some(source) => Err(Error::Purge {
            deleted: outcome.deleted,
            source,
        }),
    }
}
