// ABOUTME: Configuration types and parsing for regsweep.yml.
// ABOUTME: Handles YAML parsing, discovery, and per-repository overrides.

use crate::error::{Error, Result};
use crate::registry::RegistryClient;
use crate::types::RepositoryName;
use crate::worker::{Pool, Purger, QUEUE_FACTOR};
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "regsweep.yml";
pub const CONFIG_FILENAME_ALT: &str = "regsweep.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".regsweep/config.yml";

/// Default number of concurrent deletions per repository.
pub const DEFAULT_CONCURRENCY: NonZeroUsize = NonZeroUsize::new(5).unwrap();

#[derive(Debug, Clone, Deserialize)]
pub struct PurgeConfig {
    /// Registry host, used to label deleted resources in logs and events.
    pub login_url: String,

    #[serde(default = "default_concurrency")]
    pub concurrency: NonZeroUsize,

    /// Queue slots per worker.
    #[serde(default = "default_queue_factor")]
    pub queue_factor: NonZeroUsize,

    /// Cancel purging after this long.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    #[serde(default)]
    pub repositories: HashMap<String, RepositoryOverrides>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryOverrides {
    #[serde(default)]
    pub concurrency: Option<NonZeroUsize>,

    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

fn default_concurrency() -> NonZeroUsize {
    DEFAULT_CONCURRENCY
}

fn default_queue_factor() -> NonZeroUsize {
    QUEUE_FACTOR
}

impl PurgeConfig {
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
            concurrency: DEFAULT_CONCURRENCY,
            queue_factor: QUEUE_FACTOR,
            timeout: None,
            repositories: HashMap::new(),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    fn validate(&self) -> Result<()> {
        if self.login_url.trim().is_empty() {
            return Err(Error::InvalidConfig("login_url cannot be empty".to_string()));
        }

        for name in self.repositories.keys() {
            RepositoryName::new(name)
                .map_err(|e| Error::InvalidConfig(format!("repository '{}': {}", name, e)))?;
        }

        Ok(())
    }

    /// Concurrency for a repository, after overrides.
    pub fn concurrency_for(&self, repository: &RepositoryName) -> NonZeroUsize {
        self.repositories
            .get(repository.as_str())
            .and_then(|o| o.concurrency)
            .unwrap_or(self.concurrency)
    }

    /// Timeout for a repository, after overrides.
    pub fn timeout_for(&self, repository: &RepositoryName) -> Option<Duration> {
        self.repositories
            .get(repository.as_str())
            .and_then(|o| o.timeout)
            .or(self.timeout)
    }

    /// Build a purger for `repository` with this configuration applied.
    pub fn purger<C>(&self, client: Arc<C>, repository: RepositoryName) -> Purger<C>
    where
        C: RegistryClient + 'static,
    {
        let workers = self.concurrency_for(&repository);
        let pool = Pool::with_queue_capacity(workers, workers.saturating_mul(self.queue_factor));
        let timeout = self.timeout_for(&repository);

        let purger = Purger::with_pool(pool, client, self.login_url.clone(), repository);
        match timeout {
            Some(timeout) => purger.with_deadline(timeout),
            None => purger,
        }
    }
}
