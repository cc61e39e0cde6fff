// ABOUTME: Manifest and tag records returned by registry listings.
// ABOUTME: Deserializes the registry's camelCase JSON and exposes lock checks.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Lock flags a registry attaches to a manifest or tag.
///
/// Missing flags are treated as enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeableAttributes {
    #[serde(default)]
    pub delete_enabled: Option<bool>,
    #[serde(default)]
    pub write_enabled: Option<bool>,
    #[serde(default)]
    pub read_enabled: Option<bool>,
    #[serde(default)]
    pub list_enabled: Option<bool>,
}

impl ChangeableAttributes {
    /// A resource is locked when delete or write has been explicitly disabled.
    pub fn is_locked(&self) -> bool {
        self.delete_enabled == Some(false) || self.write_enabled == Some(false)
    }
}

/// One entry in a manifest listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestAttributes {
    /// Absent for malformed entries; such entries are never deleted.
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub image_size: Option<u64>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub changeable_attributes: Option<ChangeableAttributes>,
}

impl ManifestAttributes {
    /// A record with only a digest, as a minimal listing entry.
    pub fn with_digest(digest: impl Into<String>) -> Self {
        Self {
            digest: Some(digest.into()),
            ..Default::default()
        }
    }

    /// Whether the manifest's lock flags allow removing it.
    pub fn is_deletable(&self) -> bool {
        !self
            .changeable_attributes
            .as_ref()
            .is_some_and(ChangeableAttributes::is_locked)
    }
}

/// One entry in a tag listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagAttributes {
    pub name: String,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub signed: Option<bool>,
    #[serde(default)]
    pub changeable_attributes: Option<ChangeableAttributes>,
}
