//! Tag references supplied alongside uploads.

use crate::models::OrganizationId;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during tag validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagLookupError {
    /// The tag store could not be consulted.
    #[error("Tag store unavailable: {0}")]
    Unavailable(String),
}

/// Capability confirming that referenced tags exist for an organization.
#[async_trait]
pub trait TagValidator: Send + Sync {
    /// Returns the subset of `tag_ids` that do not exist for the organization,
    /// in the order they were given.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be consulted.
    async fn invalid_tag_ids(
        &self,
        org: &OrganizationId,
        tag_ids: &[String],
    ) -> Result<Vec<String>, TagLookupError>;
}

/// Splits a comma-separated tag list, dropping blanks and duplicates.
#[must_use]
pub fn parse_tag_ids(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// A tag provisioned for one organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Organization owning the tag.
    pub organization_id: OrganizationId,
    /// Tag identifier.
    pub tag_id: String,
}

impl FromStr for TagEntry {
    type Err = String;

    /// Parses `organization:tag`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (organization, tag_id) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("expected organization:tag, got {s:?}"))?;

        let tag_id = tag_id.trim();
        if tag_id.is_empty() || tag_id.contains(',') {
            return Err(format!("invalid tag id: {tag_id:?}"));
        }

        let organization_id = OrganizationId::new(organization.trim())
            .map_err(|e| format!("invalid organization for tag {tag_id}: {e}"))?;

        Ok(Self {
            organization_id,
            tag_id: tag_id.to_string(),
        })
    }
}

/// In-memory tag store for development and testing.
#[derive(Debug, Default)]
pub struct InMemoryTagStore {
    tags: RwLock<HashMap<OrganizationId, HashSet<String>>>,
}

impl InMemoryTagStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tag for an organization.
    pub fn insert(&self, org: OrganizationId, tag_id: impl Into<String>) {
        self.tags.write().entry(org).or_default().insert(tag_id.into());
    }

    /// Registers a provisioned tag entry.
    pub fn insert_entry(&self, entry: TagEntry) {
        self.insert(entry.organization_id, entry.tag_id);
    }
}

#[async_trait]
impl TagValidator for InMemoryTagStore {
    async fn invalid_tag_ids(
        &self,
        org: &OrganizationId,
        tag_ids: &[String],
    ) -> Result<Vec<String>, TagLookupError> {
        let tags = self.tags.read();
        let known = tags.get(org);
        Ok(tag_ids
            .iter()
            .filter(|id| !known.is_some_and(|k| k.contains(id.as_str())))
            .cloned()
            .collect())
    }
}
