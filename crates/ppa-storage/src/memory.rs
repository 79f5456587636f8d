use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use ppa_core::repository::{ReadRepository, Repository, Result};
use ppa_core::{ExpiryExtension, ShortCode, ShortLink, StorageError};

/// In-memory implementation of the repository contract using DashMap.
///
/// DashMap shards its locks, so writes to different codes don't block each
/// other while every single-record operation stays atomic. Expired links are
/// kept; they are never overwritten by a later insert.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: DashMap<ShortCode, ShortLink>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<ShortLink>> {
        Ok(self.storage.get(code).map(|entry| entry.value().clone()))
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.storage.contains_key(code))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, link: ShortLink) -> Result<()> {
        match self.storage.entry(link.code.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(link.code.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(link);
                Ok(())
            }
        }
    }

    async fn update_destination(&self, code: &ShortCode, destination: &str) -> Result<bool> {
        let Some(mut entry) = self.storage.get_mut(code) else {
            return Ok(false);
        };
        if entry.destination == destination {
            return Ok(false);
        }
        entry.destination = destination.to_owned();
        Ok(true)
    }

    async fn extend_expiry(
        &self,
        code: &ShortCode,
        extension: ExpiryExtension,
    ) -> Result<Option<Timestamp>> {
        let Some(mut entry) = self.storage.get_mut(code) else {
            return Ok(None);
        };
        let expires_at = extension.apply(entry.expires_at);
        entry.expires_at = Some(expires_at);
        Ok(Some(expires_at))
    }
}
