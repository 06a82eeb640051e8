use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::domain::ExplanationContent;
use crate::workflows::matching::{OrganizationId, ProgramId, ProgramStatus};

const KEY_PREFIX: &str = "match:explanation";

/// Cache key for an explanation. The program status is part of the key so a lifecycle change
/// always forces regeneration.
pub fn cache_key(
    organization_id: &OrganizationId,
    program_id: &ProgramId,
    status: ProgramStatus,
) -> String {
    format!(
        "{KEY_PREFIX}:{organization_id}:{program_id}:{}",
        status.label()
    )
}

/// Key/value store for generated explanations.
#[async_trait]
pub trait ExplanationCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<ExplanationContent>, CacheError>;
    async fn put(
        &self,
        key: &str,
        content: ExplanationContent,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

struct CacheEntry {
    expires_at: Instant,
    content: ExplanationContent,
}

/// Process-local cache with per-entry expiry.
#[derive(Default)]
pub struct InMemoryExplanationCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemoryExplanationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ExplanationCache for InMemoryExplanationCache {
    async fn get(&self, key: &str) -> Result<Option<ExplanationContent>, CacheError> {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.content.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        key: &str,
        content: ExplanationContent,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry {
            expires_at: Instant::now() + ttl,
            content,
        };
        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }
}
