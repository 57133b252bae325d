//! In-process response cache.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::error::EngineResult;

use super::{CacheKey, ResponseCache};

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    created_at: Instant,
    expires_at: Instant,
}

/// In-process cache adapter.
///
/// Expired entries are evicted when a read finds them, and every write
/// sweeps whatever else has expired.
#[derive(Default)]
pub struct InMemoryResponseCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl InMemoryResponseCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn get(&self, key: &CacheKey) -> EngineResult<Option<Value>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    debug!(
                        key = %key,
                        age_secs = entry.created_at.elapsed().as_secs(),
                        "Cache hit"
                    );
                    return Ok(Some(entry.payload.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(key);
        }

        Ok(None)
    }

    async fn set(&self, key: &CacheKey, value: &Value, ttl: Duration) -> EngineResult<()> {
        if ttl.is_zero() {
            return Ok(());
        }

        let created_at = Instant::now();
        let entry = CacheEntry {
            payload: value.clone(),
            created_at,
            expires_at: created_at + ttl,
        };
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > created_at);
        let swept = before - entries.len();
        if swept > 0 {
            debug!(swept, "Swept expired cache entries");
        }
        entries.insert(key.clone(), entry);

        Ok(())
    }
}
