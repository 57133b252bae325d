//! Redis-backed response cache.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use serde_json::Value;

use crate::error::{EngineError, EngineResult};

use super::{CacheKey, ResponseCache};

/// Redis implementation of the response cache, shared across processes.
///
/// Expiry is delegated to Redis via `SET EX`.
#[derive(Clone)]
pub struct RedisResponseCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisResponseCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &CacheKey) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    async fn connection(&self) -> EngineResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| EngineError::Cache {
                message: format!("failed to connect to redis: {error}"),
            })
    }
}

#[async_trait]
impl ResponseCache for RedisResponseCache {
    async fn get(&self, key: &CacheKey) -> EngineResult<Option<Value>> {
        let mut connection = self.connection().await?;
        let encoded: Option<String> =
            connection
                .get(self.key_for(key))
                .await
                .map_err(|error| EngineError::Cache {
                    message: format!("failed to read cache entry: {error}"),
                })?;

        encoded
            .as_deref()
            .map(serde_json::from_str::<Value>)
            .transpose()
            .map_err(|error| EngineError::Cache {
                message: format!("cache entry is not valid JSON: {error}"),
            })
    }

    async fn set(&self, key: &CacheKey, value: &Value, ttl: Duration) -> EngineResult<()> {
        let seconds = ttl.as_secs();
        if seconds == 0 {
            return Ok(());
        }

        let mut connection = self.connection().await?;
        let _: () = connection
            .set_ex(self.key_for(key), value.to_string(), seconds)
            .await
            .map_err(|error| EngineError::Cache {
                message: format!("failed to write cache entry: {error}"),
            })?;

        Ok(())
    }
}
