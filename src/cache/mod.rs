//! Response cache in front of the upstream provider.
//!
//! Entries are keyed by action and a canonical fingerprint of the request
//! parameters. An entry past its expiry is never returned.

mod memory;
mod redis_store;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::EngineResult;

pub use memory::InMemoryResponseCache;
pub use redis_store::RedisResponseCache;

/// Cache key: action name plus parameter fingerprint.
///
/// # Example
///
/// ```
/// use timesheet_sync::cache::CacheKey;
/// use serde_json::json;
///
/// let a = CacheKey::new("single-period-totals", &json!({ "b": 1, "a": 2 }));
/// let b = CacheKey::new("single-period-totals", &json!({ "a": 2, "b": 1 }));
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "single-period-totals:{\"a\":2,\"b\":1}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    action: String,
    fingerprint: String,
}

impl CacheKey {
    /// Builds a key from an action name and its parameters.
    pub fn new(action: impl Into<String>, params: &Value) -> Self {
        let mut fingerprint = String::new();
        write_canonical(params, &mut fingerprint);
        Self {
            action: action.into(),
            fingerprint,
        }
    }

    /// The action component.
    pub fn action(&self) -> &str {
        &self.action
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.action, self.fingerprint)
    }
}

/// Writes `value` as JSON with object keys sorted at every level.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(object) => {
            let mut keys: Vec<&String> = object.keys().collect();
            keys.sort();
            out.push('{');
            for (index, key) in keys.into_iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                if let Some(inner) = object.get(key) {
                    write_canonical(inner, out);
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Storage for cached gateway responses.
///
/// Writes are last-writer-wins. Implementations must treat an expired
/// entry exactly like a missing one.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Returns the live payload stored under `key`, if any.
    async fn get(&self, key: &CacheKey) -> EngineResult<Option<Value>>;

    /// Stores `value` under `key` for `ttl`.
    async fn set(&self, key: &CacheKey, value: &Value, ttl: Duration) -> EngineResult<()>;
}
