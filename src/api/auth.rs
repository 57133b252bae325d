//! Caller authentication and the administrator guard.
//!
//! Every gateway call must present `Authorization: Bearer <token>`. The
//! token is resolved to a [`Caller`] by a [`CallerVerifier`]; imports and
//! forced refreshes additionally require an administrator.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::{HeaderMap, header};

use crate::config::AccessConfig;
use crate::error::{EngineError, EngineResult};
use crate::sync::SyncAction;

/// An authenticated gateway caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Caller identity, recorded on imported rows.
    pub id: String,
    /// Whether the caller may run imports and forced refreshes.
    pub is_admin: bool,
}

/// Resolves a bearer token to a caller.
#[async_trait]
pub trait CallerVerifier: Send + Sync {
    /// Returns the caller owning `token`, or an [`EngineError::Auth`].
    async fn verify(&self, token: &str) -> EngineResult<Caller>;
}

/// Verifier backed by the static caller list in `access.yaml`.
#[derive(Debug, Clone, Default)]
pub struct StaticCallerVerifier {
    callers: HashMap<String, Caller>,
}

impl StaticCallerVerifier {
    /// Builds the verifier from the access configuration.
    pub fn from_config(access: &AccessConfig) -> Self {
        let callers = access
            .callers
            .iter()
            .map(|entry| {
                (
                    entry.token.clone(),
                    Caller {
                        id: entry.id.clone(),
                        is_admin: entry.admin,
                    },
                )
            })
            .collect();
        Self { callers }
    }
}

#[async_trait]
impl CallerVerifier for StaticCallerVerifier {
    async fn verify(&self, token: &str) -> EngineResult<Caller> {
        self.callers
            .get(token)
            .cloned()
            .ok_or_else(|| EngineError::Auth {
                message: "unknown caller token".to_string(),
            })
    }
}

/// Extracts the bearer token from `headers` and verifies it.
pub async fn authenticate(verifier: &dyn CallerVerifier, headers: &HeaderMap) -> EngineResult<Caller> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| EngineError::Auth {
            message: "missing bearer token".to_string(),
        })?;
    verifier.verify(token).await
}

/// Rejects non-administrators for actions that mutate or bypass the cache.
pub fn authorize(caller: &Caller, action: SyncAction, refresh: bool) -> EngineResult<()> {
    if action.requires_admin(refresh) && !caller.is_admin {
        return Err(EngineError::Authorization {
            message: format!("{action} requires an administrator"),
        });
    }
    Ok(())
}
