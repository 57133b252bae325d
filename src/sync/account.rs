//! Selection of the upstream account a run is scoped to.

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{AccountRef, ExternalSession};
use crate::upstream::UpstreamApi;

/// Picks the account (ledger) for a run.
///
/// Uses the configured account when one is set, otherwise the first account
/// the session can see.
#[derive(Debug, Clone, Default)]
pub struct AccountResolver {
    preferred: Option<String>,
}

impl AccountResolver {
    /// Creates a resolver, optionally pinned to an account id.
    pub fn new(preferred: Option<String>) -> Self {
        Self { preferred }
    }

    /// Resolves the account for `session`.
    pub async fn resolve(
        &self,
        upstream: &dyn UpstreamApi,
        session: &ExternalSession,
    ) -> EngineResult<AccountRef> {
        let accounts = upstream.list_accounts(session).await?;

        let account = match &self.preferred {
            Some(id) => accounts
                .into_iter()
                .find(|account| &account.id == id)
                .ok_or_else(|| EngineError::Config {
                    message: format!("configured account '{id}' is not visible to the session"),
                })?,
            None => accounts
                .into_iter()
                .next()
                .ok_or_else(|| EngineError::upstream("no accounts available to the session"))?,
        };

        debug!(account_id = %account.id, "Resolved upstream account");
        Ok(account)
    }
}
