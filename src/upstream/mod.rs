//! Gateway to the external time-tracking provider.
//!
//! [`UpstreamApi`] is the port the sync engine talks to; [`HttpUpstream`] is
//! the `reqwest` implementation. Payloads come back as raw JSON and are
//! turned into validated internal shapes by the functions in [`parse`].

mod credentials;
mod http;
pub mod parse;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineResult;
use crate::models::{AccountRef, Credentials, ExternalSession};

pub use credentials::{CredentialsProvider, EnvCredentialsProvider, StaticCredentials};
pub use http::HttpUpstream;

/// Parameters of a per-employee totals or detail call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsQuery {
    /// The employee's tax/payroll identifier.
    pub employee_ref: String,
    /// First day of the range (inclusive).
    pub period_start: NaiveDate,
    /// Last day of the range (inclusive).
    pub period_end: NaiveDate,
}

/// Calls the sync engine makes against the provider.
///
/// Every call except `request_token` is authorized by an [`ExternalSession`];
/// ledger calls are additionally scoped to an [`AccountRef`].
#[async_trait]
pub trait UpstreamApi: Send + Sync {
    /// Exchanges account credentials for a new session.
    async fn request_token(&self, credentials: &Credentials) -> EngineResult<ExternalSession>;

    /// Cheap short-timeout call that succeeds only while `session` is valid.
    async fn probe(&self, session: &ExternalSession) -> EngineResult<()>;

    /// Lists the accounts (ledgers) visible to the session.
    async fn list_accounts(&self, session: &ExternalSession) -> EngineResult<Vec<AccountRef>>;

    /// Returns the raw employee listing of an account.
    async fn list_employees(
        &self,
        session: &ExternalSession,
        account: &AccountRef,
    ) -> EngineResult<Value>;

    /// Returns the raw totals of one employee over a date range.
    async fn fetch_totals(
        &self,
        session: &ExternalSession,
        account: &AccountRef,
        query: &TotalsQuery,
    ) -> EngineResult<Value>;

    /// Returns the raw day-by-day breakdown of one employee over a date range.
    async fn fetch_detail(
        &self,
        session: &ExternalSession,
        account: &AccountRef,
        query: &TotalsQuery,
    ) -> EngineResult<Value>;
}
