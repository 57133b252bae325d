//! Upstream session and account types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A bearer credential for the upstream provider.
///
/// Sessions are held in memory only. The token is redacted from `Debug`
/// output so it never reaches the logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ExternalSession {
    access_token: String,
}

impl ExternalSession {
    /// Wraps an access token obtained from a credential grant.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// The raw bearer token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for ExternalSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalSession")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// The upstream ledger/bank selected for all calls in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    /// Upstream identifier of the account.
    pub id: String,
    /// Display name, when the provider reports one.
    pub name: Option<String>,
}

/// Account credentials used for the password grant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account user name.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
