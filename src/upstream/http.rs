//! `reqwest` implementation of the upstream provider port.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AccountRef, Credentials, ExternalSession};

use super::parse::parse_accounts;
use super::{TotalsQuery, UpstreamApi};

const ACCOUNT_HEADER: &str = "X-Account-Id";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// HTTP client for the time-tracking provider.
///
/// Holds two clients: one with the regular per-call timeout, and a
/// short-timeout one used only for session probes.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    probe_client: reqwest::Client,
    auth_url: String,
    api_url: String,
    client_id: String,
}

impl HttpUpstream {
    /// Builds the clients from the provider settings.
    pub fn new(config: &UpstreamConfig) -> EngineResult<Self> {
        let build = |secs: u64| {
            reqwest::Client::builder()
                .timeout(Duration::from_secs(secs))
                .build()
                .map_err(|error| EngineError::Config {
                    message: format!("failed to build HTTP client: {error}"),
                })
        };

        Ok(Self {
            client: build(config.request_timeout_secs)?,
            probe_client: build(config.probe_timeout_secs)?,
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
        })
    }

    fn auth_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.auth_url, path)
    }

    fn api_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    fn authorized(
        builder: RequestBuilder,
        session: &ExternalSession,
        account: Option<&AccountRef>,
    ) -> RequestBuilder {
        let builder = builder.bearer_auth(session.access_token());
        match account {
            Some(account) => builder.header(ACCOUNT_HEADER, account.id.as_str()),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder, url: &str) -> EngineResult<Response> {
        builder.send().await.map_err(|error| {
            if error.is_timeout() {
                EngineError::upstream(format!("request to {url} timed out"))
            } else {
                EngineError::upstream(format!("request to {url} failed: {error}"))
            }
        })
    }

    async fn read_json(response: Response, url: &str) -> EngineResult<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::upstream(format!(
                "{url} responded with HTTP {}",
                status.as_u16()
            )));
        }
        response.json::<Value>().await.map_err(|error| {
            EngineError::upstream(format!("{url} returned an unreadable body: {error}"))
        })
    }

    async fn post_ledger<B: Serialize + Sync>(
        &self,
        path: &str,
        session: &ExternalSession,
        account: &AccountRef,
        body: &B,
    ) -> EngineResult<Value> {
        let url = self.api_endpoint(path);
        let builder = Self::authorized(self.client.post(&url), session, Some(account)).json(body);
        let response = Self::send(builder, &url).await?;
        Self::read_json(response, &url).await
    }
}

#[async_trait]
impl UpstreamApi for HttpUpstream {
    async fn request_token(&self, credentials: &Credentials) -> EngineResult<ExternalSession> {
        let url = self.auth_endpoint("token");
        let form = [
            ("grant_type", "password"),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
            ("client_id", self.client_id.as_str()),
        ];
        let response = Self::send(self.client.post(&url).form(&form), &url).await?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(EngineError::Auth {
                message: format!("credential grant rejected with HTTP {}", status.as_u16()),
            });
        }
        if !status.is_success() {
            return Err(EngineError::upstream(format!(
                "{url} responded with HTTP {}",
                status.as_u16()
            )));
        }

        let token = response.json::<TokenResponse>().await.map_err(|error| {
            EngineError::upstream(format!("token response is malformed: {error}"))
        })?;
        debug!("Obtained new upstream session");
        Ok(ExternalSession::new(token.access_token))
    }

    async fn probe(&self, session: &ExternalSession) -> EngineResult<()> {
        let url = self.auth_endpoint("accounts");
        let builder = Self::authorized(self.probe_client.get(&url), session, None);
        let response = Self::send(builder, &url).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(EngineError::Auth {
                message: format!("session probe returned HTTP {}", response.status().as_u16()),
            })
        }
    }

    async fn list_accounts(&self, session: &ExternalSession) -> EngineResult<Vec<AccountRef>> {
        let url = self.auth_endpoint("accounts");
        let builder = Self::authorized(self.client.get(&url), session, None);
        let response = Self::send(builder, &url).await?;
        let payload = Self::read_json(response, &url).await?;
        parse_accounts(&payload)
    }

    async fn list_employees(
        &self,
        session: &ExternalSession,
        account: &AccountRef,
    ) -> EngineResult<Value> {
        let url = self.api_endpoint("employees");
        let builder = Self::authorized(self.client.get(&url), session, Some(account));
        let response = Self::send(builder, &url).await?;
        Self::read_json(response, &url).await
    }

    async fn fetch_totals(
        &self,
        session: &ExternalSession,
        account: &AccountRef,
        query: &TotalsQuery,
    ) -> EngineResult<Value> {
        self.post_ledger("totals", session, account, query).await
    }

    async fn fetch_detail(
        &self,
        session: &ExternalSession,
        account: &AccountRef,
        query: &TotalsQuery,
    ) -> EngineResult<Value> {
        self.post_ledger("totals/detail", session, account, query)
            .await
    }
}
