//! Upstream session lifecycle.
//!
//! A held session is probed before reuse. When there is none, or the probe
//! fails, a fresh password grant replaces it. The transitions are explicit:
//!
//! ```text
//! Unvalidated ──probe ok──▶ Valid
//!      │
//!      └─probe failed─▶ Reauthenticating ──grant ok──▶ Valid
//!                              │
//!                              └──grant rejected──▶ (error)
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::EngineResult;
use crate::models::ExternalSession;
use crate::upstream::{CredentialsProvider, UpstreamApi};

enum SessionState {
    Unvalidated(ExternalSession),
    Reauthenticating,
    Valid(ExternalSession),
}

/// Acquires and caches the upstream bearer session.
pub struct SessionManager {
    upstream: Arc<dyn UpstreamApi>,
    credentials: Arc<dyn CredentialsProvider>,
    current: Mutex<Option<ExternalSession>>,
}

impl SessionManager {
    /// Creates a manager with no session held.
    pub fn new(upstream: Arc<dyn UpstreamApi>, credentials: Arc<dyn CredentialsProvider>) -> Self {
        Self {
            upstream,
            credentials,
            current: Mutex::new(None),
        }
    }

    /// Seeds the manager with a previously obtained session.
    pub fn with_session(self, session: ExternalSession) -> Self {
        Self {
            current: Mutex::new(Some(session)),
            ..self
        }
    }

    /// Returns a session that passed validation.
    ///
    /// Fails with [`EngineError::Config`](crate::error::EngineError::Config)
    /// when a grant is needed but no credentials are configured, and with
    /// [`EngineError::Auth`](crate::error::EngineError::Auth) when the
    /// provider rejects the grant.
    pub async fn acquire(&self) -> EngineResult<ExternalSession> {
        let mut current = self.current.lock().await;
        let mut state = match current.take() {
            Some(session) => SessionState::Unvalidated(session),
            None => SessionState::Reauthenticating,
        };

        loop {
            state = match state {
                SessionState::Unvalidated(session) => {
                    match self.upstream.probe(&session).await {
                        Ok(()) => {
                            debug!("Reusing upstream session");
                            SessionState::Valid(session)
                        }
                        Err(error) => {
                            warn!(error = %error, "Upstream session failed probe, re-authenticating");
                            SessionState::Reauthenticating
                        }
                    }
                }
                SessionState::Reauthenticating => {
                    let credentials = self.credentials.credentials()?;
                    let session = self.upstream.request_token(&credentials).await?;
                    info!("Acquired new upstream session");
                    SessionState::Valid(session)
                }
                SessionState::Valid(session) => {
                    *current = Some(session.clone());
                    return Ok(session);
                }
            };
        }
    }

    /// Drops the held session so the next `acquire` performs a fresh grant.
    pub async fn invalidate(&self) {
        self.current.lock().await.take();
    }
}
