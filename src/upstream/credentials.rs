//! Sources of upstream account credentials.

use std::env;

use crate::error::{EngineError, EngineResult};
use crate::models::Credentials;

/// Supplies the account credentials used for the password grant.
pub trait CredentialsProvider: Send + Sync {
    /// Returns the credentials, or [`EngineError::Config`] when none are configured.
    fn credentials(&self) -> EngineResult<Credentials>;
}

/// Reads credentials from process environment variables.
#[derive(Debug, Clone)]
pub struct EnvCredentialsProvider {
    username_var: String,
    password_var: String,
}

impl EnvCredentialsProvider {
    /// Reads from the given variable names.
    pub fn new(username_var: impl Into<String>, password_var: impl Into<String>) -> Self {
        Self {
            username_var: username_var.into(),
            password_var: password_var.into(),
        }
    }

    fn read(name: &str) -> EngineResult<String> {
        env::var(name)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| EngineError::Config {
                message: format!("{name} is not set"),
            })
    }
}

impl Default for EnvCredentialsProvider {
    /// Reads `UPSTREAM_USERNAME` and `UPSTREAM_PASSWORD`.
    fn default() -> Self {
        Self::new("UPSTREAM_USERNAME", "UPSTREAM_PASSWORD")
    }
}

impl CredentialsProvider for EnvCredentialsProvider {
    fn credentials(&self) -> EngineResult<Credentials> {
        Ok(Credentials {
            username: Self::read(&self.username_var)?,
            password: Self::read(&self.password_var)?,
        })
    }
}

/// Fixed credentials, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    credentials: Option<Credentials>,
}

impl StaticCredentials {
    /// Always returns the given credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Some(Credentials {
                username: username.into(),
                password: password.into(),
            }),
        }
    }

    /// Always reports missing configuration.
    pub fn missing() -> Self {
        Self::default()
    }
}

impl CredentialsProvider for StaticCredentials {
    fn credentials(&self) -> EngineResult<Credentials> {
        self.credentials.clone().ok_or_else(|| EngineError::Config {
            message: "upstream credentials are not configured".to_string(),
        })
    }
}
