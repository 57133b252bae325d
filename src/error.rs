//! Error types for the timesheet synchronization engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the engine can surface: configuration, caller and
//! upstream authentication, upstream calls, persistence and cache access.

use thiserror::Error;

/// The main error type for the timesheet synchronization engine.
///
/// All fallible operations in the engine return this error type. The API
/// layer maps each variant onto an HTTP status.
///
/// # Example
///
/// ```
/// use timesheet_sync::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/upstream.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/upstream.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Required configuration (such as upstream credentials) is missing.
    #[error("Configuration error: {message}")]
    Config {
        /// A description of what is missing.
        message: String,
    },

    /// The caller identity or the upstream session could not be authenticated.
    #[error("Authentication failed: {message}")]
    Auth {
        /// A description of the authentication failure.
        message: String,
    },

    /// The caller is authenticated but lacks the required privilege.
    #[error("Not authorized: {message}")]
    Authorization {
        /// A description of the missing privilege.
        message: String,
    },

    /// A call to the upstream provider failed, timed out or returned an
    /// unusable payload.
    #[error("Upstream error: {message}")]
    Upstream {
        /// A description of the upstream failure.
        message: String,
    },

    /// Writing to or reading from the persistence sink failed.
    #[error("Persistence error: {message}")]
    Persistence {
        /// A description of the persistence failure.
        message: String,
    },

    /// The cache store could not be read or written.
    #[error("Cache error: {message}")]
    Cache {
        /// A description of the cache failure.
        message: String,
    },

    /// A request parameter was missing or invalid.
    #[error("Validation error: {message}")]
    Validation {
        /// A description of the invalid input.
        message: String,
    },
}

impl EngineError {
    /// Builds an [`EngineError::Upstream`] from any displayable cause.
    pub fn upstream(message: impl Into<String>) -> Self {
        EngineError::Upstream {
            message: message.into(),
        }
    }

    /// Builds an [`EngineError::Validation`] from any displayable cause.
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
