//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

use super::types::{AccessConfig, ComplianceFile, SyncConfig, UpstreamFile};

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/default/
/// ├── upstream.yaml    # Provider endpoints and batch pacing (required)
/// ├── compliance.yaml  # Pay and statutory constants (required)
/// └── access.yaml      # Gateway callers (optional)
/// ```
///
/// # Example
///
/// ```no_run
/// use timesheet_sync::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// let window = loader.config().batch().window_size;
/// println!("Fetching {} employees at a time", window);
/// # Ok::<(), timesheet_sync::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: SyncConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if a required file is missing, contains invalid
    /// YAML, or holds values the engine cannot run with.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let upstream_path = path.join("upstream.yaml");
        let upstream = Self::load_yaml::<UpstreamFile>(&upstream_path)?;

        let compliance_path = path.join("compliance.yaml");
        let compliance = Self::load_yaml::<ComplianceFile>(&compliance_path)?;

        let access_path = path.join("access.yaml");
        let access = if access_path.exists() {
            Self::load_yaml::<AccessConfig>(&access_path)?
        } else {
            AccessConfig::default()
        };

        let config = SyncConfig::new(
            upstream.upstream,
            upstream.batch,
            compliance.compliance,
            access,
        );
        Self::validate(&config, &path.display().to_string())?;

        Ok(Self { config })
    }

    /// Wraps an already-built configuration, validating it.
    pub fn from_config(config: SyncConfig) -> EngineResult<Self> {
        Self::validate(&config, "<in-memory>")?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate(config: &SyncConfig, path: &str) -> EngineResult<()> {
        let invalid = |message: &str| EngineError::ConfigParseError {
            path: path.to_string(),
            message: message.to_string(),
        };

        if config.upstream().auth_url.trim().is_empty() {
            return Err(invalid("upstream.auth_url must not be empty"));
        }
        if config.upstream().api_url.trim().is_empty() {
            return Err(invalid("upstream.api_url must not be empty"));
        }
        if config.batch().window_size == 0 {
            return Err(invalid("batch.window_size must be at least 1"));
        }
        if config.compliance().monthly_standard_hours <= Decimal::ZERO {
            return Err(invalid("compliance.monthly_standard_hours must be positive"));
        }

        Ok(())
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }
}
