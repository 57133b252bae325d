//! Configuration types for the synchronization engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::calculation::CompensationRegime;

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_window_size() -> usize {
    12
}

fn default_pause_ms() -> u64 {
    1000
}

/// Connection settings for the time-tracking provider.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the provider's authentication service.
    pub auth_url: String,
    /// Base URL of the provider's timesheet API.
    pub api_url: String,
    /// OAuth client identifier sent with the password grant.
    pub client_id: String,
    /// Preferred account (bank) identifier; the first listed account is used when absent.
    #[serde(default)]
    pub account_id: Option<String>,
    /// Timeout for each upstream call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Timeout for the session probe, in seconds.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

/// Pacing of per-employee fan-out calls.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of concurrent upstream calls.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Pause between windows, in milliseconds.
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            pause_ms: default_pause_ms(),
        }
    }
}

/// The `upstream.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamFile {
    /// Provider connection settings.
    pub upstream: UpstreamConfig,
    /// Batch pacing.
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Statutory and pay constants used by the compliance classifier.
///
/// Defaults: salary base 3000.00, 220 standard hours per month, 28%
/// employer social charge, 8% severance fund, individual agreement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    /// Monthly salary used to derive the hourly rate.
    pub monthly_salary_base: Decimal,
    /// Standard contractual hours per month.
    pub monthly_standard_hours: Decimal,
    /// Employer social charge rate (0.28 = 28%).
    pub employer_social_charge_rate: Decimal,
    /// Severance fund deposit rate (0.08 = 8%).
    pub severance_fund_rate: Decimal,
    /// Agreement regime that sets the compensation window.
    pub regime: CompensationRegime,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            monthly_salary_base: Decimal::from(3000),
            monthly_standard_hours: Decimal::from(220),
            employer_social_charge_rate: Decimal::new(28, 2),
            severance_fund_rate: Decimal::new(8, 2),
            regime: CompensationRegime::Individual,
        }
    }
}

/// The `compliance.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct ComplianceFile {
    /// Compliance constants.
    #[serde(default)]
    pub compliance: ComplianceConfig,
}

/// A caller allowed to use the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct CallerEntry {
    /// Bearer token presented by the caller.
    pub token: String,
    /// Identity recorded as `imported_by`.
    pub id: String,
    /// Whether the caller may import and force refreshes.
    #[serde(default)]
    pub admin: bool,
}

/// The optional `access.yaml` file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessConfig {
    /// Known callers.
    #[serde(default)]
    pub callers: Vec<CallerEntry>,
}

/// The complete engine configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    upstream: UpstreamConfig,
    batch: BatchConfig,
    compliance: ComplianceConfig,
    access: AccessConfig,
}

impl SyncConfig {
    /// Creates a new SyncConfig from its component parts.
    pub fn new(
        upstream: UpstreamConfig,
        batch: BatchConfig,
        compliance: ComplianceConfig,
        access: AccessConfig,
    ) -> Self {
        Self {
            upstream,
            batch,
            compliance,
            access,
        }
    }

    /// Returns the provider connection settings.
    pub fn upstream(&self) -> &UpstreamConfig {
        &self.upstream
    }

    /// Returns the batch pacing.
    pub fn batch(&self) -> &BatchConfig {
        &self.batch
    }

    /// Returns the compliance constants.
    pub fn compliance(&self) -> &ComplianceConfig {
        &self.compliance
    }

    /// Returns the caller list.
    pub fn access(&self) -> &AccessConfig {
        &self.access
    }
}
