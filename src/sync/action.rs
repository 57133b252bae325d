//! Gateway actions and their typed parameters.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EngineError, EngineResult};
use crate::models::Period;
use crate::upstream::TotalsQuery;

/// An action the gateway can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncAction {
    /// Raw employee listing.
    ListEmployees,
    /// Totals of one employee over a date range.
    SinglePeriodTotals,
    /// Day-by-day breakdown of one employee over a date range.
    SinglePeriodDetail,
    /// Totals of every employee over a date range.
    AllEmployeesTotals,
    /// Fetch a whole period and write it to the persistence sink.
    Import,
    /// Read back the persisted rows of a period.
    PeriodSnapshot,
}

impl SyncAction {
    /// The wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncAction::ListEmployees => "list-employees",
            SyncAction::SinglePeriodTotals => "single-period-totals",
            SyncAction::SinglePeriodDetail => "single-period-detail",
            SyncAction::AllEmployeesTotals => "all-employees-totals",
            SyncAction::Import => "import",
            SyncAction::PeriodSnapshot => "period-snapshot",
        }
    }

    /// How long a response to this action may be served from cache.
    ///
    /// `None` means the action always bypasses the cache.
    pub fn cache_ttl(&self) -> Option<Duration> {
        const MINUTE: u64 = 60;
        match self {
            SyncAction::ListEmployees => Some(Duration::from_secs(60 * MINUTE)),
            SyncAction::SinglePeriodTotals
            | SyncAction::SinglePeriodDetail
            | SyncAction::AllEmployeesTotals => Some(Duration::from_secs(30 * MINUTE)),
            SyncAction::Import | SyncAction::PeriodSnapshot => None,
        }
    }

    /// Whether the caller must be an administrator.
    ///
    /// Imports always mutate; a forced refresh spends upstream quota.
    pub fn requires_admin(&self, refresh: bool) -> bool {
        matches!(self, SyncAction::Import) || refresh
    }
}

impl FromStr for SyncAction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            SyncAction::ListEmployees,
            SyncAction::SinglePeriodTotals,
            SyncAction::SinglePeriodDetail,
            SyncAction::AllEmployeesTotals,
            SyncAction::Import,
            SyncAction::PeriodSnapshot,
        ]
        .into_iter()
        .find(|action| action.as_str() == s)
        .ok_or_else(|| EngineError::validation(format!("unknown action '{s}'")))
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date range for the all-employees action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRange {
    /// First day (inclusive).
    pub period_start: NaiveDate,
    /// Last day (inclusive).
    pub period_end: NaiveDate,
}

/// A single year-month, for import and snapshot actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRequest {
    /// The period, as `YYYY-MM`.
    pub period: Period,
}

/// A dispatched action together with its validated parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncRequest {
    /// See [`SyncAction::ListEmployees`].
    ListEmployees,
    /// See [`SyncAction::SinglePeriodTotals`].
    SinglePeriodTotals(TotalsQuery),
    /// See [`SyncAction::SinglePeriodDetail`].
    SinglePeriodDetail(TotalsQuery),
    /// See [`SyncAction::AllEmployeesTotals`].
    AllEmployeesTotals(PeriodRange),
    /// See [`SyncAction::Import`].
    Import(PeriodRequest),
    /// See [`SyncAction::PeriodSnapshot`].
    PeriodSnapshot(PeriodRequest),
}

fn body<T: serde::de::DeserializeOwned>(action: SyncAction, value: Value) -> EngineResult<T> {
    serde_json::from_value(value)
        .map_err(|error| EngineError::validation(format!("invalid body for {action}: {error}")))
}

fn check_range(start: NaiveDate, end: NaiveDate) -> EngineResult<()> {
    if start > end {
        return Err(EngineError::validation(format!(
            "periodStart {start} is after periodEnd {end}"
        )));
    }
    Ok(())
}

impl SyncRequest {
    /// Validates the JSON body of `action`.
    pub fn parse(action: SyncAction, value: Value) -> EngineResult<Self> {
        Ok(match action {
            SyncAction::ListEmployees => SyncRequest::ListEmployees,
            SyncAction::SinglePeriodTotals | SyncAction::SinglePeriodDetail => {
                let mut query: TotalsQuery = body(action, value)?;
                query.employee_ref = query.employee_ref.trim().to_string();
                if query.employee_ref.is_empty() {
                    return Err(EngineError::validation("employeeRef must not be empty"));
                }
                check_range(query.period_start, query.period_end)?;
                if action == SyncAction::SinglePeriodTotals {
                    SyncRequest::SinglePeriodTotals(query)
                } else {
                    SyncRequest::SinglePeriodDetail(query)
                }
            }
            SyncAction::AllEmployeesTotals => {
                let range: PeriodRange = body(action, value)?;
                check_range(range.period_start, range.period_end)?;
                SyncRequest::AllEmployeesTotals(range)
            }
            SyncAction::Import => SyncRequest::Import(body(action, value)?),
            SyncAction::PeriodSnapshot => SyncRequest::PeriodSnapshot(body(action, value)?),
        })
    }

    /// The action this request dispatches to.
    pub fn action(&self) -> SyncAction {
        match self {
            SyncRequest::ListEmployees => SyncAction::ListEmployees,
            SyncRequest::SinglePeriodTotals(_) => SyncAction::SinglePeriodTotals,
            SyncRequest::SinglePeriodDetail(_) => SyncAction::SinglePeriodDetail,
            SyncRequest::AllEmployeesTotals(_) => SyncAction::AllEmployeesTotals,
            SyncRequest::Import(_) => SyncAction::Import,
            SyncRequest::PeriodSnapshot(_) => SyncAction::PeriodSnapshot,
        }
    }
}
