//! The sync service: cache-first dispatch of gateway actions.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, ResponseCache};
use crate::calculation::{ComplianceAssessment, assess_compliance};
use crate::config::{ComplianceConfig, SyncConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, Period, TotalsSnapshot};
use crate::storage::TotalsRepository;
use crate::upstream::parse::{parse_employees, parse_totals};
use crate::upstream::{CredentialsProvider, TotalsQuery, UpstreamApi};

use super::{
    AccountResolver, BatchFetcher, PeriodRange, RunContext, SessionManager, SyncAction,
    SyncRequest,
};

/// Totals of one employee with their compliance assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleTotals {
    /// The employee's identifier.
    pub employee_ref: String,
    /// First day of the range.
    pub period_start: NaiveDate,
    /// Last day of the range.
    pub period_end: NaiveDate,
    /// Parsed totals.
    pub totals: TotalsSnapshot,
    /// Assessment as of today.
    pub assessment: ComplianceAssessment,
}

/// One employee's entry in an all-employees report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeTotals {
    /// The employee as listed upstream.
    pub employee: Employee,
    /// Parsed totals.
    pub totals: TotalsSnapshot,
    /// Assessment as of today. Absent from cached payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<ComplianceAssessment>,
}

/// Totals of every employee over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsReport {
    /// First day of the range.
    pub period_start: NaiveDate,
    /// Last day of the range.
    pub period_end: NaiveDate,
    /// Employees whose totals were fetched.
    pub employees: Vec<EmployeeTotals>,
    /// Per-employee fetch failures.
    pub errors: usize,
    /// Employees listed upstream.
    pub total: usize,
}

/// A persisted row as served to dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRow {
    /// The employee's identifier.
    pub employee_ref: String,
    /// Name at import time.
    pub employee_name: String,
    /// Persisted totals.
    pub totals: TotalsSnapshot,
    /// Caller that ran the import.
    pub imported_by: String,
    /// When the row was imported.
    pub imported_at: DateTime<Utc>,
    /// Assessment as of today.
    pub assessment: ComplianceAssessment,
}

/// Every persisted row of a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    /// The period.
    pub period: Period,
    /// Rows ordered by employee identifier.
    pub rows: Vec<SnapshotRow>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailResponse<'a> {
    employee_ref: &'a str,
    period_start: NaiveDate,
    period_end: NaiveDate,
    detail: Value,
}

/// Dispatches gateway actions against the upstream provider.
///
/// Read actions go through the response cache unless a refresh is
/// requested. Compliance assessments are computed after the cache lookup so
/// the days remaining are always relative to today.
pub struct SyncService {
    pub(super) upstream: Arc<dyn UpstreamApi>,
    pub(super) sessions: SessionManager,
    pub(super) accounts: AccountResolver,
    pub(super) batch: BatchFetcher,
    pub(super) repository: Arc<dyn TotalsRepository>,
    cache: Arc<dyn ResponseCache>,
    compliance: ComplianceConfig,
}

impl SyncService {
    /// Wires the service from its configuration and collaborators.
    pub fn new(
        config: &SyncConfig,
        upstream: Arc<dyn UpstreamApi>,
        credentials: Arc<dyn CredentialsProvider>,
        cache: Arc<dyn ResponseCache>,
        repository: Arc<dyn TotalsRepository>,
    ) -> Self {
        Self {
            sessions: SessionManager::new(upstream.clone(), credentials),
            accounts: AccountResolver::new(config.upstream().account_id.clone()),
            batch: BatchFetcher::new(upstream.clone(), config.batch()),
            upstream,
            repository,
            cache,
            compliance: config.compliance().clone(),
        }
    }

    /// Executes a validated request and returns its JSON response.
    ///
    /// `caller_id` is recorded as the importer of persisted rows.
    pub async fn execute(
        &self,
        request: SyncRequest,
        refresh: bool,
        caller_id: &str,
    ) -> EngineResult<Value> {
        debug!(action = %request.action(), refresh, caller = caller_id, "Executing sync action");
        match request {
            SyncRequest::ListEmployees => self.list_employees(refresh).await,
            SyncRequest::SinglePeriodTotals(query) => {
                encode(&self.single_period_totals(&query, refresh).await?)
            }
            SyncRequest::SinglePeriodDetail(query) => {
                self.single_period_detail(&query, refresh).await
            }
            SyncRequest::AllEmployeesTotals(range) => {
                encode(&self.all_employees_totals(&range, refresh).await?)
            }
            SyncRequest::Import(request) => encode(&self.import(request.period, caller_id).await?),
            SyncRequest::PeriodSnapshot(request) => {
                encode(&self.period_snapshot(request.period).await?)
            }
        }
    }

    /// The raw employee listing.
    pub async fn list_employees(&self, refresh: bool) -> EngineResult<Value> {
        self.cached(SyncAction::ListEmployees, Value::Null, refresh, async {
            let context = self.open_run().await?;
            self.upstream
                .list_employees(&context.session, &context.account)
                .await
        })
        .await
    }

    /// Totals of one employee over a date range.
    pub async fn single_period_totals(
        &self,
        query: &TotalsQuery,
        refresh: bool,
    ) -> EngineResult<SingleTotals> {
        let totals: TotalsSnapshot = self
            .cached(SyncAction::SinglePeriodTotals, params(query)?, refresh, async {
                let context = self.open_run().await?;
                let raw = self
                    .upstream
                    .fetch_totals(&context.session, &context.account, query)
                    .await?;
                parse_totals(&raw)
            })
            .await?;

        let assessment = self.assess(&totals, query.period_start);
        Ok(SingleTotals {
            employee_ref: query.employee_ref.clone(),
            period_start: query.period_start,
            period_end: query.period_end,
            totals,
            assessment,
        })
    }

    /// Day-by-day breakdown of one employee, passed through from upstream.
    pub async fn single_period_detail(
        &self,
        query: &TotalsQuery,
        refresh: bool,
    ) -> EngineResult<Value> {
        self.cached(SyncAction::SinglePeriodDetail, params(query)?, refresh, async {
            let context = self.open_run().await?;
            let detail = self
                .upstream
                .fetch_detail(&context.session, &context.account, query)
                .await?;
            encode(&DetailResponse {
                employee_ref: &query.employee_ref,
                period_start: query.period_start,
                period_end: query.period_end,
                detail,
            })
        })
        .await
    }

    /// Totals of every listed employee, fetched through the batch fetcher.
    pub async fn all_employees_totals(
        &self,
        range: &PeriodRange,
        refresh: bool,
    ) -> EngineResult<TotalsReport> {
        let mut report: TotalsReport = self
            .cached(SyncAction::AllEmployeesTotals, params(range)?, refresh, async {
                let context = self.open_run().await?;
                let listing = self
                    .upstream
                    .list_employees(&context.session, &context.account)
                    .await?;
                let employees = parse_employees(&listing)?;
                let outcome = self
                    .batch
                    .fetch_totals(&context, &employees, range.period_start, range.period_end)
                    .await;

                Ok::<_, EngineError>(TotalsReport {
                    period_start: range.period_start,
                    period_end: range.period_end,
                    employees: outcome
                        .rows
                        .into_iter()
                        .map(|fetched| EmployeeTotals {
                            employee: fetched.employee,
                            totals: fetched.totals,
                            assessment: None,
                        })
                        .collect(),
                    errors: outcome.failures,
                    total: employees.len(),
                })
            })
            .await?;

        for entry in &mut report.employees {
            entry.assessment = Some(self.assess(&entry.totals, range.period_start));
        }
        Ok(report)
    }

    /// Reads back the persisted rows of `period` with fresh assessments.
    pub async fn period_snapshot(&self, period: Period) -> EngineResult<PeriodSnapshot> {
        let today = Utc::now().date_naive();
        let rows = self
            .repository
            .list_period(period)
            .await?
            .into_iter()
            .map(|row| SnapshotRow {
                assessment: assess_compliance(&row.totals, period, &self.compliance, today),
                employee_ref: row.employee_ref,
                employee_name: row.employee_name,
                totals: row.totals,
                imported_by: row.imported_by,
                imported_at: row.imported_at,
            })
            .collect();
        Ok(PeriodSnapshot { period, rows })
    }

    /// Acquires a session and resolves the account for one run.
    pub(super) async fn open_run(&self) -> EngineResult<RunContext> {
        let session = self.sessions.acquire().await?;
        let account = self
            .accounts
            .resolve(self.upstream.as_ref(), &session)
            .await?;
        Ok(RunContext { session, account })
    }

    fn assess(&self, totals: &TotalsSnapshot, period_start: NaiveDate) -> ComplianceAssessment {
        assess_compliance(
            totals,
            Period::containing(period_start),
            &self.compliance,
            Utc::now().date_naive(),
        )
    }

    /// Serves `action` from cache, or runs `fetch` and stores its result.
    ///
    /// Cache failures never fail the request: a failed read is a miss and a
    /// failed write is skipped.
    async fn cached<T>(
        &self,
        action: SyncAction,
        params: Value,
        refresh: bool,
        fetch: impl Future<Output = EngineResult<T>>,
    ) -> EngineResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let Some(ttl) = action.cache_ttl() else {
            return fetch.await;
        };
        let key = CacheKey::new(action.as_str(), &params);

        if refresh {
            info!(key = %key, "Refresh requested, bypassing cache");
        } else {
            match self.cache.get(&key).await {
                Ok(Some(payload)) => match serde_json::from_value::<T>(payload) {
                    Ok(value) => {
                        debug!(key = %key, "Serving cached response");
                        return Ok(value);
                    }
                    Err(error) => warn!(key = %key, error = %error, "Discarding unreadable cache entry"),
                },
                Ok(None) => debug!(key = %key, "Cache miss"),
                Err(error) => warn!(key = %key, error = %error, "Cache read failed, treating as miss"),
            }
        }

        let value = fetch.await?;
        match serde_json::to_value(&value) {
            Ok(payload) => {
                if let Err(error) = self.cache.set(&key, &payload, ttl).await {
                    warn!(key = %key, error = %error, "Cache write failed");
                }
            }
            Err(error) => warn!(key = %key, error = %error, "Response not cacheable"),
        }
        Ok(value)
    }
}

fn params<T: Serialize>(value: &T) -> EngineResult<Value> {
    serde_json::to_value(value)
        .map_err(|error| EngineError::validation(format!("unencodable parameters: {error}")))
}

fn encode<T: Serialize>(value: &T) -> EngineResult<Value> {
    serde_json::to_value(value)
        .map_err(|error| EngineError::upstream(format!("failed to encode response: {error}")))
}
