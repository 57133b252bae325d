//! Period import: the only action that writes to the persistence sink.
//!
//! A run moves through a fixed sequence of stages:
//!
//! ```text
//! Idle → SessionAcquired → AccountResolved → EmployeesListed
//!      → BatchFetching → Persisting → Done
//! ```
//!
//! Any fatal error (configuration, authentication, upstream listing or
//! persistence) ends the run in `Failed`. Per-employee failures during
//! `BatchFetching` are not fatal; they are counted and reported with `Done`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Period, PeriodTotals};
use crate::upstream::parse::parse_employees;

use super::{RunContext, SyncService};

/// Stage of an import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStage {
    /// Nothing has happened yet.
    Idle,
    /// A validated upstream session is held.
    SessionAcquired,
    /// The ledger account is known.
    AccountResolved,
    /// The employee listing has been fetched.
    EmployeesListed,
    /// Per-employee totals are being fetched.
    BatchFetching,
    /// Rows are being upserted.
    Persisting,
    /// The run finished; partial failures may have been reported.
    Done,
    /// The run hit a fatal error.
    Failed,
}

impl ImportStage {
    /// The stage following this one on the success path.
    ///
    /// Terminal stages have no successor.
    pub fn next(self) -> Option<ImportStage> {
        match self {
            ImportStage::Idle => Some(ImportStage::SessionAcquired),
            ImportStage::SessionAcquired => Some(ImportStage::AccountResolved),
            ImportStage::AccountResolved => Some(ImportStage::EmployeesListed),
            ImportStage::EmployeesListed => Some(ImportStage::BatchFetching),
            ImportStage::BatchFetching => Some(ImportStage::Persisting),
            ImportStage::Persisting => Some(ImportStage::Done),
            ImportStage::Done | ImportStage::Failed => None,
        }
    }

    /// Whether the run can no longer change stage.
    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

/// Summary returned by the import action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Rows written to the sink.
    pub imported: usize,
    /// Per-employee fetch failures.
    pub errors: usize,
    /// Employees listed upstream.
    pub total: usize,
    /// The imported period.
    pub period: Period,
}

/// Tracks the stage of one run and logs every transition.
#[derive(Debug)]
struct ImportRun {
    id: Uuid,
    period: Period,
    stage: ImportStage,
}

impl ImportRun {
    fn start(period: Period) -> Self {
        let run = Self {
            id: Uuid::new_v4(),
            period,
            stage: ImportStage::Idle,
        };
        info!(run_id = %run.id, period = %period, "Import run started");
        run
    }

    fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            info!(run_id = %self.id, period = %self.period, from = ?self.stage, to = ?next, "Import stage");
            self.stage = next;
        }
    }

    fn fail(&mut self, cause: &EngineError) {
        error!(
            run_id = %self.id,
            period = %self.period,
            stage = ?self.stage,
            error = %cause,
            "Import run failed"
        );
        self.stage = ImportStage::Failed;
    }
}

impl SyncService {
    /// Imports every employee's totals for `period` into the sink.
    ///
    /// Bypasses the response cache. Safe to retry: rows are upserted under
    /// their (period, employee) key.
    pub async fn import(&self, period: Period, imported_by: &str) -> EngineResult<ImportReport> {
        let mut run = ImportRun::start(period);
        match self.run_import(&mut run, imported_by).await {
            Ok(report) => {
                run.advance();
                info!(
                    run_id = %run.id,
                    period = %period,
                    imported = report.imported,
                    errors = report.errors,
                    total = report.total,
                    "Import run finished"
                );
                Ok(report)
            }
            Err(cause) => {
                run.fail(&cause);
                Err(cause)
            }
        }
    }

    async fn run_import(&self, run: &mut ImportRun, imported_by: &str) -> EngineResult<ImportReport> {
        let period = run.period;

        let session = self.sessions.acquire().await?;
        run.advance();

        let account = self
            .accounts
            .resolve(self.upstream.as_ref(), &session)
            .await?;
        run.advance();
        let context = RunContext { session, account };

        let listing = self
            .upstream
            .list_employees(&context.session, &context.account)
            .await?;
        let employees = parse_employees(&listing)?;
        run.advance();

        run.advance();
        let outcome = self
            .batch
            .fetch_totals(&context, &employees, period.first_day(), period.last_day())
            .await;

        run.advance();
        let imported_at = Utc::now();
        let rows: Vec<PeriodTotals> = outcome
            .rows
            .into_iter()
            .map(|fetched| PeriodTotals {
                period,
                employee_ref: fetched.employee_ref,
                employee_name: fetched.employee.name,
                totals: fetched.totals,
                raw_payload: fetched.raw,
                imported_by: imported_by.to_string(),
                imported_at,
            })
            .collect();
        let imported = self.repository.upsert(&rows).await?;

        Ok(ImportReport {
            imported,
            errors: outcome.failures,
            total: employees.len(),
            period,
        })
    }
}
