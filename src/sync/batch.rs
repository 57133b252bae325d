//! Bounded-concurrency fan-out of per-employee totals calls.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::BatchConfig;
use crate::error::EngineResult;
use crate::models::{Employee, TotalsSnapshot};
use crate::upstream::parse::parse_totals;
use crate::upstream::{TotalsQuery, UpstreamApi};

use super::RunContext;

/// Totals of one employee fetched during a batch.
#[derive(Debug, Clone)]
pub struct FetchedTotals {
    /// The employee as listed upstream.
    pub employee: Employee,
    /// The identifier the totals were fetched under.
    pub employee_ref: String,
    /// Parsed totals.
    pub totals: TotalsSnapshot,
    /// The raw provider payload.
    pub raw: Value,
}

/// Result of a batch fetch.
///
/// `rows.len() + failures == attempted` always holds. Employees without an
/// identifier are counted in `skipped`, repeated identifiers in
/// `duplicates`; neither is attempted.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Successfully fetched and parsed totals, in no particular order.
    pub rows: Vec<FetchedTotals>,
    /// Number of per-employee calls that failed.
    pub failures: usize,
    /// Number of per-employee calls issued.
    pub attempted: usize,
    /// Number of employees skipped for lack of an identifier.
    pub skipped: usize,
    /// Number of employees whose identifier was already listed.
    pub duplicates: usize,
}

/// Fetches per-employee totals in fixed-size windows.
///
/// At most `window_size` calls are in flight at once. After a window
/// completes the fetcher sleeps for the configured pause before starting the
/// next one. A failed call is logged and counted; it never aborts the batch.
pub struct BatchFetcher {
    upstream: Arc<dyn UpstreamApi>,
    window_size: usize,
    pause: Duration,
}

impl BatchFetcher {
    /// Creates a fetcher with the configured window and pause.
    pub fn new(upstream: Arc<dyn UpstreamApi>, config: &BatchConfig) -> Self {
        Self {
            upstream,
            window_size: config.window_size.max(1),
            pause: Duration::from_millis(config.pause_ms),
        }
    }

    /// Fetches the totals of every identified employee over the date range.
    pub async fn fetch_totals(
        &self,
        context: &RunContext,
        employees: &[Employee],
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> BatchOutcome {
        let identified: Vec<(&Employee, &str)> = employees
            .iter()
            .filter_map(|employee| employee.reference().map(|reference| (employee, reference)))
            .collect();

        // First listing of an identifier wins.
        let mut seen = HashSet::new();
        let targets: Vec<(&Employee, &str)> = identified
            .iter()
            .copied()
            .filter(|(_, reference)| seen.insert(*reference))
            .collect();

        let mut outcome = BatchOutcome {
            skipped: employees.len() - identified.len(),
            duplicates: identified.len() - targets.len(),
            ..BatchOutcome::default()
        };
        if outcome.skipped > 0 {
            debug!(
                skipped = outcome.skipped,
                "Skipping employees without an identifier"
            );
        }
        if outcome.duplicates > 0 {
            warn!(
                duplicates = outcome.duplicates,
                "Upstream listed the same identifier more than once"
            );
        }

        for (index, window) in targets.chunks(self.window_size).enumerate() {
            if index > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }

            let calls = window.iter().map(|(employee, reference)| {
                self.fetch_one(context, employee, reference, period_start, period_end)
            });

            for (result, (_, reference)) in join_all(calls).await.into_iter().zip(window) {
                outcome.attempted += 1;
                match result {
                    Ok(row) => outcome.rows.push(row),
                    Err(error) => {
                        outcome.failures += 1;
                        warn!(employee_ref = %reference, error = %error, "Totals fetch failed");
                    }
                }
            }

            debug!(
                window = index + 1,
                size = window.len(),
                "Batch window complete"
            );
        }

        info!(
            attempted = outcome.attempted,
            succeeded = outcome.rows.len(),
            failures = outcome.failures,
            skipped = outcome.skipped,
            duplicates = outcome.duplicates,
            "Batch fetch finished"
        );
        outcome
    }

    async fn fetch_one(
        &self,
        context: &RunContext,
        employee: &Employee,
        reference: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> EngineResult<FetchedTotals> {
        let query = TotalsQuery {
            employee_ref: reference.to_string(),
            period_start,
            period_end,
        };
        let raw = self
            .upstream
            .fetch_totals(&context.session, &context.account, &query)
            .await?;
        let totals = parse_totals(&raw)?;

        Ok(FetchedTotals {
            employee: employee.clone(),
            employee_ref: query.employee_ref,
            totals,
            raw,
        })
    }
}
