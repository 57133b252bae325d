//! In-memory totals repository.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::EngineResult;
use crate::models::{Period, PeriodTotals};

use super::TotalsRepository;

/// Totals repository held in process memory.
#[derive(Default)]
pub struct InMemoryTotalsRepository {
    rows: RwLock<HashMap<(Period, String), PeriodTotals>>,
}

impl InMemoryTotalsRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TotalsRepository for InMemoryTotalsRepository {
    async fn upsert(&self, rows: &[PeriodTotals]) -> EngineResult<usize> {
        let mut stored = self.rows.write().await;
        let mut written = HashSet::new();
        for row in rows {
            written.insert(row.key());
            stored.insert((row.period, row.employee_ref.clone()), row.clone());
        }
        Ok(written.len())
    }

    async fn list_period(&self, period: Period) -> EngineResult<Vec<PeriodTotals>> {
        let stored = self.rows.read().await;
        let mut rows: Vec<PeriodTotals> = stored
            .values()
            .filter(|row| row.period == period)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.employee_ref.cmp(&b.employee_ref));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LedgerDuration, TotalsSnapshot};
    use chrono::Utc;
    use serde_json::json;

    fn row(period: &str, employee_ref: &str, balance: &str) -> PeriodTotals {
        PeriodTotals {
            period: period.parse().unwrap(),
            employee_ref: employee_ref.to_string(),
            employee_name: format!("Employee {employee_ref}"),
            totals: TotalsSnapshot {
                normal: LedgerDuration::empty(),
                absence: LedgerDuration::empty(),
                overtime_50: LedgerDuration::empty(),
                overtime_100: LedgerDuration::empty(),
                bank_credit: LedgerDuration::empty(),
                bank_debit: LedgerDuration::empty(),
                bank_balance: LedgerDuration::parse(balance),
            },
            raw_payload: json!({ "BSaldo": balance }),
            imported_by: "tester".to_string(),
            imported_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_reimport_overwrites_existing_row() {
        let repository = InMemoryTotalsRepository::new();
        repository.upsert(&[row("2025-02", "111", "01:00")]).await.unwrap();
        repository.upsert(&[row("2025-02", "111", "05:30")]).await.unwrap();

        let rows = repository.list_period("2025-02".parse().unwrap()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].totals.bank_balance.text(), "05:30");
    }

    #[tokio::test]
    async fn test_repeated_key_in_one_call_counts_once() {
        let repository = InMemoryTotalsRepository::new();
        let written = repository
            .upsert(&[
                row("2025-02", "111", "01:00"),
                row("2025-02", "111", "02:00"),
                row("2025-02", "222", "03:00"),
            ])
            .await
            .unwrap();

        assert_eq!(written, 2);
        let rows = repository.list_period("2025-02".parse().unwrap()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].totals.bank_balance.text(), "02:00");
    }

    #[tokio::test]
    async fn test_periods_are_kept_apart() {
        let repository = InMemoryTotalsRepository::new();
        repository
            .upsert(&[
                row("2025-02", "222", "01:00"),
                row("2025-02", "111", "01:00"),
                row("2025-03", "111", "02:00"),
            ])
            .await
            .unwrap();

        let february = repository.list_period("2025-02".parse().unwrap()).await.unwrap();
        let refs: Vec<&str> = february.iter().map(|row| row.employee_ref.as_str()).collect();
        assert_eq!(refs, vec!["111", "222"]);
    }
}
