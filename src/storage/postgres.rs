//! PostgreSQL totals repository.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::error::{EngineError, EngineResult};
use crate::models::{LedgerDuration, Period, PeriodTotals, TotalsSnapshot};

use super::TotalsRepository;

const UPSERT_SQL: &str = r#"
    INSERT INTO period_totals (
        period, employee_ref, employee_name,
        normal_hours, absence_hours, overtime_50_hours, overtime_100_hours,
        bank_credit, bank_debit, bank_balance, bank_balance_hours,
        raw_payload, imported_by, imported_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
    ON CONFLICT (period, employee_ref) DO UPDATE SET
        employee_name = EXCLUDED.employee_name,
        normal_hours = EXCLUDED.normal_hours,
        absence_hours = EXCLUDED.absence_hours,
        overtime_50_hours = EXCLUDED.overtime_50_hours,
        overtime_100_hours = EXCLUDED.overtime_100_hours,
        bank_credit = EXCLUDED.bank_credit,
        bank_debit = EXCLUDED.bank_debit,
        bank_balance = EXCLUDED.bank_balance,
        bank_balance_hours = EXCLUDED.bank_balance_hours,
        raw_payload = EXCLUDED.raw_payload,
        imported_by = EXCLUDED.imported_by,
        imported_at = EXCLUDED.imported_at
"#;

const SELECT_PERIOD_SQL: &str = r#"
    SELECT period, employee_ref, employee_name,
           normal_hours, absence_hours, overtime_50_hours, overtime_100_hours,
           bank_credit, bank_debit, bank_balance,
           raw_payload, imported_by, imported_at
    FROM period_totals
    WHERE period = $1
    ORDER BY employee_ref
"#;

fn persistence(context: &str, error: impl std::fmt::Display) -> EngineError {
    EngineError::Persistence {
        message: format!("{context}: {error}"),
    }
}

/// PostgreSQL implementation of the totals repository.
///
/// `bank_balance_hours` is written for dashboard queries; reads always
/// re-derive the decimal values from the stored text columns.
#[derive(Clone)]
pub struct PostgresTotalsRepository {
    pool: PgPool,
}

impl PostgresTotalsRepository {
    /// Creates a repository over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> EngineResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|error| persistence("failed to run migrations", error))
    }

    fn row_to_totals(row: &PgRow) -> EngineResult<PeriodTotals> {
        let text = |column: &str| -> EngineResult<String> {
            row.try_get::<String, _>(column)
                .map_err(|error| persistence("failed to decode period_totals row", error))
        };
        let duration = |column: &str| text(column).map(LedgerDuration::parse);

        let period: Period = text("period")?.parse()?;
        let imported_at: DateTime<Utc> = row
            .try_get("imported_at")
            .map_err(|error| persistence("failed to decode period_totals row", error))?;
        let raw_payload: serde_json::Value = row
            .try_get("raw_payload")
            .map_err(|error| persistence("failed to decode period_totals row", error))?;

        Ok(PeriodTotals {
            period,
            employee_ref: text("employee_ref")?,
            employee_name: text("employee_name")?,
            totals: TotalsSnapshot {
                normal: duration("normal_hours")?,
                absence: duration("absence_hours")?,
                overtime_50: duration("overtime_50_hours")?,
                overtime_100: duration("overtime_100_hours")?,
                bank_credit: duration("bank_credit")?,
                bank_debit: duration("bank_debit")?,
                bank_balance: duration("bank_balance")?,
            },
            raw_payload,
            imported_by: text("imported_by")?,
            imported_at,
        })
    }
}

#[async_trait]
impl TotalsRepository for PostgresTotalsRepository {
    async fn upsert(&self, rows: &[PeriodTotals]) -> EngineResult<usize> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| persistence("failed to open transaction", error))?;

        let mut written = HashSet::new();
        for row in rows {
            written.insert(row.key());
            let totals = &row.totals;
            sqlx::query(UPSERT_SQL)
                .bind(row.period.to_string())
                .bind(&row.employee_ref)
                .bind(&row.employee_name)
                .bind(totals.normal.text())
                .bind(totals.absence.text())
                .bind(totals.overtime_50.text())
                .bind(totals.overtime_100.text())
                .bind(totals.bank_credit.text())
                .bind(totals.bank_debit.text())
                .bind(totals.bank_balance.text())
                .bind(totals.bank_balance.hours())
                .bind(&row.raw_payload)
                .bind(&row.imported_by)
                .bind(row.imported_at)
                .execute(&mut *transaction)
                .await
                .map_err(|error| {
                    persistence(
                        &format!("failed to upsert totals for {}", row.employee_ref),
                        error,
                    )
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|error| persistence("failed to commit totals", error))?;

        Ok(written.len())
    }

    async fn list_period(&self, period: Period) -> EngineResult<Vec<PeriodTotals>> {
        let rows = sqlx::query(SELECT_PERIOD_SQL)
            .bind(period.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| persistence("failed to load period totals", error))?;

        rows.iter().map(Self::row_to_totals).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    async fn test_repository() -> Option<PostgresTotalsRepository> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            return None;
        };

        let pool = match PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url.as_str())
            .await
        {
            Ok(pool) => pool,
            Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
        };

        let repository = PostgresTotalsRepository::new(pool);
        if let Err(error) = repository.migrate().await {
            panic!("failed to run migrations for period totals tests: {error}");
        }

        Some(repository)
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(period: &str, employee_ref: &str, balance: &str, imported_by: &str) -> PeriodTotals {
        PeriodTotals {
            period: period.parse().unwrap(),
            employee_ref: employee_ref.to_string(),
            employee_name: format!("Employee {employee_ref}"),
            totals: TotalsSnapshot {
                normal: LedgerDuration::parse("160:00"),
                absence: LedgerDuration::empty(),
                overtime_50: LedgerDuration::parse("04:30"),
                overtime_100: LedgerDuration::empty(),
                bank_credit: LedgerDuration::parse("06:00"),
                bank_debit: LedgerDuration::parse("01:15"),
                bank_balance: LedgerDuration::parse(balance),
            },
            raw_payload: json!({ "BSaldo": balance }),
            imported_by: imported_by.to_string(),
            imported_at: Utc::now(),
        }
    }

    fn unique_ref() -> String {
        format!("test-{}", Uuid::new_v4())
    }

    async fn rows_for(
        repository: &PostgresTotalsRepository,
        period: &str,
        employee_ref: &str,
    ) -> Vec<PeriodTotals> {
        repository
            .list_period(period.parse().unwrap())
            .await
            .unwrap()
            .into_iter()
            .filter(|row| row.employee_ref == employee_ref)
            .collect()
    }

    #[tokio::test]
    async fn test_reimport_keeps_one_row_with_latest_values() {
        let Some(repository) = test_repository().await else {
            return;
        };
        let employee_ref = unique_ref();

        let first = repository
            .upsert(&[row("2025-02", &employee_ref, "10:00", "first")])
            .await
            .unwrap();
        let second = repository
            .upsert(&[row("2025-02", &employee_ref, "-22:30", "second")])
            .await
            .unwrap();
        assert_eq!((first, second), (1, 1));

        let rows = rows_for(&repository, "2025-02", &employee_ref).await;
        assert_eq!(rows.len(), 1);
        let stored = &rows[0];
        assert_eq!(stored.totals.bank_balance.text(), "-22:30");
        assert_eq!(stored.totals.bank_balance.hours(), dec("-22.5"));
        assert_eq!(stored.balance_hours(), dec("-22.5"));
        assert_eq!(stored.imported_by, "second");
        assert_eq!(stored.raw_payload, json!({ "BSaldo": "-22:30" }));
    }

    #[tokio::test]
    async fn test_columns_read_back_in_place() {
        let Some(repository) = test_repository().await else {
            return;
        };
        let employee_ref = unique_ref();
        let written = row("2025-03", &employee_ref, "03:45", "hr");

        repository.upsert(std::slice::from_ref(&written)).await.unwrap();

        let rows = rows_for(&repository, "2025-03", &employee_ref).await;
        assert_eq!(rows.len(), 1);
        let stored = &rows[0];
        assert_eq!(stored.period, written.period);
        assert_eq!(stored.employee_name, written.employee_name);
        assert_eq!(stored.totals, written.totals);
        assert_eq!(stored.totals.overtime_50.hours(), dec("4.5"));
        assert_eq!(stored.totals.bank_debit.hours(), dec("1.25"));
    }

    #[tokio::test]
    async fn test_periods_are_kept_apart() {
        let Some(repository) = test_repository().await else {
            return;
        };
        let employee_ref = unique_ref();

        repository
            .upsert(&[
                row("2025-04", &employee_ref, "01:00", "hr"),
                row("2025-05", &employee_ref, "02:00", "hr"),
            ])
            .await
            .unwrap();

        let april = rows_for(&repository, "2025-04", &employee_ref).await;
        let may = rows_for(&repository, "2025-05", &employee_ref).await;
        assert_eq!(april.len(), 1);
        assert_eq!(may.len(), 1);
        assert_eq!(april[0].totals.bank_balance.text(), "01:00");
        assert_eq!(may[0].totals.bank_balance.text(), "02:00");
    }

    #[tokio::test]
    async fn test_repeated_key_in_one_call_counts_once() {
        let Some(repository) = test_repository().await else {
            return;
        };
        let employee_ref = unique_ref();

        let written = repository
            .upsert(&[
                row("2025-06", &employee_ref, "01:00", "hr"),
                row("2025-06", &employee_ref, "05:00", "hr"),
            ])
            .await
            .unwrap();

        assert_eq!(written, 1);
        let rows = rows_for(&repository, "2025-06", &employee_ref).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].totals.bank_balance.text(), "05:00");
    }
}
