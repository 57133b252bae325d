//! Persistence sink for imported period totals.
//!
//! Rows are upserted under their (period, employee reference) key, so
//! re-importing a period overwrites rather than duplicates and a failed run
//! can simply be retried.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::error::EngineResult;
use crate::models::{Period, PeriodTotals};

pub use memory::InMemoryTotalsRepository;
pub use postgres::PostgresTotalsRepository;

/// Storage for [`PeriodTotals`] rows.
#[async_trait]
pub trait TotalsRepository: Send + Sync {
    /// Inserts or replaces each row under its (period, employee) key.
    ///
    /// Returns the number of distinct keys written; a key repeated within
    /// `rows` counts once and its last row wins.
    async fn upsert(&self, rows: &[PeriodTotals]) -> EngineResult<usize>;

    /// Returns every row of `period`, ordered by employee reference.
    async fn list_period(&self, period: Period) -> EngineResult<Vec<PeriodTotals>>;
}
