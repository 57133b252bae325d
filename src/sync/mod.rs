//! Synchronization engine.
//!
//! Ties the upstream gateway, the response cache, the compliance
//! calculations and the persistence sink together behind [`SyncService`].
//! Each call opens a run: a validated [`ExternalSession`] plus the
//! [`AccountRef`] every ledger call of that run is scoped to.

mod account;
mod action;
mod batch;
#[cfg(test)]
mod fakes;
mod import;
mod service;
mod session;

use crate::models::{AccountRef, ExternalSession};

pub use account::AccountResolver;
pub use action::{PeriodRange, PeriodRequest, SyncAction, SyncRequest};
pub use batch::{BatchFetcher, BatchOutcome, FetchedTotals};
pub use import::{ImportReport, ImportStage};
pub use service::{
    EmployeeTotals, PeriodSnapshot, SingleTotals, SnapshotRow, SyncService, TotalsReport,
};
pub use session::SessionManager;

/// Session and account shared by every upstream call of one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Validated upstream session.
    pub session: ExternalSession,
    /// Account the run is scoped to.
    pub account: AccountRef,
}
