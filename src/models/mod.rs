//! Core data models for the timesheet synchronization engine.
//!
//! This module contains the domain models shared by the upstream gateway,
//! the batch fetcher, the compliance calculations and the persistence sink.

mod employee;
mod period;
mod period_totals;
mod session;

pub use employee::Employee;
pub use period::Period;
pub use period_totals::{LedgerDuration, PeriodTotals, TotalsSnapshot};
pub use session::{AccountRef, Credentials, ExternalSession};
