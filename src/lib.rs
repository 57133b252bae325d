//! Timesheet synchronization and banked-hours compliance engine.
//!
//! This crate pulls per-employee time-ledger totals from an external
//! time-tracking provider, caches them to bound calls against the
//! rate-limited upstream, persists period snapshots, and derives compliance
//! risk tiers, overtime liability and compensation deadlines.

#![warn(missing_docs)]

pub mod api;
pub mod cache;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod sync;
pub mod upstream;
