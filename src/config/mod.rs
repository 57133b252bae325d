//! Configuration loading and management for the synchronization engine.
//!
//! This module loads the engine configuration from YAML files: provider
//! endpoints and batch pacing, compliance constants, and the caller list.
//!
//! # Example
//!
//! ```no_run
//! use timesheet_sync::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/default").unwrap();
//! println!("Upstream: {}", loader.config().upstream().api_url);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AccessConfig, BatchConfig, CallerEntry, ComplianceConfig, ComplianceFile, SyncConfig,
    UpstreamConfig, UpstreamFile,
};
