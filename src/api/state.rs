//! Application state for the gateway.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::sync::SyncService;

use super::auth::CallerVerifier;

/// Shared application state.
///
/// Holds the sync service and the caller verifier. Cloning is cheap; both
/// are reference counted.
#[derive(Clone)]
pub struct AppState {
    service: Arc<SyncService>,
    verifier: Arc<dyn CallerVerifier>,
}

impl AppState {
    /// Creates the state from its two collaborators.
    pub fn new(service: Arc<SyncService>, verifier: Arc<dyn CallerVerifier>) -> Self {
        Self { service, verifier }
    }

    /// Returns the sync service.
    pub fn service(&self) -> &SyncService {
        &self.service
    }

    /// Returns the caller verifier.
    pub fn verifier(&self) -> &dyn CallerVerifier {
        self.verifier.as_ref()
    }
}
