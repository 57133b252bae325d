//! HTTP gateway for the timesheet synchronization engine.
//!
//! Exposes a single `/sync` endpoint parameterized by an `action` query
//! field, guarded by caller authentication, plus a `/health` probe.

mod auth;
mod handlers;
mod request;
mod response;
mod state;

pub use auth::{Caller, CallerVerifier, StaticCallerVerifier, authenticate, authorize};
pub use handlers::create_router;
pub use request::ActionQuery;
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
