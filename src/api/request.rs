//! Request types for the gateway.

use serde::{Deserialize, Serialize};

/// Query string of the `/sync` endpoint.
///
/// The action-specific parameters travel in the JSON body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionQuery {
    /// Action name, e.g. `single-period-totals`.
    pub action: String,
    /// Forces a cache miss on read actions. Requires an administrator.
    #[serde(default)]
    pub refresh: bool,
}
