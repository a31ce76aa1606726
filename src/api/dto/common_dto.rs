//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Acknowledgement body for liveness and delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusMessage {
    /// Always `"ok"` on success.
    pub status: String,
    /// Human-readable message.
    pub message: String,
}

impl StatusMessage {
    /// Builds an `"ok"` acknowledgement.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }
}

/// Query parameters for `GET /games`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GamesQuery {
    /// Maximum number of games to return. Clamped to the configured maximum.
    pub limit: Option<usize>,
}
