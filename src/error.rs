//! Service error types with HTTP status code mapping.
//!
//! [`LedgerError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::settlement::SettlementError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2004,
///     "message": "player 6f1c... is referenced by 3 game(s)",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`LedgerError`] code ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Stake is not a positive two-decimal amount within range.
    #[error("invalid stake: {0}")]
    InvalidStake(String),

    /// Player name is blank or too long.
    #[error("invalid player name: {0}")]
    InvalidPlayerName(String),

    /// The declared winner did not play in the game.
    #[error("winner {winner} is not a participant of game {game_id}")]
    WinnerNotParticipant {
        /// Game being finished.
        game_id: uuid::Uuid,
        /// Rejected winner.
        winner: uuid::Uuid,
    },

    /// Participants or breaker do not form a valid pairing.
    #[error("invalid pairing: {0}")]
    InvalidPairing(String),

    /// Player with the given ID was not found.
    #[error("player not found: {0}")]
    PlayerNotFound(uuid::Uuid),

    /// Game with the given ID was not found.
    #[error("game not found: {0}")]
    GameNotFound(uuid::Uuid),

    /// The game already has a winner.
    #[error("game already finished: {0}")]
    GameAlreadyFinished(uuid::Uuid),

    /// The player still appears in recorded games and cannot be deleted.
    #[error("player {player_id} is referenced by {games} game(s)")]
    PlayerReferenced {
        /// Player whose deletion was refused.
        player_id: uuid::Uuid,
        /// Number of games referencing the player.
        games: usize,
    },

    /// The ledger contains data the settlement engine refuses to fold.
    #[error("data integrity fault: {0}")]
    DataIntegrity(#[from] SettlementError),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidStake(_) => 1002,
            Self::InvalidPlayerName(_) => 1003,
            Self::WinnerNotParticipant { .. } => 1004,
            Self::InvalidPairing(_) => 1005,
            Self::PlayerNotFound(_) => 2001,
            Self::GameNotFound(_) => 2002,
            Self::GameAlreadyFinished(_) => 2003,
            Self::PlayerReferenced { .. } => 2004,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::DataIntegrity(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidStake(_)
            | Self::InvalidPlayerName(_)
            | Self::WinnerNotParticipant { .. }
            | Self::InvalidPairing(_) => StatusCode::BAD_REQUEST,
            Self::PlayerNotFound(_) | Self::GameNotFound(_) => StatusCode::NOT_FOUND,
            Self::GameAlreadyFinished(_) | Self::PlayerReferenced { .. } => StatusCode::CONFLICT,
            Self::DataIntegrity(_) | Self::PersistenceError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::GameId;

    #[test]
    fn codes_and_statuses_line_up_by_range() {
        let cases = [
            (LedgerError::InvalidStake("x".into()), 1002, StatusCode::BAD_REQUEST),
            (LedgerError::PlayerNotFound(uuid::Uuid::nil()), 2001, StatusCode::NOT_FOUND),
            (LedgerError::GameAlreadyFinished(uuid::Uuid::nil()), 2003, StatusCode::CONFLICT),
            (
                LedgerError::PlayerReferenced {
                    player_id: uuid::Uuid::nil(),
                    games: 2,
                },
                2004,
                StatusCode::CONFLICT,
            ),
            (LedgerError::PersistenceError("down".into()), 3001, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, code, status) in cases {
            assert_eq!(err.error_code(), code);
            assert_eq!(err.status_code(), status);
        }
    }

    #[test]
    fn settlement_faults_become_data_integrity() {
        let game_id = GameId::new();
        let err: LedgerError = SettlementError::MissingWinner { game_id }.into();
        assert_eq!(err.error_code(), 3002);
        assert!(err.to_string().contains(&game_id.to_string()));
    }

    #[test]
    fn response_carries_status() {
        let response = LedgerError::GameNotFound(uuid::Uuid::nil()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
