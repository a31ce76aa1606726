//! Registered player record.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::PlayerId;
use crate::error::LedgerError;

/// Maximum display name length in characters.
pub const MAX_NAME_LEN: usize = 100;

/// A player known to the registry.
///
/// Immutable after registration; the only lifecycle event is deletion,
/// which the ledger refuses while any game references the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    /// Unique player identifier.
    pub id: PlayerId,
    /// Display name, trimmed and non-empty.
    pub name: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Registers a new player with a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidPlayerName`] if the trimmed name is
    /// empty or longer than [`MAX_NAME_LEN`] characters.
    pub fn new(name: &str) -> Result<Self, LedgerError> {
        let name = validate_name(name)?;
        Ok(Self {
            id: PlayerId::new(),
            name,
            created_at: Utc::now(),
        })
    }
}

fn validate_name(raw: &str) -> Result<String, LedgerError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(LedgerError::InvalidPlayerName(
            "name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(LedgerError::InvalidPlayerName(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}
