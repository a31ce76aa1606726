//! Game record and its `active -> finished` lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{GameId, PlayerId, Stake};
use crate::error::LedgerError;

/// Lifecycle state of a game.
///
/// `Finished` is terminal: a finished game cannot be reopened or have its
/// winner changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Being played; no winner yet.
    Active,
    /// Winner recorded; participates in settlement.
    Finished,
}

impl GameStatus {
    /// Returns the status as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Finished => "finished",
        }
    }

    /// Parses a stored status string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }
}

/// A wagered two-player game.
///
/// Built through [`Game::new`], which enforces distinct participants and a
/// participating breaker. Records hydrated from storage are trusted as-is
/// and re-validated by the settlement fold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Game {
    /// Unique game identifier.
    pub id: GameId,
    /// First participant.
    pub player1: PlayerId,
    /// Second participant, distinct from `player1`.
    pub player2: PlayerId,
    /// Participant who broke. Informational only.
    pub breaker: PlayerId,
    /// Amount moved from loser to winner.
    pub stake: Stake,
    /// Lifecycle state.
    pub status: GameStatus,
    /// Winner, set exactly once on finish.
    pub winner: Option<PlayerId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Set on the `active -> finished` transition.
    pub finished_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Starts a new active game.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidPairing`] if both participants are the
    /// same player or the breaker is not one of them.
    pub fn new(
        player1: PlayerId,
        player2: PlayerId,
        breaker: PlayerId,
        stake: Stake,
    ) -> Result<Self, LedgerError> {
        if player1 == player2 {
            return Err(LedgerError::InvalidPairing(
                "a player cannot play against themselves".to_string(),
            ));
        }
        if breaker != player1 && breaker != player2 {
            return Err(LedgerError::InvalidPairing(format!(
                "breaker {breaker} is not a participant"
            )));
        }
        Ok(Self {
            id: GameId::new(),
            player1,
            player2,
            breaker,
            stake,
            status: GameStatus::Active,
            winner: None,
            created_at: Utc::now(),
            finished_at: None,
        })
    }

    /// Returns `true` if the player is one of the two participants.
    #[must_use]
    pub fn involves(&self, player: PlayerId) -> bool {
        self.player1 == player || self.player2 == player
    }

    /// Returns the other participant, or `None` if `player` did not play.
    #[must_use]
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        if self.player1 == player {
            Some(self.player2)
        } else if self.player2 == player {
            Some(self.player1)
        } else {
            None
        }
    }

    /// Returns `true` once a winner has been recorded.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    /// Records the winner and moves the game to [`GameStatus::Finished`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::GameAlreadyFinished`] if the game is not
    /// active, or [`LedgerError::WinnerNotParticipant`] if `winner` did not
    /// play in this game.
    pub fn finish(&mut self, winner: PlayerId, at: DateTime<Utc>) -> Result<(), LedgerError> {
        if self.is_finished() {
            return Err(LedgerError::GameAlreadyFinished(*self.id.as_uuid()));
        }
        if !self.involves(winner) {
            return Err(LedgerError::WinnerNotParticipant {
                game_id: *self.id.as_uuid(),
                winner: *winner.as_uuid(),
            });
        }
        self.status = GameStatus::Finished;
        self.winner = Some(winner);
        self.finished_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn stake() -> Stake {
        let Ok(stake) = Stake::new(Decimal::from(100)) else {
            panic!("valid stake");
        };
        stake
    }

    fn make_game() -> (Game, PlayerId, PlayerId) {
        let (a, b) = (PlayerId::new(), PlayerId::new());
        let Ok(game) = Game::new(a, b, a, stake()) else {
            panic!("valid game");
        };
        (game, a, b)
    }

    #[test]
    fn new_game_is_active_without_winner() {
        let (game, _, _) = make_game();
        assert_eq!(game.status, GameStatus::Active);
        assert!(game.winner.is_none());
        assert!(game.finished_at.is_none());
    }

    #[test]
    fn self_play_is_rejected() {
        let a = PlayerId::new();
        assert!(matches!(
            Game::new(a, a, a, stake()),
            Err(LedgerError::InvalidPairing(_))
        ));
    }

    #[test]
    fn outside_breaker_is_rejected() {
        let result = Game::new(PlayerId::new(), PlayerId::new(), PlayerId::new(), stake());
        assert!(matches!(result, Err(LedgerError::InvalidPairing(_))));
    }

    #[test]
    fn finish_records_winner_once() {
        let (mut game, _, b) = make_game();
        let now = Utc::now();
        assert!(game.finish(b, now).is_ok());
        assert_eq!(game.status, GameStatus::Finished);
        assert_eq!(game.winner, Some(b));
        assert_eq!(game.finished_at, Some(now));
    }

    #[test]
    fn finishing_twice_is_rejected() {
        let (mut game, a, b) = make_game();
        assert!(game.finish(a, Utc::now()).is_ok());
        assert!(matches!(
            game.finish(b, Utc::now()),
            Err(LedgerError::GameAlreadyFinished(_))
        ));
        assert_eq!(game.winner, Some(a));
    }

    #[test]
    fn outsider_cannot_win() {
        let (mut game, _, _) = make_game();
        let result = game.finish(PlayerId::new(), Utc::now());
        assert!(matches!(
            result,
            Err(LedgerError::WinnerNotParticipant { .. })
        ));
        assert!(!game.is_finished());
    }

    #[test]
    fn opponent_lookup() {
        let (game, a, b) = make_game();
        assert_eq!(game.opponent_of(a), Some(b));
        assert_eq!(game.opponent_of(b), Some(a));
        assert_eq!(game.opponent_of(PlayerId::new()), None);
    }

    #[test]
    fn status_string_round_trip() {
        for status in [GameStatus::Active, GameStatus::Finished] {
            assert_eq!(GameStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(GameStatus::parse("paused"), None);
    }
}
