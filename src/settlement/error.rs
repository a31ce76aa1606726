//! Data-integrity faults detected while folding the ledger.

use rust_decimal::Decimal;

use crate::domain::{GameId, PlayerId};

/// A malformed record or broken invariant found by the settlement engine.
///
/// Every variant names the offending game or player. None of these are
/// ever auto-corrected: guessing a side would corrupt the balances.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettlementError {
    /// A finished game carries no winner.
    #[error("finished game {game_id} has no winner")]
    MissingWinner {
        /// Offending game.
        game_id: GameId,
    },

    /// A finished game names a winner who did not play in it.
    #[error("winner {winner} of game {game_id} is not a participant")]
    WinnerNotParticipant {
        /// Offending game.
        game_id: GameId,
        /// Recorded winner.
        winner: PlayerId,
    },

    /// Both participants of a game are the same player.
    #[error("game {game_id} pairs player {player_id} against themselves")]
    SelfPlay {
        /// Offending game.
        game_id: GameId,
        /// The duplicated participant.
        player_id: PlayerId,
    },

    /// A game references a player missing from the registry.
    #[error("game {game_id} references unknown player {player_id}")]
    UnknownPlayer {
        /// Offending game.
        game_id: GameId,
        /// Missing player.
        player_id: PlayerId,
    },

    /// Accumulating the stake of a game overflowed the decimal range.
    #[error("amount overflow while settling game {game_id}")]
    AmountOverflow {
        /// Game whose stake could not be added.
        game_id: GameId,
    },

    /// Summing a player's debts overflowed the decimal range.
    #[error("amount overflow while totalling debts of player {player_id}")]
    TotalOverflow {
        /// Player whose totals overflowed.
        player_id: PlayerId,
    },

    /// The debt set disagrees with a player's balance.
    #[error("debts of player {player_id} net to {net}, balance is {balance}")]
    ConservationViolated {
        /// Player whose position disagrees.
        player_id: PlayerId,
        /// Balance from the stats view.
        balance: Decimal,
        /// Net position implied by the debt set.
        net: Decimal,
    },
}
