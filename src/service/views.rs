//! Read models with player references resolved to full records.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::{Game, Player, PlayerId};
use crate::error::LedgerError;
use crate::settlement::{Debt, HeadToHead};

/// A game together with the records of everyone it references.
#[derive(Debug, Clone)]
pub struct GameView {
    /// The game record.
    pub game: Game,
    /// First participant.
    pub player1: Player,
    /// Second participant.
    pub player2: Player,
    /// Participant who broke.
    pub breaker: Player,
    /// Winner once finished.
    pub winner: Option<Player>,
}

/// A debt with both parties resolved.
#[derive(Debug, Clone)]
pub struct DebtView {
    /// Debtor.
    pub from: Player,
    /// Creditor.
    pub to: Player,
    /// Amount owed.
    pub amount: Decimal,
}

/// A head-to-head record with both players resolved.
#[derive(Debug, Clone)]
pub struct HeadToHeadView {
    /// First player as requested.
    pub player1: Player,
    /// Second player as requested.
    pub player2: Player,
    /// Counts between the two.
    pub record: HeadToHead,
}

/// Player lookup table built from one registry read.
#[derive(Debug, Default)]
pub(crate) struct Directory(HashMap<PlayerId, Player>);

impl Directory {
    pub(crate) fn new(players: impl IntoIterator<Item = Player>) -> Self {
        Self(players.into_iter().map(|p| (p.id, p)).collect())
    }

    /// Referenced players can never be deleted, so a miss is an integrity
    /// fault rather than a 404.
    pub(crate) fn get(&self, id: PlayerId) -> Result<Player, LedgerError> {
        self.0.get(&id).cloned().ok_or_else(|| {
            LedgerError::Internal(format!("player {id} referenced but not registered"))
        })
    }

    pub(crate) fn game_view(&self, game: Game) -> Result<GameView, LedgerError> {
        Ok(GameView {
            player1: self.get(game.player1)?,
            player2: self.get(game.player2)?,
            breaker: self.get(game.breaker)?,
            winner: game.winner.map(|w| self.get(w)).transpose()?,
            game,
        })
    }

    pub(crate) fn debt_view(&self, debt: &Debt) -> Result<DebtView, LedgerError> {
        Ok(DebtView {
            from: self.get(debt.from)?,
            to: self.get(debt.to)?,
            amount: debt.amount,
        })
    }
}
