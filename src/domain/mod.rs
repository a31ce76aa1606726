//! Domain layer: identifiers, players, games, and the ledger.
//!
//! This module holds the only persisted entities of the system (players
//! and games) together with the [`Ledger`] that stores them. Everything
//! derived from them lives in [`crate::settlement`].

pub mod game;
pub mod ids;
pub mod ledger;
pub mod player;
pub mod stake;

pub use game::{Game, GameStatus};
pub use ids::{GameId, PlayerId};
pub use ledger::{Ledger, LedgerSnapshot};
pub use player::Player;
pub use stake::Stake;
