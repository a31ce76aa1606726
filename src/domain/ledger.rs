//! Player registry and game ledger behind a single lock.
//!
//! [`Ledger`] keeps players and games in one `RwLock`-protected state so
//! that a reader always observes a consistent snapshot: a settlement pass
//! can never see some games before an update and others after it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{Game, GameId, Player, PlayerId};
use crate::error::LedgerError;

#[derive(Debug, Default)]
struct LedgerState {
    players: HashMap<PlayerId, Player>,
    games: HashMap<GameId, Game>,
}

impl LedgerState {
    fn player(&self, id: PlayerId) -> Result<&Player, LedgerError> {
        self.players
            .get(&id)
            .ok_or(LedgerError::PlayerNotFound(*id.as_uuid()))
    }

    fn references(&self, id: PlayerId) -> usize {
        self.games.values().filter(|g| g.involves(id)).count()
    }

    fn check_removable(&self, id: PlayerId) -> Result<&Player, LedgerError> {
        let player = self.player(id)?;
        let games = self.references(id);
        if games > 0 {
            return Err(LedgerError::PlayerReferenced {
                player_id: *id.as_uuid(),
                games,
            });
        }
        Ok(player)
    }

    fn check_participants(&self, game: &Game) -> Result<(), LedgerError> {
        self.player(game.player1)?;
        self.player(game.player2)?;
        Ok(())
    }
}

/// Consistent copy of the registry and the finished games.
///
/// This is the only input the settlement engine ever sees.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    /// Every registered player.
    pub players: Vec<Player>,
    /// Every finished game.
    pub games: Vec<Game>,
}

/// In-memory source of truth for players and games.
///
/// # Concurrency
///
/// - Readers share the lock; a snapshot is taken under one read guard.
/// - Writers are exclusive. The service layer additionally serialises
///   its validate-persist-apply sequences so checks stay valid until the
///   write lands.
#[derive(Debug, Default)]
pub struct Ledger {
    state: RwLock<LedgerState>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from previously persisted records.
    #[must_use]
    pub fn restore(players: Vec<Player>, games: Vec<Game>) -> Self {
        let state = LedgerState {
            players: players.into_iter().map(|p| (p.id, p)).collect(),
            games: games.into_iter().map(|g| (g.id, g)).collect(),
        };
        Self {
            state: RwLock::new(state),
        }
    }

    /// Registers a player.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] if the id is already taken
    /// (should never happen with UUID v4).
    pub async fn insert_player(&self, player: Player) -> Result<PlayerId, LedgerError> {
        let id = player.id;
        let mut state = self.state.write().await;
        if state.players.contains_key(&id) {
            return Err(LedgerError::InvalidRequest(format!(
                "player {id} already exists"
            )));
        }
        state.players.insert(id, player);
        Ok(id)
    }

    /// Returns a copy of the player record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PlayerNotFound`] for an unknown id.
    pub async fn player(&self, id: PlayerId) -> Result<Player, LedgerError> {
        self.state.read().await.player(id).cloned()
    }

    /// Returns all players sorted by name, then id.
    pub async fn players(&self) -> Vec<Player> {
        let state = self.state.read().await;
        let mut players: Vec<Player> = state.players.values().cloned().collect();
        players.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        players
    }

    /// Checks that a player exists and no game references them.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PlayerNotFound`] or
    /// [`LedgerError::PlayerReferenced`].
    pub async fn check_player_removable(&self, id: PlayerId) -> Result<(), LedgerError> {
        self.state.read().await.check_removable(id).map(|_| ())
    }

    /// Removes an unreferenced player, returning the record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PlayerNotFound`] or
    /// [`LedgerError::PlayerReferenced`].
    pub async fn remove_player(&self, id: PlayerId) -> Result<Player, LedgerError> {
        let mut state = self.state.write().await;
        state.check_removable(id)?;
        state
            .players
            .remove(&id)
            .ok_or(LedgerError::PlayerNotFound(*id.as_uuid()))
    }

    /// Checks that both participants of a new game are registered.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PlayerNotFound`] naming the missing player.
    pub async fn check_new_game(&self, game: &Game) -> Result<(), LedgerError> {
        self.state.read().await.check_participants(game)
    }

    /// Appends a game to the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PlayerNotFound`] if a participant is unknown,
    /// or [`LedgerError::InvalidRequest`] on a duplicate id.
    pub async fn insert_game(&self, game: Game) -> Result<GameId, LedgerError> {
        let id = game.id;
        let mut state = self.state.write().await;
        state.check_participants(&game)?;
        if state.games.contains_key(&id) {
            return Err(LedgerError::InvalidRequest(format!(
                "game {id} already exists"
            )));
        }
        state.games.insert(id, game);
        Ok(id)
    }

    /// Returns a copy of the game record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::GameNotFound`] for an unknown id.
    pub async fn game(&self, id: GameId) -> Result<Game, LedgerError> {
        let state = self.state.read().await;
        state
            .games
            .get(&id)
            .cloned()
            .ok_or(LedgerError::GameNotFound(*id.as_uuid()))
    }

    /// Returns up to `limit` games, most recently created first.
    pub async fn recent_games(&self, limit: usize) -> Vec<Game> {
        let state = self.state.read().await;
        let mut games: Vec<Game> = state.games.values().cloned().collect();
        sort_newest_first(&mut games);
        games.truncate(limit);
        games
    }

    /// Returns all active games, most recently created first.
    pub async fn active_games(&self) -> Vec<Game> {
        let state = self.state.read().await;
        let mut games: Vec<Game> = state
            .games
            .values()
            .filter(|g| !g.is_finished())
            .cloned()
            .collect();
        sort_newest_first(&mut games);
        games
    }

    /// Returns the finished version of a stored game without storing it.
    ///
    /// # Errors
    ///
    /// Same as [`Ledger::record_finish`].
    pub async fn preview_finish(
        &self,
        id: GameId,
        winner: PlayerId,
        at: DateTime<Utc>,
    ) -> Result<Game, LedgerError> {
        let mut game = self.game(id).await?;
        game.finish(winner, at)?;
        Ok(game)
    }

    /// Finishes a stored game in place and returns the updated record.
    ///
    /// Only the status, winner and finish time change; participants and
    /// stake stay as created.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::GameNotFound`] if the game is unknown,
    /// [`LedgerError::GameAlreadyFinished`] if it already has a winner, or
    /// [`LedgerError::WinnerNotParticipant`] if `winner` did not play.
    pub async fn record_finish(
        &self,
        id: GameId,
        winner: PlayerId,
        at: DateTime<Utc>,
    ) -> Result<Game, LedgerError> {
        let mut state = self.state.write().await;
        let stored = state
            .games
            .get_mut(&id)
            .ok_or(LedgerError::GameNotFound(*id.as_uuid()))?;
        stored.finish(winner, at)?;
        Ok(stored.clone())
    }

    /// Removes a game, returning the record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::GameNotFound`] for an unknown id.
    pub async fn remove_game(&self, id: GameId) -> Result<Game, LedgerError> {
        self.state
            .write()
            .await
            .games
            .remove(&id)
            .ok_or(LedgerError::GameNotFound(*id.as_uuid()))
    }

    /// Takes a consistent copy of all players and finished games.
    pub async fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read().await;
        LedgerSnapshot {
            players: state.players.values().cloned().collect(),
            games: state
                .games
                .values()
                .filter(|g| g.is_finished())
                .cloned()
                .collect(),
        }
    }

    /// Returns `(players, games)` counts.
    pub async fn counts(&self) -> (usize, usize) {
        let state = self.state.read().await;
        (state.players.len(), state.games.len())
    }
}

fn sort_newest_first(games: &mut [Game]) {
    games.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}
