//! Ledger service: orchestrates writes and recomputes derived views.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use super::views::{DebtView, Directory, GameView, HeadToHeadView};
use crate::config::LedgerConfig;
use crate::domain::{Game, GameId, Ledger, LedgerSnapshot, Player, PlayerId, Stake};
use crate::error::LedgerError;
use crate::persistence::PostgresPersistence;
use crate::settlement::{self, PlayerStats, Settlement, SettlementError};

/// Orchestration layer for every ledger operation.
///
/// Owns the in-memory [`Ledger`] and, when enabled, a
/// [`PostgresPersistence`] write-through store. Every mutation follows
/// the pattern: take the write gate → validate against the ledger →
/// persist → apply in memory → log. Reads of stats and debts always run a
/// fresh settlement over one ledger snapshot.
#[derive(Debug)]
pub struct LedgerService {
    ledger: Arc<Ledger>,
    persistence: Option<PostgresPersistence>,
    write_gate: Mutex<()>,
}

impl LedgerService {
    /// Creates a new `LedgerService`.
    #[must_use]
    pub fn new(ledger: Arc<Ledger>, persistence: Option<PostgresPersistence>) -> Self {
        Self {
            ledger,
            persistence,
            write_gate: Mutex::new(()),
        }
    }

    /// Creates a service backed by an empty in-memory ledger.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(Ledger::new()), None)
    }

    /// Builds the service described by `config`.
    ///
    /// With persistence enabled, connects to PostgreSQL, applies
    /// migrations, hydrates the ledger from stored rows and runs one full
    /// settlement so that a corrupt history fails startup instead of the
    /// first request.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if the database is unreachable, a row
    /// cannot be decoded, or the stored history violates a settlement
    /// invariant.
    pub async fn bootstrap(config: &LedgerConfig) -> Result<Self, LedgerError> {
        if !config.persistence_enabled {
            tracing::info!("persistence disabled; ledger is in-memory only");
            return Ok(Self::in_memory());
        }

        let db = PostgresPersistence::connect(config).await?;
        db.migrate().await?;
        let players = db.load_players().await?;
        let games = db.load_games().await?;
        let service = Self::new(Arc::new(Ledger::restore(players, games)), Some(db));
        let (players, games) = service.ledger.counts().await;
        tracing::info!(players, games, "ledger hydrated from database");

        let settlement = service.settlement().await?;
        tracing::info!(debts = settlement.debts.len(), "stored history settles cleanly");
        Ok(service)
    }

    // ── Players ─────────────────────────────────────────────────────────

    /// Registers a new player.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidPlayerName`] for a blank or overlong
    /// name, or a persistence error.
    pub async fn create_player(&self, name: &str) -> Result<Player, LedgerError> {
        let player = Player::new(name)?;

        let _gate = self.write_gate.lock().await;
        if let Some(db) = &self.persistence {
            db.insert_player(&player).await?;
        }
        self.ledger.insert_player(player.clone()).await?;

        tracing::info!(player_id = %player.id, name = %player.name, "player registered");
        Ok(player)
    }

    /// Returns all players sorted by name.
    pub async fn list_players(&self) -> Vec<Player> {
        self.ledger.players().await
    }

    /// Returns one player.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PlayerNotFound`] for an unknown id.
    pub async fn get_player(&self, id: PlayerId) -> Result<Player, LedgerError> {
        self.ledger.player(id).await
    }

    /// Deletes a player that no game references.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PlayerNotFound`],
    /// [`LedgerError::PlayerReferenced`], or a persistence error.
    pub async fn delete_player(&self, id: PlayerId) -> Result<(), LedgerError> {
        let _gate = self.write_gate.lock().await;
        if let Err(e) = self.ledger.check_player_removable(id).await {
            if matches!(e, LedgerError::PlayerReferenced { .. }) {
                tracing::warn!(player_id = %id, error = %e, "player deletion refused");
            }
            return Err(e);
        }
        if let Some(db) = &self.persistence {
            db.delete_player(id).await?;
        }
        let player = self.ledger.remove_player(id).await?;

        tracing::info!(player_id = %id, name = %player.name, "player deleted");
        Ok(())
    }

    // ── Games ───────────────────────────────────────────────────────────

    /// Starts a new active game.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidStake`], [`LedgerError::InvalidPairing`],
    /// [`LedgerError::PlayerNotFound`], or a persistence error.
    pub async fn create_game(
        &self,
        player1: PlayerId,
        player2: PlayerId,
        breaker: PlayerId,
        stake: Decimal,
    ) -> Result<GameView, LedgerError> {
        let stake = Stake::new(stake)?;
        let game = Game::new(player1, player2, breaker, stake)?;

        let _gate = self.write_gate.lock().await;
        self.ledger.check_new_game(&game).await?;
        if let Some(db) = &self.persistence {
            db.insert_game(&game).await?;
        }
        self.ledger.insert_game(game.clone()).await?;

        tracing::info!(
            game_id = %game.id,
            %player1,
            %player2,
            stake = %game.stake,
            "game started"
        );
        self.view(game).await
    }

    /// Returns up to `limit` games, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Internal`] if a game references an
    /// unregistered player.
    pub async fn list_games(&self, limit: usize) -> Result<Vec<GameView>, LedgerError> {
        let games = self.ledger.recent_games(limit).await;
        self.views(games).await
    }

    /// Returns all active games, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Internal`] if a game references an
    /// unregistered player.
    pub async fn active_games(&self) -> Result<Vec<GameView>, LedgerError> {
        let games = self.ledger.active_games().await;
        self.views(games).await
    }

    /// Returns one game.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::GameNotFound`] for an unknown id.
    pub async fn get_game(&self, id: GameId) -> Result<GameView, LedgerError> {
        let game = self.ledger.game(id).await?;
        self.view(game).await
    }

    /// Records the winner of an active game.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::GameNotFound`],
    /// [`LedgerError::GameAlreadyFinished`],
    /// [`LedgerError::WinnerNotParticipant`], or a persistence error.
    pub async fn finish_game(
        &self,
        id: GameId,
        winner: PlayerId,
    ) -> Result<GameView, LedgerError> {
        let _gate = self.write_gate.lock().await;
        let at = Utc::now();
        if let Some(db) = &self.persistence {
            let finished = self.ledger.preview_finish(id, winner, at).await?;
            db.finish_game(&finished).await?;
        }
        let game = self.ledger.record_finish(id, winner, at).await?;

        tracing::info!(game_id = %id, %winner, stake = %game.stake, "game finished");
        self.view(game).await
    }

    /// Removes a game. Derived views reflect the removal on the next read.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::GameNotFound`] or a persistence error.
    pub async fn delete_game(&self, id: GameId) -> Result<(), LedgerError> {
        let _gate = self.write_gate.lock().await;
        let game = self.ledger.game(id).await?;
        if let Some(db) = &self.persistence {
            db.delete_game(id).await?;
        }
        self.ledger.remove_game(id).await?;

        tracing::info!(game_id = %id, status = game.status.as_str(), "game deleted");
        Ok(())
    }

    // ── Derived views ───────────────────────────────────────────────────

    /// Recomputes stats and debts from one ledger snapshot and checks
    /// that they agree.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DataIntegrity`] if the ledger holds a
    /// malformed game or the two views disagree.
    pub async fn settlement(&self) -> Result<Settlement, LedgerError> {
        Ok(self.settled().await?.1)
    }

    /// Settles one snapshot and returns both, logging any integrity fault.
    async fn settled(&self) -> Result<(LedgerSnapshot, Settlement), LedgerError> {
        let snapshot = self.ledger.snapshot().await;
        let settlement = settlement::settle_snapshot(&snapshot)
            .and_then(|s| s.verify_conservation().map(|()| s))
            .map_err(integrity_fault)?;
        tracing::debug!(
            players = settlement.stats.len(),
            games = snapshot.games.len(),
            debts = settlement.debts.len(),
            "settlement recomputed"
        );
        Ok((snapshot, settlement))
    }

    /// Returns the stats of one player.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PlayerNotFound`] for an unknown id or
    /// [`LedgerError::DataIntegrity`] on a malformed ledger.
    pub async fn player_stats(&self, id: PlayerId) -> Result<PlayerStats, LedgerError> {
        let settlement = self.settlement().await?;
        settlement
            .stats_for(id)
            .cloned()
            .ok_or(LedgerError::PlayerNotFound(*id.as_uuid()))
    }

    /// Returns the stats of every player, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DataIntegrity`] on a malformed ledger.
    pub async fn all_stats(&self) -> Result<Vec<PlayerStats>, LedgerError> {
        Ok(self.settlement().await?.stats)
    }

    /// Returns the netted pairwise debts with both parties resolved.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DataIntegrity`] on a malformed ledger.
    pub async fn debts(&self) -> Result<Vec<DebtView>, LedgerError> {
        let (snapshot, settlement) = self.settled().await?;
        let directory = Directory::new(snapshot.players);
        settlement
            .debts
            .iter()
            .map(|d| directory.debt_view(d))
            .collect()
    }

    /// Returns the finished-game record between two players.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PlayerNotFound`] if either player is unknown
    /// or [`LedgerError::DataIntegrity`] on a malformed game between them.
    pub async fn head_to_head(
        &self,
        player1: PlayerId,
        player2: PlayerId,
    ) -> Result<HeadToHeadView, LedgerError> {
        let snapshot = self.ledger.snapshot().await;
        let directory = Directory::new(snapshot.players);
        let find = |id: PlayerId| {
            directory
                .get(id)
                .map_err(|_| LedgerError::PlayerNotFound(*id.as_uuid()))
        };
        let (p1, p2) = (find(player1)?, find(player2)?);
        let record =
            settlement::head_to_head(player1, player2, &snapshot.games).map_err(integrity_fault)?;
        Ok(HeadToHeadView {
            player1: p1,
            player2: p2,
            record,
        })
    }

    async fn view(&self, game: Game) -> Result<GameView, LedgerError> {
        let directory = Directory::new(self.ledger.players().await);
        directory.game_view(game)
    }

    async fn views(&self, games: Vec<Game>) -> Result<Vec<GameView>, LedgerError> {
        let directory = Directory::new(self.ledger.players().await);
        games.into_iter().map(|g| directory.game_view(g)).collect()
    }
}

fn integrity_fault(e: SettlementError) -> LedgerError {
    tracing::error!(error = %e, "settlement rejected ledger snapshot");
    LedgerError::from(e)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::GameStatus;

    async fn service_with(names: &[&str]) -> (LedgerService, Vec<PlayerId>) {
        let service = LedgerService::in_memory();
        let mut ids = Vec::new();
        for name in names {
            let Ok(p) = service.create_player(name).await else {
                panic!("player creation failed");
            };
            ids.push(p.id);
        }
        (service, ids)
    }

    fn pair(ids: &[PlayerId]) -> (PlayerId, PlayerId) {
        let (Some(a), Some(b)) = (ids.first(), ids.get(1)) else {
            panic!("need two players");
        };
        (*a, *b)
    }

    async fn play(service: &LedgerService, winner: PlayerId, loser: PlayerId, stake: i64) -> GameId {
        let Ok(view) = service
            .create_game(winner, loser, loser, Decimal::from(stake))
            .await
        else {
            panic!("game creation failed");
        };
        let Ok(_) = service.finish_game(view.game.id, winner).await else {
            panic!("finish failed");
        };
        view.game.id
    }

    #[tokio::test]
    async fn full_flow_produces_netted_debt() {
        let (service, ids) = service_with(&["Anna", "Boris"]).await;
        let (a, b) = pair(&ids);
        play(&service, a, b, 500).await;
        play(&service, a, b, 500).await;
        play(&service, b, a, 300).await;

        let Ok(debts) = service.debts().await else {
            panic!("debts failed");
        };
        assert_eq!(debts.len(), 1);
        let Some(debt) = debts.first() else {
            panic!("missing debt");
        };
        assert_eq!(debt.from.name, "Boris");
        assert_eq!(debt.to.name, "Anna");
        assert_eq!(debt.amount, Decimal::from(700));

        let Ok(stats) = service.player_stats(a).await else {
            panic!("stats failed");
        };
        assert_eq!(stats.balance, Decimal::from(700));
        assert_eq!(stats.win_rate, Decimal::new(667, 1));
    }

    #[tokio::test]
    async fn created_game_is_active_and_resolved() {
        let (service, ids) = service_with(&["Anna", "Boris"]).await;
        let (a, b) = pair(&ids);
        let Ok(view) = service.create_game(a, b, b, Decimal::new(1250, 2)).await else {
            panic!("game creation failed");
        };
        assert_eq!(view.game.status, GameStatus::Active);
        assert_eq!(view.breaker.id, b);
        assert!(view.winner.is_none());

        let Ok(active) = service.active_games().await else {
            panic!("active games failed");
        };
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn game_against_unknown_player_is_rejected() {
        let (service, ids) = service_with(&["Anna"]).await;
        let Some(a) = ids.first().copied() else {
            panic!("missing player");
        };
        let result = service
            .create_game(a, PlayerId::new(), a, Decimal::from(10))
            .await;
        assert!(matches!(result, Err(LedgerError::PlayerNotFound(_))));
    }

    #[tokio::test]
    async fn invalid_stake_is_rejected() {
        let (service, ids) = service_with(&["Anna", "Boris"]).await;
        let (a, b) = pair(&ids);
        let result = service.create_game(a, b, a, Decimal::ZERO).await;
        assert!(matches!(result, Err(LedgerError::InvalidStake(_))));
    }

    #[tokio::test]
    async fn finishing_twice_conflicts() {
        let (service, ids) = service_with(&["Anna", "Boris"]).await;
        let (a, b) = pair(&ids);
        let game_id = play(&service, a, b, 10).await;
        let result = service.finish_game(game_id, b).await;
        assert!(matches!(result, Err(LedgerError::GameAlreadyFinished(_))));

        let Ok(view) = service.get_game(game_id).await else {
            panic!("game lookup failed");
        };
        assert_eq!(view.winner.map(|p| p.id), Some(a));
    }

    #[tokio::test]
    async fn outsider_cannot_be_declared_winner() {
        let (service, ids) = service_with(&["Anna", "Boris", "Carl"]).await;
        let (a, b) = pair(&ids);
        let Some(c) = ids.get(2).copied() else {
            panic!("missing player");
        };
        let Ok(view) = service.create_game(a, b, a, Decimal::from(10)).await else {
            panic!("game creation failed");
        };
        let result = service.finish_game(view.game.id, c).await;
        assert!(matches!(
            result,
            Err(LedgerError::WinnerNotParticipant { .. })
        ));
    }

    #[tokio::test]
    async fn referenced_player_deletion_is_refused() {
        let (service, ids) = service_with(&["Anna", "Boris", "Carl"]).await;
        let (a, b) = pair(&ids);
        play(&service, a, b, 10).await;

        assert!(matches!(
            service.delete_player(a).await,
            Err(LedgerError::PlayerReferenced { .. })
        ));
        let Some(c) = ids.get(2).copied() else {
            panic!("missing player");
        };
        assert!(service.delete_player(c).await.is_ok());
        assert_eq!(service.list_players().await.len(), 2);
    }

    #[tokio::test]
    async fn deleting_a_game_recomputes_views() {
        let (service, ids) = service_with(&["Anna", "Boris"]).await;
        let (a, b) = pair(&ids);
        let game_id = play(&service, a, b, 40).await;
        assert_eq!(service.debts().await.map(|d| d.len()).ok(), Some(1));

        assert!(service.delete_game(game_id).await.is_ok());
        assert_eq!(service.debts().await.map(|d| d.len()).ok(), Some(0));
        let Ok(stats) = service.player_stats(a).await else {
            panic!("stats failed");
        };
        assert_eq!(stats.total_games, 0);
        assert!(matches!(
            service.delete_game(game_id).await,
            Err(LedgerError::GameNotFound(_))
        ));
    }

    #[tokio::test]
    async fn stats_of_unknown_player_is_not_found() {
        let service = LedgerService::in_memory();
        assert!(matches!(
            service.player_stats(PlayerId::new()).await,
            Err(LedgerError::PlayerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn empty_ledger_reads_are_not_errors() {
        let (service, _) = service_with(&["Anna"]).await;
        assert_eq!(service.debts().await.map(|d| d.len()).ok(), Some(0));
        let Ok(stats) = service.all_stats().await else {
            panic!("stats failed");
        };
        assert_eq!(stats.len(), 1);
        assert!(stats.iter().all(|s| s.total_games == 0));
    }

    #[tokio::test]
    async fn head_to_head_requires_known_players() {
        let (service, ids) = service_with(&["Anna", "Boris"]).await;
        let (a, b) = pair(&ids);
        play(&service, a, b, 10).await;
        play(&service, b, a, 10).await;
        play(&service, a, b, 10).await;

        let Ok(view) = service.head_to_head(a, b).await else {
            panic!("head to head failed");
        };
        assert_eq!(view.record.player1_wins, 2);
        assert_eq!(view.record.player2_wins, 1);
        assert_eq!(view.player1.name, "Anna");

        assert!(matches!(
            service.head_to_head(a, PlayerId::new()).await,
            Err(LedgerError::PlayerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn corrupt_history_is_reported_not_repaired() {
        let (Ok(anna), Ok(boris)) = (Player::new("Anna"), Player::new("Boris")) else {
            panic!("valid players");
        };
        let Ok(stake) = Stake::new(Decimal::from(10)) else {
            panic!("valid stake");
        };
        let Ok(mut game) = Game::new(anna.id, boris.id, anna.id, stake) else {
            panic!("valid game");
        };
        game.status = GameStatus::Finished;
        let ledger = Ledger::restore(vec![anna, boris], vec![game]);
        let service = LedgerService::new(Arc::new(ledger), None);

        assert!(matches!(
            service.settlement().await,
            Err(LedgerError::DataIntegrity(
                settlement::SettlementError::MissingWinner { .. }
            ))
        ));
        assert!(matches!(
            service.debts().await,
            Err(LedgerError::DataIntegrity(_))
        ));
    }

    #[tokio::test]
    async fn every_derived_read_reports_integrity_faults() {
        let (Ok(anna), Ok(boris)) = (Player::new("Anna"), Player::new("Boris")) else {
            panic!("valid players");
        };
        let (a, b) = (anna.id, boris.id);
        let Ok(stake) = Stake::new(Decimal::from(10)) else {
            panic!("valid stake");
        };
        let Ok(mut game) = Game::new(a, b, a, stake) else {
            panic!("valid game");
        };
        game.status = GameStatus::Finished;
        let ledger = Ledger::restore(vec![anna, boris], vec![game]);
        let service = LedgerService::new(Arc::new(ledger), None);

        assert!(matches!(
            service.all_stats().await,
            Err(LedgerError::DataIntegrity(_))
        ));
        assert!(matches!(
            service.player_stats(a).await,
            Err(LedgerError::DataIntegrity(_))
        ));
        assert!(matches!(
            service.head_to_head(a, b).await,
            Err(LedgerError::DataIntegrity(_))
        ));
    }

    #[tokio::test]
    async fn finishing_keeps_stake_and_participants() {
        let (service, ids) = service_with(&["Anna", "Boris"]).await;
        let (a, b) = pair(&ids);
        let Ok(created) = service.create_game(a, b, b, Decimal::new(1250, 2)).await else {
            panic!("game creation failed");
        };
        let Ok(finished) = service.finish_game(created.game.id, b).await else {
            panic!("finish failed");
        };
        assert_eq!(finished.game.stake, created.game.stake);
        assert_eq!(finished.player1.id, a);
        assert_eq!(finished.player2.id, b);
        assert_eq!(finished.breaker.id, b);
        assert_eq!(finished.winner.map(|p| p.id), Some(b));
        assert_eq!(finished.game.status, GameStatus::Finished);
        assert!(finished.game.finished_at.is_some());
    }

    #[tokio::test]
    async fn game_list_honours_limit() {
        let (service, ids) = service_with(&["Anna", "Boris"]).await;
        let (a, b) = pair(&ids);
        for _ in 0..4 {
            let _ = service.create_game(a, b, a, Decimal::from(1)).await;
        }
        assert_eq!(service.list_games(3).await.map(|g| g.len()).ok(), Some(3));
        assert_eq!(service.list_games(50).await.map(|g| g.len()).ok(), Some(4));
        assert_eq!(service.list_games(0).await.map(|g| g.len()).ok(), Some(0));
    }
}
