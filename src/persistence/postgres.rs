//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{GameRow, PlayerRow};
use crate::config::LedgerConfig;
use crate::domain::{Game, GameId, Player, PlayerId};
use crate::error::LedgerError;

/// PostgreSQL-backed store for players and games using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

fn db_error(e: sqlx::Error) -> LedgerError {
    LedgerError::PersistenceError(e.to_string())
}

/// A delete that matched no row means the database and the in-memory
/// ledger have diverged.
fn expect_deleted(table: &str, id: uuid::Uuid, rows: u64) -> Result<(), LedgerError> {
    if rows == 0 {
        return Err(LedgerError::PersistenceError(format!(
            "{table} row {id} missing from database"
        )));
    }
    Ok(())
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool using the database settings of `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::PersistenceError`] if the database is
    /// unreachable.
    pub async fn connect(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(db_error)?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), LedgerError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| LedgerError::PersistenceError(e.to_string()))
    }

    /// Inserts a newly registered player.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::PersistenceError`] on database failure.
    pub async fn insert_player(&self, player: &Player) -> Result<(), LedgerError> {
        sqlx::query("INSERT INTO players (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(player.id.as_uuid())
            .bind(&player.name)
            .bind(player.created_at)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    /// Deletes a player row. Foreign keys refuse the delete while any game
    /// still references the player.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::PersistenceError`] on database failure or
    /// when no row was deleted.
    pub async fn delete_player(&self, id: PlayerId) -> Result<(), LedgerError> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        expect_deleted("player", *id.as_uuid(), result.rows_affected())
    }

    /// Inserts a newly created game.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::PersistenceError`] on database failure.
    pub async fn insert_game(&self, game: &Game) -> Result<(), LedgerError> {
        let row = GameRow::from(game);
        sqlx::query(
            "INSERT INTO games \
             (id, player1_id, player2_id, breaker_id, winner_id, stake, status, created_at, finished_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(row.id)
        .bind(row.player1_id)
        .bind(row.player2_id)
        .bind(row.breaker_id)
        .bind(row.winner_id)
        .bind(row.stake)
        .bind(&row.status)
        .bind(row.created_at)
        .bind(row.finished_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    /// Records the winner of a game that is still active in the database.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::GameAlreadyFinished`] if no active row was
    /// updated, or a [`LedgerError::PersistenceError`] on database failure.
    pub async fn finish_game(&self, game: &Game) -> Result<(), LedgerError> {
        let row = GameRow::from(game);
        let result = sqlx::query(
            "UPDATE games SET status = $2, winner_id = $3, finished_at = $4 \
             WHERE id = $1 AND status = 'active'",
        )
        .bind(row.id)
        .bind(&row.status)
        .bind(row.winner_id)
        .bind(row.finished_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(LedgerError::GameAlreadyFinished(row.id));
        }
        Ok(())
    }

    /// Deletes a game row.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::PersistenceError`] on database failure or
    /// when no row was deleted.
    pub async fn delete_game(&self, id: GameId) -> Result<(), LedgerError> {
        let result = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        expect_deleted("game", *id.as_uuid(), result.rows_affected())
    }

    /// Loads every player.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::PersistenceError`] on database failure.
    pub async fn load_players(&self) -> Result<Vec<Player>, LedgerError> {
        let rows = sqlx::query_as::<_, PlayerRow>(
            "SELECT id, name, created_at FROM players ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(rows.into_iter().map(Player::from).collect())
    }

    /// Loads every game, active and finished.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::PersistenceError`] on database failure or
    /// when a row cannot be decoded.
    pub async fn load_games(&self) -> Result<Vec<Game>, LedgerError> {
        let rows = sqlx::query_as::<_, GameRow>(
            "SELECT id, player1_id, player2_id, breaker_id, winner_id, stake, status, \
             created_at, finished_at FROM games ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        rows.into_iter().map(Game::try_from).collect()
    }
}
