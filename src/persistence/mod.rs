//! Persistence layer: PostgreSQL storage for players and games.
//!
//! Only the two source-of-truth entities are stored. The service writes
//! through on every mutation and hydrates the in-memory ledger from these
//! tables at startup. The concrete implementation uses `sqlx::PgPool` for
//! async PostgreSQL access.

pub mod models;
pub mod postgres;

pub use postgres::PostgresPersistence;
