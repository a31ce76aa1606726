//! # cue-ledger
//!
//! REST service and settlement engine for wagered billiard games among a
//! private group of players.
//!
//! Players and games are the only stored facts. Every statistic and every
//! debt is recomputed from the finished games on each read, so deleting a
//! game or correcting history never leaves a stale derived value behind.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── LedgerService (service/)
//!     │
//!     ├── Ledger: players + games (domain/)
//!     ├── Settlement: stats, debts, head-to-head (settlement/)
//!     │
//!     └── PostgreSQL Persistence (optional)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod settlement;
