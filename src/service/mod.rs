//! Service layer: business logic orchestration.
//!
//! [`LedgerService`] serialises ledger mutations, writes them through to
//! persistence, and recomputes stats and debts on every read.

pub mod ledger_service;
pub mod views;

pub use ledger_service::LedgerService;
pub use views::{DebtView, GameView, HeadToHeadView};
