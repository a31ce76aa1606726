//! Data Transfer Objects for REST request/response serialization.
//!
//! Money amounts are serialized as JSON strings so that two-decimal values
//! survive clients that parse numbers as binary floats.

pub mod common_dto;
pub mod game_dto;
pub mod player_dto;
pub mod stats_dto;

pub use common_dto::*;
pub use game_dto::*;
pub use player_dto::*;
pub use stats_dto::*;
