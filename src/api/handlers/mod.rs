//! REST endpoint handlers organized by resource.

pub mod games;
pub mod players;
pub mod stats;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(players::routes())
        .merge(games::routes())
        .merge(stats::routes())
}
