//! OpenAPI document assembled from the handler annotations.

use utoipa::OpenApi;

use super::handlers::{games, players, stats, system};

/// OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "cue-ledger",
        description = "Wager ledger for a private billiards group: players, games, statistics and netted debts."
    ),
    paths(
        system::root_handler,
        system::health_handler,
        players::create_player,
        players::list_players,
        players::get_player,
        players::delete_player,
        players::player_stats,
        games::create_game,
        games::list_games,
        games::active_games,
        games::get_game,
        games::finish_game,
        games::delete_game,
        stats::all_stats,
        stats::debts,
        stats::head_to_head,
    ),
    tags(
        (name = "System", description = "Liveness and health"),
        (name = "Players", description = "Player registry"),
        (name = "Games", description = "Game lifecycle"),
        (name = "Settlement", description = "Derived statistics and debts"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/health",
            "/players",
            "/players/{id}",
            "/players/{id}/stats",
            "/games",
            "/games/active",
            "/games/{id}",
            "/games/{id}/finish",
            "/stats",
            "/debts",
            "/head-to-head/{player1_id}/{player2_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
