use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{dashboard, players, schedule, squad, users, watchlist, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/players", get(players::get_players).post(players::upsert_player))
        .route(
            "/api/players/:id",
            get(players::get_player_detail).delete(players::delete_player),
        )
        .route("/api/players/:id/report", post(players::generate_report))
        .route("/api/competitions", get(players::get_competitions))
        .route("/api/squad", get(squad::get_squad))
        .route("/api/squad/:slot/candidates", post(squad::add_candidate))
        .route(
            "/api/squad/:slot/candidates/:player_id",
            delete(squad::remove_candidate),
        )
        .route("/api/squad/:slot/move", post(squad::move_candidate))
        .route("/api/squad/:slot/promote", post(squad::promote_candidate))
        .route("/api/squad/:slot/search", get(squad::search_candidates))
        .route("/api/games", get(schedule::get_games).post(schedule::upsert_game))
        .route(
            "/api/schedules",
            get(schedule::get_schedules).post(schedule::upsert_schedule),
        )
        .route("/api/projects", get(schedule::get_projects))
        .route(
            "/api/watchlist",
            get(watchlist::get_watchlist).post(watchlist::upsert_item),
        )
        .route("/api/watchlist/:id", delete(watchlist::delete_item))
        .route("/api/watchlist/:id/status", put(watchlist::update_status))
        .route("/api/notifications", get(watchlist::get_notifications))
        .route("/api/users", get(users::list_users))
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login))
        .route("/api/users/logout", post(users::logout))
        .route("/api/users/:id/approve", post(users::approve_user))
        .route("/api/users/:id/role", put(users::change_role))
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route("/api/dashboard/view", post(dashboard::set_view))
        .route("/api/dashboard/modal", post(dashboard::set_modal))
        .with_state(state)
}
