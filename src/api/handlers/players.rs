use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Local;
use log::info;
use std::sync::Arc;

use super::{AppState, PlayerParams};
use crate::api::models::{PaginatedResponse, ReportResponse};
use crate::database::players::PlayersTable;
use crate::domain::age::{derive_age, derive_ages};
use crate::domain::filter::{self, competitions};
use crate::domain::Player;
use crate::errors::AppError;
use crate::services::report::ReportGenerator;
use crate::state::Action;

pub async fn get_players(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlayerParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(100).clamp(1, 1000);
    let offset = (page - 1) * page_size;

    let defaults = state.config.filter.initial_filter();
    let filter_state = params.to_filter(&defaults)?;

    let today = Local::now().date_naive();
    let players = derive_ages(state.remote.list::<PlayersTable>(), today);
    let visible = filter::filter(&players, &filter_state);
    let total = visible.len();
    let items: Vec<Player> = visible.into_iter().skip(offset).take(page_size).collect();

    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        page_size,
    }))
}

pub async fn get_competitions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(competitions(&state.remote.list::<PlayersTable>()))
}

pub async fn get_player_detail(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let today = Local::now().date_naive();
    match state.remote.find_player(&player_id)? {
        Some(player) => Ok(Json(derive_age(player, today)).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

pub async fn upsert_player(
    State(state): State<Arc<AppState>>,
    Json(player): Json<Player>,
) -> Result<impl IntoResponse, AppError> {
    player.validate()?;
    let player = derive_age(player, Local::now().date_naive());

    state.remote.upsert::<PlayersTable>(&player)?;
    info!("Saved player {} ({})", player.name, player.id);
    state.dashboard.dispatch(Action::PlayerSaved(player.clone()));

    Ok(Json(player))
}

pub async fn delete_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.remote.delete::<PlayersTable>(&player_id)?;
    state.dashboard.dispatch(Action::PlayerDeleted(player_id));
    Ok(StatusCode::NO_CONTENT)
}

pub async fn generate_report(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> impl IntoResponse {
    let player = match state.remote.find_player(&player_id) {
        Ok(Some(player)) => derive_age(player, Local::now().date_naive()),
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(e) => return e.into_response(),
    };

    match state.reports.generate_report(&player).await {
        Ok(report) => Json(ReportResponse { player_id, report }).into_response(),
        Err(e) => e.into_response(),
    }
}
