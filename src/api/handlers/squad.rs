use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{AppState, SearchParams};
use crate::api::models::{AddCandidateRequest, MoveRequest, MutationResponse, PromoteRequest, SquadResponse};
use crate::database::players::PlayersTable;
use crate::domain::{Player, Slot};
use crate::errors::AppError;
use crate::services::squad::{SquadGuard, SquadService};

/// The signed-in viewer's own squad, locked for the rest of the request
async fn open(state: &AppState) -> Result<SquadGuard, AppError> {
    let viewer_id = state.viewer_id()?;
    state.squads.open(&viewer_id).await
}

fn squad_response(service: &SquadService, players: &[Player]) -> SquadResponse {
    let slots = Slot::ALL
        .into_iter()
        .map(|slot| {
            let resolved = service
                .players_in_slot(slot, players)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>();
            (slot, resolved)
        })
        .filter(|(_, resolved)| !resolved.is_empty())
        .collect::<BTreeMap<_, _>>();

    SquadResponse {
        viewer_id: service.viewer_id().to_string(),
        slots,
    }
}

pub async fn get_squad(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let service = open(&state).await?;
    let players = state.remote.list::<PlayersTable>();
    Ok(Json(squad_response(&service, &players)))
}

pub async fn add_candidate(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<Slot>,
    Json(request): Json<AddCandidateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut service = open(&state).await?;
    let changed = service.add(slot, &request.player_id)?;
    Ok(Json(MutationResponse { changed }))
}

pub async fn remove_candidate(
    State(state): State<Arc<AppState>>,
    Path((slot, player_id)): Path<(Slot, String)>,
) -> Result<impl IntoResponse, AppError> {
    let mut service = open(&state).await?;
    let changed = service.remove(slot, &player_id)?;
    Ok(Json(MutationResponse { changed }))
}

pub async fn move_candidate(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<Slot>,
    Json(request): Json<MoveRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut service = open(&state).await?;
    let changed = service.move_candidate(slot, request.from, request.to)?;
    Ok(Json(MutationResponse { changed }))
}

pub async fn promote_candidate(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<Slot>,
    Json(request): Json<PromoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut service = open(&state).await?;
    let changed = service.promote(slot, request.index)?;
    Ok(Json(MutationResponse { changed }))
}

pub async fn search_candidates(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<Slot>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let service = open(&state).await?;
    let players = state.remote.list::<PlayersTable>();
    let found = service
        .search_candidates(slot, &params.q, &players)
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();
    Ok(Json(found))
}
