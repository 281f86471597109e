use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::AppState;
use crate::api::models::{NotificationsResponse, StatusUpdateRequest};
use crate::domain::WatchlistItem;
use crate::errors::AppError;
use crate::services::notifications::NotificationCounter;

pub async fn get_watchlist(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.watchlist.list())
}

pub async fn upsert_item(
    State(state): State<Arc<AppState>>,
    Json(item): Json<WatchlistItem>,
) -> Result<impl IntoResponse, AppError> {
    state.watchlist.upsert(&item)?;
    Ok(Json(item))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    if state.watchlist.update_status(&item_id, request.status)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.watchlist.delete(&item_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Count for the signed-in viewer; recounted from the current watchlist
pub async fn get_notifications(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let counter = NotificationCounter::new(state.dashboard.clone(), state.watchlist.clone());
    Json(NotificationsResponse {
        pending: counter.recount(),
    })
}
