use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::AppState;
use crate::api::models::{DashboardSummary, ModalRequest, ViewRequest};
use crate::state::{Action, DashboardState};

fn summary(state: &DashboardState) -> DashboardSummary {
    DashboardSummary {
        view: state.view,
        modal: state.modal,
        refresh_allowed: state.refresh_allowed(),
        pending_notifications: state.pending_notifications,
        last_refresh: state.last_refresh,
        session: state.session.clone(),
        player_count: state.players.len(),
    }
}

pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dashboard.read(summary))
}

pub async fn set_view(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ViewRequest>,
) -> impl IntoResponse {
    state.dashboard.dispatch(Action::Navigate(request.view));
    Json(state.dashboard.read(summary))
}

pub async fn set_modal(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ModalRequest>,
) -> impl IntoResponse {
    let action = match request.modal {
        Some(modal) => Action::OpenModal(modal),
        None => Action::CloseModal,
    };
    state.dashboard.dispatch(action);
    Json(state.dashboard.read(summary))
}
