use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use chrono::Local;
use std::sync::Arc;

use super::{AppState, ScheduleParams};
use crate::api::models::{GameView, ScheduleView};
use crate::database::games::GamesTable;
use crate::database::projects::ProjectsTable;
use crate::database::schedules::SchedulesTable;
use crate::domain::schedule::schedule_view;
use crate::domain::{GameStatus, ObservationSchedule, ScoutingGame};
use crate::errors::AppError;

pub async fn get_games(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScheduleParams>,
) -> impl IntoResponse {
    let now = Local::now().naive_local();
    let settings = &state.config.schedule;

    let games = schedule_view(
        &state.remote.list::<GamesTable>(),
        &params.owner_filter(),
        &params.range(),
        now,
        settings.window_days,
    );

    let views: Vec<GameView> = games
        .into_iter()
        .map(|game| {
            let status = GameStatus::with_duration(game.kickoff, now, settings.match_duration);
            GameView {
                game,
                status,
                status_label: status.label(),
            }
        })
        .collect();

    Json(views)
}

pub async fn upsert_game(
    State(state): State<Arc<AppState>>,
    Json(game): Json<ScoutingGame>,
) -> Result<impl IntoResponse, AppError> {
    state.remote.upsert::<GamesTable>(&game)?;
    Ok(Json(game))
}

pub async fn get_schedules(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScheduleParams>,
) -> impl IntoResponse {
    let now = Local::now().naive_local();
    let projects = state.remote.list::<ProjectsTable>();

    let schedules = schedule_view(
        &state.remote.list::<SchedulesTable>(),
        &params.owner_filter(),
        &params.range(),
        now,
        state.config.schedule.window_days,
    );

    let views: Vec<ScheduleView> = schedules
        .into_iter()
        .map(|schedule| {
            let project_name = projects
                .iter()
                .find(|project| project.id == schedule.project_id)
                .map(|project| project.name.clone());
            ScheduleView {
                schedule,
                project_name,
            }
        })
        .collect();

    Json(views)
}

pub async fn upsert_schedule(
    State(state): State<Arc<AppState>>,
    Json(schedule): Json<ObservationSchedule>,
) -> Result<impl IntoResponse, AppError> {
    state.remote.upsert::<SchedulesTable>(&schedule)?;
    Ok(Json(schedule))
}

pub async fn get_projects(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.remote.list::<ProjectsTable>())
}
