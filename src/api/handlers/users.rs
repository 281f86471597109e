use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use super::AppState;
use crate::api::models::{LoginRequest, RoleRequest};
use crate::database::users::{is_username_conflict, UsersTable};
use crate::domain::users::{approve, authenticate, set_role, RegistrationForm};
use crate::domain::User;
use crate::errors::{AppError, ValidationError};
use crate::state::Action;

fn stored_users(state: &AppState) -> Result<Vec<User>, AppError> {
    state.remote.try_list::<UsersTable>()
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(form): Json<RegistrationForm>,
) -> Result<impl IntoResponse, AppError> {
    let _registering = state.registration.lock().await;
    let existing = stored_users(&state)?;
    let user = state.registrar.register(&form, &existing, Utc::now())?;

    state.remote.upsert::<UsersTable>(&user).map_err(|e| match e {
        AppError::Remote(ref err) if is_username_conflict(err) => {
            AppError::Validation(ValidationError::DuplicateUsername(user.username.clone()))
        }
        other => other,
    })?;
    info!("Registered {} as {} ({})", user.username, user.role.as_str(), user.status.as_str());

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let users = stored_users(&state)?;
    let user = authenticate(&users, &request.username, &request.password)?;

    if let Err(e) = state.session.save(&user) {
        warn!("Signed in but could not persist session: {:#}", e);
    }
    state.dashboard.dispatch(Action::SignedIn(user.clone()));

    Ok(Json(user))
}

pub async fn logout(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    state.session.clear()?;
    state.dashboard.dispatch(Action::SignedOut);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_users(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.remote.list::<UsersTable>())
}

fn require_admin(state: &AppState, action: &'static str) -> Result<(), AppError> {
    let is_admin = state
        .dashboard
        .read(|dashboard| dashboard.session.as_ref().is_some_and(User::is_admin));
    if is_admin {
        Ok(())
    } else {
        Err(ValidationError::AdminOnly(action).into())
    }
}

fn update_user<F>(state: &AppState, user_id: &str, change: F) -> Result<Response, AppError>
where
    F: FnOnce(User) -> User,
{
    let users = stored_users(state)?;
    let Some(user) = users.into_iter().find(|user| user.id == user_id) else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    let updated = change(user);
    state.remote.upsert::<UsersTable>(&updated)?;
    Ok(Json(updated).into_response())
}

pub async fn approve_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&state, "approve accounts")?;
    update_user(&state, &user_id, approve)
}

pub async fn change_role(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(request): Json<RoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&state, "change roles")?;
    update_user(&state, &user_id, |user| set_role(user, request.role))
}
