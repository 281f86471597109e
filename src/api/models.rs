use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{
    GameStatus, ObservationSchedule, Player, PlayerId, Role, ScoutingGame, Slot, User, WatchStatus,
};
use crate::state::{Modal, View};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub player_id: PlayerId,
    pub report: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadResponse {
    pub viewer_id: String,
    /// Resolved candidates per slot, preference order, deleted players dropped
    pub slots: BTreeMap<Slot, Vec<Player>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub changed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCandidateRequest {
    pub player_id: PlayerId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteRequest {
    pub index: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    #[serde(flatten)]
    pub game: ScoutingGame,
    pub status: GameStatus,
    pub status_label: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    #[serde(flatten)]
    pub schedule: ObservationSchedule,
    pub project_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: WatchStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub pending: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest {
    pub role: Role,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub view: View,
    pub modal: Option<Modal>,
    pub refresh_allowed: bool,
    pub pending_notifications: usize,
    pub last_refresh: Option<DateTime<Utc>>,
    pub session: Option<User>,
    pub player_count: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRequest {
    pub view: View,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalRequest {
    /// `null` closes the open modal
    pub modal: Option<Modal>,
}
