use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::cache::KeyValueStore;
use crate::config::settings::AppConfig;
use crate::domain::filter::parse_codes;
use crate::domain::users::Registrar;
use crate::domain::{DateRange, FilterState, OwnerFilter};
use crate::errors::{AppError, ValidationError};
use crate::services::remote::RemoteStore;
use crate::services::report::AiReportClient;
use crate::services::session::SessionStore;
use crate::services::squad::{squad_store_for, SquadDirectory};
use crate::services::watchlist::WatchlistBackend;
use crate::state::{Action, DashboardState, DashboardStore};

pub mod dashboard;
pub mod players;
pub mod schedule;
pub mod squad;
pub mod users;
pub mod watchlist;

pub struct AppState {
    pub config: AppConfig,
    pub remote: RemoteStore,
    pub local: Arc<dyn KeyValueStore>,
    pub dashboard: DashboardStore,
    pub squads: SquadDirectory,
    pub watchlist: Arc<WatchlistBackend>,
    pub reports: Arc<AiReportClient>,
    pub session: SessionStore,
    pub registrar: Registrar,
    /// Held across check-then-insert so only one first user becomes admin
    pub registration: Mutex<()>,
}

impl AppState {
    /// Wire the collaborators for one process; a saved session is restored as-is
    pub fn new(config: AppConfig, remote: RemoteStore, local: Arc<dyn KeyValueStore>) -> anyhow::Result<Self> {
        let squads = SquadDirectory::new(squad_store_for(&remote, local.clone()));
        let watchlist = Arc::new(WatchlistBackend::for_store(&remote, local.clone()));
        let reports = Arc::new(AiReportClient::new(config.report.clone())?);
        let session = SessionStore::new(local.clone());

        let dashboard = DashboardStore::new(DashboardState::new(config.filter.initial_filter()));
        if let Some(user) = session.restore() {
            dashboard.dispatch(Action::SignedIn(user));
        }

        Ok(Self {
            config,
            remote,
            local,
            dashboard,
            squads,
            watchlist,
            reports,
            session,
            registrar: Registrar::new(),
            registration: Mutex::new(()),
        })
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlayerParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub search: Option<String>,
    pub positions: Option<String>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub recommendations: Option<String>,
    pub competitions: Option<String>,
    pub scout_years: Option<String>,
    pub feet: Option<String>,
}

impl PlayerParams {
    /// Query parameters over the configured defaults; list values are comma separated
    pub fn to_filter(&self, defaults: &FilterState) -> Result<FilterState, AppError> {
        let parse_err = |e: anyhow::Error| AppError::parse("player filter", format!("{:#}", e));

        Ok(FilterState {
            search: self.search.clone().unwrap_or_default(),
            positions: parse_codes(self.positions.as_deref()).map_err(parse_err)?,
            min_age: self.min_age.unwrap_or(defaults.min_age),
            max_age: self.max_age.unwrap_or(defaults.max_age),
            recommendations: parse_codes(self.recommendations.as_deref()).map_err(parse_err)?,
            competitions: self
                .competitions
                .as_deref()
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            scout_years: parse_codes(self.scout_years.as_deref()).map_err(parse_err)?,
            feet: parse_codes(self.feet.as_deref()).map_err(parse_err)?,
        })
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleParams {
    /// Analyst id, or "all"
    pub owner: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ScheduleParams {
    pub fn owner_filter(&self) -> OwnerFilter {
        OwnerFilter::from_param(self.owner.as_deref())
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }
}

impl AppState {
    /// Id of the signed-in user; every per-viewer resource is scoped by it
    pub fn viewer_id(&self) -> Result<String, AppError> {
        self.dashboard
            .read(|dashboard| dashboard.session.as_ref().map(|user| user.id.clone()))
            .ok_or(AppError::Validation(ValidationError::NotSignedIn))
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}
