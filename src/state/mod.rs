use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::age::derive_ages;
use crate::domain::filter;
use crate::domain::notifications::pending_for;
use crate::domain::{FilterState, Player, PlayerId, User, WatchlistItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Dashboard,
    ShadowTeam,
    Schedule,
    Watchlist,
    Admin,
}

/// Overlays that hold unsaved input or a focused read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modal {
    PlayerEditor,
    PlayerDetail,
    AiReport,
    Import,
    UserManagement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub view: View,
    pub modal: Option<Modal>,
    pub players: Vec<Player>,
    pub users: Vec<User>,
    pub watchlist: Vec<WatchlistItem>,
    pub filter: FilterState,
    pub session: Option<User>,
    pub pending_notifications: usize,
    pub last_refresh: Option<DateTime<Utc>>,
}

/// Every change the dashboard can go through
#[derive(Debug, Clone)]
pub enum Action {
    Navigate(View),
    OpenModal(Modal),
    CloseModal,
    SetFilter(FilterState),
    Refreshed {
        players: Vec<Player>,
        users: Vec<User>,
        watchlist: Vec<WatchlistItem>,
        at: DateTime<Utc>,
    },
    WatchlistLoaded(Vec<WatchlistItem>),
    PlayerSaved(Player),
    PlayerDeleted(PlayerId),
    SignedIn(User),
    SignedOut,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(FilterState::default())
    }
}

impl DashboardState {
    pub fn new(filter: FilterState) -> Self {
        Self {
            view: View::Dashboard,
            modal: None,
            players: Vec::new(),
            users: Vec::new(),
            watchlist: Vec::new(),
            filter,
            session: None,
            pending_notifications: 0,
            last_refresh: None,
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Navigate(view) => self.view = view,
            Action::OpenModal(modal) => self.modal = Some(modal),
            Action::CloseModal => self.modal = None,
            Action::SetFilter(filter) => self.filter = filter,
            Action::Refreshed {
                players,
                users,
                watchlist,
                at,
            } => {
                self.players = players;
                self.users = users;
                self.watchlist = watchlist;
                self.last_refresh = Some(at);
            }
            Action::WatchlistLoaded(items) => self.watchlist = items,
            Action::PlayerSaved(player) => {
                match self.players.iter_mut().find(|p| p.id == player.id) {
                    Some(existing) => *existing = player,
                    None => self.players.insert(0, player),
                }
            }
            Action::PlayerDeleted(id) => self.players.retain(|p| p.id != id),
            Action::SignedIn(user) => self.session = Some(user),
            Action::SignedOut => {
                self.session = None;
                self.modal = None;
                self.view = View::Dashboard;
            }
        }
        self.recount();
    }

    fn recount(&mut self) {
        self.pending_notifications = self
            .session
            .as_ref()
            .map(|user| pending_for(&self.watchlist, &user.id))
            .unwrap_or(0);
    }

    /// Background refresh may only replace data on the bare dashboard
    pub fn refresh_allowed(&self) -> bool {
        self.modal.is_none() && self.view == View::Dashboard
    }

    pub fn visible_players(&self, today: NaiveDate) -> Vec<Player> {
        let players = derive_ages(self.players.clone(), today);
        filter::filter(&players, &self.filter)
    }
}

/// Shared handle to the dashboard state; every change goes through `dispatch`
#[derive(Clone)]
pub struct DashboardStore {
    sender: Arc<watch::Sender<DashboardState>>,
}

impl DashboardStore {
    pub fn new(initial: DashboardState) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn dispatch(&self, action: Action) {
        self.sender.send_modify(|state| state.apply(action));
    }

    pub fn read<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.sender.borrow())
    }

    pub fn snapshot(&self) -> DashboardState {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.sender.subscribe()
    }

    pub fn refresh_allowed(&self) -> bool {
        self.read(DashboardState::refresh_allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{fixtures, Position};
    use crate::domain::{ApprovalStatus, Role, WatchStatus};

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Souza".to_string(),
            username: "ana.souza".to_string(),
            password_hash: String::new(),
            role: Role::Scout,
            status: ApprovalStatus::Approved,
            created_at: Utc::now(),
        }
    }

    fn pending(id: &str, analyst: &str) -> WatchlistItem {
        WatchlistItem {
            id: id.to_string(),
            player_id: "p1".to_string(),
            assigned_analyst_id: analyst.to_string(),
            requested_by: "admin".to_string(),
            status: WatchStatus::Pending,
            note: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_refresh_guard() {
        let mut state = DashboardState::default();
        assert!(state.refresh_allowed());

        state.apply(Action::OpenModal(Modal::PlayerEditor));
        assert!(!state.refresh_allowed());

        state.apply(Action::CloseModal);
        state.apply(Action::Navigate(View::ShadowTeam));
        assert!(!state.refresh_allowed());

        state.apply(Action::Navigate(View::Dashboard));
        assert!(state.refresh_allowed());
    }

    #[test]
    fn test_pending_count_follows_session_and_watchlist() {
        let mut state = DashboardState::default();
        state.apply(Action::WatchlistLoaded(vec![pending("w1", "u1"), pending("w2", "u2")]));
        assert_eq!(state.pending_notifications, 0);

        state.apply(Action::SignedIn(user("u1")));
        assert_eq!(state.pending_notifications, 1);

        state.apply(Action::WatchlistLoaded(vec![pending("w1", "u1"), pending("w3", "u1")]));
        assert_eq!(state.pending_notifications, 2);

        state.apply(Action::SignedOut);
        assert_eq!(state.pending_notifications, 0);
    }

    #[test]
    fn test_visible_players_derives_ages_before_filtering() {
        let mut state = DashboardState::new(FilterState::with_age_range(15, 18));
        state.apply(Action::PlayerSaved(fixtures::player("p1", "Ana", "X", Position::Ata, "2008-03-10")));
        state.apply(Action::PlayerSaved(fixtures::player("p2", "Bia", "Y", Position::Mei, "1995-01-01")));
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let visible = state.visible_players(today);

        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Ana");
        assert_eq!(visible[0].age, Some(17));
    }

    #[test]
    fn test_player_saved_replaces_in_place_and_deleted_removes() {
        let mut state = DashboardState::default();
        state.apply(Action::PlayerSaved(fixtures::player("p1", "Ana", "X", Position::Ata, "2008-03-10")));
        state.apply(Action::PlayerSaved(fixtures::player("p2", "Bia", "Y", Position::Mei, "2008-03-10")));
        state.apply(Action::PlayerSaved(fixtures::player("p1", "Ana", "Z", Position::Ata, "2008-03-10")));

        assert_eq!(state.players.len(), 2);
        assert_eq!(state.players[0].id, "p2");
        assert_eq!(state.players[1].club, "Z");

        state.apply(Action::PlayerDeleted("p2".to_string()));
        assert_eq!(state.players.len(), 1);
    }

    #[test]
    fn test_store_dispatch_notifies_subscribers() {
        let store = DashboardStore::new(DashboardState::default());
        let mut receiver = store.subscribe();

        store.dispatch(Action::OpenModal(Modal::AiReport));

        assert!(receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow_and_update().modal, Some(Modal::AiReport));
        assert!(!store.refresh_allowed());
    }
}
