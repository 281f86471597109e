use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::remote::RemoteStore;
use super::watchlist::WatchlistBackend;
use crate::database::players::PlayersTable;
use crate::database::users::UsersTable;
use crate::domain::{Player, User, WatchlistItem};
use crate::state::{Action, DashboardStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Guard was closed before fetching
    Skipped,
    Applied,
    /// Guard closed while the fetch was running; the result was dropped
    Discarded,
}

/// Data fetched for one refresh, not yet applied
pub struct RefreshSnapshot {
    players: Vec<Player>,
    users: Vec<User>,
    watchlist: Vec<WatchlistItem>,
    fetched_at: DateTime<Utc>,
}

/// Periodic re-fetch of players, users and the watchlist
pub struct RefreshScheduler {
    dashboard: DashboardStore,
    remote: RemoteStore,
    watchlist: Arc<WatchlistBackend>,
    period: Duration,
}

impl RefreshScheduler {
    pub fn new(dashboard: DashboardStore, remote: RemoteStore, watchlist: Arc<WatchlistBackend>, period: Duration) -> Self {
        Self {
            dashboard,
            remote,
            watchlist,
            period,
        }
    }

    pub fn tick(&self) -> TickOutcome {
        if !self.dashboard.refresh_allowed() {
            debug!("Refresh skipped: dashboard busy");
            return TickOutcome::Skipped;
        }
        let snapshot = self.fetch();
        self.commit(snapshot)
    }

    pub fn fetch(&self) -> RefreshSnapshot {
        RefreshSnapshot {
            players: self.remote.list::<PlayersTable>(),
            users: self.remote.list::<UsersTable>(),
            watchlist: self.watchlist.list(),
            fetched_at: Utc::now(),
        }
    }

    /// Apply a snapshot unless the guard closed since it was fetched
    pub fn commit(&self, snapshot: RefreshSnapshot) -> TickOutcome {
        if !self.dashboard.refresh_allowed() {
            debug!("Refresh result discarded: dashboard became busy during fetch");
            return TickOutcome::Discarded;
        }

        debug!(
            "Refreshed {} players, {} users, {} watchlist items",
            snapshot.players.len(),
            snapshot.users.len(),
            snapshot.watchlist.len()
        );
        self.dashboard.dispatch(Action::Refreshed {
            players: snapshot.players,
            users: snapshot.users,
            watchlist: snapshot.watchlist,
            at: snapshot.fetched_at,
        });
        TickOutcome::Applied
    }

    pub async fn run(self) {
        info!("Refresh scheduler running every {:?}", self.period);
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.tick();
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
