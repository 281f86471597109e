use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use super::remote::ChangeEvent;
use super::watchlist::WatchlistBackend;
use crate::database::watchlist::WatchlistTable;
use crate::database::Table;
use crate::state::{Action, DashboardStore};

/// Keeps the pending-items badge in step with the watchlist
pub struct NotificationCounter {
    dashboard: DashboardStore,
    watchlist: Arc<WatchlistBackend>,
}

impl NotificationCounter {
    pub fn new(dashboard: DashboardStore, watchlist: Arc<WatchlistBackend>) -> Self {
        Self { dashboard, watchlist }
    }

    /// Reload the watchlist and return the viewer's pending count
    pub fn recount(&self) -> usize {
        let items = self.watchlist.list();
        self.dashboard.dispatch(Action::WatchlistLoaded(items));
        let count = self.dashboard.read(|state| state.pending_notifications);
        debug!("Pending notifications: {}", count);
        count
    }

    /// Recount on every watchlist change until the feed closes
    pub async fn listen(self, mut events: broadcast::Receiver<ChangeEvent>) {
        loop {
            match events.recv().await {
                Ok(event) if event.table == WatchlistTable::NAME => {
                    self.recount();
                }
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    warn!("Notification listener missed {} change events, recounting", missed);
                    self.recount();
                }
                Err(RecvError::Closed) => {
                    info!("Change feed closed, notification listener stopping");
                    break;
                }
            }
        }
    }

    pub fn spawn(self, events: broadcast::Receiver<ChangeEvent>) -> JoinHandle<()> {
        tokio::spawn(self.listen(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::domain::{ApprovalStatus, Role, User, WatchStatus, WatchlistItem};
    use crate::services::remote::{ChangeFeed, RemoteStore};
    use crate::state::DashboardState;
    use chrono::Utc;

    fn viewer() -> User {
        User {
            id: "u1".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Souza".to_string(),
            username: "ana.souza".to_string(),
            password_hash: String::new(),
            role: Role::Scout,
            status: ApprovalStatus::Approved,
            created_at: Utc::now(),
        }
    }

    fn item(id: &str) -> WatchlistItem {
        WatchlistItem {
            id: id.to_string(),
            player_id: "p1".to_string(),
            assigned_analyst_id: "u1".to_string(),
            requested_by: "admin".to_string(),
            status: WatchStatus::Pending,
            note: None,
            created_at: Utc::now(),
        }
    }

    fn setup() -> (DashboardStore, Arc<WatchlistBackend>, ChangeFeed) {
        let feed = ChangeFeed::new();
        let remote = RemoteStore::unconfigured(feed.clone());
        let watchlist = Arc::new(WatchlistBackend::for_store(&remote, Arc::new(MemoryStore::new())));
        let dashboard = DashboardStore::new(DashboardState::default());
        dashboard.dispatch(Action::SignedIn(viewer()));
        (dashboard, watchlist, feed)
    }

    #[test]
    fn test_recount_on_demand() {
        let (dashboard, watchlist, _feed) = setup();
        watchlist.upsert(&item("w1")).unwrap();
        watchlist.upsert(&item("w2")).unwrap();
        watchlist.update_status("w2", WatchStatus::Completed).unwrap();

        let counter = NotificationCounter::new(dashboard.clone(), watchlist);

        assert_eq!(counter.recount(), 1);
        assert_eq!(dashboard.read(|s| s.pending_notifications), 1);
    }

    #[tokio::test]
    async fn test_watchlist_change_triggers_recount() {
        let (dashboard, watchlist, feed) = setup();
        let mut changes = dashboard.subscribe();
        let handle = NotificationCounter::new(dashboard.clone(), watchlist.clone()).spawn(feed.subscribe());

        watchlist.upsert(&item("w1")).unwrap();
        changes.changed().await.unwrap();

        assert_eq!(changes.borrow_and_update().pending_notifications, 1);
        handle.abort();
    }
}
