use log::{debug, warn};
use std::sync::Arc;

use super::remote::{ChangeFeed, RemoteStore};
use crate::cache::{JsonStore, KeyValueStore};
use crate::database::watchlist::WatchlistTable;
use crate::database::Table;
use crate::domain::{WatchStatus, WatchlistItem};
use crate::errors::AppError;

pub const LOCAL_WATCHLIST_KEY: &str = "scout_watchlist";

/// Ad-hoc watchlist kept under a single local key when no store is configured
pub struct LocalWatchlist {
    store: Arc<dyn KeyValueStore>,
    feed: ChangeFeed,
}

impl LocalWatchlist {
    pub fn new(store: Arc<dyn KeyValueStore>, feed: ChangeFeed) -> Self {
        Self { store, feed }
    }

    /// Newest first, the same order the store returns
    pub fn list(&self) -> Result<Vec<WatchlistItem>, AppError> {
        let mut items = self
            .store
            .load::<Vec<WatchlistItem>>(LOCAL_WATCHLIST_KEY)
            .map_err(|e| AppError::parse("local watchlist", format!("{:#}", e)))?
            .unwrap_or_default();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    pub fn upsert(&self, item: &WatchlistItem) -> Result<(), AppError> {
        let mut items = self.list()?;
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
        self.write(&items)
    }

    pub fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut items = self.list()?;
        items.retain(|item| item.id != id);
        self.write(&items)
    }

    pub fn update_status(&self, id: &str, status: WatchStatus) -> Result<bool, AppError> {
        let mut items = self.list()?;
        let Some(item) = items.iter_mut().find(|item| item.id == id) else {
            return Ok(false);
        };
        item.status = status;
        self.write(&items)?;
        Ok(true)
    }

    fn write(&self, items: &[WatchlistItem]) -> Result<(), AppError> {
        self.store.save(LOCAL_WATCHLIST_KEY, &items)?;
        debug!("Local watchlist now holds {} items", items.len());
        self.feed.publish(WatchlistTable::NAME);
        Ok(())
    }
}

/// Where watchlist items live for this process
pub enum WatchlistBackend {
    Remote(RemoteStore),
    Local(LocalWatchlist),
}

impl WatchlistBackend {
    pub fn for_store(remote: &RemoteStore, local: Arc<dyn KeyValueStore>) -> Self {
        if remote.is_configured() {
            WatchlistBackend::Remote(remote.clone())
        } else {
            WatchlistBackend::Local(LocalWatchlist::new(local, remote.feed().clone()))
        }
    }

    /// Read failures degrade to an empty list
    pub fn list(&self) -> Vec<WatchlistItem> {
        match self {
            WatchlistBackend::Remote(remote) => remote.list::<WatchlistTable>(),
            WatchlistBackend::Local(local) => local.list().unwrap_or_else(|e| {
                warn!("Local watchlist unreadable, showing nothing: {}", e);
                Vec::new()
            }),
        }
    }

    pub fn upsert(&self, item: &WatchlistItem) -> Result<(), AppError> {
        match self {
            WatchlistBackend::Remote(remote) => remote.upsert::<WatchlistTable>(item),
            WatchlistBackend::Local(local) => local.upsert(item),
        }
    }

    pub fn delete(&self, id: &str) -> Result<(), AppError> {
        match self {
            WatchlistBackend::Remote(remote) => remote.delete::<WatchlistTable>(id),
            WatchlistBackend::Local(local) => local.delete(id),
        }
    }

    pub fn update_status(&self, id: &str, status: WatchStatus) -> Result<bool, AppError> {
        match self {
            WatchlistBackend::Remote(remote) => remote.update_watch_status(id, status),
            WatchlistBackend::Local(local) => local.update_status(id, status),
        }
    }
}
