use anyhow::Context;
use log::{info, warn};
use tokio::sync::broadcast;

use crate::config::settings::StoreSettings;
use crate::database::players::{self, PlayersTable};
use crate::database::watchlist::{self, WatchlistTable};
use crate::database::{self, DbConn, DbPool, Table};
use crate::domain::{Player, WatchStatus};
use crate::errors::AppError;

const CHANGE_FEED_CAPACITY: usize = 64;

/// A collection changed in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: &'static str,
}

/// In-process change notifications, the stand-in for realtime pushes
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, table: &'static str) {
        // Nobody listening is fine
        let _ = self.sender.send(ChangeEvent { table });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

/// Entry point to the shared store.
///
/// Without a configured database every list is empty and every write fails
/// with `AppError::NotConfigured`. Read failures degrade to empty lists,
/// write failures are returned to the caller.
#[derive(Clone)]
pub struct RemoteStore {
    pool: Option<DbPool>,
    feed: ChangeFeed,
}

impl RemoteStore {
    pub fn connect(settings: &StoreSettings, feed: ChangeFeed) -> anyhow::Result<Self> {
        let Some(path) = settings.database_path.as_deref() else {
            warn!("No database configured; running in local-only mode");
            return Ok(Self::unconfigured(feed));
        };

        let pool = database::create_pool(path)
            .with_context(|| format!("Failed to open store at {}", path))?;
        info!("Connected to store at {}", path);

        Ok(Self::from_pool(pool, feed))
    }

    pub fn from_pool(pool: DbPool, feed: ChangeFeed) -> Self {
        Self {
            pool: Some(pool),
            feed,
        }
    }

    pub fn unconfigured(feed: ChangeFeed) -> Self {
        Self { pool: None, feed }
    }

    pub fn is_configured(&self) -> bool {
        self.pool.is_some()
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    pub fn list<T: Table>(&self) -> Vec<T::Record> {
        match self.try_list::<T>() {
            Ok(records) => records,
            Err(AppError::NotConfigured) => Vec::new(),
            Err(e) => {
                warn!("Listing {} failed, showing nothing: {}", T::NAME, e);
                Vec::new()
            }
        }
    }

    pub fn try_list<T: Table>(&self) -> Result<Vec<T::Record>, AppError> {
        let conn = self.conn()?;
        Ok(T::list(&conn)?)
    }

    pub fn upsert<T: Table>(&self, record: &T::Record) -> Result<(), AppError> {
        let conn = self.conn()?;
        T::upsert(&conn, record)?;
        self.feed.publish(T::NAME);
        Ok(())
    }

    pub fn delete<T: Table>(&self, id: &str) -> Result<(), AppError> {
        let conn = self.conn()?;
        T::delete(&conn, id)?;
        self.feed.publish(T::NAME);
        Ok(())
    }

    pub fn find_player(&self, id: &str) -> Result<Option<Player>, AppError> {
        let conn = self.conn()?;
        Ok(players::find_by_id(&conn, id)?)
    }

    /// All-or-nothing bulk upsert used by file imports
    pub fn upsert_players(&self, batch: &[Player]) -> Result<usize, AppError> {
        let mut conn = self.conn()?;
        let count = players::upsert_all(&mut conn, batch)?;
        self.feed.publish(PlayersTable::NAME);
        Ok(count)
    }

    pub fn update_watch_status(&self, id: &str, status: WatchStatus) -> Result<bool, AppError> {
        let conn = self.conn()?;
        let changed = watchlist::update_status(&conn, id, status)?;
        if changed {
            self.feed.publish(WatchlistTable::NAME);
        }
        Ok(changed)
    }

    pub(crate) fn conn(&self) -> Result<DbConn, AppError> {
        let pool = self.pool.as_ref().ok_or(AppError::NotConfigured)?;
        Ok(database::get_connection(pool)?)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// Store on a throwaway SQLite file; keep the `TempDir` alive for the test
    pub fn temp_store() -> (RemoteStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let settings = StoreSettings {
            database_path: Some(path.to_string_lossy().into_owned()),
            local_dir: dir.path().join("local"),
        };
        let store = RemoteStore::connect(&settings, ChangeFeed::new()).unwrap();
        (store, dir)
    }
}
