use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::cache::{JsonStore, KeyValueStore};
use crate::domain::User;

pub const SESSION_KEY: &str = "scout_session";

/// Signed-in user kept in local storage between runs
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn save(&self, user: &User) -> Result<()> {
        self.store.save(SESSION_KEY, user)?;
        info!("Session started for {}", user.username);
        Ok(())
    }

    /// Returns the stored user as-is; nothing re-checks it against the store.
    /// A malformed entry counts as signed out.
    pub fn restore(&self) -> Option<User> {
        match self.store.load::<User>(SESSION_KEY) {
            Ok(Some(user)) => {
                warn!(
                    "Restoring session for {} from local storage without re-validation",
                    user.username
                );
                Some(user)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Ignoring unreadable session: {:#}", e);
                None
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(SESSION_KEY)?;
        info!("Session cleared");
        Ok(())
    }
}
