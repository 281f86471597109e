use log::debug;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::remote::RemoteStore;
use crate::cache::{JsonStore, KeyValueStore};
use crate::database::squads;
use crate::domain::{Player, ShadowSquad, Slot};
use crate::errors::{AppError, ValidationError};

pub const SQUAD_KEY_PREFIX: &str = "shadow_squad";

pub const SQUADS_TABLE: &str = "shadow_squads";

/// Per-viewer durable home of a shadow squad
pub trait SquadStore: Send + Sync {
    /// Saved squad, or an empty one on first open
    fn load(&self, viewer_id: &str) -> Result<ShadowSquad, AppError>;
    fn save(&self, viewer_id: &str, squad: &ShadowSquad) -> Result<(), AppError>;
}

pub fn squad_key(viewer_id: &str) -> String {
    format!("{}_{}", SQUAD_KEY_PREFIX, viewer_id)
}

/// Squads kept in viewer-local storage, one key per viewer
pub struct LocalSquadStore {
    store: Arc<dyn KeyValueStore>,
}

impl LocalSquadStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl SquadStore for LocalSquadStore {
    fn load(&self, viewer_id: &str) -> Result<ShadowSquad, AppError> {
        let squad = self
            .store
            .load::<ShadowSquad>(&squad_key(viewer_id))
            .map_err(|e| AppError::parse("stored shadow squad", format!("{:#}", e)))?;
        Ok(squad.unwrap_or_default())
    }

    fn save(&self, viewer_id: &str, squad: &ShadowSquad) -> Result<(), AppError> {
        Ok(self.store.save(&squad_key(viewer_id), squad)?)
    }
}

/// Squads kept in the shared store's `shadow_squads` table
pub struct RemoteSquadStore {
    remote: RemoteStore,
}

impl RemoteSquadStore {
    pub fn new(remote: RemoteStore) -> Self {
        Self { remote }
    }
}

impl SquadStore for RemoteSquadStore {
    fn load(&self, viewer_id: &str) -> Result<ShadowSquad, AppError> {
        let conn = self.remote.conn()?;
        Ok(squads::load(&conn, viewer_id)?.unwrap_or_default())
    }

    fn save(&self, viewer_id: &str, squad: &ShadowSquad) -> Result<(), AppError> {
        let conn = self.remote.conn()?;
        squads::save(&conn, viewer_id, squad)?;
        self.remote.feed().publish(SQUADS_TABLE);
        Ok(())
    }
}

/// Remote table when a database is configured, viewer-local storage otherwise
pub fn squad_store_for(remote: &RemoteStore, local: Arc<dyn KeyValueStore>) -> Arc<dyn SquadStore> {
    if remote.is_configured() {
        Arc::new(RemoteSquadStore::new(remote.clone()))
    } else {
        Arc::new(LocalSquadStore::new(local))
    }
}

/// The viewer's squad plus its store.
///
/// Every mutation runs on a copy, is saved, and only then replaces the
/// in-memory squad: a failed save leaves nothing changed, and a successful
/// call is already durable when it returns.
pub struct SquadService {
    store: Arc<dyn SquadStore>,
    viewer_id: String,
    squad: ShadowSquad,
}

impl SquadService {
    pub fn open(store: Arc<dyn SquadStore>, viewer_id: &str) -> Result<Self, AppError> {
        let squad = store.load(viewer_id)?;
        debug!("Opened shadow squad for {}", viewer_id);
        Ok(Self {
            store,
            viewer_id: viewer_id.to_string(),
            squad,
        })
    }

    pub fn squad(&self) -> &ShadowSquad {
        &self.squad
    }

    pub fn viewer_id(&self) -> &str {
        &self.viewer_id
    }

    pub fn add(&mut self, slot: Slot, player_id: &str) -> Result<bool, AppError> {
        self.apply(|squad| {
            if squad.contains(slot, player_id) {
                return Ok(false);
            }
            squad.add(slot, player_id)?;
            Ok(true)
        })
    }

    pub fn remove(&mut self, slot: Slot, player_id: &str) -> Result<bool, AppError> {
        self.apply(|squad| Ok(squad.remove(slot, player_id)))
    }

    pub fn move_candidate(&mut self, slot: Slot, from: usize, to: usize) -> Result<bool, AppError> {
        self.apply(|squad| Ok(squad.move_candidate(slot, from, to)))
    }

    pub fn move_up(&mut self, slot: Slot, index: usize) -> Result<bool, AppError> {
        self.apply(|squad| Ok(squad.move_up(slot, index)))
    }

    pub fn move_down(&mut self, slot: Slot, index: usize) -> Result<bool, AppError> {
        self.apply(|squad| Ok(squad.move_down(slot, index)))
    }

    pub fn promote(&mut self, slot: Slot, index: usize) -> Result<bool, AppError> {
        self.apply(|squad| Ok(squad.promote(slot, index)))
    }

    pub fn players_in_slot<'a>(&self, slot: Slot, players: &'a [Player]) -> Vec<&'a Player> {
        self.squad.players_in_slot(slot, players)
    }

    pub fn search_candidates<'a>(&self, slot: Slot, text: &str, players: &'a [Player]) -> Vec<&'a Player> {
        self.squad.search_candidates(slot, text, players)
    }

    fn apply<F>(&mut self, change: F) -> Result<bool, AppError>
    where
        F: FnOnce(&mut ShadowSquad) -> Result<bool, ValidationError>,
    {
        let mut next = self.squad.clone();
        if !change(&mut next)? {
            return Ok(false);
        }
        self.store.save(&self.viewer_id, &next)?;
        self.squad = next;
        Ok(true)
    }
}

/// Hands out one viewer's squad at a time.
///
/// The squad is reloaded under the viewer's lock, so overlapping requests
/// for the same viewer never save over each other.
pub struct SquadDirectory {
    store: Arc<dyn SquadStore>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SquadDirectory {
    pub fn new(store: Arc<dyn SquadStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn open(&self, viewer_id: &str) -> Result<SquadGuard, AppError> {
        let lock = self.locks.lock().await.entry(viewer_id.to_string()).or_default().clone();
        let held = lock.lock_owned().await;
        let service = SquadService::open(self.store.clone(), viewer_id)?;
        Ok(SquadGuard { service, _held: held })
    }
}

/// A `SquadService` that keeps its viewer locked until dropped
pub struct SquadGuard {
    service: SquadService,
    _held: OwnedMutexGuard<()>,
}

impl Deref for SquadGuard {
    type Target = SquadService;

    fn deref(&self) -> &SquadService {
        &self.service
    }
}

impl DerefMut for SquadGuard {
    fn deref_mut(&mut self) -> &mut SquadService {
        &mut self.service
    }
}
