//! The vault cache.

use crate::snapshot::VaultSnapshot;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use nuvault_api::{
    ApiError, ApiResult, EntryId, EntryInput, FilterKey, PasswordService, VaultEntry,
};
use nuvault_storage::SessionStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

type EntryList = Arc<Vec<VaultEntry>>;
type SharedFetch = Shared<BoxFuture<'static, Result<EntryList, Arc<ApiError>>>>;

/// A list request other readers can join.
struct InFlight {
    fetch_id: u64,
    generation: u64,
    /// Callers currently awaiting `future`.
    waiters: usize,
    future: SharedFetch,
}

/// Releases a caller's interest in an in-flight fetch if it is dropped
/// before the fetch completes. The last waiter to leave removes the slot.
struct WaiterGuard<'a> {
    state: &'a Mutex<CacheState>,
    filter: FilterKey,
    fetch_id: u64,
    armed: bool,
}

impl WaiterGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock();
        let abandoned = match state.in_flight.get_mut(&self.filter) {
            Some(flight) if flight.fetch_id == self.fetch_id => {
                flight.waiters = flight.waiters.saturating_sub(1);
                flight.waiters == 0
            }
            _ => false,
        };
        if abandoned {
            state.in_flight.remove(&self.filter);
            debug!(filter = %self.filter, "Vault fetch abandoned by every caller");
        }
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<FilterKey, EntryList>,
    in_flight: HashMap<FilterKey, InFlight>,
    /// Bumped by every invalidation. Fetches tagged with an older value
    /// must not write.
    generation: u64,
    next_fetch_id: u64,
    health_score: Option<u8>,
    username: Option<String>,
    last_error: Option<String>,
}

/// In-memory cache of vault data, shared by every consumer.
///
/// The state lock is never held across an `.await`.
pub struct VaultCache {
    service: Arc<dyn PasswordService>,
    session: Arc<SessionStore>,
    state: Mutex<CacheState>,
}

impl VaultCache {
    pub fn new(service: Arc<dyn PasswordService>, session: Arc<SessionStore>) -> Self {
        Self {
            service,
            session,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Entries for `filter`, from cache when present.
    ///
    /// Concurrent callers for the same uncached filter share one request.
    /// A failed request caches nothing, records the error for
    /// [`VaultCache::snapshot`] and yields an empty list.
    pub async fn get_entries(&self, filter: FilterKey) -> EntryList {
        let (fetch_id, generation, future) = {
            let mut state = self.state.lock();

            if let Some(list) = state.entries.get(&filter) {
                debug!(filter = %filter, count = list.len(), "Vault cache hit");
                return Arc::clone(list);
            }

            match state.in_flight.get_mut(&filter) {
                Some(flight) => {
                    debug!(filter = %filter, "Joining in-flight vault fetch");
                    flight.waiters += 1;
                    (flight.fetch_id, flight.generation, flight.future.clone())
                }
                None => {
                    debug!(filter = %filter, "Vault cache miss, fetching");
                    let fetch_id = state.next_fetch_id;
                    state.next_fetch_id += 1;
                    let generation = state.generation;
                    let future = self.fetch(filter);
                    state.in_flight.insert(
                        filter,
                        InFlight {
                            fetch_id,
                            generation,
                            waiters: 1,
                            future: future.clone(),
                        },
                    );
                    state.last_error = None;
                    (fetch_id, generation, future)
                }
            }
        };

        let mut guard = WaiterGuard {
            state: &self.state,
            filter,
            fetch_id,
            armed: true,
        };
        let result = future.await;
        guard.disarm();

        let mut state = self.state.lock();
        // Joiners share the owner's fetch_id, so whichever caller resumes
        // first settles the slot and writes the cache. The rest, and fetches
        // detached by an invalidation, only hand back their result.
        let owner = state
            .in_flight
            .get(&filter)
            .is_some_and(|flight| flight.fetch_id == fetch_id);
        if owner {
            state.in_flight.remove(&filter);
        }
        let current = owner && state.generation == generation;

        match result {
            Ok(list) => {
                if current {
                    state.entries.insert(filter, Arc::clone(&list));
                    debug!(filter = %filter, count = list.len(), "Vault list cached");
                } else if owner {
                    debug!(filter = %filter, "Discarding vault list from a stale generation");
                }
                list
            }
            Err(err) => {
                if current {
                    warn!(filter = %filter, error = %err, "Vault fetch failed");
                    state.last_error = Some(err.read_message());
                }
                Arc::new(Vec::new())
            }
        }
    }

    fn fetch(&self, filter: FilterKey) -> SharedFetch {
        let service = Arc::clone(&self.service);
        async move {
            service
                .list_entries(filter)
                .await
                .map(Arc::new)
                .map_err(Arc::new)
        }
        .boxed()
        .shared()
    }

    /// Drop every cached list and detach in-flight fetches.
    pub fn invalidate_all(&self) {
        let mut state = self.state.lock();
        Self::invalidate_locked(&mut state);
        debug!(generation = state.generation, "Vault cache invalidated");
    }

    fn invalidate_locked(state: &mut CacheState) {
        state.generation += 1;
        state.entries.clear();
        state.in_flight.clear();
    }

    /// Flip the favorite flag of `id` and reflect it in every cached list.
    ///
    /// The Favorites list gains or loses the entry accordingly. If the entry
    /// must be added but no cached copy exists, the Favorites list is dropped
    /// instead so the next read refetches it.
    pub async fn toggle_favorite(&self, id: &EntryId) -> ApiResult<bool> {
        let is_favorite = match self.service.toggle_favorite(id).await {
            Ok(flag) => flag,
            Err(err) => {
                warn!(entry_id = %id, error = %err, "Favorite toggle failed");
                return Err(err);
            }
        };

        let mut state = self.state.lock();
        let mut patched: Option<VaultEntry> = None;

        for list in state.entries.values_mut() {
            if !list.iter().any(|entry| &entry.id == id) {
                continue;
            }
            for entry in Arc::make_mut(list).iter_mut().filter(|e| &e.id == id) {
                entry.is_favorite = is_favorite;
                if patched.is_none() {
                    patched = Some(entry.clone());
                }
            }
        }

        // List fetches still in flight predate the toggle.
        state.in_flight.clear();

        if is_favorite {
            let listed = state
                .entries
                .get(&FilterKey::Favorites)
                .map(|list| list.iter().any(|entry| &entry.id == id));
            match (listed, patched) {
                (Some(false), Some(entry)) => {
                    if let Some(list) = state.entries.get_mut(&FilterKey::Favorites) {
                        Arc::make_mut(list).push(entry);
                    }
                }
                (Some(false), None) => {
                    state.entries.remove(&FilterKey::Favorites);
                    debug!(entry_id = %id, "Favorite not cached elsewhere, dropping Favorites list");
                }
                _ => {}
            }
        } else if let Some(list) = state.entries.get_mut(&FilterKey::Favorites) {
            if list.iter().any(|entry| &entry.id == id) {
                Arc::make_mut(list).retain(|entry| &entry.id != id);
            }
        }

        info!(entry_id = %id, is_favorite, "Favorite toggled");
        Ok(is_favorite)
    }

    /// Create an entry. On success every list is invalidated.
    pub async fn add_entry(&self, entry: &EntryInput) -> ApiResult<()> {
        if let Err(err) = self.service.create_entry(entry).await {
            warn!(service = %entry.service, error = %err, "Create entry failed");
            return Err(err);
        }
        self.after_structural_change("add");
        Ok(())
    }

    /// Replace an entry. On success every list is invalidated.
    pub async fn update_entry(&self, id: &EntryId, entry: &EntryInput) -> ApiResult<()> {
        if let Err(err) = self.service.update_entry(id, entry).await {
            warn!(entry_id = %id, error = %err, "Update entry failed");
            return Err(err);
        }
        self.after_structural_change("update");
        Ok(())
    }

    /// Delete an entry. On success every list is invalidated.
    pub async fn delete_entry(&self, id: &EntryId) -> ApiResult<()> {
        if let Err(err) = self.service.delete_entry(id).await {
            warn!(entry_id = %id, error = %err, "Delete entry failed");
            return Err(err);
        }
        self.after_structural_change("delete");
        Ok(())
    }

    fn after_structural_change(&self, operation: &'static str) {
        let mut state = self.state.lock();
        Self::invalidate_locked(&mut state);
        state.health_score = None;
        info!(operation, generation = state.generation, "Vault changed, cache invalidated");
    }

    /// Health score in `0..=100`.
    ///
    /// Served from cache unless `force_refresh`. A failed fetch caches and
    /// returns 0 without touching the error indicator.
    pub async fn get_health_score(&self, force_refresh: bool) -> u8 {
        let generation = {
            let state = self.state.lock();
            if !force_refresh {
                if let Some(score) = state.health_score {
                    return score;
                }
            }
            state.generation
        };

        let score = match self.service.health_score().await {
            Ok(raw) => raw.clamp(0, 100) as u8,
            Err(err) => {
                warn!(error = %err, "Health score fetch failed, using 0");
                0
            }
        };

        let mut state = self.state.lock();
        if state.generation == generation {
            state.health_score = Some(score);
        }
        score
    }

    /// Display name of the logged-in user.
    ///
    /// When the server no longer recognises the user the session token is
    /// cleared. Any failure yields `None`.
    pub async fn get_username(&self) -> Option<String> {
        let generation = {
            let state = self.state.lock();
            if let Some(username) = &state.username {
                return Some(username.clone());
            }
            state.generation
        };

        match self.service.user_info().await {
            Ok(info) => {
                let username = info.username.filter(|name| !name.trim().is_empty())?;
                let mut state = self.state.lock();
                if state.generation == generation {
                    state.username = Some(username.clone());
                }
                Some(username)
            }
            Err(err) if err.is_auth_failure() => {
                warn!(error = %err, "User no longer recognised, clearing session");
                if let Err(storage_err) = self.session.clear_token() {
                    warn!(error = %storage_err, "Failed to clear session token");
                }
                self.state.lock().last_error = Some(err.read_message());
                None
            }
            Err(err) => {
                warn!(error = %err, "User info fetch failed");
                self.state.lock().last_error = Some(err.read_message());
                None
            }
        }
    }

    /// Forget everything. Used on logout and account deletion.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        Self::invalidate_locked(&mut state);
        state.health_score = None;
        state.username = None;
        state.last_error = None;
        info!("Vault cache cleared");
    }

    pub fn is_cached(&self, filter: FilterKey) -> bool {
        self.state.lock().entries.contains_key(&filter)
    }

    pub fn snapshot(&self) -> VaultSnapshot {
        let state = self.state.lock();
        VaultSnapshot {
            entries: state.entries.clone(),
            health_score: state.health_score,
            username: state.username.clone(),
            loading: !state.in_flight.is_empty(),
            error: state.last_error.clone(),
        }
    }
}
