//! In-memory `PasswordService` for cache tests.

use async_trait::async_trait;
use nuvault_api::{
    ApiError, ApiResult, EntryId, EntryInput, FilterKey, PasswordService, UserInfo, VaultEntry,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

pub fn entry(id: i64, service: &str, username: &str, is_favorite: bool) -> VaultEntry {
    VaultEntry {
        id: EntryId::from(id),
        service: service.to_string(),
        username: username.to_string(),
        password: format!("secret-{id}"),
        is_favorite,
        category_id: None,
        tags: Vec::new(),
        created_at: None,
    }
}

pub fn input(service: &str, username: &str, password: &str) -> EntryInput {
    EntryInput {
        service: service.to_string(),
        username: username.to_string(),
        password: password.to_string(),
        category_id: None,
        tag_ids: Vec::new(),
        is_favorite: false,
    }
}

/// Scriptable fake. Lists are served per filter; failures are one-shot.
#[derive(Default)]
pub struct FakeService {
    lists: Mutex<HashMap<FilterKey, Vec<VaultEntry>>>,
    list_calls: Mutex<HashMap<FilterKey, usize>>,
    fail_lists: AtomicBool,
    block_lists: AtomicBool,
    release: Notify,

    next_mutation_error: Mutex<Option<ApiError>>,
    mutation_calls: AtomicUsize,
    favorites: Mutex<HashMap<EntryId, bool>>,

    health: Mutex<Option<i64>>,
    health_calls: AtomicUsize,

    user: Mutex<Option<UserInfo>>,
    user_error: Mutex<Option<ApiError>>,
    user_calls: AtomicUsize,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_list(&self, filter: FilterKey, entries: Vec<VaultEntry>) {
        self.lists.lock().insert(filter, entries);
    }

    pub fn list_calls(&self, filter: FilterKey) -> usize {
        self.list_calls.lock().get(&filter).copied().unwrap_or(0)
    }

    pub fn total_list_calls(&self) -> usize {
        self.list_calls.lock().values().sum()
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    /// Make list requests wait for [`FakeService::release`].
    pub fn block_lists(&self, block: bool) {
        self.block_lists.store(block, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn fail_next_mutation(&self, err: ApiError) {
        *self.next_mutation_error.lock() = Some(err);
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    pub fn set_health(&self, score: Option<i64>) {
        *self.health.lock() = score;
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn set_user(&self, username: &str) {
        *self.user.lock() = Some(UserInfo {
            username: Some(username.to_string()),
            user_email: None,
        });
    }

    pub fn fail_user(&self, err: ApiError) {
        *self.user_error.lock() = Some(err);
    }

    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    fn mutate(&self) -> ApiResult<()> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        match self.next_mutation_error.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PasswordService for FakeService {
    async fn list_entries(&self, filter: FilterKey) -> ApiResult<Vec<VaultEntry>> {
        *self.list_calls.lock().entry(filter).or_insert(0) += 1;

        if self.block_lists.load(Ordering::SeqCst) {
            self.release.notified().await;
        }

        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(ApiError::Server {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }

        Ok(self.lists.lock().get(&filter).cloned().unwrap_or_default())
    }

    async fn create_entry(&self, _entry: &EntryInput) -> ApiResult<()> {
        self.mutate()
    }

    async fn update_entry(&self, _id: &EntryId, _entry: &EntryInput) -> ApiResult<()> {
        self.mutate()
    }

    async fn delete_entry(&self, _id: &EntryId) -> ApiResult<()> {
        self.mutate()
    }

    async fn toggle_favorite(&self, id: &EntryId) -> ApiResult<bool> {
        self.mutate()?;

        let current = self
            .lists
            .lock()
            .values()
            .flatten()
            .find(|e| &e.id == id)
            .map(|e| e.is_favorite);

        let mut favorites = self.favorites.lock();
        let flag = favorites.entry(id.clone()).or_insert(current.unwrap_or(false));
        *flag = !*flag;
        Ok(*flag)
    }

    async fn health_score(&self) -> ApiResult<i64> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        (*self.health.lock()).ok_or_else(|| ApiError::Server {
            status: 503,
            message: "Service Unavailable".to_string(),
        })
    }

    async fn user_info(&self) -> ApiResult<UserInfo> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.user_error.lock().take() {
            return Err(err);
        }
        Ok(self.user.lock().clone().unwrap_or_default())
    }
}
