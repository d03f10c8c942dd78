//! The slice of the password service the vault cache depends on.

use crate::client::NuvaultClient;
use crate::error::ApiResult;
use crate::models::{EntryId, EntryInput, FilterKey, UserInfo, VaultEntry};
use async_trait::async_trait;

/// Remote operations backing the vault cache.
///
/// Implemented by [`NuvaultClient`]; tests substitute an in-memory fake.
#[async_trait]
pub trait PasswordService: Send + Sync {
    async fn list_entries(&self, filter: FilterKey) -> ApiResult<Vec<VaultEntry>>;

    async fn create_entry(&self, entry: &EntryInput) -> ApiResult<()>;

    async fn update_entry(&self, id: &EntryId, entry: &EntryInput) -> ApiResult<()>;

    async fn delete_entry(&self, id: &EntryId) -> ApiResult<()>;

    /// Returns the flag's new value.
    async fn toggle_favorite(&self, id: &EntryId) -> ApiResult<bool>;

    /// Raw score; not clamped.
    async fn health_score(&self) -> ApiResult<i64>;

    async fn user_info(&self) -> ApiResult<UserInfo>;
}

#[async_trait]
impl PasswordService for NuvaultClient {
    async fn list_entries(&self, filter: FilterKey) -> ApiResult<Vec<VaultEntry>> {
        NuvaultClient::list_entries(self, filter).await
    }

    async fn create_entry(&self, entry: &EntryInput) -> ApiResult<()> {
        NuvaultClient::create_entry(self, entry).await
    }

    async fn update_entry(&self, id: &EntryId, entry: &EntryInput) -> ApiResult<()> {
        NuvaultClient::update_entry(self, id, entry).await
    }

    async fn delete_entry(&self, id: &EntryId) -> ApiResult<()> {
        NuvaultClient::delete_entry(self, id).await
    }

    async fn toggle_favorite(&self, id: &EntryId) -> ApiResult<bool> {
        NuvaultClient::toggle_favorite(self, id).await
    }

    async fn health_score(&self) -> ApiResult<i64> {
        NuvaultClient::health_score(self).await
    }

    async fn user_info(&self) -> ApiResult<UserInfo> {
        NuvaultClient::user_info(self).await
    }
}
