//! Backend abstraction for the token store.

use crate::StorageResult;

/// String key/value backend. Implementations serialise their own access.
pub trait SecureStorage: Send + Sync {
    /// Insert or overwrite.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Delete a value. Returns whether a value was present.
    fn delete(&self, key: &str) -> StorageResult<bool>;

    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
