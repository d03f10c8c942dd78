//! Session token storage for the Nuvault client.
//!
//! The bearer token issued at login is the only piece of client-side
//! persistent state. Its presence is the authentication signal consumed
//! by the rest of the client.
//!
//! Backends:
//! - **File**: a `0600` JSON object under `~/.nuvault/session.json`
//! - **Memory**: process-local, for tests and throwaway sessions

mod file;
mod keys;
mod memory;
mod session;
mod traits;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use session::SessionStore;
pub use traits::SecureStorage;

use nuvault_config_and_utils::Paths;
use thiserror::Error;

/// Token store failure.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backing file is not a JSON object of strings
    #[error("Corrupt session store: {0}")]
    Encoding(String),

    #[error("Session store I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand for results carrying [`StorageError`].
pub type StorageResult<T> = Result<T, StorageError>;

/// Create the default file-backed storage under the given paths.
pub fn create_storage(paths: &Paths) -> StorageResult<Box<dyn SecureStorage>> {
    let storage = FileStorage::open(paths.session_file())?;
    Ok(Box::new(storage))
}

/// Create a SessionStore with the default file-backed storage.
pub fn create_session_store(paths: &Paths) -> StorageResult<SessionStore> {
    let storage = create_storage(paths)?;
    Ok(SessionStore::new(storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_backend_through_trait_object() {
        let storage: Box<dyn SecureStorage> = Box::new(MemoryStorage::new());
        let key = StorageKeys::SESSION_TOKEN;

        assert!(!storage.has(key).unwrap());
        storage.set(key, "jwt-1").unwrap();
        storage.set(key, "jwt-2").unwrap();
        assert_eq!(storage.get(key).unwrap().as_deref(), Some("jwt-2"));

        assert!(storage.delete(key).unwrap());
        assert!(!storage.has(key).unwrap());
        assert!(!storage.delete(key).unwrap());
    }

    #[test]
    fn test_create_session_store_persists_token() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let store = create_session_store(&paths).unwrap();
        assert!(!store.is_authenticated().unwrap());
        store.set_token("jwt-abc").unwrap();

        // A second store over the same file sees the token.
        let reopened = create_session_store(&paths).unwrap();
        assert_eq!(reopened.token().unwrap(), Some("jwt-abc".to_string()));

        reopened.clear_token().unwrap();
        let reopened = create_session_store(&paths).unwrap();
        assert!(!reopened.is_authenticated().unwrap());
    }

    #[test]
    fn test_session_key_matches_stored_field() {
        // Existing session files store the token under this key.
        assert_eq!(StorageKeys::SESSION_TOKEN, "token");
    }
}
