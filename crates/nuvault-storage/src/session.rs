//! High-level API over the stored session token.

use crate::{SecureStorage, StorageKeys, StorageResult};
use tracing::{debug, info};

/// Owns the bearer token used to authenticate every request.
pub struct SessionStore {
    storage: Box<dyn SecureStorage>,
}

impl SessionStore {
    /// Create a session store over the given storage backend
    pub fn new(storage: Box<dyn SecureStorage>) -> Self {
        Self { storage }
    }

    /// Current bearer token, if logged in.
    pub fn token(&self) -> StorageResult<Option<String>> {
        self.storage.get(StorageKeys::SESSION_TOKEN)
    }

    /// Store the token issued at login.
    pub fn set_token(&self, token: &str) -> StorageResult<()> {
        self.storage.set(StorageKeys::SESSION_TOKEN, token)?;
        info!("Session token stored");
        Ok(())
    }

    /// Remove the token. Returns whether one was present.
    pub fn clear_token(&self) -> StorageResult<bool> {
        let removed = self.storage.delete(StorageKeys::SESSION_TOKEN)?;
        if removed {
            info!("Session token cleared");
        } else {
            debug!("No session token to clear");
        }
        Ok(removed)
    }

    /// Whether a token is present. Does not validate it with the server.
    pub fn is_authenticated(&self) -> StorageResult<bool> {
        Ok(self
            .token()?
            .map(|token| !token.trim().is_empty())
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;

    fn store() -> SessionStore {
        SessionStore::new(Box::new(MemoryStorage::new()))
    }

    #[test]
    fn test_token_lifecycle() {
        let session = store();
        assert_eq!(session.token().unwrap(), None);
        assert!(!session.is_authenticated().unwrap());

        session.set_token("jwt-1").unwrap();
        assert_eq!(session.token().unwrap(), Some("jwt-1".to_string()));
        assert!(session.is_authenticated().unwrap());

        session.set_token("jwt-2").unwrap();
        assert_eq!(session.token().unwrap(), Some("jwt-2".to_string()));

        assert!(session.clear_token().unwrap());
        assert!(!session.clear_token().unwrap());
        assert!(!session.is_authenticated().unwrap());
    }

    #[test]
    fn test_blank_token_is_not_authenticated() {
        let session = store();
        session.set_token("   ").unwrap();
        assert!(!session.is_authenticated().unwrap());
    }
}
