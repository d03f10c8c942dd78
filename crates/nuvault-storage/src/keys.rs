//! Storage key constants.

/// Storage keys used by the client
pub struct StorageKeys;

impl StorageKeys {
    /// Bearer token issued by `/login`
    pub const SESSION_TOKEN: &'static str = "token";
}
