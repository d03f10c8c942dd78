//! Point-in-time view of the cache for synchronous rendering.

use nuvault_api::{FilterKey, VaultEntry};
use std::collections::HashMap;
use std::sync::Arc;

/// Copy of the cache state at one instant.
///
/// Lists are shared with the cache, so taking a snapshot is cheap; later
/// cache writes never alter a snapshot already taken.
#[derive(Debug, Clone, Default)]
pub struct VaultSnapshot {
    pub entries: HashMap<FilterKey, Arc<Vec<VaultEntry>>>,
    pub health_score: Option<u8>,
    pub username: Option<String>,
    /// True while any list fetch is in flight.
    pub loading: bool,
    /// Message from the most recent failed read.
    pub error: Option<String>,
}

impl VaultSnapshot {
    /// Cached list for `filter`, if fetched.
    pub fn list(&self, filter: FilterKey) -> Option<&[VaultEntry]> {
        self.entries.get(&filter).map(|list| list.as_slice())
    }

    pub fn is_cached(&self, filter: FilterKey) -> bool {
        self.entries.contains_key(&filter)
    }

    /// Entries of the cached `filter` list matching `query`.
    ///
    /// An uncached filter yields nothing.
    pub fn search(&self, filter: FilterKey, query: &str) -> Vec<&VaultEntry> {
        self.list(filter)
            .map(|entries| filter_entries(entries, query))
            .unwrap_or_default()
    }
}

/// Case-insensitive substring match over service and username.
///
/// A blank query matches everything. Order is preserved.
pub fn filter_entries<'a>(entries: &'a [VaultEntry], query: &str) -> Vec<&'a VaultEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return entries.iter().collect();
    }

    entries
        .iter()
        .filter(|entry| {
            entry.service.to_lowercase().contains(&needle)
                || entry.username.to_lowercase().contains(&needle)
        })
        .collect()
}
