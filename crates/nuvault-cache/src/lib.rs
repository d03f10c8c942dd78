//! Client-side vault cache.
//!
//! `VaultCache` memoizes entry lists per [`FilterKey`](nuvault_api::FilterKey),
//! the health score and the username. It is constructed once and shared by
//! `Arc`; every consumer reads and mutates through it.
//!
//! Rules:
//! - Concurrent reads of the same uncached filter share one request.
//! - Structural mutations (add, update, delete) invalidate every list.
//! - A favorite toggle patches cached lists in place.
//! - A fetch that started before an invalidation never writes the cache.

mod cache;
mod snapshot;

#[cfg(test)]
mod testing;

pub use cache::VaultCache;
pub use snapshot::{filter_entries, VaultSnapshot};
