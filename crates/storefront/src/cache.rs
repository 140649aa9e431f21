//! In-memory cache of card detail responses.
//!
//! The cache is created by the caller and handed to
//! [`ApiClient`](crate::api::ApiClient); nothing global. Entries never expire
//! by time. With [`CachePolicy::Unbounded`] an entry lives until it is
//! invalidated or the cache is dropped.

use std::fmt;

use manavault_core::{CardDetail, PrintingId};
use moka::future::Cache;
use tracing::debug;

/// Eviction policy for [`CardCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Never evict.
    #[default]
    Unbounded,
    /// Evict least-recently-used entries beyond `capacity`.
    Bounded { capacity: u64 },
}

/// Card detail cache keyed by printing id. Cheap to clone; clones share
/// entries.
#[derive(Clone)]
pub struct CardCache {
    policy: CachePolicy,
    entries: Cache<PrintingId, CardDetail>,
}

impl CardCache {
    /// Create an empty cache with the given policy.
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        let entries = match policy {
            CachePolicy::Unbounded => Cache::builder().build(),
            CachePolicy::Bounded { capacity } => Cache::builder().max_capacity(capacity).build(),
        };
        Self { policy, entries }
    }

    #[must_use]
    pub const fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub async fn get(&self, id: &PrintingId) -> Option<CardDetail> {
        let hit = self.entries.get(id).await;
        if hit.is_some() {
            debug!(printing_id = %id, "Cache hit for card");
        }
        hit
    }

    pub async fn insert(&self, card: CardDetail) {
        self.entries.insert(card.id().clone(), card).await;
    }

    /// Drop one card.
    pub async fn invalidate(&self, id: &PrintingId) {
        self.entries.invalidate(id).await;
    }

    /// Drop every card.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Approximate number of cached cards.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply pending maintenance so counts are exact. Useful in tests.
    pub async fn sync(&self) {
        self.entries.run_pending_tasks().await;
    }
}

impl Default for CardCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl fmt::Debug for CardCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardCache")
            .field("policy", &self.policy)
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use manavault_core::RawCardDetail;
    use manavault_core::RawPrinting;

    use super::*;

    fn card(id: &str) -> CardDetail {
        CardDetail::from(RawCardDetail {
            printing: RawPrinting {
                printing_id: id.to_string(),
                name: "Sol Ring".to_string(),
                ..RawPrinting::default()
            },
            ..RawCardDetail::default()
        })
    }

    #[tokio::test]
    async fn test_insert_get_invalidate() {
        let cache = CardCache::default();
        cache.insert(card("a")).await;
        cache.insert(card("b")).await;

        let id = PrintingId::new("a");
        assert_eq!(cache.get(&id).await.unwrap().printing.name, "Sol Ring");

        cache.invalidate(&id).await;
        assert!(cache.get(&id).await.is_none());
        assert!(cache.get(&PrintingId::new("b")).await.is_some());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = CardCache::new(CachePolicy::Unbounded);
        let other = cache.clone();
        cache.insert(card("a")).await;
        assert!(other.get(&PrintingId::new("a")).await.is_some());

        other.clear();
        cache.sync().await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_unbounded_keeps_everything() {
        let cache = CardCache::new(CachePolicy::Unbounded);
        for i in 0..500 {
            cache.insert(card(&format!("p{i}"))).await;
        }
        cache.sync().await;
        assert_eq!(cache.len(), 500);
    }

    #[tokio::test]
    async fn test_bounded_evicts_beyond_capacity() {
        let cache = CardCache::new(CachePolicy::Bounded { capacity: 10 });
        for i in 0..100 {
            cache.insert(card(&format!("p{i}"))).await;
        }
        cache.sync().await;
        assert!(cache.len() <= 10);
    }
}
