//! In-memory recipient key cache with LRU eviction.
//!
//! Sits above a [`KeyStore`] and only short-circuits remote lookups. Explicit
//! keys and key files are always resolved and refresh the cached entry.
//! Clones share the same entries.

#![allow(clippy::expect_used, reason = "Mutex poisoning should cause a panic")]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use gatebox_crypto::PublicKey;
use gatebox_proto::RecipientId;

use crate::{
    error::ClientError,
    gateway::KeyLookup,
    key_store::{KeyHint, KeySource, KeyStore, ResolvedKey},
};

/// Bounded recipient → public key map.
///
/// Thread-safe via `Arc<Mutex<_>>`. The lock is only held for map operations,
/// never across a lookup.
#[derive(Clone)]
pub struct KeyCache {
    inner: Arc<Mutex<KeyCacheInner>>,
}

struct KeyCacheInner {
    entries: HashMap<RecipientId, PublicKey>,
    /// Most recently used at the back
    lru_order: VecDeque<RecipientId>,
    max_capacity: usize,
}

impl KeyCache {
    /// Create an empty cache holding at most `max_capacity` keys.
    ///
    /// A capacity of zero never stores anything.
    pub fn with_capacity(max_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(KeyCacheInner {
                entries: HashMap::new(),
                lru_order: VecDeque::new(),
                max_capacity,
            })),
        }
    }

    /// Cached key for `recipient`, marking it most recently used.
    pub fn get(&self, recipient: &RecipientId) -> Option<PublicKey> {
        let mut inner = self.inner.lock().expect("KeyCache mutex poisoned");

        let key = inner.entries.get(recipient).copied()?;
        inner.lru_order.retain(|id| id != recipient);
        inner.lru_order.push_back(*recipient);
        Some(key)
    }

    /// Remember `key` for `recipient`, evicting the least recently used entry
    /// when full.
    pub fn insert(&self, recipient: RecipientId, key: PublicKey) {
        let mut inner = self.inner.lock().expect("KeyCache mutex poisoned");
        if inner.max_capacity == 0 {
            return;
        }

        if inner.entries.contains_key(&recipient) {
            inner.lru_order.retain(|id| *id != recipient);
        } else if inner.entries.len() >= inner.max_capacity
            && let Some(oldest) = inner.lru_order.pop_front()
        {
            inner.entries.remove(&oldest);
        }

        inner.entries.insert(recipient, key);
        inner.lru_order.push_back(recipient);
    }

    /// Drop the cached key for `recipient`, e.g. after the recipient rotated
    /// keys.
    pub fn remove(&self, recipient: &RecipientId) -> Option<PublicKey> {
        let mut inner = self.inner.lock().expect("KeyCache mutex poisoned");

        let key = inner.entries.remove(recipient);
        if key.is_some() {
            inner.lru_order.retain(|id| id != recipient);
        }
        key
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("KeyCache mutex poisoned").entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve through the cache.
    ///
    /// Only [`KeyHint::Lookup`] is answered from memory, with source
    /// [`KeySource::Memory`]. Every other hint, and a lookup miss, is resolved
    /// by `store` and inserted on success. Errors are not cached and leave an
    /// existing entry untouched.
    pub async fn resolve<L: KeyLookup>(
        &self,
        store: &KeyStore<L>,
        recipient: &RecipientId,
        hint: &KeyHint,
    ) -> Result<ResolvedKey, ClientError> {
        if matches!(hint, KeyHint::Lookup)
            && let Some(key) = self.get(recipient)
        {
            tracing::debug!(recipient = %recipient, "public key served from memory");
            return Ok(ResolvedKey { key, source: KeySource::Memory });
        }

        let resolved = store.resolve_hint(recipient, hint).await?;
        self.insert(*recipient, resolved.key);
        Ok(resolved)
    }
}

impl std::fmt::Debug for KeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().expect("KeyCache mutex poisoned");
        f.debug_struct("KeyCache")
            .field("len", &inner.entries.len())
            .field("max_capacity", &inner.max_capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> RecipientId {
        RecipientId::new(&format!("ABCDEF{n:02}")).unwrap()
    }

    fn key(n: u8) -> PublicKey {
        PublicKey::from_bytes([n; 32])
    }

    #[test]
    fn insert_and_get() {
        let cache = KeyCache::with_capacity(4);
        cache.insert(id(1), key(1));

        assert_eq!(cache.get(&id(1)), Some(key(1)));
        assert_eq!(cache.get(&id(2)), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = KeyCache::with_capacity(2);
        cache.insert(id(1), key(1));
        cache.insert(id(2), key(2));

        // touch 1 so 2 becomes the oldest
        assert!(cache.get(&id(1)).is_some());
        cache.insert(id(3), key(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&id(1)).is_some());
        assert!(cache.get(&id(2)).is_none());
        assert!(cache.get(&id(3)).is_some());
    }

    #[test]
    fn reinsert_replaces_without_eviction() {
        let cache = KeyCache::with_capacity(2);
        cache.insert(id(1), key(1));
        cache.insert(id(2), key(2));
        cache.insert(id(1), key(9));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&id(1)), Some(key(9)));
        assert_eq!(cache.get(&id(2)), Some(key(2)));
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let cache = KeyCache::with_capacity(0);
        cache.insert(id(1), key(1));

        assert!(cache.is_empty());
    }

    #[test]
    fn clones_share_entries() {
        let cache = KeyCache::with_capacity(4);
        let clone = cache.clone();
        clone.insert(id(1), key(1));

        assert_eq!(cache.get(&id(1)), Some(key(1)));
        assert_eq!(cache.remove(&id(1)), Some(key(1)));
        assert!(clone.is_empty());
    }
}
