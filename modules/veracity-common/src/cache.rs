// Bounded read-through cache shared across concurrent requests.
// Entries are immutable snapshots; a full cache drops expired entries first,
// then the oldest insertion.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

pub struct BoundedCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    capacity: usize,
    ttl: Option<Duration>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_fresh(&self, entry: &CacheEntry<V>) -> bool {
        match self.ttl {
            Some(ttl) => entry.inserted_at.elapsed() < ttl,
            None => true,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        self.is_fresh(entry).then(|| entry.value.clone())
    }

    /// Insert or replace. Concurrent inserts for the same key race; the last
    /// writer wins.
    pub async fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            if let Some(ttl) = self.ttl {
                let now = Instant::now();
                entries.retain(|_, e| now.duration_since(e.inserted_at) < ttl);
            }
            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
