//! LRU + TTL cache for collaborator answers.
//!
//! Insertion order doubles as recency order: `set` re-inserts the key at
//! the back, `get` touches it, and eviction pops from the iteration head
//! once capacity is exceeded. Time is passed in explicitly so behavior is
//! testable and never coupled to a wall clock inside the core.

use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at_ms: u64,
}

#[derive(Debug)]
pub struct AiCache {
    max_entries: usize,
    ttl_ms: u64,
    entries: HashMap<String, Entry>,
    /// Recency order, oldest first.
    order: Vec<String>,
}

impl AiCache {
    pub fn new(max_entries: usize, ttl_ms: u64) -> Self {
        Self {
            max_entries: max_entries.max(1),
            ttl_ms,
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let k = self.order.remove(pos);
            self.order.push(k);
        }
    }

    pub fn set(&mut self, key: &str, value: Value, now_ms: u64) {
        if self.entries.contains_key(key) {
            // Remove first so the re-insert lands at the back of the
            // iteration order.
            if let Some(pos) = self.order.iter().position(|k| k == key) {
                self.order.remove(pos);
            }
        }
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at_ms: now_ms + self.ttl_ms,
            },
        );
        self.order.push(key.to_string());

        while self.order.len() > self.max_entries {
            let evicted = self.order.remove(0);
            self.entries.remove(&evicted);
            tracing::debug!(key = %evicted, "cache entry evicted");
        }
    }

    pub fn get(&mut self, key: &str, now_ms: u64) -> Option<Value> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.expires_at_ms <= now_ms,
            None => return None,
        };
        if expired {
            self.entries.remove(key);
            self.order.retain(|k| k != key);
            return None;
        }
        self.touch(key);
        self.entries.get(key).map(|e| e.value.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys oldest-first, exposed for inspection.
    pub fn keys(&self) -> &[String] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn touched_entries_survive_eviction() {
        let mut cache = AiCache::new(2, 1000);
        cache.set("a", json!(1), 0);
        cache.set("b", json!(2), 0);
        assert!(cache.get("a", 1).is_some());
        // Iteration head is now "b": inserting "c" evicts it.
        cache.set("c", json!(3), 2);
        assert!(cache.get("b", 3).is_none());
        assert!(cache.get("a", 3).is_some());
        assert!(cache.get("c", 3).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn entries_expire_by_ttl() {
        let mut cache = AiCache::new(4, 100);
        cache.set("a", json!(1), 0);
        assert!(cache.get("a", 99).is_some());
        assert!(cache.get("a", 100).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn reinsert_moves_key_to_back() {
        let mut cache = AiCache::new(2, 1000);
        cache.set("a", json!(1), 0);
        cache.set("b", json!(2), 0);
        cache.set("a", json!(10), 1);
        cache.set("c", json!(3), 2);
        // "b" was at the head after "a" re-inserted behind it.
        assert!(cache.get("b", 3).is_none());
        assert_eq!(cache.get("a", 3), Some(json!(10)));
    }
}
