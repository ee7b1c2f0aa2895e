//! Injectable per-ticker lookup cache.
//!
//! Collaborators that repeatedly resolve per-ticker facts (classification,
//! resolved store paths) share one explicit cache object owned by the caller
//! instead of process-global mutable state. Clearing is an explicit
//! operation, not a process restart.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::Ticker;

/// Thread-safe ticker-keyed cache. Cloning shares the underlying map.
#[derive(Debug)]
pub struct LookupCache<V> {
    inner: Arc<RwLock<HashMap<Ticker, V>>>,
}

impl<V> Clone for LookupCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Default for LookupCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> LookupCache<V> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.read().contains_key(ticker)
    }

    pub fn put(&self, ticker: Ticker, value: V) {
        self.write().insert(ticker, value);
    }

    /// Reset the cache to empty.
    pub fn clear(&self) {
        self.write().clear();
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Ticker, V>> {
        self.inner
            .read()
            .expect("lookup cache lock should not be poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Ticker, V>> {
        self.inner
            .write()
            .expect("lookup cache lock should not be poisoned")
    }
}

impl<V: Clone> LookupCache<V> {
    pub fn get(&self, ticker: &Ticker) -> Option<V> {
        self.read().get(ticker).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(value: &str) -> Ticker {
        Ticker::parse(value).expect("valid ticker")
    }

    #[test]
    fn stores_and_retrieves_values() {
        let cache: LookupCache<String> = LookupCache::new();

        assert!(cache.get(&ticker("AAPL")).is_none());
        cache.put(ticker("AAPL"), String::from("stock"));
        assert_eq!(cache.get(&ticker("AAPL")), Some(String::from("stock")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_resets_the_cache() {
        let cache: LookupCache<u32> = LookupCache::new();
        cache.put(ticker("AAPL"), 1);
        cache.put(ticker("MSFT"), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn clones_share_state() {
        let cache: LookupCache<u32> = LookupCache::new();
        let alias = cache.clone();

        cache.put(ticker("AAPL"), 1);
        assert_eq!(alias.get(&ticker("AAPL")), Some(1));
    }
}
