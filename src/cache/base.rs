use super::key::CacheKey;
use strata_core::Value;

/// Plain key→value store a decorator chain wraps. `dashmap` gives the
/// base store its own internal synchronization, matching tank's pattern
/// of keeping the concrete storage thin and layering behavior around it
/// (e.g. `CachedConnection` wrapping a raw connection).
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Value>;
    fn put(&self, key: CacheKey, value: Value);
    fn remove(&self, key: &CacheKey);
    fn clear(&self);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
pub struct PerpetualCache {
    entries: dashmap::DashMap<CacheKey, Value>,
}

impl CacheStore for PerpetualCache {
    fn get(&self, key: &CacheKey) -> Option<Value> {
        self.entries.get(key).map(|v| v.clone())
    }

    fn put(&self, key: CacheKey, value: Value) {
        self.entries.insert(key, value);
    }

    fn remove(&self, key: &CacheKey) {
        self.entries.remove(key);
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

pub fn region_error(region: &str, reason: &str) -> strata_core::Error {
    strata_core::MapperError::Cache(format!("cache region `{region}`: {reason}")).into()
}
