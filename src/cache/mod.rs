pub mod base;
pub mod decorators;
pub mod key;

use base::{CacheStore, PerpetualCache};
use decorators::{
    BlockingDecorator, EvictionDecorator, EvictionPolicy, LoggingDecorator, ScheduledFlushDecorator,
    SerializedDecorator, SynchronizedDecorator,
};
use std::time::Duration;

pub use key::{CacheKey, CacheKeyBuilder};

/// Settings for one `<cache>` region, mirroring the attributes MyBatis
/// exposes on the element.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub eviction: EvictionPolicy,
    pub size: usize,
    pub flush_interval: Option<Duration>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            eviction: EvictionPolicy::Lru,
            size: 1024,
            flush_interval: None,
        }
    }
}

/// A named, decorator-wrapped key/value store shared across statements
/// via `cache-ref`. Built once at startup; the chain is fixed at
/// `eviction → scheduled-flush → serialized → logging → synchronized →
/// blocking` for the default perpetual base.
pub struct CacheRegion {
    blocking: BlockingDecorator<
        SynchronizedDecorator<LoggingDecorator<SerializedDecorator<ScheduledFlushDecorator<EvictionDecorator<PerpetualCache>>>>>,
    >,
}

impl CacheRegion {
    pub fn new(namespace: &str, settings: CacheSettings) -> Self {
        let base = PerpetualCache::default();
        let eviction = EvictionDecorator::new(base, settings.eviction, settings.size);
        let flush = ScheduledFlushDecorator::new(
            eviction,
            settings.flush_interval.unwrap_or(Duration::from_secs(u64::MAX / 2)),
        );
        let serialized = SerializedDecorator::new(flush);
        let logging = LoggingDecorator::new(serialized, namespace.to_string());
        let synchronized = SynchronizedDecorator::new(logging);
        let blocking = BlockingDecorator::new(synchronized);
        Self { blocking }
    }

    pub fn get(&self, key: &CacheKey) -> Option<strata_core::Value> {
        self.blocking.get(key)
    }

    /// Blocks until either a cached value appears or the caller is
    /// granted the right to recompute it (see
    /// [`BlockingDecorator::acquire`]).
    pub fn get_or_lock(&self, key: &CacheKey) -> Option<strata_core::Value> {
        self.blocking.acquire(key)
    }

    pub fn put(&self, key: CacheKey, value: strata_core::Value) {
        self.blocking.put(key, value);
    }

    pub fn release(&self, key: &CacheKey) {
        self.blocking.release(key);
    }

    pub fn remove(&self, key: &CacheKey) {
        self.blocking.remove(key);
    }

    pub fn clear(&self) {
        self.blocking.clear();
    }

    pub fn len(&self) -> usize {
        self.blocking.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocking.is_empty()
    }
}
