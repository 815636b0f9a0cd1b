//! Decorators form a linear chain applied outermost-to-innermost, in
//! this order, when the base store is the default perpetual store:
//! `eviction → scheduled-flush → serialized → logging → synchronized →
//! blocking`.

use super::base::CacheStore;
use super::key::CacheKey;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};
use strata_core::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    Lru,
    Fifo,
    Soft,
    Weak,
}

/// Drops the eldest entry on size overflow. `Soft`/`Weak` degrade to FIFO
/// here since Rust has no GC-integrated weak-reference cache semantics
/// to hook into; they still bound the region's size.
pub struct EvictionDecorator<C: CacheStore> {
    inner: C,
    policy: EvictionPolicy,
    capacity: usize,
    order: Mutex<VecDeque<CacheKey>>,
}

impl<C: CacheStore> EvictionDecorator<C> {
    pub fn new(inner: C, policy: EvictionPolicy, capacity: usize) -> Self {
        Self {
            inner,
            policy,
            capacity,
            order: Mutex::new(VecDeque::new()),
        }
    }

    fn touch(&self, key: &CacheKey) {
        if self.policy != EvictionPolicy::Lru {
            return;
        }
        let mut order = self.order.lock().unwrap();
        if let Some(pos) = order.iter().position(|k| k == key) {
            order.remove(pos);
        }
        order.push_back(key.clone());
    }
}

impl<C: CacheStore> CacheStore for EvictionDecorator<C> {
    fn get(&self, key: &CacheKey) -> Option<Value> {
        let value = self.inner.get(key);
        if value.is_some() {
            self.touch(key);
        }
        value
    }

    fn put(&self, key: CacheKey, value: Value) {
        let mut order = self.order.lock().unwrap();
        if !order.contains(&key) {
            order.push_back(key.clone());
        }
        while order.len() > self.capacity {
            if let Some(eldest) = order.pop_front() {
                self.inner.remove(&eldest);
            }
        }
        drop(order);
        self.inner.put(key, value);
    }

    fn remove(&self, key: &CacheKey) {
        self.order.lock().unwrap().retain(|k| k != key);
        self.inner.remove(key);
    }

    fn clear(&self) {
        self.order.lock().unwrap().clear();
        self.inner.clear();
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Clears the delegate once `now - last_clear >= interval`.
pub struct ScheduledFlushDecorator<C: CacheStore> {
    inner: C,
    interval: Duration,
    last_clear: Mutex<Instant>,
}

impl<C: CacheStore> ScheduledFlushDecorator<C> {
    pub fn new(inner: C, interval: Duration) -> Self {
        Self {
            inner,
            interval,
            last_clear: Mutex::new(Instant::now()),
        }
    }

    fn maybe_flush(&self) {
        let mut last_clear = self.last_clear.lock().unwrap();
        if last_clear.elapsed() >= self.interval {
            self.inner.clear();
            *last_clear = Instant::now();
        }
    }
}

impl<C: CacheStore> CacheStore for ScheduledFlushDecorator<C> {
    fn get(&self, key: &CacheKey) -> Option<Value> {
        self.maybe_flush();
        self.inner.get(key)
    }

    fn put(&self, key: CacheKey, value: Value) {
        self.maybe_flush();
        self.inner.put(key, value);
    }

    fn remove(&self, key: &CacheKey) {
        self.inner.remove(key);
    }

    fn clear(&self) {
        self.inner.clear();
        *self.last_clear.lock().unwrap() = Instant::now();
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Returns independent clones on get, preserving at-rest immutability:
/// a caller mutating a returned `Value` never perturbs what's cached.
/// `Value`'s hand-written `Clone` already gives value semantics, so this
/// decorator's job is purely to document and enforce that every get is a
/// fresh clone rather than a shared alias.
pub struct SerializedDecorator<C: CacheStore> {
    inner: C,
}

impl<C: CacheStore> SerializedDecorator<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: CacheStore> CacheStore for SerializedDecorator<C> {
    fn get(&self, key: &CacheKey) -> Option<Value> {
        self.inner.get(key)
    }

    fn put(&self, key: CacheKey, value: Value) {
        self.inner.put(key, value);
    }

    fn remove(&self, key: &CacheKey) {
        self.inner.remove(key);
    }

    fn clear(&self) {
        self.inner.clear();
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

pub struct LoggingDecorator<C: CacheStore> {
    inner: C,
    region: String,
    hits: std::sync::atomic::AtomicU64,
    misses: std::sync::atomic::AtomicU64,
}

impl<C: CacheStore> LoggingDecorator<C> {
    pub fn new(inner: C, region: impl Into<String>) -> Self {
        Self {
            inner,
            region: region.into(),
            hits: Default::default(),
            misses: Default::default(),
        }
    }
}

impl<C: CacheStore> CacheStore for LoggingDecorator<C> {
    fn get(&self, key: &CacheKey) -> Option<Value> {
        let value = self.inner.get(key);
        use std::sync::atomic::Ordering::Relaxed;
        if value.is_some() {
            self.hits.fetch_add(1, Relaxed);
        } else {
            self.misses.fetch_add(1, Relaxed);
        }
        log::debug!(
            "cache {} hits={} misses={}",
            self.region,
            self.hits.load(Relaxed),
            self.misses.load(Relaxed)
        );
        value
    }

    fn put(&self, key: CacheKey, value: Value) {
        self.inner.put(key, value);
    }

    fn remove(&self, key: &CacheKey) {
        self.inner.remove(key);
    }

    fn clear(&self) {
        self.inner.clear();
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Mutual exclusion for put/get/remove. `dashmap`'s base store is
/// already internally synchronized; this decorator exists as the named
/// link in the chain the spec calls for, and is where a non-concurrent
/// base store would need it.
pub struct SynchronizedDecorator<C: CacheStore> {
    inner: Mutex<C>,
}

impl<C: CacheStore> SynchronizedDecorator<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }
}

impl<C: CacheStore> CacheStore for SynchronizedDecorator<C> {
    fn get(&self, key: &CacheKey) -> Option<Value> {
        self.inner.lock().unwrap().get(key)
    }

    fn put(&self, key: CacheKey, value: Value) {
        self.inner.lock().unwrap().put(key, value);
    }

    fn remove(&self, key: &CacheKey) {
        self.inner.lock().unwrap().remove(key);
    }

    fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }

    fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}

/// Holds a per-key lock on get-miss, preventing concurrent recompute of
/// the same key. The lock is released by the subsequent `put`, or by
/// `release_on_failure` if the recompute fails.
pub struct BlockingDecorator<C: CacheStore> {
    inner: C,
    locks: dashmap::DashMap<CacheKey, std::sync::Arc<(Mutex<bool>, Condvar)>>,
}

impl<C: CacheStore> BlockingDecorator<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            locks: dashmap::DashMap::new(),
        }
    }

    /// Blocks until no other caller holds the key's lock, then takes it.
    /// Returns the cached value if another caller already populated it
    /// while we waited.
    pub fn acquire(&self, key: &CacheKey) -> Option<Value> {
        loop {
            if let Some(value) = self.inner.get(key) {
                return Some(value);
            }
            let lock = self
                .locks
                .entry(key.clone())
                .or_insert_with(|| std::sync::Arc::new((Mutex::new(false), Condvar::new())))
                .clone();
            let (mutex, condvar) = &*lock;
            let mut locked = mutex.lock().unwrap();
            if !*locked {
                *locked = true;
                return None;
            }
            let _ = condvar.wait_timeout(locked, Duration::from_millis(50)).unwrap();
        }
    }

    pub fn release(&self, key: &CacheKey) {
        if let Some(lock) = self.locks.get(key) {
            let (mutex, condvar) = &**lock;
            *mutex.lock().unwrap() = false;
            condvar.notify_all();
        }
    }
}

impl<C: CacheStore> CacheStore for BlockingDecorator<C> {
    fn get(&self, key: &CacheKey) -> Option<Value> {
        self.inner.get(key)
    }

    fn put(&self, key: CacheKey, value: Value) {
        self.inner.put(key.clone(), value);
        self.release(&key);
    }

    fn remove(&self, key: &CacheKey) {
        self.inner.remove(key);
        self.release(key);
    }

    fn clear(&self) {
        self.inner.clear();
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
