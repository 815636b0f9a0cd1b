//! §4.J first-level (local) cache. Scoped either to one top-level
//! statement call (`Statement`) or to the whole session (`Session`,
//! MyBatis' default) — an executor clears it between top-level calls
//! under the former and keeps it until `close`/an explicit `clear`
//! under the latter.

use crate::cache::CacheKey;
use std::collections::HashMap;
use strata_core::RowLabeled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalCacheScope {
    Statement,
    #[default]
    Session,
}

#[derive(Default)]
pub struct LocalCache {
    entries: HashMap<CacheKey, Vec<RowLabeled>>,
}

impl LocalCache {
    pub fn get(&self, key: &CacheKey) -> Option<&[RowLabeled]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn put(&mut self, key: CacheKey, rows: Vec<RowLabeled>) {
        self.entries.insert(key, rows);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Value;

    fn row() -> RowLabeled {
        RowLabeled::new(vec!["id".to_string()].into(), vec![Value::Int32(Some(1))].into_boxed_slice())
    }

    #[test]
    fn put_then_get_round_trips() {
        let mut cache = LocalCache::default();
        let key = crate::cache::CacheKeyBuilder::new("ns.stmt", "SELECT 1", "env").build();
        cache.put(key.clone(), vec![row()]);
        assert_eq!(cache.get(&key).unwrap().len(), 1);
    }

    #[test]
    fn clear_empties_the_cache() {
        let mut cache = LocalCache::default();
        let key = crate::cache::CacheKeyBuilder::new("ns.stmt", "SELECT 1", "env").build();
        cache.put(key, vec![row()]);
        cache.clear();
        assert!(cache.is_empty());
    }
}
