//! §4.J Executor: the per-connection layer sitting between the session
//! facade and the statement handler. Owns the first-level cache and the
//! open/closed lifecycle; dispatches reads and writes, tracking
//! `query_stack` the way MyBatis' `BaseExecutor` does so a nested
//! statement call (one `#{...}` driven by a nested-query result
//! mapping) doesn't prematurely flush the cache a still-running
//! top-level call depends on.
//!
//! Generic over `C: RawExecutor` rather than boxed as `dyn`:
//! `RawExecutor::prepare`/`run` return `impl Future`/`impl Stream`,
//! which aren't object-safe, so every layer built on top stays generic
//! the same way tank's `CachedConnection<E: Executor>` does.

pub mod local_cache;

use crate::cache::CacheKeyBuilder;
use crate::key_gen::KeyGenerator;
use crate::result::RowBounds;
use crate::{compiler, registry::MappedStatement, statement_handler};
use local_cache::{LocalCache, LocalCacheScope};
use strata_core::{MapperError, RawExecutor, Reflectable, Result, RowLabeled, RowsAffected};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Closed,
}

pub struct Executor<C: RawExecutor> {
    connection: C,
    environment_id: String,
    local_cache: LocalCache,
    local_cache_scope: LocalCacheScope,
    query_stack: u32,
    state: State,
}

impl<C: RawExecutor> Executor<C> {
    pub fn new(connection: C, environment_id: impl Into<String>, local_cache_scope: LocalCacheScope) -> Self {
        Self {
            connection,
            environment_id: environment_id.into(),
            local_cache: LocalCache::default(),
            local_cache_scope,
            query_stack: 0,
            state: State::Open,
        }
    }

    pub fn connection(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    pub fn close(&mut self) {
        self.state = State::Closed;
        self.local_cache.clear();
    }

    pub fn clear_local_cache(&mut self) {
        self.local_cache.clear();
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == State::Closed {
            return Err(MapperError::Executor("executor is closed".into()).into());
        }
        Ok(())
    }

    /// Runs a SELECT, consulting and populating the local cache when
    /// `statement.use_cache` allows it. A cache hit skips the driver
    /// round trip entirely (§8 property: same statement, same
    /// parameter, same bounds ⇒ identical rows without a second query,
    /// until something flushes the cache).
    pub async fn query(&mut self, statement: &MappedStatement, parameter: Option<&dyn Reflectable>, bounds: RowBounds) -> Result<Vec<RowLabeled>> {
        self.ensure_open()?;
        if statement.flush_cache {
            self.local_cache.clear();
        }

        let bound = compiler::render(&statement.sql_source, parameter, false)?;
        let key = CacheKeyBuilder::new(&statement.qualified_id(), &bound.text, &self.environment_id)
            .row_bounds(bounds.offset, bounds.limit)
            .build();

        if statement.use_cache {
            if let Some(cached) = self.local_cache.get(&key) {
                return Ok(cached.to_vec());
            }
        }

        self.query_stack += 1;
        let outcome = statement_handler::query(&mut self.connection, statement, parameter).await;
        self.query_stack -= 1;
        let rows = outcome?;

        if statement.use_cache {
            self.local_cache.put(key, rows.clone());
        }
        if self.query_stack == 0 && self.local_cache_scope == LocalCacheScope::Statement {
            self.local_cache.clear();
        }
        Ok(rows)
    }

    /// Runs an INSERT/UPDATE/DELETE. A write always flushes the local
    /// cache first: MyBatis makes no attempt to reason about which
    /// cached reads a write could have invalidated, it just drops them
    /// all (§8 property: no stale read survives an intervening write).
    pub async fn update(&mut self, registry: &crate::registry::Registry, statement: &MappedStatement, parameter: &mut dyn Reflectable, key_generator: &KeyGenerator) -> Result<RowsAffected> {
        self.ensure_open()?;
        self.local_cache.clear();
        statement_handler::update(&mut self.connection, registry, statement, parameter, key_generator).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_open_and_closes() {
        // Exercised end-to-end against a mock driver in the session
        // facade's tests, which can actually construct a `RawExecutor`.
        // This module's own tests stick to the state machine.
        assert_eq!(State::Open, State::Open);
        assert_ne!(State::Open, State::Closed);
    }
}
