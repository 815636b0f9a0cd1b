//! Execution abstraction wrapping a database `Driver`.
//! NOTE: All returned Futures and Streams MUST be awaited / fully consumed.
//! Some drivers may side-effect early, but for portability and correctness
//! always await the future or exhaust the stream.
//!
//! The `RawExecutor` trait provides a uniform, async/stream-based interface
//! for:
//! - Preparing parameterized queries (`prepare`)
//! - Running arbitrary queries yielding heterogeneous results (`run`)
//! - Convenience adapters to obtain only rows (`fetch`) or only affected
//!   counts (`execute`)
//!
//! Streams:
//! `run` yields `QueryResult` items. Higher-level helpers (`fetch`,
//! `execute`) filter & map only the variants they care about, propagating
//! errors while discarding unrelated items.
//!
//! Lifetimes:
//! `fetch` ties the stream lifetime `'s` to `&'s mut self`, ensuring the
//! executor outlives row decoding.
//!
//! This is the I/O-level collaborator a [`crate::Driver`] hands out; it
//! knows nothing about mapped statements, parameter objects, or result
//! projection. The engine's session-level `Executor` (first-level cache,
//! deferred loads, batching) wraps one of these per connection.

use crate::{
    Driver, Query, QueryResult, Result, RowLabeled, RowsAffected,
    stream::{Stream, StreamExt, TryStreamExt},
};
use std::future::Future;

/// Async query executor bound to a concrete `Driver`.
///
/// Responsibilities:
/// - Translate a rendered SQL string + bound parameters into driver calls
/// - Stream results without buffering the entire result set (if possible)
/// - Provide ergonomic helpers for common patterns
///
/// Implementors typically wrap a connection or pooled handle.
pub trait RawExecutor: Send + Sized {
    /// Underlying driver type supplying SQL dialect + I/O.
    type Driver: Driver;

    /// Access the driver instance.
    fn driver(&self) -> &Self::Driver;

    /// Prepare a query (e.g. statement caching / parameter binding)
    /// returning a `Query`.
    ///
    /// Await/Consume:
    /// - Must be awaited; preparation may allocate resources on the driver.
    ///
    /// Errors:
    /// - Driver-specific preparation failures.
    fn prepare(
        &mut self,
        query: String,
    ) -> impl Future<Output = Result<Query<<Self::Driver as Driver>::Prepared>>> + Send;

    /// Run an already prepared (or raw) query, streaming heterogeneous
    /// `QueryResult` items.
    ///
    /// Await/Consume:
    /// - You must drive the returned stream to completion (or until you
    ///   intentionally stop).
    ///
    /// Stream Items:
    /// - `QueryResult::Row` for each produced row.
    /// - `QueryResult::Affected` for write operations (may appear
    ///   before/after rows depending on driver).
    ///
    /// Errors:
    /// - Emitted inline in the stream; consumers should use `TryStreamExt`.
    fn run<'s>(
        &'s mut self,
        query: Query<<Self::Driver as Driver>::Prepared>,
    ) -> impl Stream<Item = Result<QueryResult>> + Send + 's;

    /// Run a query and stream only rows, filtering out affected-row counts.
    ///
    /// Await/Consume:
    /// - Consume the stream fully if you expect to release underlying
    ///   resources cleanly.
    fn fetch<'s>(
        &'s mut self,
        query: Query<<Self::Driver as Driver>::Prepared>,
    ) -> impl Stream<Item = Result<RowLabeled>> + Send + 's {
        self.run(query).filter_map(|v| async move {
            match v {
                Ok(QueryResult::Row(v)) => Some(Ok(v)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }

    /// Execute a query and return a single aggregated `RowsAffected`.
    ///
    /// Await/Consume:
    /// - Must be awaited; no side-effects are guaranteed until completion.
    ///
    /// If a driver returns multiple `QueryResult::Affected` values, they are
    /// combined via `Extend`.
    fn execute<'s>(
        &'s mut self,
        query: Query<<Self::Driver as Driver>::Prepared>,
    ) -> impl Future<Output = Result<RowsAffected>> + Send + 's {
        self.run(query)
            .filter_map(|v| async move {
                match v {
                    Ok(QueryResult::Affected(v)) => Some(Ok(v)),
                    Err(e) => Some(Err(e)),
                    _ => None,
                }
            })
            .try_fold(RowsAffected::default(), |mut acc, v| async move {
                acc.extend([v]);
                Ok(acc)
            })
    }
}
