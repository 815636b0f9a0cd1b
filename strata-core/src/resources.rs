//! Resolves the logical paths a `Configuration` is built from (the XML
//! `Resources`/classpath-loading layer in the system this engine's
//! configuration format is modeled on) into readable byte streams.
//!
//! Kept as a trait in `strata-core` so the compiler/registry machinery in
//! the `strata` crate never hard-codes "read from the filesystem" — tests
//! and embedders can supply an in-memory implementation instead.

use crate::Result;
use std::future::Future;

/// Resolves a logical resource path (a mapper XML location, an included
/// fragment, a properties file referenced from `<properties resource="..."
/// />`) to its raw bytes.
pub trait Resources: Send + Sync {
    /// Read the resource at `path` fully into memory.
    fn read(&self, path: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Whether `path` exists and is readable, without reading its content.
    fn exists(&self, path: &str) -> impl Future<Output = bool> + Send;
}
