use crate::{RawExecutor, Result};
use std::future::Future;

/// A single physical connection to a database, capable of running queries
/// through the [`RawExecutor`] it implements.
pub trait Connection: RawExecutor {
    /// Initial part of the connect url, e.g. `"postgres://"`.
    const PREFIX: &'static str;

    /// Establish a connection to the given URL.
    fn connect(url: &str) -> impl Future<Output = Result<impl Connection>>;
}
