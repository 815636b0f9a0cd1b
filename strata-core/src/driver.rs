use crate::{Connection, Prepared, Result};
use std::future::Future;

/// How a driver expects bound parameters to be written into rendered SQL.
///
/// The statement compiler ([`crate`]'s consumers render `#{...}` expressions
/// into one of these forms) picks the style from the target [`Driver`] once,
/// at mapped-statement build time, rather than re-deciding per execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?`, repeated for every parameter (MySQL, SQLite).
    QuestionMark,
    /// `$1`, `$2`, ... (Postgres).
    Numbered,
    /// `:name` (Oracle-style named binds).
    Named,
}

pub trait Driver {
    type Connection: Connection;
    type Prepared: Prepared;

    fn get_instance() -> Self;

    fn connect(&self, url: &str) -> impl Future<Output = Result<impl Connection>> {
        Self::Connection::connect(url)
    }

    fn placeholder_style(&self) -> PlaceholderStyle;
}
