//! Strata: a declarative SQL mapping engine. Mapper traits annotated with
//! `#[mapper]`, or XML `<mapper>` documents read through a
//! [`strata_core::Resources`], compile down into [`registry::MappedStatement`]s
//! that a [`Session`] runs against any driver implementing `strata_core`'s
//! collaborator traits.

mod cache;
mod compiler;
pub mod configuration;
pub mod executor;
mod expr;
mod key_gen;
pub mod mapper;
mod placeholder;
mod plugin;
pub mod registry;
pub mod result;
pub mod resources;
pub mod session;
mod sql_node;
mod statement_handler;

pub use cache::{CacheKey, CacheKeyBuilder, CacheRegion, CacheSettings};
pub use compiler::SqlSource;
pub use compiler::xml::XmlNode;
pub use configuration::{Configuration, Settings};
pub use executor::local_cache::LocalCacheScope;
pub use key_gen::{KeyGenerator, SelectKeyOrder};
pub use placeholder::{ParameterMapping, StaticSqlSource};
pub use plugin::{InterceptOutcome, Interceptor, Invocation, PluginChain};
pub use registry::Registry;
pub use result::{AutoMappingBehavior, FromMappedRow, MappedRow, RowBounds};
pub use session::{AssembledParameter, Session};
pub use sql_node::SqlNode;

pub use ::strata_core as core;

/// Convenience re-exports for the types a `#[mapper]` trait body and its
/// hand-written `FromMappedRow`/`Reflectable` impls need.
pub mod prelude {
    pub use crate::configuration::Configuration;
    pub use crate::mapper::{AnnotatedMapper, ParamMap};
    pub use crate::result::FromMappedRow;
    pub use crate::session::{AssembledParameter, Session};
    pub use strata_core::{AsValue, Reflectable, Result, Value};
    pub use strata_macros::mapper;
}
