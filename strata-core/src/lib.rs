mod as_value;
mod connection;
mod driver;
mod error;
mod interval;
mod parse;
mod prepared;
mod query;
mod raw_executor;
mod reflect;
mod relations;
mod resources;
mod transaction;
mod type_handler;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use connection::*;
pub use driver::*;
pub use error::*;
pub use interval::*;
pub use parse::*;
pub use prepared::*;
pub use query::*;
pub use raw_executor::*;
pub use reflect::*;
pub use relations::*;
pub use resources::*;
pub use transaction::*;
pub use type_handler::*;
pub use util::*;
pub use value::*;

pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
