pub mod cache_ref;
pub mod mapped_statement;
pub mod parameter_map;
pub mod registry;
pub mod result_map;

pub use cache_ref::CacheRef;
pub use mapped_statement::MappedStatement;
pub use parameter_map::ParameterMap;
pub use registry::Registry;
pub use result_map::{Discriminator, ResultMap, ResultMapping};
