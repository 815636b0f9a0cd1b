use crate::compiler::SqlSource;
use crate::key_gen::KeyGenerator;
use crate::mapper::StatementKind;

/// The compiled, registered unit for one SELECT/INSERT/UPDATE/DELETE,
/// identified as `namespace.id`.
pub struct MappedStatement {
    pub id: String,
    pub namespace: String,
    pub kind: StatementKind,
    pub sql_source: SqlSource,
    pub result_map_id: Option<String>,
    pub use_cache: bool,
    pub flush_cache: bool,
    pub timeout: Option<u64>,
    pub fetch_size: Option<u64>,
    /// Defaults to `NoKey`. Wiring `<selectKey>`/`useGeneratedKeys` XML
    /// attributes and an annotation equivalent into the two builders
    /// below is not done yet; every statement currently registers with
    /// no key generator regardless of how it declares one.
    pub key_generator: KeyGenerator,
}

impl MappedStatement {
    pub fn qualified_id(&self) -> String {
        format!("{}.{}", self.namespace, self.id)
    }
}
