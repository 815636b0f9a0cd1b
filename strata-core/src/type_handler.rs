//! Pluggable conversion between Rust types and the column types a driver
//! understands, for cases [`crate::AsValue`]'s built-in mapping isn't enough
//! (enum-to-string/int mappings, a custom newtype over `Value::Blob`, a
//! column storing JSON as text).

use crate::{Result, Value};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Converts between a single Rust type and its [`Value`] wire shape.
///
/// Registered handlers are consulted before the default [`crate::AsValue`]
/// impl for a type; a handler registered for `(Rust type, jdbc_type)` wins
/// over the blanket `AsValue` conversion for that exact pairing only, so a
/// mapper can opt a single column into custom handling without affecting
/// every other use of the same Rust type.
pub trait TypeHandler: Send + Sync {
    /// The JDBC-superset type name this handler targets, e.g. `"VARCHAR"`,
    /// matched case-insensitively against a `jdbcType` attribute.
    fn jdbc_type(&self) -> &str;

    /// Convert a bound parameter into its wire [`Value`].
    fn set_parameter(&self, value: Box<dyn Any + Send>) -> Result<Value>;

    /// Convert a decoded [`Value`] back into the Rust type this handler
    /// owns, boxed for the caller to downcast.
    fn get_result(&self, value: Value) -> Result<Box<dyn Any + Send>>;
}

/// Registry of custom type handlers, keyed by (Rust `TypeId`, JDBC type
/// name). Falls back to [`crate::AsValue`] when no entry matches.
#[derive(Default, Clone)]
pub struct TypeHandlerRegistry {
    handlers: HashMap<(TypeId, String), Arc<dyn TypeHandler>>,
}

impl TypeHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: 'static>(&mut self, jdbc_type: impl Into<String>, handler: Arc<dyn TypeHandler>) {
        self.handlers
            .insert((TypeId::of::<T>(), jdbc_type.into().to_ascii_uppercase()), handler);
    }

    pub fn lookup<T: 'static>(&self, jdbc_type: &str) -> Option<&Arc<dyn TypeHandler>> {
        self.handlers
            .get(&(TypeId::of::<T>(), jdbc_type.to_ascii_uppercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UppercasingText;

    impl TypeHandler for UppercasingText {
        fn jdbc_type(&self) -> &str {
            "VARCHAR"
        }

        fn set_parameter(&self, value: Box<dyn Any + Send>) -> Result<Value> {
            let s = *value
                .downcast::<String>()
                .map_err(|_| crate::Error::msg("expected String"))?;
            Ok(Value::Varchar(Some(s.to_uppercase())))
        }

        fn get_result(&self, value: Value) -> Result<Box<dyn Any + Send>> {
            match value {
                Value::Varchar(Some(s)) => Ok(Box::new(s.to_uppercase())),
                _ => Err(crate::Error::msg("expected Varchar")),
            }
        }
    }

    #[test]
    fn registers_and_looks_up_by_type_and_jdbc_type() {
        let mut registry = TypeHandlerRegistry::new();
        registry.register::<String>("VARCHAR", Arc::new(UppercasingText));
        assert!(registry.lookup::<String>("varchar").is_some());
        assert!(registry.lookup::<String>("INTEGER").is_none());
        assert!(registry.lookup::<i32>("VARCHAR").is_none());
    }
}
