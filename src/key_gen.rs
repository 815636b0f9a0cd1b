//! §4.M Key Generators: pre/post hooks run by the statement handler
//! around an INSERT. `NoKey` is the default; the other two variants
//! write the generated id back into the parameter's `keyProperty`.

use std::future::Future;
use std::pin::Pin;
use strata_core::{Reflectable, Result, RowsAffected, Value, set_path};

/// Runs the auxiliary statement named by a `SelectKey` generator and
/// hands back its single-column scalar result. Boxed rather than
/// `impl Future` because it sits behind a `dyn FnMut`: the statement
/// handler closes over its connection and registry to run the select,
/// and that run is a network round trip, not a synchronous lookup.
pub type RunSelect<'a> = dyn FnMut(&str) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>> + Send + 'a;

#[derive(Debug, Clone)]
pub enum KeyGenerator {
    /// No key-generation behavior; the statement runs as declared.
    NoKey,
    /// JDBC's generated-keys mode: the driver hands back the
    /// auto-generated id(s) alongside the row count. `key_property`
    /// names where, on the bound parameter, to store it.
    Jdbc3Key { key_property: String },
    /// Runs `statement_id` before or after the main statement and
    /// stores its single-column result under `key_property`.
    SelectKey {
        statement_id: String,
        key_property: String,
        order: SelectKeyOrder,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectKeyOrder {
    Before,
    After,
}

impl KeyGenerator {
    /// Whether the statement handler should ask the driver to return
    /// generated keys when preparing the statement.
    pub fn requests_generated_keys(&self) -> bool {
        matches!(self, KeyGenerator::Jdbc3Key { .. })
    }

    /// Runs before the main statement; only `SelectKey { order: Before }`
    /// does anything here. `run_select` executes the designated
    /// statement and returns its single-column scalar result.
    pub async fn process_before(&self, parameter: &mut dyn Reflectable, run_select: &mut RunSelect<'_>) -> Result<()> {
        if let KeyGenerator::SelectKey {
            statement_id,
            key_property,
            order: SelectKeyOrder::Before,
        } = self
        {
            let key = run_select(statement_id).await?;
            set_path(parameter, key_property, key)?;
        }
        Ok(())
    }

    /// Runs after the main statement executes. `Jdbc3Key` pulls
    /// `rows_affected.last_insert_id`; `SelectKey { order: After }` runs
    /// its auxiliary select.
    pub async fn process_after(
        &self,
        parameter: &mut dyn Reflectable,
        rows_affected: &RowsAffected,
        run_select: &mut RunSelect<'_>,
    ) -> Result<()> {
        match self {
            KeyGenerator::NoKey => Ok(()),
            KeyGenerator::Jdbc3Key { key_property } => {
                if let Some(id) = rows_affected.last_insert_id {
                    set_path(parameter, key_property, Value::UInt64(Some(id)))?;
                }
                Ok(())
            }
            KeyGenerator::SelectKey {
                statement_id,
                key_property,
                order: SelectKeyOrder::After,
            } => {
                let key = run_select(statement_id).await?;
                set_path(parameter, key_property, key)
            }
            KeyGenerator::SelectKey { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::MapperError;

    struct SingleProp(Value);
    impl Reflectable for SingleProp {
        fn get_property(&self, name: &str) -> Result<Value> {
            if name == "id" {
                Ok(self.0.clone())
            } else {
                Err(MapperError::Reflection {
                    path: name.to_string(),
                    target_type: "SingleProp",
                    reason: "unknown".into(),
                }
                .into())
            }
        }
        fn get_index(&self, _index: usize) -> Result<Value> {
            unreachable!()
        }
        fn set_property(&mut self, name: &str, value: Value) -> Result<()> {
            assert_eq!(name, "id");
            self.0 = value;
            Ok(())
        }
    }

    #[tokio::test]
    async fn jdbc3_key_writes_last_insert_id() {
        let generator = KeyGenerator::Jdbc3Key {
            key_property: "id".into(),
        };
        let mut param = SingleProp(Value::Null);
        let rows = RowsAffected {
            rows_affected: 1,
            last_insert_id: Some(42),
        };
        generator
            .process_after(&mut param, &rows, &mut |_| Box::pin(async { unreachable!() }))
            .await
            .unwrap();
        assert_eq!(param.0, Value::UInt64(Some(42)));
    }

    #[tokio::test]
    async fn no_key_is_a_no_op() {
        let mut param = SingleProp(Value::Null);
        let rows = RowsAffected {
            rows_affected: 1,
            last_insert_id: Some(7),
        };
        KeyGenerator::NoKey
            .process_after(&mut param, &rows, &mut |_| Box::pin(async { unreachable!() }))
            .await
            .unwrap();
        assert_eq!(param.0, Value::Null);
    }

    #[tokio::test]
    async fn select_key_after_runs_auxiliary_statement() {
        let generator = KeyGenerator::SelectKey {
            statement_id: "nextval".into(),
            key_property: "id".into(),
            order: SelectKeyOrder::After,
        };
        let mut param = SingleProp(Value::Null);
        let rows = RowsAffected {
            rows_affected: 1,
            last_insert_id: None,
        };
        generator
            .process_after(
                &mut param,
                &rows,
                &mut |id| {
                    assert_eq!(id, "nextval");
                    Box::pin(async { Ok(Value::UInt64(Some(99))) })
                },
            )
            .await
            .unwrap();
        assert_eq!(param.0, Value::UInt64(Some(99)));
    }
}
