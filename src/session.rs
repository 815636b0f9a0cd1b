//! §4.N Session Facade: the entry point a mapper proxy method dispatches
//! through. Given a statement id and the method's arguments, it
//! assembles the named-parameter object, runs the statement via the
//! executor, and converts the raw result into the shape the mapper
//! method declared (list/single row/affected count).
//!
//! Deferred nested-query loads (from `PendingNestedLoad`) are resolved
//! here rather than inside the executor: resolving one means running
//! another statement through this same session and splicing the result
//! back into a `MappedRow`, which needs the projector's types, not just
//! the executor's.

use crate::executor::Executor;
use crate::executor::local_cache::LocalCacheScope;
use crate::key_gen::KeyGenerator;
use crate::mapper::{ParamMap, ParamValue};
use crate::registry::Registry;
use crate::result::{AutoMappingBehavior, Field, FromMappedRow, MappedRow, PendingNestedLoad, Projector, RowBounds};
use std::collections::HashSet;
use std::sync::Arc;
use strata_core::{MapperError, RawExecutor, Reflectable, Result, RowLabeled, RowsAffected, Value};

/// One argument a mapper-trait method was called with, as the
/// `#[mapper]` macro sees it at expansion time: it knows the Rust
/// identifier used in the method signature, whether an explicit
/// `#[param("name")]` override was written, and — since it sees the
/// static type — whether the argument is a collection or array.
pub struct MethodArg {
    pub declared_name: Option<String>,
    pub explicit_name: Option<String>,
    pub value: ParamValue,
    pub is_collection: bool,
    pub is_array: bool,
}

impl MethodArg {
    pub fn scalar(declared_name: impl Into<String>, value: Value) -> Self {
        Self {
            declared_name: Some(declared_name.into()),
            explicit_name: None,
            value: ParamValue::Scalar(value),
            is_collection: false,
            is_array: false,
        }
    }
}

/// Implements §4.N's named-parameter rules: a single unnamed argument
/// is passed straight through (wrapped only if it's a collection/array,
/// so `<foreach collection="list">` has somewhere to point); anything
/// else is folded into a `ParamMap` keyed by name, with `param1..paramN`
/// filled in for positions that don't collide with a user-declared name.
pub enum AssembledParameter {
    None,
    Scalar(Value),
    Object(Arc<dyn Reflectable + Send + Sync>),
    Map(ParamMap),
}

pub fn assemble_parameters(args: Vec<MethodArg>) -> AssembledParameter {
    if args.is_empty() {
        return AssembledParameter::None;
    }
    if args.len() == 1 && args[0].explicit_name.is_none() {
        let arg = args.into_iter().next().unwrap();
        if !arg.is_collection && !arg.is_array {
            return match arg.value {
                ParamValue::Scalar(value) => AssembledParameter::Scalar(value),
                ParamValue::Object(object) => AssembledParameter::Object(object),
            };
        }
        let mut map = ParamMap::new();
        if let ParamValue::Scalar(value) = &arg.value {
            map.insert("collection", value.clone());
            if arg.is_collection {
                map.insert("list", value.clone());
            }
            if arg.is_array {
                map.insert("array", value.clone());
            }
        }
        if let Some(name) = &arg.declared_name {
            match &arg.value {
                ParamValue::Scalar(value) => {
                    map.insert(name.clone(), value.clone());
                }
                ParamValue::Object(object) => {
                    map.insert_object(name.clone(), object.clone());
                }
            }
        }
        return AssembledParameter::Map(map);
    }

    let mut map = ParamMap::new();
    let mut used_names = std::collections::HashSet::new();
    for arg in &args {
        if let Some(name) = arg.explicit_name.as_ref().or(arg.declared_name.as_ref()) {
            used_names.insert(name.clone());
        }
    }
    for (i, arg) in args.into_iter().enumerate() {
        let name = arg.explicit_name.clone().or(arg.declared_name.clone()).unwrap_or_else(|| format!("param{}", i + 1));
        insert_into(&mut map, &name, &arg.value);
        let positional = format!("param{}", i + 1);
        if !used_names.contains(&positional) || positional == name {
            insert_into(&mut map, &positional, &arg.value);
        }
    }
    AssembledParameter::Map(map)
}

fn qualify(id: &str, namespace: &str) -> String {
    if id.contains('.') {
        id.to_string()
    } else {
        format!("{namespace}.{id}")
    }
}

fn insert_into(map: &mut ParamMap, name: &str, value: &ParamValue) {
    match value {
        ParamValue::Scalar(value) => {
            map.insert(name.to_string(), value.clone());
        }
        ParamValue::Object(object) => {
            map.insert_object(name.to_string(), object.clone());
        }
    }
}

impl AssembledParameter {
    fn as_reflectable(&self) -> Option<&dyn Reflectable> {
        match self {
            AssembledParameter::None => None,
            AssembledParameter::Scalar(_) => None,
            AssembledParameter::Object(object) => Some(object.as_ref()),
            AssembledParameter::Map(map) => Some(map),
        }
    }
}

pub struct Session<C: RawExecutor> {
    executor: Executor<C>,
    registry: Arc<Registry>,
    auto_mapping: AutoMappingBehavior,
    map_underscore_to_camel_case: bool,
    /// Cycle guard for [`Self::resolve_nested_load`]: `(statement_id,
    /// parameter)` pairs for which a nested-query load is currently
    /// being projected somewhere up this call chain.
    in_flight_nested_loads: HashSet<String>,
}

impl<C: RawExecutor> Session<C> {
    pub fn new(
        connection: C,
        registry: Arc<Registry>,
        environment_id: impl Into<String>,
        local_cache_scope: LocalCacheScope,
        auto_mapping: AutoMappingBehavior,
        map_underscore_to_camel_case: bool,
    ) -> Self {
        Self {
            executor: Executor::new(connection, environment_id, local_cache_scope),
            registry,
            auto_mapping,
            map_underscore_to_camel_case,
            in_flight_nested_loads: HashSet::new(),
        }
    }

    pub fn executor(&mut self) -> &mut Executor<C> {
        &mut self.executor
    }

    pub fn close(&mut self) {
        self.executor.close();
    }

    /// Runs a SELECT, returning the driver rows without any projection
    /// (callers that want typed objects go through a `Projector` and
    /// [`Self::resolve_nested_loads`] themselves, since only they know
    /// the statement's result-map-declared nested queries).
    pub async fn select_rows(&mut self, statement_id: &str, parameter: AssembledParameter) -> Result<Vec<RowLabeled>> {
        let registry = self.registry.clone();
        let statement = registry.statements.get(statement_id).ok_or_else(|| MapperError::Binding(format!("no mapped statement `{statement_id}`")))?;
        self.executor.query(statement, parameter.as_reflectable(), RowBounds::default()).await
    }

    pub async fn select_one_row(&mut self, statement_id: &str, parameter: AssembledParameter) -> Result<Option<RowLabeled>> {
        let mut rows = self.select_rows(statement_id, parameter).await?;
        if rows.len() > 1 {
            return Err(MapperError::Binding(format!("`{statement_id}` expected at most one row, got {}", rows.len())).into());
        }
        Ok(rows.pop())
    }

    /// Runs a SELECT and projects every returned row into `T`, resolving
    /// any nested-query mappings the result map declared along the way.
    pub async fn select_list<T: FromMappedRow>(&mut self, statement_id: &str, parameter: AssembledParameter) -> Result<Vec<T>> {
        let mapped = self.select_and_project(statement_id, parameter).await?;
        mapped.iter().map(T::from_mapped_row).collect()
    }

    /// Like [`Self::select_list`], but expects at most one row.
    pub async fn select_option<T: FromMappedRow>(&mut self, statement_id: &str, parameter: AssembledParameter) -> Result<Option<T>> {
        let mut mapped = self.select_and_project(statement_id, parameter).await?;
        if mapped.len() > 1 {
            return Err(MapperError::Binding(format!("`{statement_id}` expected at most one row, got {}", mapped.len())).into());
        }
        mapped.pop().map(|row| T::from_mapped_row(&row)).transpose()
    }

    /// Like [`Self::select_list`], but expects exactly one row, erroring
    /// on zero rather than silently returning a default.
    pub async fn select_one<T: FromMappedRow>(&mut self, statement_id: &str, parameter: AssembledParameter) -> Result<T> {
        let mapped = self.select_and_project(statement_id, parameter).await?;
        match mapped.len() {
            1 => T::from_mapped_row(&mapped[0]),
            0 => Err(MapperError::Binding(format!("`{statement_id}` expected exactly one row, got none")).into()),
            n => Err(MapperError::Binding(format!("`{statement_id}` expected exactly one row, got {n}")).into()),
        }
    }

    /// Runs a SELECT, projects its rows against the statement's result
    /// map (or a fully automatic one when it declares none), and
    /// resolves every deferred nested-query load before handing the
    /// rows back.
    async fn select_and_project(&mut self, statement_id: &str, parameter: AssembledParameter) -> Result<Vec<MappedRow>> {
        let registry = self.registry.clone();
        let rows = self.select_rows(statement_id, parameter).await?;
        let statement = registry.statements.get(statement_id).ok_or_else(|| MapperError::Binding(format!("no mapped statement `{statement_id}`")))?;

        let (result_map, auto_mapping) = match &statement.result_map_id {
            Some(id) => {
                let qualified = qualify(id, &statement.namespace);
                let result_map = registry.result_maps.get(&qualified).ok_or_else(|| MapperError::Binding(format!("result map `{qualified}` not found")))?;
                (result_map.clone(), self.auto_mapping)
            }
            None => (crate::registry::ResultMap::default(), AutoMappingBehavior::Full),
        };

        let projector = Projector::new(&registry, auto_mapping, self.map_underscore_to_camel_case);
        let projected = projector.project_nested(&rows, &result_map)?;

        let mut mapped_rows = Vec::with_capacity(projected.len());
        for (mut mapped_row, pending) in projected {
            for load in &pending {
                self.resolve_nested_load(load, &mut mapped_row).await?;
            }
            mapped_rows.push(mapped_row);
        }
        Ok(mapped_rows)
    }

    pub async fn insert(&mut self, statement_id: &str, parameter: &mut AssembledParameter) -> Result<RowsAffected> {
        self.write(statement_id, parameter).await
    }

    pub async fn update(&mut self, statement_id: &str, parameter: &mut AssembledParameter) -> Result<RowsAffected> {
        self.write(statement_id, parameter).await
    }

    pub async fn delete(&mut self, statement_id: &str, parameter: &mut AssembledParameter) -> Result<RowsAffected> {
        self.write(statement_id, parameter).await
    }

    async fn write(&mut self, statement_id: &str, parameter: &mut AssembledParameter) -> Result<RowsAffected> {
        let registry = self.registry.clone();
        let statement = registry.statements.get(statement_id).ok_or_else(|| MapperError::Binding(format!("no mapped statement `{statement_id}`")))?;
        let key_generator = statement.key_generator.clone();
        let mut empty = Value::Null;
        match parameter {
            AssembledParameter::None => self.executor.update(&registry, statement, &mut empty, &key_generator).await,
            AssembledParameter::Scalar(value) => self.executor.update(&registry, statement, value, &key_generator).await,
            AssembledParameter::Object(object) => {
                let object = Arc::get_mut(object).ok_or_else(|| MapperError::Binding("cannot write a generated key back into a shared parameter object".to_string()))?;
                self.executor.update(&registry, statement, object, &key_generator).await
            }
            AssembledParameter::Map(map) => self.executor.update(&registry, statement, map, &key_generator).await,
        }
    }

    /// Resolves one deferred nested-query load by running `load`'s own
    /// mapped statement and projecting it through its own result map —
    /// a single matching row becomes a nested object, several become a
    /// nested collection, none becomes a null scalar.
    ///
    /// Cycle guard: a nested-query graph can point back at a
    /// `(statement_id, parameter)` pair that's already being resolved
    /// further up this very call chain (the textbook case: a blog's
    /// nested "author" load's own result map nests a "latest blog" load
    /// whose parameter is the same author id, which nests "author"
    /// again). Recursing through `select_and_project` without bound
    /// would never terminate for such a graph. Once a pair is already
    /// in `in_flight_nested_loads`, this stops recursing into its own
    /// nested loads and instead takes a plain scalar straight off the
    /// statement's raw rows, exactly like the pre-cycle-guard behavior
    /// below — breaking the cycle after one extra hop instead of
    /// overflowing the stack.
    pub async fn resolve_nested_load(&mut self, load: &PendingNestedLoad, row: &mut MappedRow) -> Result<()> {
        let key = format!("{}\u{1}{:?}", load.statement_id, load.parameter);
        let parameter = AssembledParameter::Scalar(load.parameter.clone());
        let field = if self.in_flight_nested_loads.contains(&key) {
            let rows = self.select_rows(&load.statement_id, parameter).await?;
            let value = rows.first().and_then(|r| r.values.first().cloned()).unwrap_or(Value::Null);
            Field::Scalar(value)
        } else {
            self.in_flight_nested_loads.insert(key.clone());
            let projected = self.select_and_project(&load.statement_id, parameter).await;
            self.in_flight_nested_loads.remove(&key);
            let mut rows = projected?;
            match rows.len() {
                0 => Field::Scalar(Value::Null),
                1 => Field::Nested(Box::new(rows.pop().expect("len checked above"))),
                _ => Field::NestedList(rows),
            }
        };
        row.set_field(load.property.clone(), field);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_unnamed_scalar_passes_through_unwrapped() {
        let args = vec![MethodArg::scalar("id", Value::Int32(Some(7)))];
        match assemble_parameters(args) {
            AssembledParameter::Scalar(Value::Int32(Some(7))) => {}
            _ => panic!("expected a bare scalar"),
        }
    }

    #[test]
    fn single_unnamed_collection_is_wrapped() {
        let mut arg = MethodArg::scalar("ids", Value::List(Some(vec![Value::Int32(Some(1))]), Box::new(Value::Int32(None))));
        arg.is_collection = true;
        match assemble_parameters(vec![arg]) {
            AssembledParameter::Map(map) => {
                assert!(map.get("collection").is_some());
                assert!(map.get("list").is_some());
                assert!(map.get("ids").is_some());
            }
            _ => panic!("expected a ParamMap"),
        }
    }

    #[test]
    fn multiple_arguments_get_positional_aliases() {
        let args = vec![MethodArg::scalar("name", Value::Varchar(Some("ann".into()))), MethodArg::scalar("age", Value::Int32(Some(30)))];
        match assemble_parameters(args) {
            AssembledParameter::Map(map) => {
                assert_eq!(map.get("name"), Some(Value::Varchar(Some("ann".into()))));
                assert_eq!(map.get("param1"), Some(Value::Varchar(Some("ann".into()))));
                assert_eq!(map.get("param2"), Some(Value::Int32(Some(30))));
            }
            _ => panic!("expected a ParamMap"),
        }
    }
}
