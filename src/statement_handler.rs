//! §4.K Statement Handler: the layer between a [`MappedStatement`] plus a
//! bound parameter and a driver round trip. It renders the statement's
//! `SqlSource` into text and a `#{...}` → `?` mapping list, binds each
//! mapping's resolved value, runs the query, and — for writes — drives
//! key generation around it.

use crate::compiler;
use crate::key_gen::KeyGenerator;
use crate::placeholder::StaticSqlSource;
use crate::registry::{MappedStatement, Registry};
use futures::StreamExt;
use std::future::Future;
use std::pin::Pin;
use strata_core::{Prepared, Query, RawExecutor, Reflectable, Result, RowLabeled, RowsAffected, Value, resolve_path};

/// Runs `statement`'s SELECT against `connection`, returning every
/// produced row. Streaming end-to-end all the way to the caller is the
/// projector's job (component L); this layer just drains the driver.
pub async fn query<C: RawExecutor>(
    connection: &mut C,
    statement: &MappedStatement,
    parameter: Option<&dyn Reflectable>,
) -> Result<Vec<RowLabeled>> {
    let bound = compiler::render(&statement.sql_source, parameter, false)?;
    let prepared = prepare_and_bind(&mut *connection, &bound, parameter).await?;
    let mut rows = Vec::new();
    let mut stream = std::pin::pin!(connection.fetch(Query::Prepared(prepared)));
    while let Some(row) = stream.next().await {
        rows.push(row?);
    }
    Ok(rows)
}

/// Runs `statement`'s INSERT/UPDATE/DELETE, driving `key_generator`'s
/// before/after hooks around it. `parameter` is mutable because a
/// generated key gets written back into it.
pub async fn update<C: RawExecutor>(
    connection: &mut C,
    registry: &Registry,
    statement: &MappedStatement,
    parameter: &mut dyn Reflectable,
    key_generator: &KeyGenerator,
) -> Result<RowsAffected> {
    {
        let mut select = once_select(&mut *connection, registry);
        key_generator.process_before(parameter, &mut select).await?;
    }

    let bound = compiler::render(&statement.sql_source, Some(&*parameter), false)?;
    let prepared = prepare_and_bind(&mut *connection, &bound, Some(&*parameter)).await?;
    let rows_affected = connection.execute(Query::Prepared(prepared)).await?;

    {
        let mut select = once_select(&mut *connection, registry);
        key_generator.process_after(parameter, &rows_affected, &mut select).await?;
    }

    Ok(rows_affected)
}

/// Wraps a single-use auxiliary-select closure satisfying
/// [`RunSelect`]: a key generator calls its `run_select` argument at
/// most once per hook invocation, so a closure that can only be called
/// once is sufficient — and keeps the borrow of `connection` exclusive
/// rather than shared across the whole statement handler call.
fn once_select<'c, C: RawExecutor>(connection: &'c mut C, registry: &'c Registry) -> impl FnMut(&str) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + 'c>> {
    let mut connection = Some(connection);
    move |statement_id: &str| {
        let connection = connection.take().expect("auxiliary select run more than once per hook");
        let statement_id = statement_id.to_string();
        Box::pin(async move { run_auxiliary_select(connection, registry, &statement_id).await })
    }
}

/// `statement_id` is always namespace-qualified here: a `KeyGenerator`
/// is built at registry-build time, the same point every other
/// cross-statement reference (`<include>`, nested result maps) gets
/// qualified against its declaring namespace.
async fn run_auxiliary_select<C: RawExecutor>(connection: &mut C, registry: &Registry, statement_id: &str) -> Result<Value> {
    let statement = registry
        .statements
        .get(statement_id)
        .ok_or_else(|| strata_core::MapperError::Binding(format!("no statement registered for key generator select `{statement_id}`")))?;
    let rows = query(connection, statement, None).await?;
    Ok(rows.first().and_then(|row| row.values.first().cloned()).unwrap_or(Value::Null))
}

async fn prepare_and_bind<C: RawExecutor>(connection: &mut C, bound: &StaticSqlSource, parameter: Option<&dyn Reflectable>) -> Result<<C::Driver as strata_core::Driver>::Prepared> {
    let query = connection.prepare(bound.text.clone()).await?;
    let mut prepared = match query {
        Query::Prepared(p) => p,
        Query::Raw(_) => {
            return Err(strata_core::MapperError::Executor("driver did not return a prepared statement".into()).into());
        }
    };
    for mapping in &bound.mappings {
        let value = match bound.bindings.get(&mapping.property) {
            Some(value) => value.clone(),
            None => match parameter {
                Some(parameter) => resolve_path(parameter, &mapping.property)?,
                None => Value::Null,
            },
        };
        prepared.bind(value)?;
    }
    Ok(prepared)
}
