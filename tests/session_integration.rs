//! End-to-end coverage over a scripted in-memory driver: a `#[mapper]`
//! trait compiles into session dispatch, the registry resolves it under
//! the trait's own namespace, and the projector turns driver rows back
//! into a plain struct — without a real database anywhere in the loop.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::stream::{self, Stream};
use strata::prelude::*;
use strata_core::{Connection, Driver, PlaceholderStyle, RowLabeled, RowsAffected, Value};

#[derive(Clone)]
struct MockPrepared {
    sql: Arc<str>,
    params: Arc<Mutex<Vec<Value>>>,
}

impl fmt::Display for MockPrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)
    }
}

impl strata_core::Prepared for MockPrepared {
    fn bind<V: AsValue>(&mut self, value: V) -> Result<&mut Self> {
        self.params.lock().unwrap().push(value.as_value());
        Ok(self)
    }

    fn bind_index<V: AsValue>(&mut self, value: V, index: u64) -> Result<&mut Self> {
        let mut params = self.params.lock().unwrap();
        let index = index as usize;
        if index >= params.len() {
            params.resize(index + 1, Value::Null);
        }
        params[index] = value.as_value();
        Ok(self)
    }
}

#[derive(Clone, Copy, Default)]
struct MockDriver;

impl Driver for MockDriver {
    type Connection = MockConnection;
    type Prepared = MockPrepared;

    fn get_instance() -> Self {
        MockDriver
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::QuestionMark
    }
}

/// One driver round trip's canned response, popped in call order.
enum ScriptedResponse {
    Rows(Vec<RowLabeled>),
    Affected(RowsAffected),
}

struct MockConnection {
    driver: MockDriver,
    responses: VecDeque<ScriptedResponse>,
}

impl MockConnection {
    fn new(responses: Vec<ScriptedResponse>) -> Self {
        Self {
            driver: MockDriver,
            responses: responses.into(),
        }
    }
}

impl Connection for MockConnection {
    const PREFIX: &'static str = "mock://";

    fn connect(_url: &str) -> impl Future<Output = Result<impl Connection>> {
        async { Ok(MockConnection::new(Vec::new())) }
    }
}

impl strata_core::RawExecutor for MockConnection {
    type Driver = MockDriver;

    fn driver(&self) -> &Self::Driver {
        &self.driver
    }

    fn prepare(&mut self, query: String) -> impl Future<Output = Result<strata_core::Query<MockPrepared>>> + Send {
        async move {
            Ok(strata_core::Query::Prepared(MockPrepared {
                sql: query.into(),
                params: Arc::new(Mutex::new(Vec::new())),
            }))
        }
    }

    fn run<'s>(&'s mut self, _query: strata_core::Query<MockPrepared>) -> impl Stream<Item = Result<strata_core::QueryResult>> + Send + 's {
        let items: Vec<Result<strata_core::QueryResult>> = match self.responses.pop_front() {
            Some(ScriptedResponse::Rows(rows)) => rows.into_iter().map(|r| Ok(strata_core::QueryResult::Row(r))).collect(),
            Some(ScriptedResponse::Affected(affected)) => vec![Ok(strata_core::QueryResult::Affected(affected))],
            None => vec![Err(strata_core::MapperError::Executor("mock connection ran out of scripted responses".into()).into())],
        };
        stream::iter(items)
    }
}

fn labeled_row(labels: &[&str], values: Vec<Value>) -> RowLabeled {
    RowLabeled::new(labels.iter().map(|s| s.to_string()).collect::<Vec<_>>().into(), values.into_boxed_slice())
}

#[derive(Debug, PartialEq, Eq)]
struct User {
    id: i64,
    name: String,
}

impl FromMappedRow for User {
    fn from_mapped_row(row: &strata::result::MappedRow) -> Result<Self> {
        Ok(User {
            id: i64::try_from_value(row.scalar("id")?)?,
            name: String::try_from_value(row.scalar("name")?)?,
        })
    }
}

#[mapper]
trait UserMapper {
    #[select(id = "findById", sql = "SELECT id, name FROM users WHERE id = #{id}")]
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    #[select(id = "listAll", sql = "SELECT id, name FROM users ORDER BY id")]
    async fn list_all(&self) -> Result<Vec<User>>;

    #[insert(id = "insertUser", sql = "INSERT INTO users (name) VALUES (#{name})")]
    async fn insert_user(&self, name: String) -> Result<i64>;

    #[update(id = "renameUser", sql = "UPDATE users SET name = #{name} WHERE id = #{id}")]
    async fn rename_user(&self, id: i64, name: String) -> Result<bool>;

    #[delete(id = "deleteUser", sql = "DELETE FROM users WHERE id = #{id}")]
    async fn delete_user(&self, id: i64) -> Result<()>;
}

fn build_session(responses: Vec<ScriptedResponse>) -> Session<MockConnection> {
    let mut configuration = Configuration::new("test-env");
    configuration.add_mapper::<dyn UserMapper>().unwrap();
    configuration.finish_build().unwrap();
    configuration.build_session(MockConnection::new(responses))
}

#[tokio::test]
async fn select_option_resolves_a_matching_row() {
    let mut session = build_session(vec![ScriptedResponse::Rows(vec![labeled_row(&["id", "name"], vec![Value::Int64(Some(7)), Value::Varchar(Some("ann".into()))])])]);
    let found = session.find_by_id(7).await.unwrap();
    assert_eq!(found, Some(User { id: 7, name: "ann".into() }));
}

#[tokio::test]
async fn select_option_resolves_to_none_on_an_empty_result_set() {
    let mut session = build_session(vec![ScriptedResponse::Rows(vec![])]);
    let found = session.find_by_id(404).await.unwrap();
    assert_eq!(found, None);
}

#[tokio::test]
async fn select_list_projects_every_row() {
    let mut session = build_session(vec![ScriptedResponse::Rows(vec![
        labeled_row(&["id", "name"], vec![Value::Int64(Some(1)), Value::Varchar(Some("ann".into()))]),
        labeled_row(&["id", "name"], vec![Value::Int64(Some(2)), Value::Varchar(Some("bob".into()))]),
    ])]);
    let all = session.list_all().await.unwrap();
    assert_eq!(all, vec![User { id: 1, name: "ann".into() }, User { id: 2, name: "bob".into() }]);
}

#[tokio::test]
async fn insert_converts_rows_affected_into_the_declared_return_type() {
    let mut session = build_session(vec![ScriptedResponse::Affected(RowsAffected {
        rows_affected: 1,
        last_insert_id: Some(42),
    })]);
    let affected: i64 = session.insert_user("carol".into()).await.unwrap();
    assert_eq!(affected, 1);
}

#[tokio::test]
async fn update_converts_rows_affected_into_a_bool_success_flag() {
    let mut session = build_session(vec![ScriptedResponse::Affected(RowsAffected {
        rows_affected: 1,
        last_insert_id: None,
    })]);
    let updated = session.rename_user(7, "annie".into()).await.unwrap();
    assert!(updated);
}

#[tokio::test]
async fn update_reports_no_match_as_a_false_success_flag() {
    let mut session = build_session(vec![ScriptedResponse::Affected(RowsAffected {
        rows_affected: 0,
        last_insert_id: None,
    })]);
    let updated = session.rename_user(404, "nobody".into()).await.unwrap();
    assert!(!updated);
}

#[tokio::test]
async fn delete_accepts_a_unit_return_type() {
    let mut session = build_session(vec![ScriptedResponse::Affected(RowsAffected {
        rows_affected: 1,
        last_insert_id: None,
    })]);
    session.delete_user(7).await.unwrap();
}

#[tokio::test]
async fn annotated_statements_register_under_the_trait_s_own_namespace() {
    let mut configuration = Configuration::new("test-env");
    configuration.add_mapper::<dyn UserMapper>().unwrap();
    configuration.finish_build().unwrap();
    let namespace = <dyn UserMapper as AnnotatedMapper>::namespace();
    assert!(configuration.registry().statements.contains_key(&format!("{namespace}.findById")));
}
