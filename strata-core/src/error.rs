use std::fmt;

/// Taxonomy of failures the mapping engine can raise.
///
/// Every variant is wrapped into an `anyhow::Error` before it leaves the
/// crate (via `.context(...)`/`From`), so callers see the rich chain of
/// causes `anyhow` builds, while still being able to `downcast_ref` to this
/// enum when they need to branch on the failure kind (e.g. a caller that
/// wants to distinguish "statement not found" from "driver timed out").
#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    /// Malformed XML, grammar errors in `#{...}` expressions, unknown
    /// elements/attributes, duplicate ids.
    #[error("parse error: {0}")]
    Parse(String),

    /// A forward reference (`<cache-ref>`, `<include>`, `resultMap`
    /// extension, nested statement) that may still resolve once more of the
    /// configuration has loaded.
    #[error("incomplete element `{id}`: {reason}")]
    IncompleteElement { id: String, reason: String },

    /// Mapper-method lookup failure, missing mapped statement, conflict
    /// between an annotation and an XML declaration for the same id.
    #[error("binding error: {0}")]
    Binding(String),

    /// No type handler registered for the (Rust type, JDBC type) pair.
    #[error("no type handler for {rust_type} <-> {jdbc_type}")]
    TypeHandler {
        rust_type: &'static str,
        jdbc_type: String,
    },

    /// A property path could not be resolved against a target type.
    #[error("reflection error: cannot resolve `{path}` on {target_type}: {reason}")]
    Reflection {
        path: String,
        target_type: &'static str,
        reason: String,
    },

    /// Use-after-close, nested transaction misuse, cursor misuse.
    #[error("executor error: {0}")]
    Executor(String),

    /// Failure inside a cache decorator.
    #[error("cache error: {0}")]
    Cache(String),

    /// Driver-reported failure, carrying the MyBatis-style
    /// `resource/activity/object/sql` context string.
    #[error("sql execution error while {activity} on {object} ({resource}): {sql}")]
    SqlExecution {
        resource: String,
        activity: String,
        object: String,
        sql: String,
    },

    /// An interceptor signature names a method outside the four
    /// interceptable target kinds, or a method that kind does not have.
    #[error("plugin error: {0}")]
    Plugin(String),
}

impl MapperError {
    pub fn incomplete(id: impl Into<String>, reason: impl fmt::Display) -> Self {
        MapperError::IncompleteElement {
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    pub fn sql_execution(
        resource: impl Into<String>,
        activity: impl Into<String>,
        object: impl Into<String>,
        sql: impl Into<String>,
    ) -> Self {
        MapperError::SqlExecution {
            resource: resource.into(),
            activity: activity.into(),
            object: object.into(),
            sql: sql.into(),
        }
    }
}
