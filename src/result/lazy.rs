//! §4.L "Lazy proxies". MyBatis wraps a result object in a cglib/javassist
//! proxy that triggers a loader on first access to a given property and
//! forwards everything else untouched. Rust result objects have no
//! runtime vtable to patch, so laziness here is a memoized cell a
//! `lazy=true` nested-query property is typed as, rather than a
//! transparent method-interception proxy. There is no trigger-method
//! allow-list to maintain because nothing here intercepts arbitrary
//! method calls in the first place — `Debug`/`Clone`/`Eq` on the
//! containing struct simply never touch this cell unless the field is
//! read through [`Lazy::get`].

use strata_core::Value;

/// A property whose value is either already materialized or still
/// backed by a nested query waiting to run. The executor resolves
/// `Pending` cells via the deferred-load queue (component J) and calls
/// [`Lazy::resolve`] once the value is known.
#[derive(Debug, Clone)]
pub enum Lazy<T> {
    Loaded(T),
    Pending { statement_id: String, parameter: Value },
}

impl<T> Lazy<T> {
    pub fn loaded(value: T) -> Self {
        Lazy::Loaded(value)
    }

    pub fn pending(statement_id: impl Into<String>, parameter: Value) -> Self {
        Lazy::Pending {
            statement_id: statement_id.into(),
            parameter,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Lazy::Loaded(_))
    }

    /// The loaded value, or `None` if the loader hasn't run yet.
    pub fn get(&self) -> Option<&T> {
        match self {
            Lazy::Loaded(value) => Some(value),
            Lazy::Pending { .. } => None,
        }
    }

    /// The nested query this cell is waiting on, if still pending.
    pub fn pending_load(&self) -> Option<(&str, &Value)> {
        match self {
            Lazy::Pending { statement_id, parameter } => Some((statement_id, parameter)),
            Lazy::Loaded(_) => None,
        }
    }

    /// Memoizes a loaded value, replacing a pending cell.
    pub fn resolve(&mut self, value: T) {
        *self = Lazy::Loaded(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_cell_reports_its_nested_load() {
        let cell: Lazy<i32> = Lazy::pending("authorById", Value::Int64(Some(7)));
        assert!(!cell.is_loaded());
        assert_eq!(cell.pending_load().unwrap().0, "authorById");
    }

    #[test]
    fn resolve_memoizes_the_value() {
        let mut cell: Lazy<i32> = Lazy::pending("authorById", Value::Int64(Some(7)));
        cell.resolve(42);
        assert!(cell.is_loaded());
        assert_eq!(cell.get(), Some(&42));
    }
}
