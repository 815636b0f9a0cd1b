//! §4.I Plugin Chain: an ordered list of interceptors wrapping targets
//! at four construction points. MyBatis declares interceptor signatures
//! as `(target-type, method-name, arg-types)` triples and dispatches by
//! reflection; Rust has no runtime method reflection, so each of the
//! four target kinds gets its own typed hook instead — the `Interceptor`
//! trait's default methods call straight through, exactly like an
//! interceptor whose signature set doesn't cover that target.

use crate::registry::MappedStatement;
use async_trait::async_trait;
use std::sync::Arc;
use strata_core::{Result, Value};

/// One invocation an interceptor may observe. Unlike MyBatis' generic
/// `Invocation` (reflective method + args), each variant here names the
/// concrete operation being wrapped.
pub enum Invocation<'a> {
    ExecutorQuery {
        statement: &'a MappedStatement,
        parameter: &'a Value,
    },
    ExecutorUpdate {
        statement: &'a MappedStatement,
        parameter: &'a Value,
    },
    ParameterHandlerSetParameters {
        statement: &'a MappedStatement,
    },
    ResultSetHandlerHandle {
        statement: &'a MappedStatement,
    },
    StatementHandlerPrepare {
        sql: &'a str,
    },
}

/// An interceptor may return a replacement value, call through
/// (`Proceed`), or re-enter the chain; `Proceed` is the default for any
/// hook an interceptor doesn't override, which is what makes an
/// always-call-through interceptor observably transparent (§8 property
/// 7).
pub enum InterceptOutcome {
    Proceed,
    Replace(Value),
}

#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn intercept(&self, invocation: &Invocation<'_>) -> Result<InterceptOutcome> {
        let _ = invocation;
        Ok(InterceptOutcome::Proceed)
    }
}

/// Folds `target = interceptor.wrap(target)` across all interceptors at
/// the four well-defined construction points. Since targets here are
/// behavioral hooks rather than wrapped objects, "wrapping" means: run
/// the chain before the real target executes, honoring the first
/// non-`Proceed` outcome.
#[derive(Default, Clone)]
pub struct PluginChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl PluginChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    pub async fn run(&self, invocation: Invocation<'_>) -> Result<InterceptOutcome> {
        for interceptor in &self.interceptors {
            match interceptor.intercept(&invocation).await? {
                InterceptOutcome::Proceed => continue,
                replaced @ InterceptOutcome::Replace(_) => return Ok(replaced),
            }
        }
        Ok(InterceptOutcome::Proceed)
    }
}
