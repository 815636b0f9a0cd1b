//! The compiled shape of a dynamic SQL template: a tree of nodes each of
//! which appends text and bindings into a [`RenderContext`] as it is
//! applied. Grounded on tank-macros' `Operand`/`BinaryOp` tree shape
//! (`decode_expression.rs`) generalized from a compile-time AST into a
//! runtime one, since a mapper's dynamic SQL is only known once its XML
//! is parsed.

use crate::expr::{Expr, EvalContext, evaluate_boolean, evaluate_iterable};
use crate::placeholder::interpolate_variables;
use std::collections::HashMap;
use strata_core::{Result, Value};

/// Mutable state threaded through `SqlNode::apply`: the text buffer being
/// built and the bindings map (`#{...}` names seen so far, including
/// per-iteration `__frch_*` substitutes).
pub struct RenderContext<'a> {
    pub sql: String,
    pub bindings: HashMap<String, Value>,
    pub parameter: Option<&'a dyn strata_core::Reflectable>,
    pub shrink_whitespace: bool,
    frch_counter: u64,
}

impl<'a> RenderContext<'a> {
    pub fn new(parameter: Option<&'a dyn strata_core::Reflectable>, shrink_whitespace: bool) -> Self {
        Self {
            sql: String::new(),
            bindings: HashMap::new(),
            parameter,
            shrink_whitespace,
            frch_counter: 0,
        }
    }

    pub fn eval_ctx(&self) -> EvalContext<'_> {
        EvalContext {
            bindings: &self.bindings,
            parameter: self.parameter,
        }
    }

    /// Appends with a single separating space if the buffer is non-empty
    /// and does not already end in whitespace.
    fn append_with_space(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.sql.is_empty() && !self.sql.ends_with(char::is_whitespace) {
            self.sql.push(' ');
        }
        self.sql.push_str(text);
    }
}

#[derive(Debug, Clone)]
pub enum SqlNode {
    /// Purely static text, no `${}` interpolation possible.
    Static(String),
    /// Text subject to `${}` interpolation at apply time.
    Text(String),
    Mixed(Vec<SqlNode>),
    If {
        test: Expr,
        body: Box<SqlNode>,
    },
    Choose {
        whens: Vec<(Expr, SqlNode)>,
        otherwise: Option<Box<SqlNode>>,
    },
    Trim {
        body: Box<SqlNode>,
        prefix: Option<String>,
        prefix_overrides: Vec<String>,
        suffix: Option<String>,
        suffix_overrides: Vec<String>,
    },
    Foreach {
        collection: String,
        item: Option<String>,
        index: Option<String>,
        open: Option<String>,
        close: Option<String>,
        separator: Option<String>,
        nullable: bool,
        body: Box<SqlNode>,
    },
    Bind {
        name: String,
        expr: Expr,
    },
}

impl SqlNode {
    pub fn where_trim(body: SqlNode) -> SqlNode {
        SqlNode::Trim {
            body: Box::new(body),
            prefix: Some("WHERE".to_string()),
            prefix_overrides: vec!["AND ".to_string(), "OR ".to_string(), "AND\n".to_string(), "OR\n".to_string()],
            suffix: None,
            suffix_overrides: vec![],
        }
    }

    pub fn set_trim(body: SqlNode) -> SqlNode {
        SqlNode::Trim {
            body: Box::new(body),
            prefix: Some("SET".to_string()),
            prefix_overrides: vec![],
            suffix: None,
            suffix_overrides: vec![",".to_string()],
        }
    }

    /// Applies this node to `ctx`, returning whether it contributed
    /// anything (mirrors MyBatis' boolean "did this node produce text"
    /// contract, used by `<trim>`/`<where>`/`<set>` to decide trimming).
    pub fn apply(&self, ctx: &mut RenderContext) -> Result<bool> {
        match self {
            SqlNode::Static(text) => {
                ctx.append_with_space(text);
                Ok(!text.trim().is_empty())
            }
            SqlNode::Text(text) => {
                let rendered = interpolate_variables(text, &ctx.eval_ctx())?;
                ctx.append_with_space(&rendered);
                Ok(!rendered.trim().is_empty())
            }
            SqlNode::Mixed(children) => {
                let mut any = false;
                for child in children {
                    any |= child.apply(ctx)?;
                }
                Ok(any)
            }
            SqlNode::If { test, body } => {
                if evaluate_boolean(test, &ctx.eval_ctx())? {
                    body.apply(ctx)
                } else {
                    Ok(false)
                }
            }
            SqlNode::Choose { whens, otherwise } => {
                for (test, body) in whens {
                    if evaluate_boolean(test, &ctx.eval_ctx())? {
                        return body.apply(ctx);
                    }
                }
                match otherwise {
                    Some(body) => body.apply(ctx),
                    None => Ok(false),
                }
            }
            SqlNode::Trim {
                body,
                prefix,
                prefix_overrides,
                suffix,
                suffix_overrides,
            } => {
                let mut inner = RenderContext::new(ctx.parameter, ctx.shrink_whitespace);
                inner.bindings = ctx.bindings.clone();
                inner.frch_counter = ctx.frch_counter;
                let produced = body.apply(&mut inner)?;
                ctx.frch_counter = inner.frch_counter;
                ctx.bindings = inner.bindings;
                if !produced {
                    return Ok(false);
                }
                let mut text = inner.sql.trim().to_string();
                let upper = text.to_uppercase();
                if let Some(pos) = prefix_overrides
                    .iter()
                    .find_map(|o| upper.starts_with(&o.to_uppercase()).then_some(o.len()))
                {
                    text = text[pos..].trim_start().to_string();
                }
                let upper = text.to_uppercase();
                if let Some(pos) = suffix_overrides
                    .iter()
                    .find_map(|o| upper.ends_with(&o.to_uppercase()).then_some(o.len()))
                {
                    text.truncate(text.len() - pos);
                    text = text.trim_end().to_string();
                }
                let mut result = String::new();
                if let Some(prefix) = prefix {
                    result.push_str(prefix);
                    result.push(' ');
                }
                result.push_str(&text);
                if let Some(suffix) = suffix {
                    result.push(' ');
                    result.push_str(suffix);
                }
                ctx.append_with_space(&result);
                Ok(true)
            }
            SqlNode::Foreach {
                collection,
                item,
                index,
                open,
                close,
                separator,
                nullable,
                body,
            } => {
                let collection_expr = crate::expr::parse(collection)?;
                let items = evaluate_iterable(&collection_expr, &ctx.eval_ctx(), *nullable)?;
                if let Some(open) = open {
                    ctx.append_with_space(open);
                }
                for (n, element) in items.into_iter().enumerate() {
                    if n > 0 {
                        if let Some(separator) = separator {
                            ctx.append_with_space(separator);
                        }
                    }
                    let suffix = ctx.frch_counter;
                    ctx.frch_counter += 1;
                    let item_name = item.clone().unwrap_or_else(|| "item".to_string());
                    let index_name = index.clone().unwrap_or_else(|| "index".to_string());
                    let unique_item = format!("__frch_{item_name}_{suffix}");
                    let unique_index = format!("__frch_{index_name}_{suffix}");

                    let (key, value) = match element {
                        Value::Map(Some(mut pairs), ..) if pairs.len() == 1 => pairs.remove(0),
                        other => (Value::UInt64(Some(n as u64)), other),
                    };
                    ctx.bindings.insert(item_name.clone(), value.clone());
                    ctx.bindings.insert(unique_item.clone(), value);
                    ctx.bindings.insert(index_name.clone(), key.clone());
                    ctx.bindings.insert(unique_index.clone(), key);

                    let rendered = render_foreach_body(body, ctx, &item_name, &unique_item, &index_name, &unique_index)?;
                    ctx.append_with_space(&rendered);

                    ctx.bindings.remove(&item_name);
                    ctx.bindings.remove(&index_name);
                }
                if let Some(close) = close {
                    ctx.append_with_space(close);
                }
                Ok(true)
            }
            SqlNode::Bind { name, expr } => {
                let value = crate::expr::evaluate_value(expr, &ctx.eval_ctx())?;
                ctx.bindings.insert(name.clone(), value);
                Ok(false)
            }
        }
    }
}

/// Renders `body` in a child buffer, then rewrites any `#{item...}`/
/// `#{index...}` placeholder token spelled with the bare names into the
/// unique `__frch_*` spelling, so the placeholder rewriter of §4.F binds
/// against the per-element value instead of colliding across elements.
///
/// The unique `__frch_item_N`/`__frch_index_N` bindings just produced are
/// left in `ctx.bindings` on return — they're what the rewritten text
/// here now references, and the placeholder rewriter and binder (§4.F/
/// §4.K) don't run until the whole template has finished rendering, long
/// after this iteration's body is done. Only the *bare* names get
/// unbound once the iteration ends (by the caller, `SqlNode::apply`'s
/// `Foreach` arm), since those are reused fresh by the next element.
fn render_foreach_body(
    body: &SqlNode,
    ctx: &mut RenderContext,
    item_name: &str,
    unique_item: &str,
    index_name: &str,
    unique_index: &str,
) -> Result<String> {
    let mut child = RenderContext::new(ctx.parameter, ctx.shrink_whitespace);
    child.bindings = ctx.bindings.clone();
    child.frch_counter = ctx.frch_counter;
    body.apply(&mut child)?;
    ctx.frch_counter = child.frch_counter;
    ctx.bindings = child.bindings;
    let rewritten = child
        .sql
        .replace(&format!("#{{{item_name}"), &format!("#{{{unique_item}"))
        .replace(&format!("#{{{index_name}"), &format!("#{{{unique_index}"));
    Ok(rewritten)
}
