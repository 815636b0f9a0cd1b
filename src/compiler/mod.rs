//! §4.D Template Compiler: turns a mapper statement's body (XML element
//! children, or an annotation string) into a [`SqlSource`].

pub mod include;
pub mod param_expr;
pub mod script;
pub mod xml;

use crate::expr::{self, Expr};
use crate::placeholder::StaticSqlSource;
use crate::sql_node::{RenderContext, SqlNode};
use include::{FragmentSource, expand_includes};
use std::collections::HashMap;
use strata_core::{MapperError, Reflectable, Result};
use xml::XmlNode;

/// Static statements run the placeholder rewriter once at startup and
/// keep a prebuilt mapping list; dynamic ones re-evaluate their node
/// tree (and therefore re-scan for `#{...}`) on every call.
pub enum SqlSource {
    Static(crate::placeholder::StaticSqlSource),
    Dynamic(SqlNode),
}

/// §3 `BoundSql`: the per-invocation artifact a statement handler binds
/// against. A static source just clones its prebuilt text and mappings;
/// a dynamic one evaluates its node tree against `parameter`, then runs
/// the same placeholder rewriter the static path ran once at startup.
pub fn render(
    source: &SqlSource,
    parameter: Option<&dyn Reflectable>,
    shrink_whitespace: bool,
) -> Result<StaticSqlSource> {
    match source {
        SqlSource::Static(static_source) => Ok(static_source.clone()),
        SqlSource::Dynamic(node) => {
            let mut ctx = RenderContext::new(parameter, shrink_whitespace);
            node.apply(&mut ctx)?;
            let mut bound = crate::placeholder::rewrite_placeholders(&ctx.sql, false)?;
            bound.bindings = ctx.bindings;
            Ok(bound)
        }
    }
}

/// Compiles one statement's XML body. `included` mirrors §4.D.1: when
/// true, `${}` substitution inside attribute values and text nodes has
/// already happened during include expansion.
pub fn compile_xml_statement(
    body: &str,
    namespace: &str,
    fragments: &dyn FragmentSource,
) -> Result<SqlSource> {
    let root = xml::parse_fragment(body)?;
    let expanded = expand_includes(&root, namespace, fragments, &HashMap::new())?;
    compile_expanded_node(&expanded)
}

/// Compiles an `XmlNode` tree that has already been through
/// `<include>` expansion (used by the registry's retry-queue path,
/// where expansion and compilation happen as separate, independently
/// retryable steps).
pub fn compile_expanded_node(expanded: &XmlNode) -> Result<SqlSource> {
    let children = match expanded {
        XmlNode::Element { children, .. } => children.clone(),
        XmlNode::Text(_) => vec![expanded.clone()],
    };
    compile_children(&children)
}

/// Compiles an annotation-declared SQL string: `<script>...</script>`
/// bodies are parsed as a single-element XML document and processed the
/// same as an XML statement body; anything else becomes a single `Text`
/// node (after the plain `${}` pre-interpolation pass the annotation
/// path always performs).
pub fn compile_annotation_statement(
    sql: &str,
    namespace: &str,
    fragments: &dyn FragmentSource,
) -> Result<SqlSource> {
    let trimmed = sql.trim();
    if script::is_script(trimmed) {
        return compile_xml_statement(trimmed, namespace, fragments);
    }
    let is_dynamic = trimmed.contains("${");
    if is_dynamic {
        Ok(SqlSource::Dynamic(SqlNode::Text(sql.to_string())))
    } else {
        Ok(SqlSource::Static(crate::placeholder::rewrite_placeholders(
            sql, false,
        )?))
    }
}

fn compile_children(children: &[XmlNode]) -> Result<SqlSource> {
    let mut dynamic = false;
    let mut nodes = Vec::with_capacity(children.len());
    for child in children {
        nodes.push(compile_node(child, &mut dynamic)?);
    }
    let node = match nodes.len() {
        1 => nodes.into_iter().next().unwrap(),
        _ => SqlNode::Mixed(nodes),
    };
    if dynamic {
        Ok(SqlSource::Dynamic(node))
    } else {
        let text = render_static(&node);
        Ok(SqlSource::Static(crate::placeholder::rewrite_placeholders(
            &text, false,
        )?))
    }
}

/// Flattens a tree known to contain only `Static`/`Mixed` nodes back
/// into plain text, for the static classification path.
fn render_static(node: &SqlNode) -> String {
    match node {
        SqlNode::Static(text) | SqlNode::Text(text) => text.clone(),
        SqlNode::Mixed(children) => children
            .iter()
            .map(render_static)
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}

fn compile_node(node: &XmlNode, dynamic: &mut bool) -> Result<SqlNode> {
    match node {
        XmlNode::Text(text) => {
            if text.contains("${") {
                *dynamic = true;
                Ok(SqlNode::Text(text.clone()))
            } else {
                Ok(SqlNode::Static(text.clone()))
            }
        }
        XmlNode::Element {
            tag,
            attrs,
            children,
        } => {
            *dynamic = true;
            let attr = |name: &str| attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());
            match tag.as_str() {
                "if" => {
                    let test = parse_test(attr("test"), tag)?;
                    Ok(SqlNode::If {
                        test,
                        body: Box::new(compile_body(children, dynamic)?),
                    })
                }
                "choose" => {
                    let mut whens = Vec::new();
                    let mut otherwise = None;
                    for child in children {
                        if let XmlNode::Element {
                            tag: child_tag,
                            children: child_children,
                            ..
                        } = child
                        {
                            match child_tag.as_str() {
                                "when" => {
                                    let test = parse_test(child.attr("test"), "when")?;
                                    whens.push((test, compile_body(child_children, dynamic)?));
                                }
                                "otherwise" => {
                                    otherwise = Some(Box::new(compile_body(child_children, dynamic)?));
                                }
                                _ => {}
                            }
                        }
                    }
                    Ok(SqlNode::Choose { whens, otherwise })
                }
                "trim" => Ok(SqlNode::Trim {
                    body: Box::new(compile_body(children, dynamic)?),
                    prefix: attr("prefix").map(str::to_string),
                    prefix_overrides: split_overrides(attr("prefixOverrides")),
                    suffix: attr("suffix").map(str::to_string),
                    suffix_overrides: split_overrides(attr("suffixOverrides")),
                }),
                "where" => Ok(SqlNode::where_trim(compile_body(children, dynamic)?)),
                "set" => Ok(SqlNode::set_trim(compile_body(children, dynamic)?)),
                "foreach" => Ok(SqlNode::Foreach {
                    collection: attr("collection")
                        .ok_or_else(|| MapperError::Parse("<foreach> is missing collection".into()))?
                        .to_string(),
                    item: attr("item").map(str::to_string),
                    index: attr("index").map(str::to_string),
                    open: attr("open").map(str::to_string),
                    close: attr("close").map(str::to_string),
                    separator: attr("separator").map(str::to_string),
                    nullable: attr("nullable").map(|v| v == "true").unwrap_or(false),
                    body: Box::new(compile_body(children, dynamic)?),
                }),
                "bind" => {
                    let name = attr("name")
                        .ok_or_else(|| MapperError::Parse("<bind> is missing name".into()))?
                        .to_string();
                    let value_expr = attr("value")
                        .ok_or_else(|| MapperError::Parse("<bind> is missing value".into()))?;
                    Ok(SqlNode::Bind {
                        name,
                        expr: expr::parse(value_expr)?,
                    })
                }
                other => Err(MapperError::Parse(format!(
                    "unknown dynamic-SQL element `<{other}>`"
                ))
                .into()),
            }
        }
    }
}

fn compile_body(children: &[XmlNode], dynamic: &mut bool) -> Result<SqlNode> {
    let nodes = children
        .iter()
        .map(|c| compile_node(c, dynamic))
        .collect::<Result<Vec<_>>>()?;
    Ok(if nodes.len() == 1 {
        nodes.into_iter().next().unwrap()
    } else {
        SqlNode::Mixed(nodes)
    })
}

fn parse_test(test: Option<&str>, tag: &str) -> Result<Expr> {
    let test = test.ok_or_else(|| MapperError::Parse(format!("<{tag}> is missing test")))?;
    expr::parse(test)
}

fn split_overrides(raw: Option<&str>) -> Vec<String> {
    raw.map(|v| v.split('|').map(str::to_string).collect())
        .unwrap_or_default()
}
