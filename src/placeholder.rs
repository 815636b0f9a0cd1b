//! Rewrites evaluated SQL text. Two independent passes operate on the
//! same `#{...}`/`${...}` delimiter shape: the placeholder rewriter turns
//! `#{...}` parameter references into `?` plus a `ParameterMapping`, and
//! `${...}` variable interpolation (used by `<include>` expansion and
//! `Text` nodes) substitutes raw text — the code-injection-prone half of
//! the template language.

use crate::compiler::param_expr::parse_param_expr;
use crate::expr::EvalContext;
use std::collections::HashMap;
use strata_core::{Result, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMapping {
    pub property: String,
    pub jdbc_type: Option<String>,
    pub java_type: Option<String>,
    pub mode: Option<String>,
}

/// `StaticSqlSource`: text with `?` placeholders, plus the ordered list
/// of mappings that produced them. `ParameterMapping` order equals
/// textual order of `#{...}` occurrences in the fully-rendered text.
///
/// `bindings` is the §4.F "additional bindings" a dynamic render carried
/// alongside its text: `<bind>` names and the per-iteration `__frch_*`
/// substitutes `<foreach>` produced. A source compiled once at startup
/// (no dynamic evaluation ever ran) always has this empty; `compiler::
/// render`'s dynamic branch fills it in from the `RenderContext` that
/// just produced `text`, so bind time can resolve a mapping against it
/// before falling back to the parameter object.
#[derive(Debug, Clone, Default)]
pub struct StaticSqlSource {
    pub text: String,
    pub mappings: Vec<ParameterMapping>,
    pub bindings: HashMap<String, Value>,
}

/// Scans `text` for `#{...}` occurrences, replacing each with `?` and
/// recording a `ParameterMapping` parsed via the §4.E grammar.
pub fn rewrite_placeholders(text: &str, shrink_whitespace: bool) -> Result<StaticSqlSource> {
    let text = if shrink_whitespace {
        shrink(text)
    } else {
        text.to_string()
    };
    let mut output = String::with_capacity(text.len());
    let mut mappings = Vec::new();
    let mut rest = text.as_str();
    while let Some(start) = rest.find("#{") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            output.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let inner = &after[..end];
        let parsed = parse_param_expr(inner)?;
        mappings.push(ParameterMapping {
            property: parsed.property,
            jdbc_type: parsed.jdbc_type,
            java_type: parsed.java_type,
            mode: parsed.mode,
        });
        output.push('?');
        rest = &after[end + 1..];
    }
    output.push_str(rest);
    Ok(StaticSqlSource {
        text: output,
        mappings,
        bindings: HashMap::new(),
    })
}

/// Substitutes every `${name}` occurrence with the textual form of
/// `name`'s resolved value. Applied at `Text` node apply-time and during
/// `<include>` property-frame expansion.
pub fn interpolate_variables(text: &str, ctx: &EvalContext) -> Result<String> {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            output.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let name = after[..end].trim();
        let value = ctx.resolve(name)?;
        output.push_str(&render_plain(&value));
        rest = &after[end + 1..];
    }
    output.push_str(rest);
    Ok(output)
}

fn render_plain(value: &strata_core::Value) -> String {
    use strata_core::Value::*;
    match value {
        Null => String::new(),
        Boolean(Some(v)) => v.to_string(),
        Int8(Some(v)) => v.to_string(),
        Int16(Some(v)) => v.to_string(),
        Int32(Some(v)) => v.to_string(),
        Int64(Some(v)) => v.to_string(),
        Int128(Some(v)) => v.to_string(),
        UInt8(Some(v)) => v.to_string(),
        UInt16(Some(v)) => v.to_string(),
        UInt32(Some(v)) => v.to_string(),
        UInt64(Some(v)) => v.to_string(),
        UInt128(Some(v)) => v.to_string(),
        Float32(Some(v)) => v.to_string(),
        Float64(Some(v)) => v.to_string(),
        Decimal(Some(v), ..) => v.to_string(),
        Varchar(Some(v)) => v.clone(),
        Uuid(Some(v)) => v.to_string(),
        _ => String::new(),
    }
}

/// Collapses any run of whitespace to a single space, as
/// `shrinkWhitespacesInSql` does before the scanner runs.
fn shrink(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_single_placeholder() {
        let source = rewrite_placeholders("SELECT * FROM t WHERE id = #{id}", false).unwrap();
        assert_eq!(source.text, "SELECT * FROM t WHERE id = ?");
        assert_eq!(source.mappings.len(), 1);
        assert_eq!(source.mappings[0].property, "id");
    }

    #[test]
    fn rewrites_in_textual_order() {
        let source = rewrite_placeholders("#{a} , #{b}, #{c}", false).unwrap();
        assert_eq!(source.text, "? , ?, ?");
        let props: Vec<_> = source.mappings.iter().map(|m| m.property.as_str()).collect();
        assert_eq!(props, ["a", "b", "c"]);
    }

    #[test]
    fn shrinks_whitespace_before_scanning() {
        let source = rewrite_placeholders("SELECT   *\nFROM t\tWHERE id=#{id}", true).unwrap();
        assert_eq!(source.text, "SELECT * FROM t WHERE id=?");
    }
}
