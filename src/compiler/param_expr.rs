//! Grammar for one `#{...}` occurrence's inner text:
//! `inline = (property | '(' expression ')') (':' jdbcType)? (',' key '=' value)*`
//!
//! Position-oriented, not tokenized ahead of time: skip whitespace, switch
//! to balanced-paren capture on `(`, otherwise read a bare property path
//! up to `,` or `:`.

use strata_core::{MapperError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamExpr {
    pub property: String,
    pub jdbc_type: Option<String>,
    pub java_type: Option<String>,
    pub mode: Option<String>,
    pub numeric_scale: Option<String>,
    pub result_map: Option<String>,
    pub type_handler: Option<String>,
    pub jdbc_type_name: Option<String>,
}

const RECOGNIZED_KEYS: [&str; 8] = [
    "javaType",
    "jdbcType",
    "mode",
    "numericScale",
    "resultMap",
    "typeHandler",
    "jdbcTypeName",
    "property",
];

pub fn parse_param_expr(input: &str) -> Result<ParamExpr> {
    let mut chars = input.trim().chars().peekable();
    let mut result = ParamExpr::default();

    if chars.peek() == Some(&'(') {
        chars.next();
        let mut depth = 1;
        let mut expr = String::new();
        for c in chars.by_ref() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            if depth > 0 {
                expr.push(c);
            }
        }
        result.property = expr.trim().to_string();
    } else {
        let mut property = String::new();
        while let Some(&c) = chars.peek() {
            if c == ',' || c == ':' {
                break;
            }
            property.push(c);
            chars.next();
        }
        result.property = property.trim().to_string();
    }

    if chars.peek() == Some(&':') {
        chars.next();
        let mut jdbc_type = String::new();
        while let Some(&c) = chars.peek() {
            if c == ',' {
                break;
            }
            jdbc_type.push(c);
            chars.next();
        }
        result.jdbc_type = Some(jdbc_type.trim().to_string());
    }

    while chars.peek() == Some(&',') {
        chars.next();
        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' {
                break;
            }
            key.push(c);
            chars.next();
        }
        let key = key.trim();
        if chars.peek() != Some(&'=') {
            return Err(MapperError::Parse(format!(
                "expected `=` after attribute `{key}` in `#{{{input}}}`"
            ))
            .into());
        }
        chars.next();
        let mut value = String::new();
        while let Some(&c) = chars.peek() {
            if c == ',' {
                break;
            }
            value.push(c);
            chars.next();
        }
        let value = value.trim().to_string();

        if key == "expression" {
            return Err(MapperError::Parse(
                "`expression=` attributes are not supported".into(),
            )
            .into());
        }
        if !RECOGNIZED_KEYS.contains(&key) {
            return Err(MapperError::Parse(format!(
                "unknown attribute `{key}` in `#{{{input}}}`"
            ))
            .into());
        }
        match key {
            "javaType" => result.java_type = Some(value),
            "jdbcType" => result.jdbc_type = Some(value),
            "mode" => result.mode = Some(value),
            "numericScale" => result.numeric_scale = Some(value),
            "resultMap" => result.result_map = Some(value),
            "typeHandler" => result.type_handler = Some(value),
            "jdbcTypeName" => result.jdbc_type_name = Some(value),
            "property" => result.property = value,
            _ => unreachable!(),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_property() {
        let parsed = parse_param_expr("id").unwrap();
        assert_eq!(parsed.property, "id");
        assert!(parsed.jdbc_type.is_none());
    }

    #[test]
    fn parses_legacy_colon_type() {
        let parsed = parse_param_expr("id:NUMERIC").unwrap();
        assert_eq!(parsed.property, "id");
        assert_eq!(parsed.jdbc_type.as_deref(), Some("NUMERIC"));
    }

    #[test]
    fn parses_named_attributes() {
        let parsed = parse_param_expr("name, jdbcType=VARCHAR, mode=IN").unwrap();
        assert_eq!(parsed.property, "name");
        assert_eq!(parsed.jdbc_type.as_deref(), Some("VARCHAR"));
        assert_eq!(parsed.mode.as_deref(), Some("IN"));
    }

    #[test]
    fn rejects_unknown_attribute() {
        assert!(parse_param_expr("id, bogus=1").is_err());
    }

    #[test]
    fn captures_balanced_paren_expression() {
        let parsed = parse_param_expr("(a.b + c)").unwrap();
        assert_eq!(parsed.property, "a.b + c");
    }
}
