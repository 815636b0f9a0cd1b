//! A small object-navigation expression language for `<if test="...">`,
//! `<choose><when test="...">` and `<foreach collection="...">`. Grounded
//! on tank-macros' `decode_expression` shape (`Operand`/`BinaryOp`/
//! `UnaryOp`/`BinaryOpType`), translated from a compile-time `syn::Expr`
//! walk into a runtime tokenizer + recursive-descent parser, since
//! mapper conditions are only known once an XML document or annotation
//! string is loaded.

use rust_decimal::Decimal;
use std::collections::HashMap;
use strata_core::{MapperError, Reflectable, Result, Value, resolve_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOpType {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

#[derive(Debug, Clone)]
pub enum Operand {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A dotted/indexed property path, resolved against the evaluation
    /// context at evaluate time.
    Path(String),
}

#[derive(Debug, Clone)]
pub enum Expr {
    Operand(Operand),
    Binary {
        op: BinaryOpType,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Not(Box<Expr>),
}

/// The layered lookup a test expression or a `collection=` attribute
/// resolves names against: first the binding map (per-iteration
/// `__frch_*` names and `<bind>`-declared names live here), then the
/// parameter object's own property, then a `_parameter` fallback.
pub struct EvalContext<'a> {
    pub bindings: &'a HashMap<String, Value>,
    pub parameter: Option<&'a dyn Reflectable>,
}

impl<'a> EvalContext<'a> {
    pub fn resolve(&self, path: &str) -> Result<Value> {
        if let Some(value) = self.bindings.get(path) {
            return Ok(value.clone());
        }
        if path == "_parameter" {
            return self
                .parameter
                .map(|_| Value::Null)
                .ok_or_else(|| MapperError::Binding("no parameter bound".into()).into());
        }
        if let Some(parameter) = self.parameter {
            return resolve_path(parameter, path);
        }
        Err(MapperError::Binding(format!("cannot resolve `{path}`, no parameter bound")).into())
    }
}

pub fn parse(source: &str) -> Result<Expr> {
    let mut tokens = tokenize(source)?;
    let expr = parse_or(&mut tokens)?;
    if !tokens.is_empty() {
        return Err(MapperError::Parse(format!("trailing tokens in expression `{source}`")).into());
    }
    Ok(expr)
}

/// `test="x != null"` style boolean evaluation. Non-boolean, non-numeric
/// non-null values are always truthy; numeric truthiness goes through a
/// decimal comparison against zero to dodge float-equality pitfalls.
pub fn evaluate_boolean(expr: &Expr, ctx: &EvalContext) -> Result<bool> {
    Ok(truthy(&evaluate(expr, ctx)?))
}

/// `collection="ids"` style: accepts any sequence directly, converts an
/// array to an order-preserving list, and yields a map's entries as
/// `(key, value)` pairs packaged back as `Value::Map` elements.
pub fn evaluate_iterable(expr: &Expr, ctx: &EvalContext, nullable: bool) -> Result<Vec<Value>> {
    let value = evaluate(expr, ctx)?;
    match value {
        Value::Null => {
            if nullable {
                Ok(Vec::new())
            } else {
                Err(MapperError::Binding("foreach collection is null".into()).into())
            }
        }
        Value::Array(Some(items), _) => Ok(items.into_vec()),
        Value::List(Some(items), _) => Ok(items),
        Value::Map(Some(entries), key_ty, value_ty) => Ok(entries
            .into_iter()
            .map(|(k, v)| Value::Map(Some(vec![(k, v)]), key_ty.clone(), value_ty.clone()))
            .collect()),
        Value::Array(None, _) | Value::List(None, _) | Value::Map(None, _, _) => {
            if nullable {
                Ok(Vec::new())
            } else {
                Err(MapperError::Binding("foreach collection is null".into()).into())
            }
        }
        other => Err(MapperError::Binding(format!(
            "value of type {other:?} is not iterable"
        ))
        .into()),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Boolean(Some(b)) => *b,
        Value::Boolean(None) => false,
        other => {
            if let Some(decimal) = as_decimal(other) {
                decimal != Decimal::ZERO
            } else {
                !other.is_null()
            }
        }
    }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Int8(Some(v)) => Some(Decimal::from(*v)),
        Value::Int16(Some(v)) => Some(Decimal::from(*v)),
        Value::Int32(Some(v)) => Some(Decimal::from(*v)),
        Value::Int64(Some(v)) => Some(Decimal::from(*v)),
        Value::UInt8(Some(v)) => Some(Decimal::from(*v)),
        Value::UInt16(Some(v)) => Some(Decimal::from(*v)),
        Value::UInt32(Some(v)) => Some(Decimal::from(*v)),
        Value::UInt64(Some(v)) => Some(Decimal::from(*v)),
        Value::Float32(Some(v)) => Decimal::try_from(*v).ok(),
        Value::Float64(Some(v)) => Decimal::try_from(*v).ok(),
        Value::Decimal(Some(v), ..) => Some(*v),
        _ => None,
    }
}

/// Evaluates an expression to its raw `Value`, for `<bind>`/`<var>`
/// declarations that store a computed value rather than branch on one.
pub fn evaluate_value(expr: &Expr, ctx: &EvalContext) -> Result<Value> {
    evaluate(expr, ctx)
}

fn evaluate(expr: &Expr, ctx: &EvalContext) -> Result<Value> {
    match expr {
        Expr::Operand(Operand::Null) => Ok(Value::Null),
        Expr::Operand(Operand::Bool(b)) => Ok(Value::Boolean(Some(*b))),
        Expr::Operand(Operand::Int(i)) => Ok(Value::Int64(Some(*i))),
        Expr::Operand(Operand::Float(f)) => Ok(Value::Float64(Some(*f))),
        Expr::Operand(Operand::Str(s)) => Ok(Value::Varchar(Some(s.clone()))),
        Expr::Operand(Operand::Path(path)) => ctx.resolve(path),
        Expr::Not(inner) => Ok(Value::Boolean(Some(!evaluate_boolean(inner, ctx)?))),
        Expr::Binary { op, lhs, rhs } => match op {
            BinaryOpType::And => {
                Ok(Value::Boolean(Some(evaluate_boolean(lhs, ctx)? && evaluate_boolean(rhs, ctx)?)))
            }
            BinaryOpType::Or => {
                Ok(Value::Boolean(Some(evaluate_boolean(lhs, ctx)? || evaluate_boolean(rhs, ctx)?)))
            }
            _ => {
                let lhs = evaluate(lhs, ctx)?;
                let rhs = evaluate(rhs, ctx)?;
                Ok(Value::Boolean(Some(compare(*op, &lhs, &rhs)?)))
            }
        },
    }
}

fn compare(op: BinaryOpType, lhs: &Value, rhs: &Value) -> Result<bool> {
    if op == BinaryOpType::Equal || op == BinaryOpType::NotEqual {
        let eq = match (lhs.is_null(), rhs.is_null()) {
            (true, true) => true,
            (true, false) | (false, true) => false,
            _ => match (as_decimal(lhs), as_decimal(rhs)) {
                (Some(a), Some(b)) => a == b,
                _ => lhs == rhs,
            },
        };
        return Ok(if op == BinaryOpType::Equal { eq } else { !eq });
    }
    let (a, b) = match (as_decimal(lhs), as_decimal(rhs)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(MapperError::Binding(format!(
                "cannot order-compare {lhs:?} and {rhs:?}"
            ))
            .into());
        }
    };
    Ok(match op {
        BinaryOpType::Less => a < b,
        BinaryOpType::LessEqual => a <= b,
        BinaryOpType::Greater => a > b,
        BinaryOpType::GreaterEqual => a >= b,
        _ => unreachable!(),
    })
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Null,
    True,
    False,
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Op(&'static str),
    Not,
    LParen,
    RParen,
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut s = String::new();
                for c in chars.by_ref() {
                    if c == quote {
                        break;
                    }
                    s.push(c);
                }
                tokens.push(Token::Str(s));
            }
            '=' | '!' | '<' | '>' | '&' | '|' => {
                let mut op = String::new();
                op.push(c);
                chars.next();
                if matches!(chars.peek(), Some('=') | Some('&') | Some('|')) {
                    op.push(*chars.peek().unwrap());
                    chars.next();
                }
                tokens.push(match op.as_str() {
                    "==" => Token::Op("=="),
                    "!=" => Token::Op("!="),
                    "<" => Token::Op("<"),
                    "<=" => Token::Op("<="),
                    ">" => Token::Op(">"),
                    ">=" => Token::Op(">="),
                    "&&" => Token::Op("&&"),
                    "||" => Token::Op("||"),
                    "!" => Token::Not,
                    other => return Err(MapperError::Parse(format!("unknown operator `{other}`")).into()),
                });
            }
            c if c.is_ascii_digit() => {
                let mut num = String::new();
                let mut is_float = false;
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() {
                        num.push(c);
                        chars.next();
                    } else if c == '.' && !is_float {
                        is_float = true;
                        num.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(if is_float {
                    Token::Float(num.parse().map_err(|_| {
                        strata_core::Error::from(MapperError::Parse(format!(
                            "invalid number literal `{num}`"
                        )))
                    })?)
                } else {
                    Token::Int(num.parse().map_err(|_| {
                        strata_core::Error::from(MapperError::Parse(format!(
                            "invalid number literal `{num}`"
                        )))
                    })?)
                });
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '.' || c == '[' || c == ']' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(match ident.as_str() {
                    "null" => Token::Null,
                    "true" => Token::True,
                    "false" => Token::False,
                    "and" => Token::Op("&&"),
                    "or" => Token::Op("||"),
                    "not" => Token::Not,
                    _ => Token::Ident(ident),
                });
            }
            other => {
                return Err(MapperError::Parse(format!("unexpected character `{other}` in expression")).into());
            }
        }
    }
    Ok(tokens)
}

fn parse_or(tokens: &mut Vec<Token>) -> Result<Expr> {
    let mut lhs = parse_and(tokens)?;
    while matches!(tokens.first(), Some(Token::Op("||"))) {
        tokens.remove(0);
        let rhs = parse_and(tokens)?;
        lhs = Expr::Binary {
            op: BinaryOpType::Or,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
    }
    Ok(lhs)
}

fn parse_and(tokens: &mut Vec<Token>) -> Result<Expr> {
    let mut lhs = parse_comparison(tokens)?;
    while matches!(tokens.first(), Some(Token::Op("&&"))) {
        tokens.remove(0);
        let rhs = parse_comparison(tokens)?;
        lhs = Expr::Binary {
            op: BinaryOpType::And,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
    }
    Ok(lhs)
}

fn parse_comparison(tokens: &mut Vec<Token>) -> Result<Expr> {
    let lhs = parse_unary(tokens)?;
    let op = match tokens.first() {
        Some(Token::Op(op @ ("==" | "!=" | "<" | "<=" | ">" | ">="))) => *op,
        _ => return Ok(lhs),
    };
    tokens.remove(0);
    let rhs = parse_unary(tokens)?;
    let op = match op {
        "==" => BinaryOpType::Equal,
        "!=" => BinaryOpType::NotEqual,
        "<" => BinaryOpType::Less,
        "<=" => BinaryOpType::LessEqual,
        ">" => BinaryOpType::Greater,
        ">=" => BinaryOpType::GreaterEqual,
        _ => unreachable!(),
    };
    Ok(Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

fn parse_unary(tokens: &mut Vec<Token>) -> Result<Expr> {
    if matches!(tokens.first(), Some(Token::Not)) {
        tokens.remove(0);
        return Ok(Expr::Not(Box::new(parse_unary(tokens)?)));
    }
    parse_primary(tokens)
}

fn parse_primary(tokens: &mut Vec<Token>) -> Result<Expr> {
    let token = tokens
        .first()
        .cloned()
        .ok_or_else(|| MapperError::Parse("unexpected end of expression".into()))?;
    match token {
        Token::LParen => {
            tokens.remove(0);
            let inner = parse_or(tokens)?;
            match tokens.first() {
                Some(Token::RParen) => {
                    tokens.remove(0);
                    Ok(inner)
                }
                _ => Err(MapperError::Parse("unbalanced parentheses in expression".into()).into()),
            }
        }
        Token::Null => {
            tokens.remove(0);
            Ok(Expr::Operand(Operand::Null))
        }
        Token::True => {
            tokens.remove(0);
            Ok(Expr::Operand(Operand::Bool(true)))
        }
        Token::False => {
            tokens.remove(0);
            Ok(Expr::Operand(Operand::Bool(false)))
        }
        Token::Int(i) => {
            tokens.remove(0);
            Ok(Expr::Operand(Operand::Int(i)))
        }
        Token::Float(f) => {
            tokens.remove(0);
            Ok(Expr::Operand(Operand::Float(f)))
        }
        Token::Str(s) => {
            tokens.remove(0);
            Ok(Expr::Operand(Operand::Str(s)))
        }
        Token::Ident(ident) => {
            tokens.remove(0);
            Ok(Expr::Operand(Operand::Path(ident)))
        }
        other => Err(MapperError::Parse(format!("unexpected token `{other:?}` in expression")).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ctx(bindings: HashMap<String, Value>) -> EvalContext<'static> {
        EvalContext {
            bindings: Box::leak(Box::new(bindings)),
            parameter: None,
        }
    }

    #[test]
    fn equals_and_null_checks() {
        let mut bindings = HashMap::new();
        bindings.insert("name".to_string(), Value::Varchar(Some("ann".into())));
        let expr = parse("name != null").unwrap();
        assert!(evaluate_boolean(&expr, &ctx(bindings)).unwrap());
    }

    #[test]
    fn numeric_comparison_ignores_zero_vs_false() {
        let mut bindings = HashMap::new();
        bindings.insert("age".to_string(), Value::Int32(Some(0)));
        let expr = parse("age > 0").unwrap();
        assert!(!evaluate_boolean(&expr, &ctx(bindings)).unwrap());
    }

    #[test]
    fn and_or_short_circuit_shape() {
        let mut bindings = HashMap::new();
        bindings.insert("a".to_string(), Value::Boolean(Some(true)));
        bindings.insert("b".to_string(), Value::Boolean(Some(false)));
        let expr = parse("a && b").unwrap();
        assert!(!evaluate_boolean(&expr, &ctx(bindings.clone())).unwrap());
        let expr = parse("a || b").unwrap();
        assert!(evaluate_boolean(&expr, &ctx(bindings)).unwrap());
    }

    #[test]
    fn iterates_a_list_value() {
        let mut bindings = HashMap::new();
        bindings.insert(
            "ids".to_string(),
            Value::List(Some(vec![Value::Int32(Some(1)), Value::Int32(Some(2))]), Box::new(Value::Int32(None))),
        );
        let expr = parse("ids").unwrap();
        let items = evaluate_iterable(&expr, &ctx(bindings), false).unwrap();
        assert_eq!(items.len(), 2);
    }
}
