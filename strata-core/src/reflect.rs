//! Dotted/indexed property path tokenization and runtime property access.
//!
//! Parameter objects and result targets are plain Rust structs/maps the
//! engine has never seen at compile time, so binding `#{user.address[0].zip}`
//! has to walk the path token by token against a [`Reflectable`] value
//! rather than against generated field accessors.

use crate::{Error, Result, Value};

/// One segment of a dotted/indexed property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    /// `.name`
    Property(String),
    /// `[index]`
    Index(usize),
}

/// Splits `user.address[0].zip` into `[Property("user"), Property("address"),
/// Index(0), Property("zip")]`.
///
/// # Errors
/// Returns an error on an unterminated `[`, a non-numeric index, or a
/// leading/trailing/doubled `.`.
pub fn tokenize_path(path: &str) -> Result<Vec<PathToken>> {
    let mut tokens = Vec::new();
    let mut rest = path;
    if rest.is_empty() {
        return Err(Error::msg("empty property path"));
    }
    loop {
        let end = rest
            .find(['.', '['])
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(end);
        if head.is_empty() {
            return Err(Error::msg(format!(
                "malformed property path `{path}`: empty segment"
            )));
        }
        tokens.push(PathToken::Property(head.to_string()));
        rest = tail;
        loop {
            if let Some(after_dot) = rest.strip_prefix('.') {
                if after_dot.starts_with(['.', '[']) || after_dot.is_empty() {
                    return Err(Error::msg(format!(
                        "malformed property path `{path}`: empty segment after `.`"
                    )));
                }
                rest = after_dot;
                break;
            } else if let Some(after_bracket) = rest.strip_prefix('[') {
                let Some(close) = after_bracket.find(']') else {
                    return Err(Error::msg(format!(
                        "malformed property path `{path}`: unterminated `[`"
                    )));
                };
                let (index, after_close) = after_bracket.split_at(close);
                let index: usize = index.parse().map_err(|_| {
                    Error::msg(format!(
                        "malformed property path `{path}`: `{index}` is not a valid index"
                    ))
                })?;
                tokens.push(PathToken::Index(index));
                rest = &after_close[1..];
            } else {
                return Ok(tokens);
            }
        }
        if rest.is_empty() {
            return Ok(tokens);
        }
    }
}

/// A value a parameter/result path can be read from or written into at
/// runtime.
///
/// Implemented by hand, or via `#[derive(Mapper)]`'s generated accessors,
/// for structs bound as mapper parameters or result targets. Paths are
/// walked at runtime rather than compiled into static field offsets, since
/// the set of properties a statement touches isn't known until its XML or
/// annotation is parsed.
pub trait Reflectable {
    /// Read the named direct property (not a full dotted path).
    fn get_property(&self, name: &str) -> Result<Value>;
    /// Read the element at `index`, for properties that are sequences.
    fn get_index(&self, index: usize) -> Result<Value>;
    /// Read a named property yielding a nested `Reflectable`, when walking a
    /// path needs to descend further rather than terminate on a `Value`.
    fn get_nested(&self, _name: &str) -> Result<&dyn Reflectable> {
        Err(Error::msg(format!(
            "{} has no nested reflectable properties",
            std::any::type_name::<Self>()
        )))
    }
    /// Read the element at `index` yielding a nested `Reflectable`, for
    /// sequences of objects a path needs to descend through rather than
    /// terminate on, e.g. the `[0]` in `orders[0].total`.
    fn get_nested_index(&self, _index: usize) -> Result<&dyn Reflectable> {
        Err(Error::msg(format!(
            "{} has no indexable nested reflectable elements",
            std::any::type_name::<Self>()
        )))
    }
    /// Write `value` into the named direct property. Only needed by
    /// parameter objects a key generator writes an auto-generated key
    /// back into; most `Reflectable` impls never need this and keep the
    /// default, which errs.
    fn set_property(&mut self, name: &str, _value: Value) -> Result<()> {
        Err(Error::msg(format!(
            "{} has no settable property `{name}`",
            std::any::type_name::<Self>()
        )))
    }
}

/// Lets a bare scalar stand in as a whole parameter object: the single
/// unnamed-parameter call path binds `#{value}`/`#{param1}` directly
/// against whatever was passed, which may be a `Value` rather than a
/// struct implementing `Reflectable` itself. Every lookup past "the
/// value itself" fails, since a scalar has no properties to descend
/// into.
impl Reflectable for Value {
    fn get_property(&self, name: &str) -> Result<Value> {
        Err(Error::msg(format!(
            "a scalar parameter has no property `{name}`; bind it unnamed instead"
        )))
    }

    fn get_index(&self, _index: usize) -> Result<Value> {
        Err(Error::msg("a scalar parameter is not indexable"))
    }
}

/// Writes `value` into `root` at `path`. Only single-segment (direct
/// property) paths are supported: a key generator's `keyProperty` is
/// overwhelmingly a flat name in practice, and writing through a nested
/// path would need a mutable descent `Reflectable` has no counterpart
/// for (`get_nested`/`get_nested_index` both hand back a shared `&dyn
/// Reflectable`).
pub fn set_path(root: &mut dyn Reflectable, path: &str, value: Value) -> Result<()> {
    let tokens = tokenize_path(path)?;
    match tokens.as_slice() {
        [PathToken::Property(name)] => root.set_property(name, value),
        _ => Err(Error::msg(format!(
            "cannot write generated key to nested path `{path}`, only a direct property name is supported"
        ))),
    }
}

/// Walks `path` against `root`, descending through every non-terminal
/// segment via [`Reflectable::get_nested`]/[`Reflectable::get_nested_index`]
/// and resolving the final segment to a [`Value`].
pub fn resolve_path(root: &dyn Reflectable, path: &str) -> Result<Value> {
    let tokens = tokenize_path(path)?;
    let mut current = root;
    let last = tokens.len() - 1;
    for (i, token) in tokens.iter().enumerate() {
        let is_last = i == last;
        match (token, is_last) {
            (PathToken::Property(name), true) => return current.get_property(name),
            (PathToken::Property(name), false) => current = current.get_nested(name)?,
            (PathToken::Index(index), true) => return current.get_index(*index),
            (PathToken::Index(index), false) => current = current.get_nested_index(*index)?,
        }
    }
    unreachable!("tokenize_path never returns an empty token list")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_plain_property() {
        assert_eq!(
            tokenize_path("name").unwrap(),
            vec![PathToken::Property("name".into())]
        );
    }

    #[test]
    fn tokenizes_dotted_path() {
        assert_eq!(
            tokenize_path("user.address.zip").unwrap(),
            vec![
                PathToken::Property("user".into()),
                PathToken::Property("address".into()),
                PathToken::Property("zip".into()),
            ]
        );
    }

    #[test]
    fn tokenizes_indexed_path() {
        assert_eq!(
            tokenize_path("user.tags[0]").unwrap(),
            vec![
                PathToken::Property("user".into()),
                PathToken::Property("tags".into()),
                PathToken::Index(0),
            ]
        );
    }

    #[test]
    fn tokenizes_chained_indices() {
        assert_eq!(
            tokenize_path("matrix[0][1]").unwrap(),
            vec![
                PathToken::Property("matrix".into()),
                PathToken::Index(0),
                PathToken::Index(1),
            ]
        );
    }

    #[test]
    fn rejects_unterminated_bracket() {
        assert!(tokenize_path("user.tags[0").is_err());
    }

    #[test]
    fn rejects_non_numeric_index() {
        assert!(tokenize_path("user.tags[x]").is_err());
    }

    #[test]
    fn rejects_double_dot() {
        assert!(tokenize_path("user..name").is_err());
    }

    #[test]
    fn rejects_empty_path() {
        assert!(tokenize_path("").is_err());
    }
}
