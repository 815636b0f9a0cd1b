use crate::{
    Result,
    stream::{Stream, TryStreamExt},
};
use std::fmt::Display;

#[derive(Clone)]
pub enum EitherIterator<A, B>
where
    A: Iterator,
    B: Iterator<Item = A::Item>,
{
    Left(A),
    Right(B),
}
impl<A, B> Iterator for EitherIterator<A, B>
where
    A: Iterator,
    B: Iterator<Item = A::Item>,
{
    type Item = A::Item;
    fn next(&mut self) -> Option<Self::Item> {
        match self {
            EitherIterator::Left(a) => a.next(),
            EitherIterator::Right(b) => b.next(),
        }
    }
}

/// Consumes and returns the leading run of `input` matching `pred`, advancing
/// `input` past it.
pub fn consume_while(input: &mut &str, pred: impl Fn(&char) -> bool) -> String {
    let end = input
        .char_indices()
        .find(|(_, c)| !pred(c))
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    let (matched, rest) = input.split_at(end);
    *input = rest;
    matched.to_string()
}

/// Consumes a leading numeric literal (digits, and if `ALLOW_SIGN` a single
/// leading `+`/`-`) from `input`, advancing it past the match.
pub fn extract_number<const ALLOW_SIGN: bool>(input: &mut &str) -> String {
    let mut out = String::new();
    let mut rest = *input;
    if ALLOW_SIGN
        && let Some(c) = rest.chars().next()
        && (c == '+' || c == '-')
    {
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    let digits = consume_while(&mut rest, char::is_ascii_digit);
    out.push_str(&digits);
    if digits.is_empty() {
        return String::new();
    }
    *input = rest;
    out
}

/// Truncates `value` to at most 500 characters, for embedding raw user input
/// into error messages without blowing them up.
#[macro_export]
macro_rules! truncate_long {
    ($value:expr) => {{
        let value = $value;
        let cut = value
            .char_indices()
            .nth(500)
            .map(|(i, _)| i)
            .unwrap_or(value.len());
        &value[..cut]
    }};
}

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

pub fn add_error_context<T, S: Stream<Item = Result<T>>, Q: Display>(
    stream: S,
    query: &Q,
) -> impl Stream<Item = Result<T>> + use<T, S, Q> {
    let query = format!("{}", query).chars().take(500).collect::<String>();
    stream.map_err(move |e| e.context(format!("While executing the query:\n{}", query)))
}

#[macro_export]
macro_rules! possibly_parenthesized {
    ($out:ident, $cond:expr, $v:expr) => {
        if $cond {
            $out.push('(');
            $v;
            $out.push(')');
        } else {
            $v;
        }
    };
}
