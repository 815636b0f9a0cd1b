use crate::{
    Error, Interval, Passive, Result, consume_while, extract_number, truncate_long,
};
use anyhow::Context;
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use std::{
    any,
    borrow::Cow,
    collections::{BTreeMap, HashMap, LinkedList, VecDeque},
    hash::Hash,
};
use time::{PrimitiveDateTime, format_description::parse_borrowed};
use uuid::Uuid;

use crate::Value;

/// Value conversion and simple parsing utilities. It is the central
/// conversion and parsing abstraction used throughout `strata` to move
/// between native Rust types and the dynamically typed [`Value`]
/// representation that backs bound parameters and projected rows.
///
/// # Implementing `AsValue` for custom types
/// Implementations must decide how to represent themselves as a [`Value`].
/// A minimal implementation wraps the type's canonical SQL representation
/// directly, without any lossy transformation.
///
/// # Parsing contract
/// - `parse` delegates to `extract`-style helpers then verifies the slice
///   is exhausted.
/// - Implementations should return descriptive errors including the
///   original fragment; prefer `any::type_name::<Self>()` for uniform
///   messages.
///
/// # Error semantics
/// - Range checks always occur before returning numeric conversions. The
///   error message includes both the offending literal and target type.
/// - Temporal parsing attempts multiple format strings; if none match, an
///   error with the remaining slice is returned.
///
/// # Examples
/// ```rust
/// use strata_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i32 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Return an "empty" (NULL-like) value variant for this type. Used when
    /// constructing composite `Value` containers (arrays, maps) or
    /// representing absent optional data.
    fn as_empty_value() -> Value;
    /// Convert this value into its owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
    /// Parse a full string into `Self`.
    ///
    /// Fails if the parsing routine does not consume the entire input
    /// (guards against accidentally accepting things like `123abc`).
    fn parse(input: impl AsRef<str>) -> Result<Self>
    where
        Self: Sized,
    {
        Err(Error::msg(format!(
            "Cannot parse '{}' as {} (the parse method is not implemented)",
            truncate_long!(input.as_ref()),
            any::type_name::<Self>()
        )))
    }
}

impl AsValue for Value {
    fn as_empty_value() -> Value {
        Value::Null
    }
    fn as_value(self) -> Value {
        self
    }
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized,
    {
        Ok(value)
    }
}

impl From<&'static str> for Value {
    fn from(value: &'static str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self as _))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v as _),
                    $($pat_rest => $expr_rest,)*
                    #[allow(unreachable_patterns)]
                    Value::Int32(Some(v)) => {
                        if (v as i128).clamp(<$source>::MIN as _, <$source>::MAX as _) != v as i128 {
                            return Err(Error::msg(format!(
                                "Value {v}: i32 is out of range for {}",
                                any::type_name::<Self>(),
                            )));
                        }
                        Ok(v as $source)
                    }
                    #[allow(unreachable_patterns)]
                    Value::Int64(Some(v)) => {
                        if (v as i128).clamp(<$source>::MIN as _, <$source>::MAX as _) != v as i128 {
                            return Err(Error::msg(format!(
                                "Value {v}: i64 is out of range for {}",
                                any::type_name::<Self>(),
                            )));
                        }
                        Ok(v as $source)
                    }
                    Value::Varchar(Some(ref v)) => Self::parse(v),
                    _ => Err(Error::msg(format!(
                        "Cannot convert {value:?} to {}",
                        any::type_name::<Self>(),
                    ))),
                }
            }
            fn parse(input: impl AsRef<str>) -> Result<Self> {
                input.as_ref().parse::<Self>().map_err(Into::into)
            }
        }
    };
}
impl_as_value!(
    i8,
    Value::Int8,
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::Int16(Some(v)) => {
        let result = v as i8;
        if result as i16 != v {
            return Err(Error::msg(format!("Value {v}: i16 is out of range for i8")));
        }
        Ok(result)
    },
);
impl_as_value!(
    i16,
    Value::Int16,
    Value::Int8(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
);
impl_as_value!(
    i32,
    Value::Int32,
    Value::Int16(Some(v)) => Ok(v as _),
    Value::Int8(Some(v)) => Ok(v as _),
    Value::UInt32(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v), ..) => {
        let error = Error::msg(format!("Value {v}: Decimal does not fit into i32"));
        if !v.is_integer() {
            return Err(error.context("The value is not a integer"));
        }
        v.to_i32().ok_or(error)
    }
);
impl_as_value!(
    i64,
    Value::Int64,
    Value::Int32(Some(v)) => Ok(v as _),
    Value::Int16(Some(v)) => Ok(v as _),
    Value::Int8(Some(v)) => Ok(v as _),
    Value::UInt64(Some(v)) => Ok(v as _),
    Value::UInt32(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v), ..) => {
        let error = Error::msg(format!("Value {v}: Decimal does not fit into i64"));
        if !v.is_integer() {
            return Err(error.context("The value is not a integer"));
        }
        v.to_i64().ok_or(error)
    }
);
impl_as_value!(
    i128,
    Value::Int128,
    Value::Int64(Some(v)) => Ok(v as _),
    Value::Int32(Some(v)) => Ok(v as _),
    Value::Int16(Some(v)) => Ok(v as _),
    Value::Int8(Some(v)) => Ok(v as _),
    Value::UInt128(Some(v)) => Ok(v as _),
    Value::UInt64(Some(v)) => Ok(v as _),
    Value::UInt32(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v), ..) => {
        let error = Error::msg(format!("Value {v}: Decimal does not fit into i128"));
        if !v.is_integer() {
            return Err(error.context("The value is not a integer"));
        }
        v.to_i128().ok_or(error)
    }
);
impl_as_value!(
    isize,
    Value::Int64,
    Value::Int32(Some(v)) => Ok(v as _),
    Value::Int16(Some(v)) => Ok(v as _),
    Value::Int8(Some(v)) => Ok(v as _),
    Value::UInt64(Some(v)) => Ok(v as _),
    Value::UInt32(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v), ..) => {
        let error = Error::msg(format!("Value {v}: Decimal does not fit into i64"));
        if !v.is_integer() {
            return Err(error.context("The value is not a integer"));
        }
        v.to_isize().ok_or(error)
    }
);
impl_as_value!(
    u8,
    Value::UInt8,
    Value::Int16(Some(v)) => {
        v.to_u8().ok_or(Error::msg(format!("Value {v}: i16 is out of range for u8")))
    }
);
impl_as_value!(
    u16,
    Value::UInt16,
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::Int32(Some(v)) => {
        let result = v as u16;
        if result as i32 != v {
            return Err(Error::msg(format!("Value {v}: i32 is out of range for u16")));
        }
        Ok(result)
    }
);
impl_as_value!(
    u32,
    Value::UInt32,
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
);
impl_as_value!(
    u64,
    Value::UInt64,
    Value::UInt32(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v), ..) => {
        let error = Error::msg(format!("Value {v}: Decimal does not fit into u64"));
        if !v.is_integer() {
            return Err(error.context("The value is not a integer"));
        }
        v.to_u64().ok_or(error)
    }
);
impl_as_value!(
    u128,
    Value::UInt128,
    Value::UInt64(Some(v)) => Ok(v as _),
    Value::UInt32(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v), ..) => {
        let error = Error::msg(format!("Value {v}: Decimal does not fit into u128"));
        if !v.is_integer() {
            return Err(error.context("The value is not a integer"));
        }
        v.to_u128().ok_or(error)
    }
);
impl_as_value!(
    usize,
    Value::UInt64,
    Value::UInt32(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v), ..) => {
        let error = Error::msg(format!("Value {v}: Decimal does not fit into u64"));
        if !v.is_integer() {
            return Err(error.context("The value is not a integer"));
        }
        v.to_usize().ok_or(error)
    }
);

macro_rules! impl_as_value_str {
    ($source:ty, $destination:path, $extract:expr $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self.into()))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v.into()),
                    $($pat_rest => $expr_rest,)*
                    _ => Err(Error::msg(format!(
                        "Cannot convert {value:?} to {}",
                        any::type_name::<Self>(),
                    ))),
                }
            }
            fn parse(input: impl AsRef<str>)  -> Result<Self> {
                $extract(input.as_ref())
            }
        }
    };
}
impl_as_value_str!(
    bool,
    Value::Boolean,
    |input: &str| {
        match input {
            x if x.eq_ignore_ascii_case("true") || x.eq_ignore_ascii_case("t") || x.eq("1") => Ok(true),
            x if x.eq_ignore_ascii_case("false") || x.eq_ignore_ascii_case("f") || x.eq("0") => Ok(false),
            _  => Err(Error::msg(format!("Cannot parse boolean from '{input}'")))
        }
    },
    Value::Int8(Some(v)) => Ok(v != 0),
    Value::Int16(Some(v)) => Ok(v != 0),
    Value::Int32(Some(v)) => Ok(v != 0),
    Value::Int64(Some(v)) => Ok(v != 0),
    Value::Int128(Some(v)) => Ok(v != 0),
    Value::UInt8(Some(v)) => Ok(v != 0),
    Value::UInt16(Some(v)) => Ok(v != 0),
    Value::UInt32(Some(v)) => Ok(v != 0),
    Value::UInt64(Some(v)) => Ok(v != 0),
    Value::UInt128(Some(v)) => Ok(v != 0),
);
impl_as_value_str!(
    f32,
    Value::Float32,
    |input: &str| {
        Ok(input.parse::<f32>()?)
    },
    Value::Float64(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v), ..) => Ok(v.try_into()?),
);
impl_as_value_str!(
    f64,
    Value::Float64,
    |input: &str| {
        Ok(input.parse::<f64>()?)
    },
    Value::Float32(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v), ..) => Ok(v.try_into()?),
);

impl_as_value_str!(
    String,
    Value::Varchar,
    |input: &str| {
        Ok(input.into())
    },
);
impl_as_value_str!(Vec<u8>, Value::Blob, |mut input: &str| {
    if input.starts_with("\\x") {
        input = &input[2..];
    }
    let filter_x = input.contains('x');
    let result = if filter_x {
        hex::decode(input.chars().filter(|c| *c != 'x').collect::<String>())
    } else {
        hex::decode(input)
    }
    .context(format!(
        "While decoding `{}` as {}",
        truncate_long!(input),
        any::type_name::<Self>()
    ))?;
    Ok(result)
});
impl_as_value_str!(Interval, Value::Interval, |mut input: &str| {
    let context = || {
        Error::msg(format!(
            "Cannot extract interval from `{}`",
            truncate_long!(input)
        ))
    };
    match input.chars().peekable().peek() {
        Some(v) if *v == '"' || *v == '\'' => {
            input = &input[1..];
            if !input.ends_with(*v) {
                return Err(context());
            }
            input = input.trim_end_matches(*v);
        }
        _ => {}
    };
    let mut interval = Interval::ZERO;
    loop {
        let mut cur = input;
        let Ok(count) = extract_number::<true>(&mut cur).parse::<i128>() else {
            break;
        };
        cur = cur.trim_start();
        let unit = consume_while(&mut cur, char::is_ascii_alphabetic);
        if unit.is_empty() {
            break;
        }
        match unit.as_str() {
            x if x.eq_ignore_ascii_case("y")
                || x.eq_ignore_ascii_case("year")
                || x.eq_ignore_ascii_case("years") =>
            {
                interval += Interval::from_years(count as _)
            }
            x if x.eq_ignore_ascii_case("mon")
                || x.eq_ignore_ascii_case("mons")
                || x.eq_ignore_ascii_case("month")
                || x.eq_ignore_ascii_case("months") =>
            {
                interval += Interval::from_months(count as _)
            }
            x if x.eq_ignore_ascii_case("d")
                || x.eq_ignore_ascii_case("day")
                || x.eq_ignore_ascii_case("days") =>
            {
                interval += Interval::from_days(count as _)
            }
            x if x.eq_ignore_ascii_case("h")
                || x.eq_ignore_ascii_case("hour")
                || x.eq_ignore_ascii_case("hours") =>
            {
                interval += Interval::from_hours(count as _)
            }
            x if x.eq_ignore_ascii_case("min")
                || x.eq_ignore_ascii_case("mins")
                || x.eq_ignore_ascii_case("minute")
                || x.eq_ignore_ascii_case("minutes") =>
            {
                interval += Interval::from_mins(count as _)
            }
            x if x.eq_ignore_ascii_case("s")
                || x.eq_ignore_ascii_case("sec")
                || x.eq_ignore_ascii_case("secs")
                || x.eq_ignore_ascii_case("second")
                || x.eq_ignore_ascii_case("seconds") =>
            {
                interval += Interval::from_secs(count as _)
            }
            x if x.eq_ignore_ascii_case("micro")
                || x.eq_ignore_ascii_case("micros")
                || x.eq_ignore_ascii_case("microsecond")
                || x.eq_ignore_ascii_case("microseconds") =>
            {
                interval += Interval::from_micros(count as _)
            }
            x if x.eq_ignore_ascii_case("ns")
                || x.eq_ignore_ascii_case("nano")
                || x.eq_ignore_ascii_case("nanos")
                || x.eq_ignore_ascii_case("nanosecond")
                || x.eq_ignore_ascii_case("nanoseconds") =>
            {
                interval += Interval::from_nanos(count as _)
            }
            _ => return Err(context()),
        }
        input = cur.trim_start();
    }
    let neg = if Some('-') == input.chars().next() {
        input = input[1..].trim_ascii_start();
        true
    } else {
        false
    };
    let mut time_interval = Interval::ZERO;
    let num = extract_number::<true>(&mut input);
    if !num.is_empty() {
        let num = num.parse::<u64>().with_context(context)?;
        time_interval += Interval::from_hours(num as _);
        if Some(':') == input.chars().next() {
            input = &input[1..];
            let num = extract_number::<false>(&mut input).parse::<u64>()?;
            if input.is_empty() {
                return Err(context());
            }
            time_interval += Interval::from_mins(num as _);
            if Some(':') == input.chars().next() {
                input = &input[1..];
                let num = extract_number::<false>(&mut input)
                    .parse::<u64>()
                    .with_context(context)?;
                time_interval += Interval::from_secs(num as _);
                if Some('.') == input.chars().next() {
                    input = &input[1..];
                    let len = input.len();
                    let mut num = extract_number::<true>(&mut input)
                        .parse::<i128>()
                        .with_context(context)?;
                    let magnitude = (len - 1) / 3;
                    num *= 10_i128.pow(2 - (len + 2) as u32 % 3);
                    match magnitude {
                        0 => time_interval += Interval::from_millis(num),
                        1 => time_interval += Interval::from_micros(num),
                        2 => time_interval += Interval::from_nanos(num),
                        _ => return Err(context()),
                    }
                }
            }
        }
        if neg {
            interval -= time_interval;
        } else {
            interval += time_interval;
        }
    }
    if !input.is_empty() {
        return Err(context());
    }
    Ok(interval)
});
impl_as_value_str!(std::time::Duration, Value::Interval, |v| {
    <Interval as AsValue>::parse(v).map(Into::into)
});
impl_as_value_str!(time::Duration, Value::Interval, |v| {
    <Interval as AsValue>::parse(v).map(Into::into)
});
impl_as_value_str!(
    Uuid,
    Value::Uuid,
    |input: &str| {
        let uuid = Uuid::parse_str(input).with_context(|| {
            format!(
                "Cannot extract a uuid value from `{}`",
                truncate_long!(input)
            )
        })?;
        Ok(uuid)
    },
    Value::Varchar(Some(v)) => Self::parse(v),
);

macro_rules! parse_time {
    ($value: ident, $($formats:literal),+ $(,)?) => {
        'value: {
            let context = || Error::msg(format!(
                "Cannot parse `{}` as {}",
                truncate_long!($value),
                any::type_name::<Self>()
            ));
            for format in [$($formats,)+] {
                let format = parse_borrowed::<2>(format)?;
                let mut parsed = time::parsing::Parsed::new();
                let remaining = parsed.parse_items($value.as_bytes(), &format);
                if let Ok(remaining) = remaining {
                    let result = parsed.try_into().with_context(context)?;
                    $value = &$value[($value.len() - remaining.len())..];
                    break 'value Ok(result);
                }
            }
            Err(context())
        }
    }
}

impl_as_value_str!(
    time::Date,
    Value::Date,
    |input: &str| {
        let mut value = input;
        let mut result: time::Date = parse_time!(value, "[year]-[month]-[day]")?;
        {
            let mut attempt = value.trim_start();
            let suffix = consume_while(&mut attempt, char::is_ascii_alphabetic);
            if suffix.eq_ignore_ascii_case("bc") {
                result =
                    time::Date::from_calendar_date(-(result.year() - 1), result.month(), result.day())?;
                value = attempt;
            }
            if suffix.eq_ignore_ascii_case("ad") {
                value = attempt
            }
        }
        if !value.is_empty() {
            return Err(Error::msg(format!("Cannot parse `{}` as time::Date", truncate_long!(input))))
        }
        Ok(result)
    },
    Value::Varchar(Some(v)) => <Self as AsValue>::parse(v),
);
impl_as_value_str!(
    time::Time,
    Value::Time,
    |mut input: &str| {
        let result: time::Time = parse_time!(
            input,
            "[hour]:[minute]:[second].[subsecond]",
            "[hour]:[minute]:[second]",
            "[hour]:[minute]",
        )?;
        if !input.is_empty() {
            return Err(Error::msg(format!("Cannot parse `{}` as time::Time", truncate_long!(input))))
        }
        Ok(result)
    },
    Value::Varchar(Some(v)) => <Self as AsValue>::parse(v),
);

impl_as_value_str!(
    time::PrimitiveDateTime,
    Value::Timestamp,
    |mut input: &str| {
        let result: time::PrimitiveDateTime = parse_time!(
            input,
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]",
            "[year]-[month]-[day]T[hour]:[minute]:[second]",
            "[year]-[month]-[day]T[hour]:[minute]",
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]",
            "[year]-[month]-[day] [hour]:[minute]:[second]",
            "[year]-[month]-[day] [hour]:[minute]",
        )?;
        if !input.is_empty() {
            return Err(Error::msg(format!("Cannot parse `{}` as time::PrimitiveDateTime", truncate_long!(input))))
        }
        Ok(result)
    },
    Value::Varchar(Some(v)) => <Self as AsValue>::parse(v),
);

impl_as_value_str!(
    time::OffsetDateTime,
    Value::TimestampWithTimezone,
    |mut input: &str| {
        if let Ok::<time::OffsetDateTime, _>(result) = parse_time!(
            input,
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]",
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]",
            "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]",
            "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]",
            "[year]-[month]-[day]T[hour]:[minute][offset_hour sign:mandatory]:[offset_minute]",
            "[year]-[month]-[day]T[hour]:[minute][offset_hour sign:mandatory]",
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]",
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]",
            "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]",
            "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]",
            "[year]-[month]-[day] [hour]:[minute][offset_hour sign:mandatory]:[offset_minute]",
            "[year]-[month]-[day] [hour]:[minute][offset_hour sign:mandatory]",
        ) {
            return Ok(result);
        }
        if let Ok(result) = <PrimitiveDateTime as AsValue>::parse(input).map(|v| v.assume_utc()) {
            return Ok(result);
        }
        Err(Error::msg(format!("Cannot parse `{}` as time::OffsetDateTime", truncate_long!(input))))
    },
    Value::Timestamp(Some(timestamp)) => Ok(timestamp.assume_utc()),
    Value::Varchar(Some(v)) => <Self as AsValue>::parse(v),
);

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None, 0, 0)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self), 38, self.scale() as _)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v), ..) => Ok(v),
            Value::Int8(Some(v)) => Ok(Decimal::new(v as i64, 0)),
            Value::Int16(Some(v)) => Ok(Decimal::new(v as i64, 0)),
            Value::Int32(Some(v)) => Ok(Decimal::new(v as i64, 0)),
            Value::Int64(Some(v)) => Ok(Decimal::new(v, 0)),
            Value::UInt8(Some(v)) => Ok(Decimal::new(v as i64, 0)),
            Value::UInt16(Some(v)) => Ok(Decimal::new(v as i64, 0)),
            Value::UInt32(Some(v)) => Ok(Decimal::new(v as i64, 0)),
            Value::UInt64(Some(v)) => Ok(Decimal::new(v as i64, 0)),
            Value::Float32(Some(v)) => Decimal::from_f32(v)
                .ok_or(Error::msg(format!("Cannot convert {value:?} to Decimal"))),
            Value::Float64(Some(v)) => Decimal::from_f64(v)
                .ok_or(Error::msg(format!("Cannot convert {value:?} to Decimal"))),
            Value::Varchar(Some(ref v)) => Self::parse(v),
            _ => Err(Error::msg(format!("Cannot convert {value:?} to Decimal"))),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref();
        input.parse::<Decimal>().with_context(|| {
            format!(
                "Cannot extract a decimal value from `{}`",
                truncate_long!(input)
            )
        })
    }
}

impl<T: AsValue, const N: usize> AsValue for [T; N] {
    fn as_empty_value() -> Value {
        Value::Array(None, Box::new(T::as_empty_value()))
    }
    fn as_value(self) -> Value {
        Value::Array(
            Some(self.into_iter().map(AsValue::as_value).collect()),
            Box::new(T::as_empty_value()),
        )
    }
    fn try_from_value(value: Value) -> Result<Self> {
        fn convert_iter<T: AsValue, const N: usize>(
            iter: impl IntoIterator<Item = Value>,
        ) -> Result<[T; N]> {
            iter.into_iter()
                .map(T::try_from_value)
                .collect::<Result<Vec<_>>>()?
                .try_into()
                .map_err(|v: Vec<T>| {
                    Error::msg(format!(
                        "Expected array of length {}, got {} elements ({})",
                        N,
                        v.len(),
                        any::type_name::<[T; N]>()
                    ))
                })
        }
        match value {
            Value::List(Some(v), ..) if v.len() == N => convert_iter(v),
            Value::Array(Some(v), ..) if v.len() == N => convert_iter(v.into_vec()),
            _ => Err(Error::msg(format!(
                "Cannot convert {value:?} to array {}",
                any::type_name::<Self>()
            ))),
        }
    }
}

macro_rules! impl_as_value_collection {
    ($source:ident) => {
        impl<T: AsValue> AsValue for $source<T> {
            fn as_empty_value() -> Value {
                Value::List(None, Box::new(T::as_empty_value()))
            }
            fn as_value(self) -> Value {
                Value::List(
                    Some(self.into_iter().map(AsValue::as_value).collect()),
                    Box::new(T::as_empty_value()),
                )
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    Value::List(Some(v), ..) => v
                        .into_iter()
                        .map(|v| Ok::<_, Error>(<T as AsValue>::try_from_value(v)?))
                        .collect::<Result<_>>(),
                    Value::List(None, ..) => Ok($source::<T>::new()),
                    Value::Array(Some(v), ..) => v
                        .into_vec()
                        .into_iter()
                        .map(|v| Ok::<_, Error>(<T as AsValue>::try_from_value(v)?))
                        .collect::<Result<_>>(),
                    _ => Err(Error::msg(format!(
                        "Cannot convert {value:?} to {}",
                        any::type_name::<Self>(),
                    ))),
                }
            }
        }
    };
}
impl_as_value_collection!(Vec);
impl_as_value_collection!(VecDeque);
impl_as_value_collection!(LinkedList);

macro_rules! impl_as_value_map {
    ($source:ident) => {
        impl<K: AsValue, V: AsValue> AsValue for $source<K, V> {
            fn as_empty_value() -> Value {
                Value::Map(None, K::as_empty_value().into(), V::as_empty_value().into())
            }
            fn as_value(self) -> Value {
                Value::Map(
                    Some(
                        self.into_iter()
                            .map(|(k, v)| (k.as_value(), v.as_value()))
                            .collect(),
                    ),
                    K::as_empty_value().into(),
                    V::as_empty_value().into(),
                )
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Map(Some(v), ..) => v
                        .into_iter()
                        .map(|(k, v)| {
                            Ok((
                                <K as AsValue>::try_from_value(k)?,
                                <V as AsValue>::try_from_value(v)?,
                            ))
                        })
                        .collect::<Result<_>>(),
                    Value::Map(None, ..) => Ok($source::<K, V>::new()),
                    _ => Err(Error::msg(format!(
                        "Cannot convert {value:?} to {}",
                        any::type_name::<Self>(),
                    ))),
                }
            }
        }
    };
}
impl_as_value_map!(BTreeMap);
impl_as_value_map!(HashMap);

impl<'a> AsValue for Cow<'a, str> {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.into()))
    }
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized,
    {
        String::try_from_value(value).map(Into::into)
    }
    fn parse(input: impl AsRef<str>) -> Result<Self>
    where
        Self: Sized,
    {
        <String as AsValue>::parse(input).map(Into::into)
    }
}

impl<T: AsValue> AsValue for Passive<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Passive::Set(v) => v.as_value(),
            Passive::NotSet => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(Passive::Set(<T as AsValue>::try_from_value(value)?))
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(if value.is_null() {
            None
        } else {
            Some(<T as AsValue>::try_from_value(value)?)
        })
    }
    fn parse(input: impl AsRef<str>) -> Result<Self>
    where
        Self: Sized,
    {
        let mut value = input.as_ref();
        let result = consume_while(&mut value, |v| v.is_alphanumeric() || *v == '_');
        if result.eq_ignore_ascii_case("null") {
            return Ok(None);
        };
        T::parse(input).map(Some)
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(Self::new(<T as AsValue>::try_from_value(value)?))
    }
    fn parse(input: impl AsRef<str>) -> Result<Self>
    where
        Self: Sized,
    {
        T::parse(input).map(Self::new)
    }
}
