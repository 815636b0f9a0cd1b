use rust_decimal::Decimal;
use std::cmp::Ordering;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::Interval;

/// A dynamically-typed SQL value.
///
/// Every variant is an `Option` wrapping its payload: `None` represents SQL
/// `NULL` while still carrying the column's declared type, which is what a
/// [`crate::TypeHandler`] needs to pick the right bind/extract routine even
/// when the value itself is absent. A bare, typeless `NULL` (e.g. a literal
/// in dynamic SQL before it has been bound to any column) is `Value::Null`.
///
/// `Map`'s key/value slots are stored as a flat `Vec<(Value, Value)>` rather
/// than a `BTreeMap`/`HashMap`: `Value` has no total order or derived `Hash`
/// impl, and none of the engine's consumers (foreach over a bound map
/// parameter, an `ARRAY`/`STRUCT`-shaped column) need ordered or hashed
/// lookup, only iteration.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),

    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Int128(Option<i128>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    UInt128(Option<u128>),

    Float32(Option<f32>),
    Float64(Option<f64>),
    /// Arbitrary-precision decimal, carrying its declared (precision, scale)
    /// alongside the value so a `None` still describes the column's shape.
    Decimal(Option<Decimal>, u8, u8),

    Varchar(Option<String>),
    Blob(Option<Vec<u8>>),

    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Interval(Option<Interval>),

    Uuid(Option<Uuid>),

    /// A fixed-length array of a single element type, e.g. Postgres's
    /// `int4[5]` columns.
    Array(Option<Box<[Value]>>, Box<Value>),
    /// A variable-length, homogeneous list.
    List(Option<Vec<Value>>, Box<Value>),
    /// A homogeneous key/value collection.
    Map(Option<Vec<(Value, Value)>>, Box<Value>, Box<Value>),
}

impl Value {
    /// Whether `self` and `other` are the same variant with the same
    /// declared shape (precision/scale, element type), independent of
    /// whether either side carries a value or is `NULL`.
    pub fn same_type(&self, other: &Value) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null)
            | (Boolean(..), Boolean(..))
            | (Int8(..), Int8(..))
            | (Int16(..), Int16(..))
            | (Int32(..), Int32(..))
            | (Int64(..), Int64(..))
            | (Int128(..), Int128(..))
            | (UInt8(..), UInt8(..))
            | (UInt16(..), UInt16(..))
            | (UInt32(..), UInt32(..))
            | (UInt64(..), UInt64(..))
            | (UInt128(..), UInt128(..))
            | (Float32(..), Float32(..))
            | (Float64(..), Float64(..))
            | (Varchar(..), Varchar(..))
            | (Blob(..), Blob(..))
            | (Date(..), Date(..))
            | (Time(..), Time(..))
            | (Timestamp(..), Timestamp(..))
            | (TimestampWithTimezone(..), TimestampWithTimezone(..))
            | (Interval(..), Interval(..))
            | (Uuid(..), Uuid(..)) => true,
            (Decimal(_, p1, s1), Decimal(_, p2, s2)) => p1 == p2 && s1 == s2,
            (Array(_, t1), Array(_, t2)) => t1.same_type(t2),
            (List(_, t1), List(_, t2)) => t1.same_type(t2),
            (Map(_, k1, v1), Map(_, k2, v2)) => k1.same_type(k2) && v1.same_type(v2),
            _ => false,
        }
    }

    /// Whether the value is `NULL` (either bare `Value::Null` or a typed
    /// variant holding `None`).
    pub fn is_null(&self) -> bool {
        use Value::*;
        match self {
            Null => true,
            Boolean(v) => v.is_none(),
            Int8(v) => v.is_none(),
            Int16(v) => v.is_none(),
            Int32(v) => v.is_none(),
            Int64(v) => v.is_none(),
            Int128(v) => v.is_none(),
            UInt8(v) => v.is_none(),
            UInt16(v) => v.is_none(),
            UInt32(v) => v.is_none(),
            UInt64(v) => v.is_none(),
            UInt128(v) => v.is_none(),
            Float32(v) => v.is_none(),
            Float64(v) => v.is_none(),
            Decimal(v, ..) => v.is_none(),
            Varchar(v) => v.is_none(),
            Blob(v) => v.is_none(),
            Date(v) => v.is_none(),
            Time(v) => v.is_none(),
            Timestamp(v) => v.is_none(),
            TimestampWithTimezone(v) => v.is_none(),
            Interval(v) => v.is_none(),
            Uuid(v) => v.is_none(),
            Array(v, _) => v.is_none(),
            List(v, _) => v.is_none(),
            Map(v, ..) => v.is_none(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Int8(a), Int8(b)) => a == b,
            (Int16(a), Int16(b)) => a == b,
            (Int32(a), Int32(b)) => a == b,
            (Int64(a), Int64(b)) => a == b,
            (Int128(a), Int128(b)) => a == b,
            (UInt8(a), UInt8(b)) => a == b,
            (UInt16(a), UInt16(b)) => a == b,
            (UInt32(a), UInt32(b)) => a == b,
            (UInt64(a), UInt64(b)) => a == b,
            (UInt128(a), UInt128(b)) => a == b,
            (Float32(a), Float32(b)) => a == b,
            (Float64(a), Float64(b)) => a == b,
            (Decimal(a, p1, s1), Decimal(b, p2, s2)) => a == b && p1 == p2 && s1 == s2,
            (Varchar(a), Varchar(b)) => a == b,
            (Blob(a), Blob(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Time(a), Time(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (TimestampWithTimezone(a), TimestampWithTimezone(b)) => a == b,
            (Interval(a), Interval(b)) => a == b,
            (Uuid(a), Uuid(b)) => a == b,
            (Array(a, t1), Array(b, t2)) => a == b && t1 == t2,
            (List(a, t1), List(b, t2)) => a == b && t1 == t2,
            (Map(a, k1, v1), Map(b, k2, v2)) => a == b && k1 == k2 && v1 == v2,
            _ => false,
        }
    }
}

/// Orders `Null` before every other variant and otherwise compares values of
/// the same variant; values of different variants (other than `Null`)
/// compare as equal, since `Value` has no single natural type order. Used
/// only by the local-cache key sorter, which compares keys within a single
/// known column type.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use Value::*;
        Some(match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Less,
            (_, Null) => Ordering::Greater,
            (Boolean(a), Boolean(b)) => a.cmp(b),
            (Int8(a), Int8(b)) => a.cmp(b),
            (Int16(a), Int16(b)) => a.cmp(b),
            (Int32(a), Int32(b)) => a.cmp(b),
            (Int64(a), Int64(b)) => a.cmp(b),
            (Int128(a), Int128(b)) => a.cmp(b),
            (UInt8(a), UInt8(b)) => a.cmp(b),
            (UInt16(a), UInt16(b)) => a.cmp(b),
            (UInt32(a), UInt32(b)) => a.cmp(b),
            (UInt64(a), UInt64(b)) => a.cmp(b),
            (UInt128(a), UInt128(b)) => a.cmp(b),
            (Float32(a), Float32(b)) => return a.partial_cmp(b),
            (Float64(a), Float64(b)) => return a.partial_cmp(b),
            (Decimal(a, ..), Decimal(b, ..)) => a.cmp(b),
            (Varchar(a), Varchar(b)) => a.cmp(b),
            (Blob(a), Blob(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Time(a), Time(b)) => a.cmp(b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (TimestampWithTimezone(a), TimestampWithTimezone(b)) => a.cmp(b),
            (Uuid(a), Uuid(b)) => a.cmp(b),
            _ => return None,
        })
    }
}
