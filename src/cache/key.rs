//! §4.H base store key: a composite hash over {statement id, offset,
//! limit, SQL text, each parameter value, environment id}. Two
//! logically-identical calls produce equal keys; any difference in
//! these inputs produces unequal ones (§8 property 5).

use std::hash::{Hash, Hasher};
use strata_core::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(u64);

pub struct CacheKeyBuilder<'a> {
    statement_id: &'a str,
    offset: u64,
    limit: u64,
    sql_text: &'a str,
    environment_id: &'a str,
    parameters: Vec<&'a Value>,
}

impl<'a> CacheKeyBuilder<'a> {
    pub fn new(statement_id: &'a str, sql_text: &'a str, environment_id: &'a str) -> Self {
        Self {
            statement_id,
            offset: 0,
            limit: u64::MAX,
            sql_text,
            environment_id,
            parameters: Vec::new(),
        }
    }

    pub fn row_bounds(mut self, offset: u64, limit: u64) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    pub fn parameter(mut self, value: &'a Value) -> Self {
        self.parameters.push(value);
        self
    }

    pub fn build(self) -> CacheKey {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.statement_id.hash(&mut hasher);
        self.offset.hash(&mut hasher);
        self.limit.hash(&mut hasher);
        self.sql_text.hash(&mut hasher);
        self.environment_id.hash(&mut hasher);
        for value in &self.parameters {
            hash_value(value, &mut hasher);
        }
        CacheKey(hasher.finish())
    }
}

/// `Value` has no blanket `Hash` impl (its `PartialEq`/`PartialOrd` are
/// hand-written to tolerate cross-type comparisons), so the cache key
/// hashes each variant's payload directly instead.
fn hash_value(value: &Value, hasher: &mut impl Hasher) {
    use Value::*;
    std::mem::discriminant(value).hash(hasher);
    match value {
        Null => {}
        Boolean(v) => v.hash(hasher),
        Int8(v) => v.hash(hasher),
        Int16(v) => v.hash(hasher),
        Int32(v) => v.hash(hasher),
        Int64(v) => v.hash(hasher),
        Int128(v) => v.hash(hasher),
        UInt8(v) => v.hash(hasher),
        UInt16(v) => v.hash(hasher),
        UInt32(v) => v.hash(hasher),
        UInt64(v) => v.hash(hasher),
        UInt128(v) => v.hash(hasher),
        Float32(v) => v.map(|f| f.to_bits()).hash(hasher),
        Float64(v) => v.map(|f| f.to_bits()).hash(hasher),
        Decimal(v, p, s) => {
            v.map(|d| d.to_string()).hash(hasher);
            p.hash(hasher);
            s.hash(hasher);
        }
        Varchar(v) => v.hash(hasher),
        Blob(v) => v.hash(hasher),
        Date(v) => v.map(|d| d.to_string()).hash(hasher),
        Time(v) => v.map(|t| t.to_string()).hash(hasher),
        Timestamp(v) => v.map(|t| t.to_string()).hash(hasher),
        TimestampWithTimezone(v) => v.map(|t| t.to_string()).hash(hasher),
        Interval(v) => v.map(|i| format!("{i:?}")).hash(hasher),
        Uuid(v) => v.hash(hasher),
        Array(v, _) | List(v, _) => {
            if let Some(items) = v {
                for item in items.iter() {
                    hash_value(item, hasher);
                }
            }
        }
        Map(v, _, _) => {
            if let Some(entries) = v {
                for (k, val) in entries {
                    hash_value(k, hasher);
                    hash_value(val, hasher);
                }
            }
        }
    }
}
