//! §4.L Result-Set Projector. Rust has no reflective object factory to
//! build an arbitrary target type from a column set at runtime, so
//! projection here stops one layer short of that: it resolves a row
//! (and, for nested result maps, a run of rows sharing a parent key)
//! into a [`MappedRow`] — a property-named tree of scalars and nested
//! sub-rows — and leaves turning that into a caller's concrete type to
//! [`FromMappedRow`], implemented by hand the same way [`Reflectable`]
//! is implemented by hand for parameter types. This mirrors tank's own
//! `from_row` trait (generated per table there; written once per result
//! type here, since a result map's shape isn't known at compile time).

pub mod lazy;

use crate::registry::{Discriminator, Registry, ResultMap, ResultMapping};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::collections::HashSet;
use strata_core::{MapperError, Reflectable, Result, RowLabeled, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoMappingBehavior {
    None,
    Partial,
    Full,
}

#[derive(Debug, Clone, Copy)]
pub struct RowBounds {
    pub offset: u64,
    pub limit: u64,
}

impl Default for RowBounds {
    fn default() -> Self {
        Self { offset: 0, limit: u64::MAX }
    }
}

/// One resolved property of a projected row: a plain column value, a
/// single nested object, or a nested collection built by grouping
/// joined rows under the same parent key.
#[derive(Debug, Clone)]
pub enum Field {
    Scalar(Value),
    Nested(Box<MappedRow>),
    NestedList(Vec<MappedRow>),
}

/// The property-named result of resolving one row (or one group of
/// joined rows) against a `ResultMap`. Unmapped-but-present driver
/// columns land here too when auto-mapping is enabled.
#[derive(Debug, Clone, Default)]
pub struct MappedRow {
    fields: HashMap<String, Field>,
}

impl MappedRow {
    pub fn scalar(&self, property: &str) -> Result<Value> {
        match self.fields.get(property) {
            Some(Field::Scalar(value)) => Ok(value.clone()),
            Some(_) => Err(MapperError::Reflection {
                path: property.to_string(),
                target_type: "MappedRow",
                reason: "is a nested property, not a scalar".into(),
            }
            .into()),
            None => Ok(Value::Null),
        }
    }

    pub fn nested(&self, property: &str) -> Result<Option<&MappedRow>> {
        match self.fields.get(property) {
            Some(Field::Nested(row)) => Ok(Some(row)),
            Some(_) => Err(MapperError::Reflection {
                path: property.to_string(),
                target_type: "MappedRow",
                reason: "is not a nested object".into(),
            }
            .into()),
            None => Ok(None),
        }
    }

    pub fn nested_list(&self, property: &str) -> Result<&[MappedRow]> {
        match self.fields.get(property) {
            Some(Field::NestedList(rows)) => Ok(rows),
            Some(_) => Err(MapperError::Reflection {
                path: property.to_string(),
                target_type: "MappedRow",
                reason: "is not a nested collection".into(),
            }
            .into()),
            None => Ok(&[]),
        }
    }

    /// Lets an executor splice a resolved nested-query result back into
    /// the row it belongs to, once the statement-handler round trip that
    /// produced it has completed.
    pub fn set_field(&mut self, property: impl Into<String>, field: Field) {
        self.fields.insert(property.into(), field);
    }

    pub fn field(&self, property: &str) -> Option<&Field> {
        self.fields.get(property)
    }
}

/// A value a SELECT's Rust result type can be constructed from, once
/// the projector has resolved column-to-property mappings. Implemented
/// by hand for a statement's target type.
pub trait FromMappedRow: Sized {
    fn from_mapped_row(row: &MappedRow) -> Result<Self>;
}

/// A property mapping whose value depends on running another mapped
/// statement; the projector can't do this itself (it has no access to
/// an executor), so it hands the description back for the executor to
/// resolve — immediately, or through the deferred-load queue when
/// `lazy` or when the nested statement cycles back to an in-flight key.
#[derive(Debug, Clone)]
pub struct PendingNestedLoad {
    pub property: String,
    pub statement_id: String,
    pub parameter: Value,
    pub lazy: bool,
}

pub struct Projector<'a> {
    registry: &'a Registry,
    auto_mapping: AutoMappingBehavior,
    map_underscore_to_camel_case: bool,
}

impl<'a> Projector<'a> {
    pub fn new(registry: &'a Registry, auto_mapping: AutoMappingBehavior, map_underscore_to_camel_case: bool) -> Self {
        Self {
            registry,
            auto_mapping,
            map_underscore_to_camel_case,
        }
    }

    /// Projects a single row that has no nested result-map joins
    /// (the common case: one row per result object). Resolves the
    /// discriminator chain first.
    pub fn project_simple(&self, row: &RowLabeled, result_map: &ResultMap) -> Result<(MappedRow, Vec<PendingNestedLoad>)> {
        let resolved = self.resolve_discriminator(result_map, row, None)?;
        self.project_row(row, resolved, None)
    }

    /// Projects a run of rows sharing a result map with one or more
    /// `nestedResultMapId` mappings (S5): rows with the same parent key
    /// contribute to the same parent object, and each distinct child key
    /// is linked into the parent's collection-valued property at most
    /// once. Grandchild nesting (a nested result map whose own mappings
    /// nest further) is not grouped recursively — only the direct
    /// parent/child link tracked here is deduplicated.
    pub fn project_nested(&self, rows: &[RowLabeled], result_map: &ResultMap) -> Result<Vec<(MappedRow, Vec<PendingNestedLoad>)>> {
        let mut order = Vec::new();
        let mut parents: HashMap<String, (MappedRow, Vec<PendingNestedLoad>)> = HashMap::new();
        let mut linked: HashSet<(String, String, String)> = HashSet::new();

        for row in rows {
            let resolved = self.resolve_discriminator(result_map, row, None)?;
            let parent_key = row_key(row, resolved, None)?;
            if let Entry::Vacant(entry) = parents.entry(parent_key.clone()) {
                entry.insert(self.project_row(row, resolved, None)?);
                order.push(parent_key.clone());
            }

            for mapping in &resolved.mappings {
                let Some(nested_id) = &mapping.nested_result_map_id else {
                    continue;
                };
                let qualified = qualify(nested_id, &resolved.namespace);
                let Some(nested_map) = self.registry.result_maps.get(&qualified) else {
                    continue;
                };
                let prefix = mapping.column_prefix.as_deref();
                let child_key = row_key(row, nested_map, prefix)?;
                let link_key = (parent_key.clone(), mapping.property.clone(), child_key);
                if linked.contains(&link_key) {
                    continue;
                }
                linked.insert(link_key);
                let (child_row, child_pending) = self.project_row(row, nested_map, prefix)?;
                let (parent_row, parent_pending) = parents.get_mut(&parent_key).expect("parent just inserted");
                parent_pending.extend(child_pending);
                match parent_row.fields.entry(mapping.property.clone()) {
                    Entry::Occupied(mut existing) => {
                        if let Field::NestedList(list) = existing.get_mut() {
                            list.push(child_row);
                        }
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(Field::NestedList(vec![child_row]));
                    }
                }
            }
        }

        Ok(order.into_iter().map(|key| parents.remove(&key).unwrap()).collect())
    }

    fn project_row(&self, row: &RowLabeled, result_map: &ResultMap, prefix: Option<&str>) -> Result<(MappedRow, Vec<PendingNestedLoad>)> {
        let mut mapped = MappedRow::default();
        let mut pending = Vec::new();
        let mut mapped_columns = HashSet::new();

        for mapping in result_map.mappings.iter().chain(&result_map.constructor_mappings) {
            if let Some(column) = &mapping.column {
                mapped_columns.insert(column.to_ascii_lowercase());
            }
            if mapping.nested_result_map_id.is_some() {
                continue;
            }
            if let Some(statement_id) = &mapping.nested_query_id {
                let key_value = match &mapping.column {
                    Some(column) => column_value(row, column, prefix)?,
                    None => Value::Null,
                };
                pending.push(PendingNestedLoad {
                    property: mapping.property.clone(),
                    statement_id: qualify(statement_id, &result_map.namespace),
                    parameter: key_value,
                    lazy: mapping.lazy,
                });
                continue;
            }
            let Some(column) = &mapping.column else { continue };
            let value = column_value(row, column, prefix)?;
            mapped.fields.insert(mapping.property.clone(), Field::Scalar(value));
        }

        let auto_map = match self.auto_mapping {
            AutoMappingBehavior::None => false,
            AutoMappingBehavior::Partial => !has_nested_result_maps(result_map),
            AutoMappingBehavior::Full => true,
        };
        if auto_map {
            for (i, label) in row.labels.iter().enumerate() {
                let Some(bare) = strip_prefix(label, prefix) else { continue };
                if mapped_columns.contains(&bare.to_ascii_lowercase()) {
                    continue;
                }
                let property = if self.map_underscore_to_camel_case {
                    to_camel_case(&bare)
                } else {
                    bare.clone()
                };
                mapped.fields.entry(property).or_insert_with(|| Field::Scalar(row.values[i].clone()));
            }
        }

        Ok((mapped, pending))
    }

    /// Resolves `result_map → case(value) → result_map → …` against
    /// `row`, bounded by a visited-id cycle guard (§8 property 4).
    fn resolve_discriminator(&self, result_map: &'a ResultMap, row: &RowLabeled, prefix: Option<&str>) -> Result<&'a ResultMap> {
        let mut current = result_map;
        let mut visited = HashSet::new();
        loop {
            if !visited.insert(current.qualified_id()) {
                return Ok(current);
            }
            let Some(Discriminator { column, cases }) = &current.discriminator else {
                return Ok(current);
            };
            let value = column_value(row, column, prefix)?;
            let rendered = stringify(&value);
            let Some((_, case_id)) = cases.iter().find(|(case_value, _)| case_value == &rendered) else {
                return Ok(current);
            };
            let synthetic_id = format!("{}-{}", current.id, rendered);
            let qualified = format!("{}.{}", current.namespace, synthetic_id);
            let Some(next) = self.registry.result_maps.get(&qualified) else {
                let qualified_case = qualify(case_id, &current.namespace);
                return self
                    .registry
                    .result_maps
                    .get(&qualified_case)
                    .map(Ok)
                    .unwrap_or(Ok(current))?;
            };
            current = next;
        }
    }
}

fn has_nested_result_maps(result_map: &ResultMap) -> bool {
    result_map.mappings.iter().any(|m| m.nested_result_map_id.is_some())
}

fn row_key(row: &RowLabeled, result_map: &ResultMap, prefix: Option<&str>) -> Result<String> {
    let id_mappings: Vec<&ResultMapping> = result_map.mappings.iter().filter(|m| m.is_id).collect();
    let mut parts = Vec::new();
    if id_mappings.is_empty() {
        for (i, label) in row.labels.iter().enumerate() {
            if strip_prefix(label, prefix).is_some() {
                parts.push(format!("{label}={}", stringify(&row.values[i])));
            }
        }
    } else {
        for mapping in id_mappings {
            if let Some(column) = &mapping.column {
                let value = column_value(row, column, prefix)?;
                parts.push(format!("{column}={}", stringify(&value)));
            }
        }
    }
    Ok(parts.join("\u{1}"))
}

fn column_value(row: &RowLabeled, column: &str, prefix: Option<&str>) -> Result<Value> {
    let full = match prefix {
        Some(prefix) => format!("{prefix}{column}"),
        None => column.to_string(),
    };
    row.labels
        .iter()
        .position(|label| label.eq_ignore_ascii_case(&full))
        .map(|i| row.values[i].clone())
        .ok_or_else(|| {
            MapperError::Reflection {
                path: full,
                target_type: "RowLabeled",
                reason: "column not present in the result set".into(),
            }
            .into()
        })
}

fn strip_prefix(label: &str, prefix: Option<&str>) -> Option<String> {
    match prefix {
        None => Some(label.to_string()),
        Some(prefix) => label.strip_prefix(prefix).map(str::to_string),
    }
}

fn qualify(id: &str, namespace: &str) -> String {
    if id.contains('.') {
        id.to_string()
    } else {
        format!("{namespace}.{id}")
    }
}

fn stringify(value: &Value) -> String {
    use Value::*;
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

fn to_camel_case(column: &str) -> String {
    let mut out = String::with_capacity(column.len());
    let mut upper_next = false;
    for c in column.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ResultMapping;
    use std::sync::Arc;

    fn row(labels: &[&str], values: Vec<Value>) -> RowLabeled {
        RowLabeled::new(labels.iter().map(|s| s.to_string()).collect::<Vec<_>>().into(), values.into_boxed_slice())
    }

    fn result_map(mappings: Vec<ResultMapping>) -> ResultMap {
        ResultMap {
            id: "userMap".into(),
            namespace: "ns".into(),
            mappings,
            ..Default::default()
        }
    }

    #[test]
    fn maps_declared_columns_to_properties() {
        let registry = Registry::new();
        let rm = result_map(vec![ResultMapping {
            column: Some("user_name".into()),
            property: "name".into(),
            ..Default::default()
        }]);
        let projector = Projector::new(&registry, AutoMappingBehavior::None, false);
        let row = row(&["user_name"], vec![Value::Varchar(Some("ann".into()))]);
        let (mapped, pending) = projector.project_simple(&row, &rm).unwrap();
        assert!(pending.is_empty());
        assert_eq!(mapped.scalar("name").unwrap(), Value::Varchar(Some("ann".into())));
    }

    #[test]
    fn auto_maps_unmapped_columns_with_camel_case() {
        let registry = Registry::new();
        let rm = result_map(vec![]);
        let projector = Projector::new(&registry, AutoMappingBehavior::Full, true);
        let row = row(&["first_name"], vec![Value::Varchar(Some("ann".into()))]);
        let (mapped, _) = projector.project_simple(&row, &rm).unwrap();
        assert_eq!(mapped.scalar("firstName").unwrap(), Value::Varchar(Some("ann".into())));
    }

    #[test]
    fn groups_nested_join_rows_by_parent_key() {
        let mut registry = Registry::new();
        registry.result_maps.insert(
            "ns.addressMap".into(),
            ResultMap {
                id: "addressMap".into(),
                namespace: "ns".into(),
                mappings: vec![
                    ResultMapping {
                        column: Some("a_id".into()),
                        property: "id".into(),
                        is_id: true,
                        ..Default::default()
                    },
                ],
                ..Default::default()
            },
        );
        let rm = result_map(vec![
            ResultMapping {
                column: Some("u".into()),
                property: "id".into(),
                is_id: true,
                ..Default::default()
            },
            ResultMapping {
                property: "addresses".into(),
                nested_result_map_id: Some("addressMap".into()),
                ..Default::default()
            },
        ]);
        let projector = Projector::new(&registry, AutoMappingBehavior::None, false);
        let rows = vec![
            row(&["u", "a_id"], vec![Value::Int32(Some(1)), Value::Int32(Some(10))]),
            row(&["u", "a_id"], vec![Value::Int32(Some(1)), Value::Int32(Some(11))]),
            row(&["u", "a_id"], vec![Value::Int32(Some(2)), Value::Int32(Some(20))]),
        ];
        let projected = projector.project_nested(&rows, &rm).unwrap();
        assert_eq!(projected.len(), 2);
        let first_addresses = projected[0].0.nested_list("addresses").unwrap();
        assert_eq!(first_addresses.len(), 2);
        let second_addresses = projected[1].0.nested_list("addresses").unwrap();
        assert_eq!(second_addresses.len(), 1);
        let _ = Arc::new(0);
    }

    #[test]
    fn discriminator_picks_case_specific_map() {
        let mut registry = Registry::new();
        registry.result_maps.insert(
            "ns.userMap-A".into(),
            ResultMap {
                id: "userMap-A".into(),
                namespace: "ns".into(),
                mappings: vec![ResultMapping {
                    column: Some("a_only".into()),
                    property: "aOnly".into(),
                    ..Default::default()
                }],
                ..Default::default()
            },
        );
        let rm = result_map(vec![]);
        let mut rm = rm;
        rm.discriminator = Some(Discriminator {
            column: "kind".into(),
            cases: vec![("A".into(), "userMap-A".into())],
        });
        let projector = Projector::new(&registry, AutoMappingBehavior::None, false);
        let row = row(&["kind", "a_only"], vec![Value::Varchar(Some("A".into())), Value::Varchar(Some("x".into()))]);
        let (mapped, _) = projector.project_simple(&row, &rm).unwrap();
        assert_eq!(mapped.scalar("aOnly").unwrap(), Value::Varchar(Some("x".into())));
    }
}
