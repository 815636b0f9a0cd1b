/// A single property-or-constructor-arg entry inside a [`ResultMap`].
#[derive(Debug, Clone, Default)]
pub struct ResultMapping {
    pub column: Option<String>,
    pub property: String,
    pub jdbc_type: Option<String>,
    pub java_type: Option<String>,
    pub type_handler: Option<String>,
    pub nested_result_map_id: Option<String>,
    pub nested_query_id: Option<String>,
    pub result_set: Option<String>,
    pub column_prefix: Option<String>,
    pub lazy: bool,
    pub is_id: bool,
    pub is_constructor_arg: bool,
}

/// Selects a sub-result-map based on a column value. Each case is
/// compiled, at registry-build time, into a synthetic result-map with id
/// `{parent}-{value}` inheriting the enclosing map's mappings.
#[derive(Debug, Clone, Default)]
pub struct Discriminator {
    pub column: String,
    pub cases: Vec<(String, String)>,
}

/// A declarative mapping from columns to target-type properties or
/// constructor args, possibly extending a parent map and carrying a
/// discriminator.
#[derive(Debug, Clone, Default)]
pub struct ResultMap {
    pub id: String,
    pub namespace: String,
    pub extends: Option<String>,
    pub mappings: Vec<ResultMapping>,
    pub constructor_mappings: Vec<ResultMapping>,
    pub discriminator: Option<Discriminator>,
    pub auto_mapping: Option<bool>,
}

impl ResultMap {
    pub fn qualified_id(&self) -> String {
        format!("{}.{}", self.namespace, self.id)
    }

    /// Applies `extends`: the child's constructor mappings suppress the
    /// parent's entirely; other mappings are unioned with child entries
    /// taking priority over a parent entry for the same column; the
    /// child's discriminator, if any, replaces the parent's.
    pub fn merged_with_parent(mut self, parent: &ResultMap) -> ResultMap {
        if self.constructor_mappings.is_empty() {
            self.constructor_mappings = parent.constructor_mappings.clone();
        }
        let mut mappings = parent.mappings.clone();
        for child_mapping in std::mem::take(&mut self.mappings) {
            if let Some(existing) = mappings
                .iter_mut()
                .find(|m| m.column == child_mapping.column)
            {
                *existing = child_mapping;
            } else {
                mappings.push(child_mapping);
            }
        }
        self.mappings = mappings;
        if self.discriminator.is_none() {
            self.discriminator = parent.discriminator.clone();
        }
        self.extends = None;
        self
    }
}
